use std::str::FromStr;

use serde_json::Value;

use crate::{JsonPath, JsonPathQuery, JsonPathResult, ResultSet};

/// Owns a document and answers any number of queries against it.
///
/// The document is never mutated, so a `Finder` can be shared between threads.
#[derive(Debug, Clone, PartialEq)]
pub struct Finder {
    value: Value,
}

impl Finder {
    pub fn new(value: Value) -> Self {
        Finder { value }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    pub fn find(&self, json_path: &str) -> JsonPathResult<ResultSet<'_>> {
        self.value.find(json_path)
    }

    pub fn find_path(&self, json_path: &JsonPath) -> JsonPathResult<ResultSet<'_>> {
        json_path.find(&self.value)
    }

    pub fn values(&self, json_path: &str) -> JsonPathResult<Vec<&Value>> {
        self.value.find_values(json_path)
    }

    pub fn paths(&self, json_path: &str) -> JsonPathResult<Vec<String>> {
        self.value.find_paths(json_path)
    }
}

impl From<Value> for Finder {
    fn from(value: Value) -> Self {
        Finder::new(value)
    }
}

impl FromStr for Finder {
    type Err = serde_json::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Finder::new(serde_json::from_str(s)?))
    }
}
