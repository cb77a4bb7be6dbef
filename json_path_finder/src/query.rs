use std::str::FromStr;

use serde_json::Value;

use crate::{
    eval::{Eval, ResultAcceptor},
    tokenizer::{Token, Tokenizer},
    JsonPathError, JsonPathResult, ResultSet,
};

/// A parsed jsonpath, reusable across documents.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonPath {
    source: String,
    tokens: Vec<Token>,
}

impl JsonPath {
    pub fn parse(json_path: &str) -> JsonPathResult<Self> {
        let tokens = Tokenizer::new().tokenize(json_path).map_err(|e| {
            log::debug!("rejected jsonpath {:?}: {}", json_path, e);
            e
        })?;
        Ok(JsonPath {
            source: json_path.to_string(),
            tokens,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn find<'a>(&self, json: &'a Value) -> JsonPathResult<ResultSet<'a>> {
        let mut result = ResultSet::new();
        self.find_into(json, &mut result)?;
        log::debug!("jsonpath {:?} matched {} nodes", self.source, result.len());
        Ok(result)
    }

    /// Streams the matches into any [`ResultAcceptor`].
    pub fn find_into<'a>(
        &self,
        json: &'a Value,
        acceptor: &mut impl ResultAcceptor<'a>,
    ) -> JsonPathResult<()> {
        Eval::new(json).eval(&self.tokens, acceptor)
    }
}

impl FromStr for JsonPath {
    type Err = JsonPathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JsonPath::parse(s)
    }
}
