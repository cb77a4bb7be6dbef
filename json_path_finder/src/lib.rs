//! JsonPath queries over `serde_json` documents.
//!
//! Every match carries the value it selected and the canonical path that
//! leads to it, rendered in bracket notation (`$['store']['book'][0]`).
//!
//! ```
//! use json_path_finder::JsonPathQuery;
//! use serde_json::json;
//!
//! let json = json!({"store": {"bicycle": {"color": "red"}}});
//! let result = json.find("$.store.bicycle.color").unwrap();
//! assert_eq!(vec![&json!("red")], result.values());
//! assert_eq!(vec!["$['store']['bicycle']['color']"], result.paths());
//! ```
mod errors;
pub mod eval;
mod finder;
mod query;
mod result;
pub mod tokenizer;
pub use errors::*;
pub use finder::Finder;
pub use query::JsonPath;
pub use result::{Match, ResultSet};
use serde_json::Value;

pub trait JsonPathQuery {
    fn find(&self, json_path: &str) -> JsonPathResult<ResultSet<'_>>;

    fn find_values(&self, json_path: &str) -> JsonPathResult<Vec<&Value>> {
        Ok(self.find(json_path)?.values())
    }

    fn find_paths(&self, json_path: &str) -> JsonPathResult<Vec<String>> {
        Ok(self.find(json_path)?.into_paths())
    }
}

impl JsonPathQuery for Value {
    fn find(&self, json_path: &str) -> JsonPathResult<ResultSet<'_>> {
        JsonPath::parse(json_path)?.find(self)
    }
}

/// Parses `json_path` and evaluates it against `json` in one go.
pub fn parse_and_evaluate<'a>(json: &'a Value, json_path: &str) -> JsonPathResult<ResultSet<'a>> {
    json.find(json_path)
}
