use serde_json::Value;

use crate::{JsonPathResult, Match, ResultSet};

use super::CanonicalPath;

/// Receives the final working set of an evaluation, in order.
pub trait ResultAcceptor<'a> {
    fn accept(&mut self, value: &'a Value, path: CanonicalPath) -> JsonPathResult<()>;
}

impl<'a> ResultAcceptor<'a> for ResultSet<'a> {
    fn accept(&mut self, value: &'a Value, path: CanonicalPath) -> JsonPathResult<()> {
        self.push(Match::new(value, path));
        Ok(())
    }
}

/// Counts matches without keeping them.
#[derive(Debug, Default)]
pub struct MatchCounter {
    count: usize,
}

impl MatchCounter {
    pub fn new() -> Self {
        Self { count: 0 }
    }

    pub fn count(&self) -> usize {
        self.count
    }
}

impl<'a> ResultAcceptor<'a> for MatchCounter {
    fn accept(&mut self, _value: &'a Value, _path: CanonicalPath) -> JsonPathResult<()> {
        self.count += 1;
        Ok(())
    }
}
