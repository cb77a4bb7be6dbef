use std::fmt::{self, Display};

use serde_json::Value;

use crate::eval::CanonicalPath;

/// A matched node together with its canonical location in the document.
#[derive(Debug, Clone, PartialEq)]
pub struct Match<'a> {
    data: &'a Value,
    path: String,
}

impl<'a> Match<'a> {
    pub fn new(data: &'a Value, path: CanonicalPath) -> Self {
        Match {
            data,
            path: path.into_string(),
        }
    }

    pub fn data(&self) -> &'a Value {
        self.data
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn into_path(self) -> String {
        self.path
    }
}

impl<'a> Display for Match<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Match(data={}, path=\"{}\")", self.data, self.path)
    }
}

/// Ordered matches of one evaluation.
///
/// [`ResultSet::values`] and [`ResultSet::paths`] are projections of the same
/// matches, so they always have the same length and order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultSet<'a> {
    matches: Vec<Match<'a>>,
}

impl<'a> ResultSet<'a> {
    pub fn new() -> Self {
        ResultSet { matches: vec![] }
    }

    pub fn push(&mut self, m: Match<'a>) {
        self.matches.push(m)
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Match<'a>> {
        self.matches.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Match<'a>> {
        self.matches.iter()
    }

    pub fn values(&self) -> Vec<&'a Value> {
        self.matches.iter().map(Match::data).collect()
    }

    pub fn paths(&self) -> Vec<&str> {
        self.matches.iter().map(Match::path).collect()
    }

    /// Owned copies of the matched values.
    pub fn to_values(&self) -> Vec<Value> {
        self.matches.iter().map(|m| m.data.clone()).collect()
    }

    pub fn into_paths(self) -> Vec<String> {
        self.matches.into_iter().map(Match::into_path).collect()
    }
}

impl<'a> IntoIterator for ResultSet<'a> {
    type Item = Match<'a>;
    type IntoIter = std::vec::IntoIter<Match<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.matches.into_iter()
    }
}

impl<'r, 'a> IntoIterator for &'r ResultSet<'a> {
    type Item = &'r Match<'a>;
    type IntoIter = std::slice::Iter<'r, Match<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.matches.iter()
    }
}

impl<'a> FromIterator<Match<'a>> for ResultSet<'a> {
    fn from_iter<T: IntoIterator<Item = Match<'a>>>(iter: T) -> Self {
        ResultSet {
            matches: iter.into_iter().collect(),
        }
    }
}
