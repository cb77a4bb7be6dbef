use std::fmt::{self, Display};

/// Canonical bracket-notation location of a node, e.g. `$['store']['book'][0]`.
///
/// Paths are built by appending to a copy of the parent's path, so nodes never
/// need to point back at their parents.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalPath(String);

impl CanonicalPath {
    pub fn root() -> Self {
        CanonicalPath("$".to_string())
    }

    pub fn key(&self, key: &str) -> Self {
        let mut path = String::with_capacity(self.0.len() + key.len() + 4);
        path.push_str(&self.0);
        path.push_str("['");
        for c in key.chars() {
            if c == '\'' || c == '\\' {
                path.push('\\');
            }
            path.push(c);
        }
        path.push_str("']");
        CanonicalPath(path)
    }

    pub fn index(&self, index: usize) -> Self {
        CanonicalPath(format!("{}[{}]", self.0, index))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl Display for CanonicalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
