use serde_json::Value;

use super::constants::DOC_CONTEXT;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Root(RootPathToken),
    Property(PropertyPathToken),
    ArrayIndex(ArrayIndexPathToken),
    /// A bracketed union such as `[0,'a',1:3]`.
    ArrayPath(ArrayPathPathToken),
    ArraySlice(ArraySlicePathToken),
    Predicate(PredicatePathToken),
    Scan(ScanPathToken),
    Wildcard(WildcardPathToken),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RootPathToken {
    pub root_path_char: char,
}

impl RootPathToken {
    /// `$` anchors at the document, `@` at the node under evaluation.
    pub fn is_document_root(&self) -> bool {
        self.root_path_char == DOC_CONTEXT
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyPathToken {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayIndexPathToken {
    pub index: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayPathPathToken {
    pub selectors: Vec<Selector>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArraySlicePathToken {
    pub start: Option<i64>,
    pub end: Option<i64>,
    pub step: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PredicatePathToken {
    pub expression: Predicate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScanPathToken {}

#[derive(Debug, Clone, PartialEq)]
pub struct WildcardPathToken {}

/// One member of a union.
#[derive(Debug, Clone, PartialEq)]
pub enum Selector {
    Property(PropertyPathToken),
    Index(ArrayIndexPathToken),
    Slice(ArraySlicePathToken),
}

impl Selector {
    pub fn into_token(self) -> Token {
        match self {
            Selector::Property(p) => Token::Property(p),
            Selector::Index(i) => Token::ArrayIndex(i),
            Selector::Slice(s) => Token::ArraySlice(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `@.isbn`: true when the path selects at least one node.
    Exists(Vec<Token>),
    Compare {
        left: Operand,
        operator: ComparisonOperator,
        right: Operand,
    },
    Function {
        function: FilterFunction,
        args: Vec<Operand>,
    },
    And(Box<Predicate>, Box<Predicate>),
    Or(Box<Predicate>, Box<Predicate>),
    Not(Box<Predicate>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Literal(Value),
    /// A path starting with a `Token::Root`, either `@` or `$`.
    Path(Vec<Token>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOperator {
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    /// `~=`, unanchored regex match.
    Matches,
}

impl ComparisonOperator {
    /// Operators ordered so that two-character ones win over their prefixes.
    pub const ALL: [(&'static str, ComparisonOperator); 7] = [
        ("==", ComparisonOperator::Equal),
        ("!=", ComparisonOperator::NotEqual),
        ("<=", ComparisonOperator::LessEqual),
        (">=", ComparisonOperator::GreaterEqual),
        ("~=", ComparisonOperator::Matches),
        ("<", ComparisonOperator::Less),
        (">", ComparisonOperator::Greater),
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterFunction {
    /// `match(value, pattern)`: the pattern must match the whole string.
    Match,
    /// `search(value, pattern)`: the pattern may match any substring.
    Search,
}

impl FilterFunction {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "match" => Some(FilterFunction::Match),
            "search" => Some(FilterFunction::Search),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FilterFunction::Match => "match",
            FilterFunction::Search => "search",
        }
    }

    pub fn arity(&self) -> usize {
        2
    }
}
