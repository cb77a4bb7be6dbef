use thiserror::Error;

pub type JsonPathResult<T> = Result<T, JsonPathError>;

#[derive(Debug, Error, PartialEq)]
pub enum JsonPathError {
    /// The query text does not parse. Carries the message and the character offset.
    #[error("Invalid JsonPath: {0} at {1}")]
    InvalidJsonPath(String, usize),
    /// A well-formed query failed while evaluating a filter, e.g. a bad regex.
    #[error("JsonPath evaluation error: {0}")]
    EvaluationError(String),
}

impl JsonPathError {
    pub fn is_syntax_error(&self) -> bool {
        matches!(self, JsonPathError::InvalidJsonPath(_, _))
    }

    pub fn is_evaluation_error(&self) -> bool {
        matches!(self, JsonPathError::EvaluationError(_))
    }

    /// Character offset of a syntax error.
    pub fn position(&self) -> Option<usize> {
        match self {
            JsonPathError::InvalidJsonPath(_, pos) => Some(*pos),
            JsonPathError::EvaluationError(_) => None,
        }
    }
}

impl From<regex::Error> for JsonPathError {
    fn from(value: regex::Error) -> Self {
        JsonPathError::EvaluationError(format!("invalid regex pattern: {}", value))
    }
}
