//! Error types for the filter engine

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Filter parsing and compilation errors
///
/// Errors are raised where they are detected and propagate unchanged to the
/// caller; a filter either compiles fully or not at all.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Missing attribute '{attribute}' on <{element}>")]
    MissingAttribute { element: String, attribute: String },

    #[error("Malformed value '{value}': expected {expected}")]
    MalformedValue { value: String, expected: &'static str },

    #[error("Malformed filter at <{element}>: {message}")]
    MalformedFilter { element: String, message: String },

    #[error("Unknown operator: {0}")]
    UnknownOperator(String),

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    #[error("Unsupported feature: {0}")]
    Unsupported(String),

    #[error("XML parse error: {0}")]
    Xml(String),
}

impl Error {
    pub(crate) fn malformed(element: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedFilter {
            element: element.into(),
            message: message.into(),
        }
    }
}

impl From<roxmltree::Error> for Error {
    fn from(err: roxmltree::Error) -> Self {
        Self::Xml(err.to_string())
    }
}
