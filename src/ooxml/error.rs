/// Error types for OOXML markup processing.
use thiserror::Error;

/// Result type for OOXML markup processing.
pub type Result<T> = std::result::Result<T, OoxmlError>;

/// Error types for OOXML markup processing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OoxmlError {
    /// XML tokenizer error
    #[error("XML error: {0}")]
    Xml(String),

    /// Unterminated construct or an event where a structural marker was required
    #[error("Unexpected structure: {0}")]
    UnexpectedStructure(String),

    /// Tracked change met while automatic acceptance is disabled
    #[error("Unexpected revision: {0}")]
    UnexpectedRevision(String),

    /// Contract violation by the calling code
    #[error("Illegal state: {0}")]
    IllegalState(String),

    /// Unsupported operand combination
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl OoxmlError {
    /// Shorthand for an unexpected structure error.
    #[inline]
    pub(crate) fn structure(message: impl Into<String>) -> Self {
        OoxmlError::UnexpectedStructure(message.into())
    }

    /// Shorthand for an illegal state error.
    #[inline]
    pub(crate) fn illegal_state(message: impl Into<String>) -> Self {
        OoxmlError::IllegalState(message.into())
    }
}

impl From<quick_xml::Error> for OoxmlError {
    fn from(err: quick_xml::Error) -> Self {
        OoxmlError::Xml(err.to_string())
    }
}

impl From<std::str::Utf8Error> for OoxmlError {
    fn from(err: std::str::Utf8Error) -> Self {
        OoxmlError::Xml(format!("Invalid UTF-8: {}", err))
    }
}
