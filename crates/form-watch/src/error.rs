//! Error types.

use thiserror::Error;

/// Failure while turning a JSON schema into a [`SchemaNode`](crate::SchemaNode).
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("invalid schema JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Error returned by a watch handler.
///
/// Handler errors never leave the dispatcher; they are logged against the
/// watch path and collected into the dispatch report.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct HandlerError(pub String);

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl From<&str> for HandlerError {
    fn from(message: &str) -> Self {
        Self(message.to_string())
    }
}

impl From<String> for HandlerError {
    fn from(message: String) -> Self {
        Self(message)
    }
}
