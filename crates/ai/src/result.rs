use thiserror::Error;

/// Failures at the AI boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AiError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("unparseable provider response: {0}")]
    Parse(String),

    #[error("empty provider response")]
    EmptyResponse,
}
