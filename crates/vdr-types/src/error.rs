use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid base64url string: {0}")]
    InvalidBase64(String),

    #[error("invalid operation id: {0}")]
    InvalidOperationId(String),
}
