use thiserror::Error;

/// Errors from encoding or parsing locator URLs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UrlError {
    #[error("empty locator")]
    Empty,

    #[error("invalid character {character:?} at byte {position}")]
    InvalidCharacter { character: char, position: usize },

    #[error("malformed locator {url:?}: {source}")]
    Malformed {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid query parameter: {0:?}")]
    InvalidQuery(String),

    #[error("invalid public key in {key}: {reason}")]
    InvalidPublicKey { key: String, reason: String },
}

pub type UrlResult<T> = std::result::Result<T, UrlError>;
