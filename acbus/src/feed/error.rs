//! Feed error types.

use std::path::PathBuf;

use super::fields::Field;

/// Errors from fetching or decoding the real-time feed.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Feed answered with a non-success status code
    #[error("feed returned status {status}: {message}")]
    Status { status: u16, message: String },

    /// Response body is missing or cannot be decoded
    #[error("malformed response: {0}")]
    Malformed(String),

    /// The configured field list cannot be parsed without this field
    #[error("field list does not include {0}")]
    MissingField(Field),

    /// Canned response files could not be read
    #[error("failed to read {path:?}: {message}")]
    Io { path: PathBuf, message: String },
}

impl FeedError {
    /// Whether the feed was reached but answered with something unusable.
    ///
    /// Everything else means the feed could not be reached at all.
    pub fn is_malformed(&self) -> bool {
        matches!(self, FeedError::Malformed(_) | FeedError::MissingField(_))
    }
}
