//! Location error types.

use std::path::PathBuf;
use std::time::Duration;

/// Errors that can occur while determining the current position.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LocationError {
    /// No fix arrived before the configured timeout
    #[error("timed out after {0:?} waiting for a position fix")]
    Timeout(Duration),

    /// The provider refused or failed (permissions, hardware, ...)
    #[error("position unavailable: {0}")]
    Unavailable(String),

    /// The latest fix is older than the maximum age
    #[error("latest fix is {age_secs}s old (limit {max_age_secs}s)")]
    Stale { age_secs: u64, max_age_secs: u64 },

    /// The fix file could not be read
    #[error("failed to read {path:?}: {message}")]
    Io { path: PathBuf, message: String },

    /// The fix file could not be parsed
    #[error("invalid position fix: {0}")]
    Invalid(String),
}
