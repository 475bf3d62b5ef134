//! Error types for wikihop operations
//!
//! Every failure observed while a search is running is fatal to the whole
//! search: the first task to hit one delivers it and the orchestrator
//! surfaces it to the caller unchanged. There is no retry layer.

use thiserror::Error;

/// Result type alias for wikihop operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for wikihop operations.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    /// Input validation error.
    ///
    /// **Recovery:** Check the start/target titles. Not retryable.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// HTTP-level error (non-success status from the remote host).
    ///
    /// **Recovery:** Check the article title exists; may be transient for
    /// 5xx responses.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Network error (connectivity, DNS, timeouts, body transfer).
    ///
    /// **Recovery:** Usually transient. Check connectivity and retry the
    /// whole search.
    #[error("Network error: {0}")]
    Network(String),

    /// The finite reachable portion of the link graph was fully explored
    /// without encountering the target.
    #[error("'{target}' is not reachable from the start article ({explored} articles explored)")]
    TargetUnreachable {
        /// The target article title
        target: String,
        /// Number of distinct articles claimed before the frontier ran dry
        explored: usize,
    },

    /// Internal invariant violation. Filing a bug report is appropriate.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an `InvalidInput` error
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Error::InvalidInput(msg.into())
    }

    /// Create an `Http` error
    pub fn http<S: Into<String>>(msg: S) -> Self {
        Error::Http(msg.into())
    }

    /// Create a `Network` error
    pub fn network<S: Into<String>>(msg: S) -> Self {
        Error::Network(msg.into())
    }

    /// Create an `Internal` error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Error::Internal(msg.into())
    }

    /// Whether this error came from the transport or the remote host rather
    /// than from this process.
    #[must_use]
    pub fn is_remote(&self) -> bool {
        matches!(self, Error::Http(_) | Error::Network(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructor_helpers() {
        assert!(matches!(Error::http("500"), Error::Http(_)));
        assert!(matches!(Error::network("refused"), Error::Network(_)));
        assert!(matches!(Error::invalid_input("empty"), Error::InvalidInput(_)));
        assert!(matches!(Error::internal("bug"), Error::Internal(_)));
    }

    #[test]
    fn test_is_remote() {
        assert!(Error::http("x").is_remote());
        assert!(Error::network("x").is_remote());
        assert!(!Error::invalid_input("x").is_remote());
        assert!(!Error::internal("x").is_remote());
    }

    #[test]
    fn test_unreachable_display_mentions_target_and_count() {
        let err = Error::TargetUnreachable {
            target: "Kumquat".to_string(),
            explored: 42,
        };
        let msg = err.to_string();
        assert!(msg.contains("Kumquat"));
        assert!(msg.contains("42"));
    }
}
