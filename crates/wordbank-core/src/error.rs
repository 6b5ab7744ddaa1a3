//! Error types shared across the wordbank crates.
//!
//! Oracle errors live here rather than in `wordbank-oracles` so the practice
//! session can classify failures (network vs. malformed output vs. lookup
//! misses) without string matching.

use thiserror::Error;

/// Failures of the key-value entry store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store could not be reached or opened.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Filesystem I/O failed.
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A value could not be serialized or deserialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A persisted record exists but does not decode as an entry.
    #[error("corrupt record {key}: {reason}")]
    Corrupt { key: String, reason: String },
}

/// Errors that can occur when talking to a grading, lookup or assistant oracle.
#[derive(Debug, Error)]
pub enum OracleError {
    /// The API returned a 429 rate limit response.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// Authentication failed (invalid API key).
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The requested model was not found.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),

    /// The oracle answered, but not in the agreed shape.
    #[error("malformed oracle response: {0}")]
    MalformedResponse(String),

    /// The lookup found nothing for the input.
    #[error("not found: {0}")]
    NotFound(String),

    /// The input has a shape the oracle cannot handle (e.g. a phrase
    /// sent to a single-word dictionary).
    #[error("unsupported input: {0}")]
    UnsupportedInput(String),

    /// No provider or model is configured for the request.
    #[error("not configured: {0}")]
    NotConfigured(String),

    /// The request was rejected before any I/O.
    #[error("{0}")]
    Validation(String),
}

impl OracleError {
    /// Returns `true` if the oracle was unreachable or refused the call,
    /// as opposed to answering with something unusable.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            OracleError::RateLimited { .. }
                | OracleError::AuthenticationFailed(_)
                | OracleError::ModelNotFound(_)
                | OracleError::ApiError { .. }
                | OracleError::Timeout(_)
                | OracleError::NetworkError(_)
        )
    }

    /// Returns the retry-after delay in milliseconds, if applicable.
    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            OracleError::RateLimited { retry_after_ms } => Some(*retry_after_ms),
            _ => None,
        }
    }
}

/// Errors from the word repository.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// A required field is missing; nothing was written.
    #[error("{0}")]
    Validation(String),

    /// The id does not belong to the entry namespace.
    #[error("invalid entry id: {0}")]
    InvalidId(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors from a practice session.
#[derive(Debug, Error)]
pub enum PracticeError {
    /// The attempt was rejected before calling the grading oracle.
    #[error("{0}")]
    Validation(String),

    /// A submission is already awaiting the grading oracle.
    #[error("a submission is already in progress")]
    Busy,

    /// The action needs graded feedback and there is none.
    #[error("no feedback to act on")]
    NoFeedback,

    /// The improved sentence scored below the threshold for saving.
    #[error("score {score} is below the threshold of {threshold}")]
    ScoreTooLow { score: u8, threshold: u8 },

    #[error("grading failed: {0}")]
    Oracle(#[from] OracleError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_errors_are_classified() {
        assert!(OracleError::Timeout(30).is_transport());
        assert!(OracleError::NetworkError("reset".into()).is_transport());
        assert!(!OracleError::MalformedResponse("not json".into()).is_transport());
        assert!(!OracleError::NotFound("qwerty".into()).is_transport());
    }

    #[test]
    fn retry_after_only_for_rate_limits() {
        let err = OracleError::RateLimited {
            retry_after_ms: 5000,
        };
        assert_eq!(err.retry_after_ms(), Some(5000));
        assert_eq!(err.to_string(), "rate limited, retry after 5000ms");
        assert_eq!(OracleError::Timeout(1).retry_after_ms(), None);
    }

    #[test]
    fn repository_error_wraps_store_error() {
        let err: RepositoryError = StoreError::Unavailable("disk gone".into()).into();
        assert_eq!(err.to_string(), "store unavailable: disk gone");
    }
}
