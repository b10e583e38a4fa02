//! Piiscope error types

/// Piiscope error types
#[derive(Debug, thiserror::Error)]
pub enum PiiScopeError {
    // Transport errors (connection refused/reset, timeout, DNS failure).
    // The underlying message is passed through unmodified.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Non-2xx response resolved by the service.
    ///
    /// Sub-500 statuses are never retried — the service answered, the
    /// answer was just not a success. 5xx statuses reach the caller only
    /// after retries are exhausted.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    // Data errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl PiiScopeError {
    /// Whether this error is transient and worth retrying.
    ///
    /// Transport failures and 5xx statuses are transient; everything else
    /// (4xx, decode failures, bad input, bad config) is permanent.
    pub fn is_transient(&self) -> bool {
        match self {
            PiiScopeError::Http(_) => true,
            PiiScopeError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Result type alias for piiscope operations
pub type Result<T> = std::result::Result<T, PiiScopeError>;
