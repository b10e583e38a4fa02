//! Connection-pool and retry configuration.

use std::time::Duration;

/// Maximum redirect hops followed per request, analysis and probe alike.
pub(crate) const MAX_REDIRECTS: usize = 3;

/// Configuration for the HTTP connection pool and retry behaviour.
///
/// All fields have defaults; override individual fields via the
/// builder-style setters:
///
/// ```rust
/// # use piiscope::PoolConfig;
/// # use std::time::Duration;
/// let config = PoolConfig::new()
///     .retry_attempts(5)
///     .retry_delay(Duration::from_millis(250));
/// ```
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Advisory maximum concurrent connections. Default: 10.
    ///
    /// Accepted for diagnostics but not enforced as a hard cap anywhere
    /// in the request path.
    pub max_connections: usize,
    /// TCP connect timeout. Default: 5s.
    pub connection_timeout: Duration,
    /// End-to-end timeout per request attempt. Default: 30s.
    pub request_timeout: Duration,
    /// Maximum retries after the initial attempt. 0 = no retry. Default: 3.
    pub retry_attempts: u32,
    /// Base unit for linear backoff: the Nth retry waits `retry_delay * N`.
    /// Default: 1s.
    pub retry_delay: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 10,
            connection_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(30),
            retry_attempts: 3,
            retry_delay: Duration::from_secs(1),
        }
    }
}

impl PoolConfig {
    /// Create a new config with sensible defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the advisory maximum concurrent connections.
    pub fn max_connections(mut self, n: usize) -> Self {
        self.max_connections = n;
        self
    }

    /// Set the TCP connect timeout.
    pub fn connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    /// Set the end-to-end timeout per request attempt.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the maximum retries after the initial attempt.
    pub fn retry_attempts(mut self, n: u32) -> Self {
        self.retry_attempts = n;
        self
    }

    /// Set the base unit for linear backoff.
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Calculate the backoff delay before a given retry attempt (1-indexed).
    ///
    /// Linear, not exponential: `retry_delay * attempt`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.retry_delay * attempt
    }
}
