//! Telemetry metric name constants.
//!
//! Centralised metric names for piiscope operations. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `piiscope_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `method` — logical analysis method ("hybrid", "presidio", "spacy",
//!   "transformers", "benchmark")
//! - `status` — outcome: "ok" or "error"

/// Total HTTP requests dispatched (each retry attempt counts once).
///
/// Labels: `status` ("ok" | "error").
pub const REQUESTS_TOTAL: &str = "piiscope_requests_total";

/// Request duration in seconds, per resolved attempt.
pub const REQUEST_DURATION_SECONDS: &str = "piiscope_request_duration_seconds";

/// Total retry attempts (not counting the initial request).
pub const RETRIES_TOTAL: &str = "piiscope_retries_total";

/// Total response-cache hits.
///
/// Labels: `method`.
pub const CACHE_HITS_TOTAL: &str = "piiscope_cache_hits_total";

/// Total response-cache misses.
///
/// Labels: `method`.
pub const CACHE_MISSES_TOTAL: &str = "piiscope_cache_misses_total";

/// Total health probes executed.
///
/// Labels: `status` ("ok" | "error").
pub const HEALTH_PROBES_TOTAL: &str = "piiscope_health_probes_total";
