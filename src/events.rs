//! Client lifecycle events and the broadcast bus that carries them.
//!
//! Every request attempt, retry, cache interaction, and health probe
//! publishes a [`ClientEvent`] on a `tokio::sync::broadcast` channel.
//! Emission is fire-and-forget: no subscriber is required, and a slow
//! or failing subscriber can never block or fail the emitting call path.
//! Slow receivers see [`tokio::sync::broadcast::error::RecvError::Lagged`]
//! when they fall more than [`EVENT_CHANNEL_CAP`] events behind.

use std::time::Duration;

use tokio::sync::broadcast;

use crate::types::ServiceHealth;

/// Events buffered per subscriber before lag kicks in.
pub const EVENT_CHANNEL_CAP: usize = 256;

/// Lifecycle events published by the client.
#[derive(Debug, Clone)]
pub enum ClientEvent {
    /// An HTTP attempt was dispatched (retries count as new attempts).
    RequestStarted {
        url: String,
        method: String,
        active_requests: usize,
    },
    /// An HTTP attempt resolved with a sub-500 status.
    RequestCompleted {
        url: String,
        status: u16,
        duration: Duration,
        active_requests: usize,
    },
    /// A retryable failure; the request will be re-dispatched.
    RequestRetry {
        url: String,
        /// 1-indexed retry number (the initial attempt is not a retry).
        attempt: u32,
        error: String,
    },
    /// Retries exhausted; the error propagates to the caller.
    RequestFailed {
        url: String,
        error: String,
        /// Retries used (not counting the initial attempt).
        attempts: u32,
    },
    /// An analysis call was served from the response cache.
    CacheHit { cache_key: u64 },
    /// An analysis call completed successfully.
    AnalysisCompleted {
        method: String,
        text_length: usize,
        entities_found: usize,
        processing_time: f64,
    },
    /// An analysis call failed.
    AnalysisError {
        method: String,
        error: String,
        text_length: usize,
    },
    /// A benchmark call completed successfully.
    BenchmarkCompleted {
        text_length: usize,
        results: serde_json::Value,
    },
    /// A benchmark call failed.
    BenchmarkError { error: String, text_length: usize },
    /// A health probe succeeded; carries the full snapshot.
    HealthCheckCompleted(ServiceHealth),
    /// A health probe failed.
    HealthCheckFailed {
        error: String,
        response_time: Duration,
    },
    /// The response cache was emptied.
    CacheCleared,
    /// The base URL changed.
    ServiceUrlUpdated { new_url: String },
    /// The client was shut down.
    Shutdown,
}

/// Broadcast bus for [`ClientEvent`]s.
///
/// Clone freely — all clones share the same underlying channel.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ClientEvent>,
}

impl EventBus {
    /// Create a bus with the given per-subscriber capacity.
    pub(crate) fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to the event stream.
    ///
    /// The receiver sees every event emitted while it is alive.
    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.tx.subscribe()
    }

    /// Publish an event to all current subscribers.
    ///
    /// Having no subscribers is not an error.
    pub(crate) fn emit(&self, event: ClientEvent) {
        let _ = self.tx.send(event);
    }
}
