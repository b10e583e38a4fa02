//! Request dispatch with in-flight accounting and retry-with-backoff.
//!
//! Every outbound call goes through [`Dispatcher::dispatch`]. Per attempt
//! it bumps the in-flight counter, publishes request lifecycle events,
//! and classifies the outcome:
//!
//! - any response with a sub-500 status is *resolved* — returned as-is,
//!   4xx included (the caller inspects the status);
//! - transport failures and 5xx statuses are *retryable* — re-dispatched
//!   up to `retry_attempts` times with linear backoff
//!   (`retry_delay * attempt`), after which the classified error
//!   propagates unmodified.
//!
//! Retries are invisible to the caller except through events.

use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::time::Instant;
use tracing::warn;

use crate::events::{ClientEvent, EventBus};
use crate::telemetry;
use crate::types::PoolConfig;
use crate::{PiiScopeError, Result};

pub(crate) struct Dispatcher {
    http: reqwest::Client,
    config: PoolConfig,
    events: EventBus,
    in_flight: AtomicUsize,
}

impl Dispatcher {
    pub(crate) fn new(http: reqwest::Client, config: PoolConfig, events: EventBus) -> Self {
        Self {
            http,
            config,
            events,
            in_flight: AtomicUsize::new(0),
        }
    }

    pub(crate) fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Requests currently dispatched but not yet resolved.
    pub(crate) fn active_requests(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Reset in-flight bookkeeping (shutdown path).
    pub(crate) fn reset(&self) {
        self.in_flight.store(0, Ordering::SeqCst);
    }

    fn acquire(&self) -> usize {
        self.in_flight.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Clamped decrement: the counter never goes negative, even if
    /// `reset()` raced with an in-flight request.
    fn release(&self) -> usize {
        let _ = self
            .in_flight
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Send a request, retrying retryable failures with linear backoff.
    ///
    /// `build` is invoked once per attempt so each retry gets a fresh
    /// request.
    pub(crate) async fn dispatch<F>(
        &self,
        url: &str,
        method: &str,
        build: F,
    ) -> Result<reqwest::Response>
    where
        F: Fn(&reqwest::Client) -> reqwest::RequestBuilder,
    {
        let mut attempts = 0u32;
        loop {
            let active = self.acquire();
            self.events.emit(ClientEvent::RequestStarted {
                url: url.to_string(),
                method: method.to_string(),
                active_requests: active,
            });

            let started = Instant::now();
            let outcome = build(&self.http).send().await;
            let duration = started.elapsed();
            let active = self.release();

            let error = match outcome {
                Ok(response) if response.status().as_u16() < 500 => {
                    metrics::counter!(telemetry::REQUESTS_TOTAL, "status" => "ok").increment(1);
                    metrics::histogram!(telemetry::REQUEST_DURATION_SECONDS)
                        .record(duration.as_secs_f64());
                    self.events.emit(ClientEvent::RequestCompleted {
                        url: url.to_string(),
                        status: response.status().as_u16(),
                        duration,
                        active_requests: active,
                    });
                    return Ok(response);
                }
                Ok(response) => {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    PiiScopeError::Api {
                        status: status.as_u16(),
                        message: if body.is_empty() { status.to_string() } else { body },
                    }
                }
                Err(e) => PiiScopeError::Http(e.to_string()),
            };

            metrics::counter!(telemetry::REQUESTS_TOTAL, "status" => "error").increment(1);

            if attempts < self.config.retry_attempts {
                attempts += 1;
                metrics::counter!(telemetry::RETRIES_TOTAL).increment(1);
                let delay = self.config.delay_for_attempt(attempts);
                warn!(
                    url,
                    attempt = attempts,
                    max_attempts = self.config.retry_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %error,
                    "retrying after transient failure"
                );
                self.events.emit(ClientEvent::RequestRetry {
                    url: url.to_string(),
                    attempt: attempts,
                    error: error.to_string(),
                });
                tokio::time::sleep(delay).await;
                continue;
            }

            self.events.emit(ClientEvent::RequestFailed {
                url: url.to_string(),
                error: error.to_string(),
                attempts,
            });
            return Err(error);
        }
    }
}
