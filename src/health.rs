//! Periodic health probing of the detection service.
//!
//! [`HealthMonitor`] owns a dedicated HTTP client with a short probe
//! timeout, independent of the general request timeout. On client
//! construction it runs one probe immediately, then re-arms on a fixed
//! interval until stopped. The last snapshot is stored and served
//! synchronously; reads never trigger a probe.

use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, SystemTime};

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, warn};

use crate::events::{ClientEvent, EventBus};
use crate::telemetry;
use crate::types::health::HealthPayload;
use crate::types::{HealthState, ServiceHealth};
use crate::{PiiScopeError, Result};

/// Timeout for a single probe, independent of the request timeout.
pub(crate) const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Probe latency at or above which a successful probe counts as degraded.
const DEGRADED_THRESHOLD: Duration = Duration::from_millis(1000);

pub(crate) struct HealthMonitor {
    http: reqwest::Client,
    base_url: Arc<RwLock<String>>,
    events: EventBus,
    snapshot: RwLock<ServiceHealth>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl HealthMonitor {
    pub(crate) fn new(
        base_url: Arc<RwLock<String>>,
        events: EventBus,
        user_agent: &str,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(PROBE_TIMEOUT)
            .redirect(reqwest::redirect::Policy::limited(
                crate::types::config::MAX_REDIRECTS,
            ))
            .user_agent(user_agent)
            .build()
            .map_err(|e| PiiScopeError::Configuration(e.to_string()))?;
        Ok(Self {
            http,
            base_url,
            events,
            snapshot: RwLock::new(ServiceHealth::offline()),
            task: Mutex::new(None),
        })
    }

    /// Spawn the probe loop: one immediate probe, then one per `interval`.
    ///
    /// Requires a tokio runtime context.
    pub(crate) fn start(self: &Arc<Self>, interval: Duration) {
        let monitor = Arc::clone(self);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                monitor.probe().await;
            }
        });
        *self.task.lock().expect("health task lock poisoned") = Some(handle);
    }

    /// Stop the probe loop. No further probes fire after this returns,
    /// even if one was in flight. Idempotent.
    pub(crate) fn stop(&self) {
        if let Some(handle) = self.task.lock().expect("health task lock poisoned").take() {
            handle.abort();
        }
    }

    /// The last computed snapshot. Never triggers a probe.
    pub(crate) fn status(&self) -> ServiceHealth {
        self.snapshot
            .read()
            .expect("health snapshot lock poisoned")
            .clone()
    }

    /// Reset the snapshot to offline (used on shutdown).
    pub(crate) fn set_offline(&self) {
        *self
            .snapshot
            .write()
            .expect("health snapshot lock poisoned") = ServiceHealth::offline();
    }

    /// Run one probe, store the resulting snapshot, and publish it.
    pub(crate) async fn probe(&self) -> ServiceHealth {
        let url = {
            let base = self.base_url.read().expect("base url lock poisoned");
            format!("{}/health", base)
        };
        let started = Instant::now();
        let outcome = self.probe_once(&url).await;
        let elapsed = started.elapsed();

        let snapshot = match outcome {
            Ok(payload) => {
                let status = if elapsed < DEGRADED_THRESHOLD {
                    HealthState::Healthy
                } else {
                    HealthState::Degraded
                };
                metrics::counter!(telemetry::HEALTH_PROBES_TOTAL, "status" => "ok").increment(1);
                debug!(?status, elapsed_ms = elapsed.as_millis() as u64, "health probe completed");
                ServiceHealth {
                    status,
                    response_time: elapsed,
                    last_check: SystemTime::now(),
                    available_engines: payload.engines,
                    version: payload.version,
                }
            }
            Err(e) => {
                metrics::counter!(telemetry::HEALTH_PROBES_TOTAL, "status" => "error").increment(1);
                warn!(error = %e, elapsed_ms = elapsed.as_millis() as u64, "health probe failed");
                self.events.emit(ClientEvent::HealthCheckFailed {
                    error: e.to_string(),
                    response_time: elapsed,
                });
                let snapshot = ServiceHealth {
                    status: HealthState::Unhealthy,
                    response_time: elapsed,
                    last_check: SystemTime::now(),
                    available_engines: Vec::new(),
                    version: None,
                };
                *self
                    .snapshot
                    .write()
                    .expect("health snapshot lock poisoned") = snapshot.clone();
                return snapshot;
            }
        };

        *self
            .snapshot
            .write()
            .expect("health snapshot lock poisoned") = snapshot.clone();
        self.events
            .emit(ClientEvent::HealthCheckCompleted(snapshot.clone()));
        snapshot
    }

    async fn probe_once(&self, url: &str) -> Result<HealthPayload> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| PiiScopeError::Http(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(PiiScopeError::Api {
                status: status.as_u16(),
                message: format!("health endpoint returned {}", status),
            });
        }
        response
            .json::<HealthPayload>()
            .await
            .map_err(|e| PiiScopeError::Http(e.to_string()))
    }
}

impl Drop for HealthMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}
