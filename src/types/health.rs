//! Service health snapshot types.

use std::time::{Duration, SystemTime};

use serde::Deserialize;

/// Liveness/readiness classification of the remote service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthState {
    /// Last probe succeeded in under a second.
    Healthy,
    /// Last probe succeeded but took a second or more.
    Degraded,
    /// Last probe failed.
    Unhealthy,
    /// No probe has completed yet, or the client has been shut down.
    Offline,
}

/// Snapshot of the remote service's health as of the last probe.
///
/// Mutated only by the health monitor; read via a cloned snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceHealth {
    pub status: HealthState,
    /// Duration of the last probe.
    pub response_time: Duration,
    /// Wall-clock time the last probe finished.
    pub last_check: SystemTime,
    /// Engine names reported by the service, in service order.
    pub available_engines: Vec<String>,
    /// Service version, when reported.
    pub version: Option<String>,
}

impl ServiceHealth {
    /// The snapshot used before any probe has run and after shutdown.
    pub fn offline() -> Self {
        Self {
            status: HealthState::Offline,
            response_time: Duration::ZERO,
            last_check: SystemTime::UNIX_EPOCH,
            available_engines: Vec::new(),
            version: None,
        }
    }
}

/// Wire shape of the service's `/health` body. Absent fields default.
#[derive(Debug, Deserialize)]
pub(crate) struct HealthPayload {
    #[serde(default)]
    pub engines: Vec<String>,
    #[serde(default)]
    pub version: Option<String>,
}
