//! Builder for configuring client instances.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::events::{EVENT_CHANNEL_CAP, EventBus};
use crate::health::HealthMonitor;
use crate::types::PoolConfig;
use crate::types::config::MAX_REDIRECTS;
use crate::{PiiScopeError, Result};

use super::dispatch::Dispatcher;
use super::PiiClient;

/// Default base URL for the detection service.
const DEFAULT_SERVICE_URL: &str = "http://localhost:8000";

/// Default interval between health probes.
const DEFAULT_HEALTH_INTERVAL: Duration = Duration::from_secs(60);

/// Builder for configuring [`PiiClient`] instances.
///
/// ```rust,no_run
/// # use piiscope::{PiiClient, PoolConfig};
/// # fn main() -> piiscope::Result<()> {
/// # let rt = tokio::runtime::Runtime::new().unwrap();
/// # let _guard = rt.enter();
/// let client = PiiClient::builder()
///     .service_url("http://pii.internal:8000")
///     .pool_config(PoolConfig::new().retry_attempts(5))
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct PiiClientBuilder {
    service_url: String,
    pool_config: PoolConfig,
    health_interval: Duration,
    event_capacity: usize,
}

impl PiiClientBuilder {
    pub fn new() -> Self {
        Self {
            service_url: DEFAULT_SERVICE_URL.to_string(),
            pool_config: PoolConfig::default(),
            health_interval: DEFAULT_HEALTH_INTERVAL,
            event_capacity: EVENT_CHANNEL_CAP,
        }
    }

    /// Set the service base URL. A trailing slash is stripped.
    pub fn service_url(mut self, url: impl Into<String>) -> Self {
        let url: String = url.into();
        self.service_url = url.trim_end_matches('/').to_string();
        self
    }

    /// Override the connection-pool and retry configuration.
    pub fn pool_config(mut self, config: PoolConfig) -> Self {
        self.pool_config = config;
        self
    }

    /// Override the interval between health probes. Default: 60s.
    pub fn health_interval(mut self, interval: Duration) -> Self {
        self.health_interval = interval;
        self
    }

    /// Override the per-subscriber event buffer capacity.
    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    /// Build the client and start its health-probe loop.
    ///
    /// Must be called within a tokio runtime context.
    pub fn build(self) -> Result<PiiClient> {
        let user_agent = concat!("piiscope/", env!("CARGO_PKG_VERSION"));
        let http = reqwest::Client::builder()
            .timeout(self.pool_config.request_timeout)
            .connect_timeout(self.pool_config.connection_timeout)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .user_agent(user_agent)
            .build()
            .map_err(|e| PiiScopeError::Configuration(e.to_string()))?;

        let base_url = Arc::new(RwLock::new(self.service_url));
        let events = EventBus::new(self.event_capacity);
        let health = Arc::new(HealthMonitor::new(
            Arc::clone(&base_url),
            events.clone(),
            user_agent,
        )?);
        health.start(self.health_interval);

        let dispatcher = Dispatcher::new(http, self.pool_config, events.clone());
        Ok(PiiClient::from_parts(base_url, dispatcher, events, health))
    }
}

impl Default for PiiClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
