//! The public client facade.

mod builder;
mod dispatch;

pub use builder::PiiClientBuilder;

use std::sync::{Arc, RwLock};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::debug;

use crate::cache::{ResponseCache, fingerprint};
use crate::events::{ClientEvent, EventBus};
use crate::health::HealthMonitor;
use crate::telemetry;
use crate::types::{AnalysisOptions, AnalysisResponse, Engine, PoolConfig, ServiceHealth};
use crate::{PiiScopeError, Result};
use dispatch::Dispatcher;

/// TTL applied to cached analysis responses.
const ANALYSIS_TTL: Duration = Duration::from_secs(300);

/// Diagnostic snapshot of the client's internal state.
#[derive(Debug, Clone)]
pub struct ClientStatistics {
    pub service_url: String,
    pub health: ServiceHealth,
    pub active_requests: usize,
    pub cache_size: usize,
    pub pool_config: PoolConfig,
}

#[derive(Serialize)]
struct AnalyzeBody<'a> {
    text: &'a str,
    language: &'a str,
}

#[derive(Serialize)]
struct BenchmarkBody<'a> {
    text: &'a str,
}

pub(crate) struct Inner {
    base_url: Arc<RwLock<String>>,
    dispatcher: Dispatcher,
    cache: ResponseCache,
    events: EventBus,
    health: Arc<HealthMonitor>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.health.stop();
    }
}

/// Async client for a multi-engine PII detection service.
///
/// Composes a response cache, retry-with-backoff dispatch, in-flight
/// request accounting, a periodic health probe, and a broadcast event
/// bus. Cheap to clone — all clones share the same state.
///
/// ```rust,no_run
/// use piiscope::PiiClient;
///
/// #[tokio::main]
/// async fn main() -> piiscope::Result<()> {
///     let client = PiiClient::new("http://localhost:8000")?;
///     let result = client.analyze_hybrid("email me at jane@example.com", None).await?;
///     println!("{} entities found", result.entities.len());
///     client.shutdown();
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct PiiClient {
    inner: Arc<Inner>,
}

impl PiiClient {
    /// Create a client with default configuration.
    ///
    /// Must be called within a tokio runtime: construction spawns the
    /// health-probe loop.
    pub fn new(service_url: impl Into<String>) -> Result<Self> {
        Self::builder().service_url(service_url).build()
    }

    /// Create a builder for configuring the client.
    pub fn builder() -> PiiClientBuilder {
        PiiClientBuilder::new()
    }

    pub(crate) fn from_parts(
        base_url: Arc<RwLock<String>>,
        dispatcher: Dispatcher,
        events: EventBus,
        health: Arc<HealthMonitor>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                base_url,
                dispatcher,
                cache: ResponseCache::new(),
                events,
                health,
            }),
        }
    }

    /// Subscribe to the client's lifecycle events.
    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.inner.events.subscribe()
    }

    /// Analyze text with all engines the service has loaded, consolidated
    /// server-side. Results are cached for five minutes.
    pub async fn analyze_hybrid(
        &self,
        text: &str,
        options: Option<AnalysisOptions>,
    ) -> Result<AnalysisResponse> {
        self.analyze("hybrid", "/analyze/hybrid", text, options)
            .await
    }

    /// Analyze text with a single named engine. Results are cached for
    /// five minutes.
    pub async fn analyze_with_engine(
        &self,
        engine: Engine,
        text: &str,
        options: Option<AnalysisOptions>,
    ) -> Result<AnalysisResponse> {
        let path = format!("/analyze/{}", engine.as_str());
        self.analyze(engine.as_str(), &path, text, options).await
    }

    async fn analyze(
        &self,
        method: &str,
        path: &str,
        text: &str,
        options: Option<AnalysisOptions>,
    ) -> Result<AnalysisResponse> {
        if text.is_empty() {
            return Err(PiiScopeError::InvalidInput("text must be non-empty".into()));
        }
        let options = options.unwrap_or_default();
        let key = fingerprint(method, text, &options);

        if let Some(cached) = self.inner.cache.get(key) {
            metrics::counter!(telemetry::CACHE_HITS_TOTAL, "method" => method.to_owned())
                .increment(1);
            debug!(method, cache_key = key, "analysis served from cache");
            self.inner.events.emit(ClientEvent::CacheHit { cache_key: key });
            return Ok(cached);
        }
        metrics::counter!(telemetry::CACHE_MISSES_TOTAL, "method" => method.to_owned())
            .increment(1);

        let url = format!("{}{}", self.service_url(), path);
        let body = AnalyzeBody {
            text,
            language: options.effective_language(),
        };

        let outcome = self
            .inner
            .dispatcher
            .dispatch(&url, "POST", |http| http.post(&url).json(&body))
            .await;

        let response = match outcome {
            Ok(response) => response,
            Err(e) => {
                self.emit_analysis_error(method, &e, text.len());
                return Err(e);
            }
        };

        let status = response.status();
        if !status.is_success() {
            // Resolved 4xx: surfaced with the body passed through, never retried.
            let body = response.text().await.unwrap_or_default();
            let e = PiiScopeError::Api {
                status: status.as_u16(),
                message: if body.is_empty() { status.to_string() } else { body },
            };
            self.emit_analysis_error(method, &e, text.len());
            return Err(e);
        }

        let parsed: AnalysisResponse = match response.json().await {
            Ok(parsed) => parsed,
            Err(e) => {
                let e = PiiScopeError::Http(e.to_string());
                self.emit_analysis_error(method, &e, text.len());
                return Err(e);
            }
        };

        self.inner.cache.insert(key, parsed.clone(), ANALYSIS_TTL);
        self.inner.events.emit(ClientEvent::AnalysisCompleted {
            method: method.to_string(),
            text_length: text.len(),
            entities_found: parsed.entities.len(),
            processing_time: parsed.processing_time,
        });
        Ok(parsed)
    }

    fn emit_analysis_error(&self, method: &str, error: &PiiScopeError, text_length: usize) {
        self.inner.events.emit(ClientEvent::AnalysisError {
            method: method.to_string(),
            error: error.to_string(),
            text_length,
        });
    }

    /// Benchmark all engines the service has loaded. Bypasses the cache.
    ///
    /// The result shape is service-defined and returned opaquely.
    pub async fn benchmark(&self, text: &str) -> Result<serde_json::Value> {
        if text.is_empty() {
            return Err(PiiScopeError::InvalidInput("text must be non-empty".into()));
        }
        let url = format!("{}/benchmark", self.service_url());
        let body = BenchmarkBody { text };

        let outcome = self
            .inner
            .dispatcher
            .dispatch(&url, "POST", |http| http.post(&url).json(&body))
            .await;

        let result: Result<serde_json::Value> = match outcome {
            Ok(response) => {
                let status = response.status();
                if status.is_success() {
                    response
                        .json()
                        .await
                        .map_err(|e| PiiScopeError::Http(e.to_string()))
                } else {
                    let body = response.text().await.unwrap_or_default();
                    Err(PiiScopeError::Api {
                        status: status.as_u16(),
                        message: if body.is_empty() { status.to_string() } else { body },
                    })
                }
            }
            Err(e) => Err(e),
        };

        match result {
            Ok(results) => {
                self.inner.events.emit(ClientEvent::BenchmarkCompleted {
                    text_length: text.len(),
                    results: results.clone(),
                });
                Ok(results)
            }
            Err(e) => {
                self.inner.events.emit(ClientEvent::BenchmarkError {
                    error: e.to_string(),
                    text_length: text.len(),
                });
                Err(e)
            }
        }
    }

    /// Probe the service now and return the resulting snapshot.
    pub async fn check_health(&self) -> ServiceHealth {
        self.inner.health.probe().await
    }

    /// The last computed health snapshot. Never probes.
    pub fn health_status(&self) -> ServiceHealth {
        self.inner.health.status()
    }

    /// Read-only diagnostic composite. No side effects.
    pub fn statistics(&self) -> ClientStatistics {
        ClientStatistics {
            service_url: self.service_url(),
            health: self.inner.health.status(),
            active_requests: self.inner.dispatcher.active_requests(),
            cache_size: self.inner.cache.len(),
            pool_config: self.inner.dispatcher.config().clone(),
        }
    }

    /// Empty the response cache.
    pub fn clear_cache(&self) {
        self.inner.cache.clear();
        self.inner.events.emit(ClientEvent::CacheCleared);
    }

    /// Replace the base URL used by subsequent requests and health probes.
    /// A trailing slash is stripped. Outstanding in-flight requests are
    /// unaffected.
    pub fn update_service_url(&self, url: impl Into<String>) {
        let url: String = url.into();
        let url = url.trim_end_matches('/').to_string();
        *self.inner.base_url.write().expect("base url lock poisoned") = url.clone();
        self.inner
            .events
            .emit(ClientEvent::ServiceUrlUpdated { new_url: url });
    }

    /// Stop the periodic health probe. Idempotent.
    pub fn stop_health_monitoring(&self) {
        self.inner.health.stop();
    }

    /// Stop health probing, clear the cache and connection bookkeeping,
    /// and mark the service offline. In-flight requests are not cancelled.
    pub fn shutdown(&self) {
        self.inner.health.stop();
        self.inner.health.set_offline();
        self.inner.cache.clear();
        self.inner.dispatcher.reset();
        self.inner.events.emit(ClientEvent::Shutdown);
    }

    fn service_url(&self) -> String {
        self.inner
            .base_url
            .read()
            .expect("base url lock poisoned")
            .clone()
    }
}
