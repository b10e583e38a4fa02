//! Piiscope - resilient client for multi-engine PII detection services
//!
//! This crate provides [`PiiClient`], an async HTTP client for text-analysis
//! services that detect personally identifiable information with multiple
//! engines (Presidio, spaCy, Transformers). The client layers reliability
//! and observability over the raw API:
//!
//! - bounded retry with linear backoff on transport failures and 5xx,
//! - a TTL + capacity-bounded response cache (FIFO eviction),
//! - in-flight request accounting,
//! - a self-scheduling periodic health probe,
//! - a broadcast [`ClientEvent`] bus for lifecycle observability.
//!
//! # Example
//!
//! ```rust,no_run
//! use piiscope::{AnalysisOptions, Engine, PiiClient};
//!
//! #[tokio::main]
//! async fn main() -> piiscope::Result<()> {
//!     let client = PiiClient::new("http://localhost:8000")?;
//!
//!     let result = client
//!         .analyze_with_engine(
//!             Engine::Presidio,
//!             "Jane Doe's card is 4111-1111-1111-1111",
//!             Some(AnalysisOptions::new().language("en")),
//!         )
//!         .await?;
//!
//!     for entity in &result.entities {
//!         println!("{} [{}..{}] {:.2}", entity.entity_type, entity.start, entity.end, entity.score);
//!     }
//!
//!     client.shutdown();
//!     Ok(())
//! }
//! ```
//!
//! # Observability
//!
//! Subscribe to lifecycle events with [`PiiClient::subscribe`]; emission is
//! fire-and-forget and never affects the primary call path. Metrics are
//! emitted through the `metrics` facade (see [`telemetry`] for names), and
//! retries and probe failures are logged via `tracing`.

pub mod cache;
pub mod client;
pub mod error;
pub mod events;
mod health;
pub mod telemetry;
pub mod types;

// Re-export main types at crate root
pub use cache::ResponseCache;
pub use client::{ClientStatistics, PiiClient, PiiClientBuilder};
pub use error::{PiiScopeError, Result};
pub use events::ClientEvent;
pub use types::{
    AnalysisOptions, AnalysisResponse, Engine, HealthState, PiiEntity, PoolConfig, ServiceHealth,
};
