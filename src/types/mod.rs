//! Core types for piiscope

pub mod config;
pub mod health;
pub mod request;
pub mod response;

pub use config::PoolConfig;
pub use health::{HealthState, ServiceHealth};
pub use request::{AnalysisOptions, Engine};
pub use response::{AnalysisResponse, PiiEntity};
