//! Analysis response types

use serde::{Deserialize, Serialize};

/// A single detected PII entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PiiEntity {
    /// Entity type as reported by the service (e.g. `EMAIL_ADDRESS`, `PERSON`).
    #[serde(rename = "type")]
    pub entity_type: String,
    /// Byte offset where the match starts.
    pub start: usize,
    /// Byte offset one past the end of the match.
    pub end: usize,
    /// Detection confidence in `[0, 1]`.
    pub score: f32,
    /// The matched text.
    pub text: String,
}

/// Result of one analysis call.
///
/// Owned by the caller once returned; the client keeps only a cached copy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    #[serde(default)]
    pub entities: Vec<PiiEntity>,
    /// Server-side processing time in seconds.
    #[serde(default)]
    pub processing_time: f64,
    /// Engine (or `"hybrid"`) that produced the result.
    #[serde(default)]
    pub engine: String,
    /// Overall confidence across entities.
    #[serde(default)]
    pub confidence: f32,
}
