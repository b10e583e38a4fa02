//! Analysis request options and engine selection.

use std::fmt;

use serde::Serialize;

/// A single-engine analysis backend exposed by the detection service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Engine {
    /// Microsoft Presidio pattern/context recognizers.
    Presidio,
    /// spaCy NER.
    Spacy,
    /// Transformers token-classification NER.
    Transformers,
}

impl Engine {
    /// The engine's path segment as the service expects it.
    pub fn as_str(&self) -> &'static str {
        match self {
            Engine::Presidio => "presidio",
            Engine::Spacy => "spacy",
            Engine::Transformers => "transformers",
        }
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-call analysis options. Constructed per call, not persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnalysisOptions {
    /// Language hint for the service. Defaults to `"en"` when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Restrict detection to these engine-specific entity recognizers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engines: Option<Vec<String>>,
}

impl AnalysisOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the language hint.
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Restrict detection to the given engines.
    pub fn engines(mut self, engines: Vec<String>) -> Self {
        self.engines = Some(engines);
        self
    }

    /// The effective language, applying the `"en"` default.
    pub fn effective_language(&self) -> &str {
        self.language.as_deref().unwrap_or("en")
    }
}
