//! Sentence normalization shared by the dataset loader and the service.
//!
//! [`TextNormalizer`] runs an [`Analyzer`] and joins the surviving tokens
//! with single spaces. Training and serving must use the same normalizer
//! settings, otherwise the vocabulary fit at training time will not match
//! the tokens seen at serving time.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::analysis::analyzer::{Analyzer, EnglishAnalyzer};
use crate::error::Result;

/// Normalizer settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    /// Reduce tokens to their lemma.
    pub lemmatize: bool,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self { lemmatize: true }
    }
}

/// Turns free text into a normalized, space-separated token string.
#[derive(Clone)]
pub struct TextNormalizer {
    analyzer: Arc<dyn Analyzer>,
}

impl std::fmt::Debug for TextNormalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextNormalizer")
            .field("analyzer", &self.analyzer.name())
            .finish()
    }
}

impl TextNormalizer {
    /// Build the English normalizer for the given settings.
    pub fn new(config: NormalizerConfig) -> Result<Self> {
        let analyzer = EnglishAnalyzer::with_lemmatization(config.lemmatize)?;
        Ok(Self::with_analyzer(Arc::new(analyzer)))
    }

    /// Use a custom analyzer.
    pub fn with_analyzer(analyzer: Arc<dyn Analyzer>) -> Self {
        Self { analyzer }
    }

    /// Normalize `text`. Returns an empty string when nothing survives.
    pub fn normalize(&self, text: &str) -> Result<String> {
        let tokens: Vec<String> = self.analyzer.analyze(text)?.map(|t| t.text).collect();
        Ok(tokens.join(" "))
    }
}
