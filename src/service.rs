//! Inference service state.
//!
//! [`ServiceContext`] owns the currently loaded model as an `Arc` snapshot.
//! Requests clone the snapshot and work on it without holding any lock;
//! [`ServiceContext::reload`] builds a complete new snapshot first and then
//! swaps the pointer, so a request never sees a half-loaded model.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Serialize, Serializer};

use crate::analysis::normalizer::TextNormalizer;
use crate::artifacts::{ArtifactStore, ModelBundle};
use crate::config::AppConfig;
use crate::dataset::{DatasetLoader, SentencePair};
use crate::error::{PlagiarismError, Result};
use crate::ml::classifier::{Classifier, ClassifierKind};
use crate::ml::trainer::TrainingStats;

/// Status reported when the stats artifact is missing.
pub const STATS_UNAVAILABLE: &str = "Training statistics unavailable";

/// Number of vocabulary terms listed by [`ServiceContext::model_info`].
const VOCABULARY_SAMPLE: usize = 20;

/// Prediction confidence: the highest class probability, when the
/// classifier provides probabilities.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Confidence {
    Probability(f64),
    Unavailable,
}

impl Confidence {
    pub fn value(&self) -> Option<f64> {
        match self {
            Confidence::Probability(p) => Some(*p),
            Confidence::Unavailable => None,
        }
    }
}

impl Serialize for Confidence {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Confidence::Probability(p) => serializer.serialize_f64(*p),
            Confidence::Unavailable => serializer.serialize_str("N/A"),
        }
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Confidence::Probability(p) => write!(f, "{p:.4}"),
            Confidence::Unavailable => f.write_str("N/A"),
        }
    }
}

/// Result of a prediction, with the training stats of the serving model.
#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    pub sentence1: String,
    pub sentence2: String,
    /// 1 means the pair was classified as plagiarized.
    pub prediction: u8,
    pub confidence: Confidence,
    pub total_features: usize,
    pub sample_features: BTreeMap<String, f64>,
    pub accuracy: Option<f64>,
    pub f1_score: Option<f64>,
    pub status: String,
}

/// Summary of the loaded model.
#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub classifier: ClassifierKind,
    pub total_features: usize,
    pub vocabulary_sample: Vec<String>,
    pub lemmatize: bool,
    pub stats: Option<TrainingStats>,
}

/// A loaded model ready to serve.
#[derive(Debug)]
pub struct ModelSnapshot {
    bundle: ModelBundle,
    normalizer: TextNormalizer,
}

impl ModelSnapshot {
    /// Fails when the model and the vectorizer disagree on the feature width.
    pub fn new(bundle: ModelBundle) -> Result<Self> {
        let width = bundle.model.n_features();
        let vocabulary = bundle.vectorizer.vocabulary_size();
        if width != vocabulary {
            return Err(PlagiarismError::serialization(format!(
                "model expects {width} features but the vectorizer produces {vocabulary}"
            )));
        }
        let normalizer = TextNormalizer::new(bundle.normalizer)?;
        Ok(Self { bundle, normalizer })
    }

    pub fn bundle(&self) -> &ModelBundle {
        &self.bundle
    }

    /// Classify one sentence pair.
    pub fn predict(&self, sentence1: &str, sentence2: &str) -> Result<Prediction> {
        if sentence1.trim().is_empty() || sentence2.trim().is_empty() {
            return Err(PlagiarismError::invalid_request("Both sentences are required"));
        }

        let norm1 = self.normalizer.normalize(sentence1)?;
        let norm2 = self.normalizer.normalize(sentence2)?;
        let row = self.bundle.vectorizer.transform(&format!("{norm1} {norm2}"));

        let model = &self.bundle.model;
        let prediction = model.predict(&row);
        let confidence = match model.predict_proba(&row) {
            Some([p0, p1]) => Confidence::Probability(p0.max(p1)),
            None => Confidence::Unavailable,
        };

        let stats = self.bundle.stats.as_ref();
        Ok(Prediction {
            sentence1: sentence1.to_string(),
            sentence2: sentence2.to_string(),
            prediction,
            confidence,
            total_features: self.bundle.vectorizer.vocabulary_size(),
            sample_features: stats.map(|s| s.sample_features.clone()).unwrap_or_default(),
            accuracy: stats.map(|s| s.accuracy),
            f1_score: stats.map(|s| s.f1_score),
            status: stats.map_or_else(|| STATS_UNAVAILABLE.to_string(), |s| s.status.clone()),
        })
    }

    pub fn info(&self) -> ModelInfo {
        ModelInfo {
            classifier: self.bundle.model.kind(),
            total_features: self.bundle.vectorizer.vocabulary_size(),
            vocabulary_sample: self
                .bundle
                .vectorizer
                .feature_names()
                .take(VOCABULARY_SAMPLE)
                .map(str::to_string)
                .collect(),
            lemmatize: self.bundle.normalizer.lemmatize,
            stats: self.bundle.stats.clone(),
        }
    }
}

#[derive(Debug)]
enum ModelState {
    Loaded(Arc<ModelSnapshot>),
    Unloaded { reason: String },
}

/// Shared state of the inference service.
#[derive(Debug)]
pub struct ServiceContext {
    config: AppConfig,
    store: ArtifactStore,
    state: RwLock<ModelState>,
}

impl ServiceContext {
    /// Create the context and try to load the model.
    ///
    /// Missing or unreadable artifacts leave the service in a degraded state
    /// where predictions fail with [`PlagiarismError::ModelNotLoaded`].
    pub fn open(config: AppConfig) -> Self {
        let store = ArtifactStore::new(&config.model_dir);
        let state = match Self::load_snapshot(&store) {
            Ok(snapshot) => {
                tracing::info!(model_dir = %config.model_dir.display(), "model loaded");
                ModelState::Loaded(snapshot)
            }
            Err(err) => {
                tracing::warn!(
                    model_dir = %config.model_dir.display(),
                    error = %err,
                    "starting without a model; train first or call /reload"
                );
                ModelState::Unloaded {
                    reason: err.to_string(),
                }
            }
        };

        Self {
            config,
            store,
            state: RwLock::new(state),
        }
    }

    fn load_snapshot(store: &ArtifactStore) -> Result<Arc<ModelSnapshot>> {
        Ok(Arc::new(ModelSnapshot::new(store.load()?)?))
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn model_dir(&self) -> &Path {
        self.store.paths().dir()
    }

    pub fn is_ready(&self) -> bool {
        matches!(*self.state.read(), ModelState::Loaded(_))
    }

    /// Re-read the artifacts. On failure the current model stays in place.
    pub fn reload(&self) -> Result<Arc<ModelSnapshot>> {
        let snapshot = Self::load_snapshot(&self.store)?;
        *self.state.write() = ModelState::Loaded(snapshot.clone());
        tracing::info!(model_dir = %self.model_dir().display(), "model reloaded");
        Ok(snapshot)
    }

    /// The current model, or [`PlagiarismError::ModelNotLoaded`].
    pub fn snapshot(&self) -> Result<Arc<ModelSnapshot>> {
        match &*self.state.read() {
            ModelState::Loaded(snapshot) => Ok(snapshot.clone()),
            ModelState::Unloaded { reason } => Err(PlagiarismError::model_not_loaded(
                self.model_dir(),
                reason.clone(),
            )),
        }
    }

    /// Classify a sentence pair. Empty sentences are rejected before the
    /// model state is consulted.
    pub fn predict(&self, sentence1: &str, sentence2: &str) -> Result<Prediction> {
        if sentence1.trim().is_empty() || sentence2.trim().is_empty() {
            return Err(PlagiarismError::invalid_request("Both sentences are required"));
        }
        self.snapshot()?.predict(sentence1, sentence2)
    }

    pub fn model_info(&self) -> Result<ModelInfo> {
        Ok(self.snapshot()?.info())
    }

    /// The first `limit` cleaned records of the configured dataset.
    pub fn preview(&self, limit: usize) -> Result<Vec<SentencePair>> {
        let loader = DatasetLoader::new(self.config.loader.clone())?;
        let dataset = loader.load(&self.config.data_path)?;
        Ok(dataset.preview(limit).to_vec())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn untrained() -> (TempDir, ServiceContext) {
        let dir = TempDir::new().unwrap();
        let config = AppConfig {
            model_dir: dir.path().join("model"),
            data_path: dir.path().join("data.tsv"),
            ..AppConfig::default()
        };
        (dir, ServiceContext::open(config))
    }

    #[test]
    fn test_confidence_serialization() {
        assert_eq!(
            serde_json::to_string(&Confidence::Probability(0.75)).unwrap(),
            "0.75"
        );
        assert_eq!(
            serde_json::to_string(&Confidence::Unavailable).unwrap(),
            "\"N/A\""
        );
        assert_eq!(Confidence::Unavailable.value(), None);
    }

    #[test]
    fn test_untrained_service_is_degraded() {
        let (_dir, ctx) = untrained();

        assert!(!ctx.is_ready());
        assert!(matches!(
            ctx.predict("one sentence", "another sentence"),
            Err(PlagiarismError::ModelNotLoaded { .. })
        ));
        assert!(ctx.model_info().is_err());
        assert!(ctx.reload().is_err());
        assert!(!ctx.is_ready());
    }

    #[test]
    fn test_empty_sentence_is_a_client_error() {
        let (_dir, ctx) = untrained();

        let err = ctx.predict("  ", "something").unwrap_err();
        assert!(err.is_client_error());
        let err = ctx.predict("something", "").unwrap_err();
        assert!(err.is_client_error());
    }

    #[test]
    fn test_snapshot_rejects_feature_width_mismatch() {
        use crate::analysis::normalizer::NormalizerConfig;
        use crate::ml::classifier::LinearParams;
        use crate::ml::tfidf::{TfIdfConfig, TfIdfVectorizer};

        let mut narrow = TfIdfVectorizer::new(TfIdfConfig::default());
        let rows = narrow.fit_transform(&["copied essay", "fresh idea"]).unwrap();
        let rows: Vec<&[f64]> = rows.iter().map(Vec::as_slice).collect();
        let mut model = ClassifierKind::LogisticRegression.build(LinearParams::default());
        model.fit(&rows, &[1, 0]).unwrap();

        let mut wide = TfIdfVectorizer::new(TfIdfConfig::default());
        wide.fit(&["copied essay history", "fresh idea market rain"]).unwrap();

        let bundle = ModelBundle {
            model: model.clone(),
            vectorizer: wide,
            normalizer: NormalizerConfig::default(),
            stats: None,
        };
        match ModelSnapshot::new(bundle) {
            Err(PlagiarismError::Serialization(msg)) => {
                assert_eq!(msg, "model expects 4 features but the vectorizer produces 7")
            }
            other => panic!("expected Serialization error, got {other:?}"),
        }

        let bundle = ModelBundle {
            model,
            vectorizer: narrow,
            normalizer: NormalizerConfig::default(),
            stats: None,
        };
        assert!(ModelSnapshot::new(bundle).is_ok());
    }

    #[test]
    fn test_preview_without_dataset() {
        let (_dir, ctx) = untrained();
        assert!(matches!(
            ctx.preview(10),
            Err(PlagiarismError::DatasetLoad(_))
        ));
    }
}
