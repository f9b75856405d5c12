//! Train/test split, classifier fitting and evaluation.

use std::collections::BTreeMap;
use std::time::Instant;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TrainingError};
use crate::ml::classifier::{Classifier, ClassifierKind, LinearParams, TrainedModel};
use crate::ml::metrics::{accuracy, weighted_f1};
use crate::ml::tfidf::{FeatureVector, TfIdfVectorizer};

/// Status recorded for a successful run.
pub const TRAINED_STATUS: &str = "Model trained successfully";

/// Trainer settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    /// Seed for the shuffle split and the sample-feature document.
    pub seed: u64,
    /// Fraction of rows held out for evaluation.
    pub test_size: f64,
    pub classifier: ClassifierKind,
    pub params: LinearParams,
    /// Number of vocabulary terms reported in `sample_features`.
    pub sample_feature_count: usize,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            test_size: 0.2,
            classifier: ClassifierKind::default(),
            params: LinearParams::default(),
            sample_feature_count: 10,
        }
    }
}

/// Vectorized rows ready for fitting, with the vectorizer that produced them.
#[derive(Debug, Clone)]
pub struct TrainingSet {
    pub features: Vec<FeatureVector>,
    pub labels: Vec<u8>,
    pub vectorizer: TfIdfVectorizer,
}

impl TrainingSet {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Summary of a training run, persisted next to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingStats {
    pub total_features: usize,
    /// Test accuracy.
    pub accuracy: f64,
    /// Test weighted F1.
    pub f1_score: f64,
    pub train_accuracy: f64,
    pub train_f1_score: f64,
    pub train_samples: usize,
    pub test_samples: usize,
    /// Weights of the first vocabulary terms in one training document.
    pub sample_features: BTreeMap<String, f64>,
    pub classifier: ClassifierKind,
    pub trained_at: DateTime<Utc>,
    pub status: String,
}

/// Index partition produced by [`train_test_split`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffle `0..n` with `seed` and hold out `ceil(n * test_size)` indices,
/// keeping at least one row on each side.
pub fn train_test_split(n: usize, test_size: f64, seed: u64) -> Result<Split> {
    if n < 2 {
        return Err(TrainingError::InsufficientData {
            min_samples: 2,
            actual: n,
        }
        .into());
    }
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(TrainingError::Fit(format!(
            "test_size must be in (0, 1), got {test_size}"
        ))
        .into());
    }

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let n_test = ((n as f64 * test_size).ceil() as usize).clamp(1, n - 1);
    let train = indices.split_off(n_test);
    Ok(Split {
        train,
        test: indices,
    })
}

fn ensure_both_classes(labels: impl IntoIterator<Item = u8>) -> Result<()> {
    let mut labels = labels.into_iter();
    let Some(first) = labels.next() else {
        return Err(TrainingError::InsufficientData {
            min_samples: 2,
            actual: 0,
        }
        .into());
    };
    if labels.all(|label| label == first) {
        return Err(TrainingError::SingleClass { label: first }.into());
    }
    Ok(())
}

fn gather<'a>(set: &'a TrainingSet, indices: &[usize]) -> (Vec<&'a [f64]>, Vec<u8>) {
    indices
        .iter()
        .map(|&i| (set.features[i].as_slice(), set.labels[i]))
        .unzip()
}

/// Fits and evaluates a classifier on a [`TrainingSet`].
#[derive(Debug, Clone, Default)]
pub struct Trainer {
    config: TrainerConfig,
}

impl Trainer {
    pub fn new(config: TrainerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    /// Split, fit, evaluate. Nothing is persisted here.
    pub fn train(&self, set: &TrainingSet) -> Result<(TrainedModel, TrainingStats)> {
        let start = Instant::now();
        if set.features.len() != set.labels.len() {
            return Err(TrainingError::Fit(format!(
                "{} feature rows but {} labels",
                set.features.len(),
                set.labels.len()
            ))
            .into());
        }
        ensure_both_classes(set.labels.iter().copied())?;

        let split = train_test_split(set.len(), self.config.test_size, self.config.seed)?;
        ensure_both_classes(split.train.iter().map(|&i| set.labels[i]))?;

        let (train_rows, train_labels) = gather(set, &split.train);
        let (test_rows, test_labels) = gather(set, &split.test);

        tracing::info!(
            classifier = %self.config.classifier,
            train_samples = train_rows.len(),
            test_samples = test_rows.len(),
            features = set.vectorizer.vocabulary_size(),
            "fitting classifier"
        );

        let mut model = self.config.classifier.build(self.config.params);
        model.fit(&train_rows, &train_labels)?;

        let predict_all =
            |rows: &[&[f64]]| -> Vec<u8> { rows.iter().map(|row| model.predict(row)).collect() };
        let train_pred = predict_all(&train_rows);
        let test_pred = predict_all(&test_rows);

        let train_accuracy = accuracy(&train_labels, &train_pred);
        let train_f1_score = weighted_f1(&train_labels, &train_pred);
        let test_accuracy = accuracy(&test_labels, &test_pred);
        let test_f1_score = weighted_f1(&test_labels, &test_pred);

        tracing::info!(train_accuracy, train_f1_score, "training partition");
        tracing::info!(
            accuracy = test_accuracy,
            f1_score = test_f1_score,
            "test partition"
        );

        let stats = TrainingStats {
            total_features: set.vectorizer.vocabulary_size(),
            accuracy: test_accuracy,
            f1_score: test_f1_score,
            train_accuracy,
            train_f1_score,
            train_samples: train_rows.len(),
            test_samples: test_rows.len(),
            sample_features: self.sample_features(set, &train_rows),
            classifier: model.kind(),
            trained_at: Utc::now(),
            status: TRAINED_STATUS.to_string(),
        };

        tracing::debug!(elapsed_ms = start.elapsed().as_millis() as u64, "training done");
        Ok((model, stats))
    }

    fn sample_features(&self, set: &TrainingSet, train_rows: &[&[f64]]) -> BTreeMap<String, f64> {
        // Offset the seed so the pick does not mirror the split's first draw.
        let mut rng = StdRng::seed_from_u64(self.config.seed.wrapping_add(1));
        let Some(row) = train_rows.get(rng.random_range(0..train_rows.len().max(1))) else {
            return BTreeMap::new();
        };

        set.vectorizer
            .feature_names()
            .take(self.config.sample_feature_count)
            .enumerate()
            .map(|(idx, term)| (term.to_string(), row.get(idx).copied().unwrap_or(0.0)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlagiarismError;
    use crate::ml::tfidf::TfIdfConfig;

    fn training_set(labels: Vec<u8>) -> TrainingSet {
        let documents: Vec<String> = labels
            .iter()
            .enumerate()
            .map(|(i, &label)| {
                if label == 1 {
                    format!("copied essay copied text doc{i}")
                } else {
                    format!("original thought fresh idea doc{i}")
                }
            })
            .collect();
        let mut vectorizer = TfIdfVectorizer::new(TfIdfConfig::default());
        let features = vectorizer.fit_transform(&documents).unwrap();
        TrainingSet {
            features,
            labels,
            vectorizer,
        }
    }

    #[test]
    fn test_split_is_seeded_and_rounds_up() {
        let a = train_test_split(11, 0.2, 42).unwrap();
        let b = train_test_split(11, 0.2, 42).unwrap();

        assert_eq!(a, b);
        assert_eq!(a.test.len(), 3);
        assert_eq!(a.train.len(), 8);

        let mut all: Vec<usize> = a.train.iter().chain(&a.test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..11).collect::<Vec<_>>());
    }

    #[test]
    fn test_split_keeps_both_sides_non_empty() {
        let split = train_test_split(2, 0.2, 7).unwrap();
        assert_eq!(split.test.len(), 1);
        assert_eq!(split.train.len(), 1);

        assert!(train_test_split(1, 0.2, 7).is_err());
        assert!(train_test_split(10, 1.0, 7).is_err());
    }

    #[test]
    fn test_train_produces_stats() {
        let labels: Vec<u8> = (0..20).map(|i| (i % 2) as u8).collect();
        let set = training_set(labels);

        let (model, stats) = Trainer::default().train(&set).unwrap();

        assert_eq!(model.n_features(), set.vectorizer.vocabulary_size());
        assert_eq!(stats.total_features, set.vectorizer.vocabulary_size());
        assert_eq!(stats.train_samples, 16);
        assert_eq!(stats.test_samples, 4);
        assert_eq!(stats.accuracy, 1.0);
        assert_eq!(stats.f1_score, 1.0);
        assert_eq!(stats.sample_features.len(), 10);
        assert_eq!(stats.status, TRAINED_STATUS);
        assert_eq!(stats.classifier, ClassifierKind::LogisticRegression);
    }

    #[test]
    fn test_train_rejects_single_class() {
        let set = training_set(vec![1; 12]);

        match Trainer::default().train(&set) {
            Err(PlagiarismError::Training(TrainingError::SingleClass { label })) => {
                assert_eq!(label, 1)
            }
            other => panic!("expected SingleClass, got {other:?}"),
        }
    }

    #[test]
    fn test_train_rejects_mismatched_rows_and_labels() {
        let mut set = training_set((0..12).map(|i| (i % 2) as u8).collect());
        set.features.truncate(7);

        match Trainer::default().train(&set) {
            Err(PlagiarismError::Training(TrainingError::Fit(msg))) => {
                assert_eq!(msg, "7 feature rows but 12 labels")
            }
            other => panic!("expected Fit error, got {other:?}"),
        }
    }

    #[test]
    fn test_train_with_svm() {
        let labels: Vec<u8> = (0..20).map(|i| (i % 2) as u8).collect();
        let set = training_set(labels);
        let config = TrainerConfig {
            classifier: ClassifierKind::LinearSvm,
            ..TrainerConfig::default()
        };

        let (model, stats) = Trainer::new(config).train(&set).unwrap();
        assert!(model.predict_proba(&set.features[0]).is_none());
        assert_eq!(stats.classifier, ClassifierKind::LinearSvm);
        assert_eq!(stats.accuracy, 1.0);
    }
}
