//! End-to-end training run: load, vectorize, fit, evaluate, persist.

use crate::artifacts::{ArtifactStore, FeatureArtifact};
use crate::config::AppConfig;
use crate::dataset::DatasetLoader;
use crate::error::Result;
use crate::ml::trainer::{Trainer, TrainingStats};

/// Train on `config.data_path` and write the artifacts to `config.model_dir`.
///
/// Holds the model directory's training lock for the whole run. Artifacts
/// are only written after every step succeeded.
pub fn run_training(config: &AppConfig) -> Result<TrainingStats> {
    let store = ArtifactStore::new(&config.model_dir);

    store.with_exclusive(|| {
        tracing::info!(
            data_path = %config.data_path.display(),
            model_dir = %config.model_dir.display(),
            "starting model training"
        );

        let loader = DatasetLoader::new(config.loader.clone())?;
        let dataset = loader.load(&config.data_path)?;
        let training_set = dataset.vectorize(config.tfidf)?;

        let (model, stats) = Trainer::new(config.trainer.clone()).train(&training_set)?;

        let features = FeatureArtifact {
            normalizer: config.loader.normalizer,
            vectorizer: training_set.vectorizer,
        };
        store.save(&model, &features, &stats)?;

        tracing::info!(
            accuracy = stats.accuracy,
            f1_score = stats.f1_score,
            total_features = stats.total_features,
            "model training complete"
        );
        Ok(stats)
    })
}
