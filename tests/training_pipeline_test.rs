//! End-to-end tests for training, persistence and serving.

mod common;

use std::fs;
use std::sync::Arc;

use plagio::artifacts::{ArtifactStore, MODEL_FILE, STATS_FILE, VECTORIZER_FILE};
use plagio::error::{PlagiarismError, Result, TrainingError};
use plagio::ml::classifier::ClassifierKind;
use plagio::pipeline::run_training;
use plagio::service::{Confidence, ServiceContext};
use tempfile::TempDir;

#[test]
fn test_training_writes_artifacts() -> Result<()> {
    let dir = TempDir::new()?;
    let config = common::config_in(dir.path());

    let stats = run_training(&config)?;

    for file in [MODEL_FILE, VECTORIZER_FILE, STATS_FILE] {
        assert!(config.model_dir.join(file).is_file(), "{file} missing");
    }
    assert_eq!(stats.train_samples + stats.test_samples, 30);
    assert_eq!(stats.test_samples, 6);
    assert!(stats.accuracy >= 0.8, "accuracy {}", stats.accuracy);
    assert_eq!(stats.sample_features.len(), 10);

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(config.model_dir.join(STATS_FILE))?)?;
    for key in ["total_features", "accuracy", "f1_score", "sample_features", "status"] {
        assert!(json.get(key).is_some(), "stats json lacks {key}");
    }
    assert_eq!(json["status"], "Model trained successfully");

    Ok(())
}

#[test]
fn test_training_is_reproducible() -> Result<()> {
    let first = TempDir::new()?;
    let second = TempDir::new()?;
    let config_a = common::config_in(first.path());
    let config_b = common::config_in(second.path());

    let stats_a = run_training(&config_a)?;
    let stats_b = run_training(&config_b)?;

    assert_eq!(stats_a.accuracy, stats_b.accuracy);
    assert_eq!(stats_a.sample_features, stats_b.sample_features);
    for file in [MODEL_FILE, VECTORIZER_FILE] {
        assert_eq!(
            fs::read(config_a.model_dir.join(file))?,
            fs::read(config_b.model_dir.join(file))?,
            "{file} differs between runs"
        );
    }

    Ok(())
}

#[test]
fn test_serving_after_training() -> Result<()> {
    let dir = TempDir::new()?;
    let config = common::config_in(dir.path());
    run_training(&config)?;

    let ctx = ServiceContext::open(config);
    assert!(ctx.is_ready());

    let copied = ctx.predict(
        "The student copied the essay on history.",
        "A student copied an essay about history.",
    )?;
    assert_eq!(copied.prediction, 1);
    match copied.confidence {
        Confidence::Probability(p) => assert!(p > 0.5 && p <= 1.0, "confidence {p}"),
        Confidence::Unavailable => panic!("logistic regression must report confidence"),
    }
    assert!(copied.accuracy.is_some());
    assert_eq!(copied.total_features, ctx.model_info()?.total_features);

    let unrelated = ctx.predict(
        "Markets rallied after the poetry report.",
        "Rain is expected over the poetry valley.",
    )?;
    assert_eq!(unrelated.prediction, 0);

    Ok(())
}

#[test]
fn test_svm_reports_unavailable_confidence() -> Result<()> {
    let dir = TempDir::new()?;
    let mut config = common::config_in(dir.path());
    config.trainer.classifier = ClassifierKind::LinearSvm;
    run_training(&config)?;

    let ctx = ServiceContext::open(config);
    let prediction = ctx.predict("The student copied the essay.", "A student copied it.")?;

    assert_eq!(prediction.confidence, Confidence::Unavailable);
    let json = serde_json::to_value(&prediction)?;
    assert_eq!(json["confidence"], "N/A");

    Ok(())
}

#[test]
fn test_single_class_dataset_writes_nothing() -> Result<()> {
    let dir = TempDir::new()?;
    let mut config = common::config_in(dir.path());
    let rows: Vec<String> = common::dataset_rows()
        .into_iter()
        .filter(|row| row.ends_with("\t1"))
        .collect();
    config.data_path = common::write_dataset(dir.path(), &rows);

    let result = run_training(&config);
    assert!(matches!(
        result,
        Err(PlagiarismError::Training(TrainingError::SingleClass { label: 1 }))
    ));
    assert!(!ArtifactStore::new(&config.model_dir).exists());

    Ok(())
}

#[test]
fn test_concurrent_training_is_rejected() -> Result<()> {
    let dir = TempDir::new()?;
    let config = common::config_in(dir.path());
    let store = ArtifactStore::new(&config.model_dir);

    let inner = store.with_exclusive(|| Ok(run_training(&config)))?;
    assert!(matches!(inner, Err(PlagiarismError::ArtifactsLocked(_))));

    // Released once the closure returned.
    run_training(&config)?;
    Ok(())
}

#[test]
fn test_reload_picks_up_new_model() -> Result<()> {
    let dir = TempDir::new()?;
    let config = common::config_in(dir.path());

    let ctx = ServiceContext::open(config.clone());
    assert!(!ctx.is_ready());
    assert!(matches!(
        ctx.predict("a sentence", "another sentence"),
        Err(PlagiarismError::ModelNotLoaded { .. })
    ));

    run_training(&config)?;
    ctx.reload()?;
    assert!(ctx.is_ready());
    ctx.predict("a sentence", "another sentence")?;

    Ok(())
}

#[test]
fn test_failed_reload_keeps_current_model() -> Result<()> {
    let dir = TempDir::new()?;
    let config = common::config_in(dir.path());
    run_training(&config)?;

    let ctx = ServiceContext::open(config.clone());
    let before = ctx.snapshot()?;

    fs::write(config.model_dir.join(MODEL_FILE), b"truncated")?;
    assert!(matches!(
        ctx.reload(),
        Err(PlagiarismError::Serialization(_))
    ));
    assert!(ctx.is_ready());
    assert!(Arc::ptr_eq(&before, &ctx.snapshot()?));

    let copied = ctx.predict(
        "The student copied the essay on history.",
        "A student copied an essay about history.",
    )?;
    assert_eq!(copied.prediction, 1);

    Ok(())
}

#[test]
fn test_snapshot_survives_reload() -> Result<()> {
    let dir = TempDir::new()?;
    let config = common::config_in(dir.path());
    run_training(&config)?;

    let ctx = ServiceContext::open(config.clone());
    let before = ctx.snapshot()?;

    run_training(&config)?;
    let after = ctx.reload()?;
    assert!(!Arc::ptr_eq(&before, &after));

    let old = before.predict(
        "The student copied the essay on music.",
        "A student copied an essay about music.",
    )?;
    let new = ctx.predict(
        "The student copied the essay on music.",
        "A student copied an essay about music.",
    )?;
    assert_eq!(old.prediction, 1);
    assert_eq!(new.prediction, 1);

    Ok(())
}

#[test]
fn test_model_from_another_run_is_not_served() -> Result<()> {
    let full = TempDir::new()?;
    let small = TempDir::new()?;
    let config = common::config_in(full.path());

    let mut small_config = common::config_in(small.path());
    let rows = common::dataset_rows();
    small_config.data_path = common::write_dataset(small.path(), &rows[..12]);

    let full_stats = run_training(&config)?;
    let small_stats = run_training(&small_config)?;
    assert_ne!(full_stats.total_features, small_stats.total_features);

    fs::copy(
        small_config.model_dir.join(MODEL_FILE),
        config.model_dir.join(MODEL_FILE),
    )?;

    let ctx = ServiceContext::open(config);
    assert!(!ctx.is_ready());
    assert!(matches!(
        ctx.predict(
            "The student copied the essay on history.",
            "A student copied an essay about history.",
        ),
        Err(PlagiarismError::ModelNotLoaded { .. })
    ));
    assert!(matches!(
        ctx.reload(),
        Err(PlagiarismError::ModelNotLoaded { .. })
    ));

    Ok(())
}
