//! Command implementations for the plagio CLI.

use std::sync::Arc;

use crate::cli::args::*;
use crate::cli::output::*;
use crate::comparison::OverlapComparator;
use crate::config::AppConfig;
use crate::dataset::{DatasetLoader, Strictness};
use crate::error::Result;
use crate::pipeline::run_training;
use crate::server;
use crate::service::ServiceContext;

/// Execute a CLI command.
pub fn execute_command(args: PlagioArgs) -> Result<()> {
    let config = args.app_config()?;
    match &args.command {
        Command::Train(train_args) => train(train_args, config, &args),
        Command::Serve(serve_args) => serve(serve_args, config),
        Command::Predict(predict_args) => predict(predict_args, config, &args),
        Command::Compare(compare_args) => compare(compare_args, &args),
        Command::Preview(preview_args) => preview(preview_args, config, &args),
        Command::Info => info(config, &args),
    }
}

/// Train and persist the model.
fn train(train_args: &TrainArgs, mut config: AppConfig, cli_args: &PlagioArgs) -> Result<()> {
    if let Some(classifier) = train_args.classifier {
        config.trainer.classifier = classifier.into();
    }
    if let Some(seed) = train_args.seed {
        config.trainer.seed = seed;
    }
    if train_args.strict {
        config.loader.strictness = Strictness::Strict;
    }
    if train_args.no_lemmatize {
        config.loader.normalizer.lemmatize = false;
    }
    config.validate()?;

    let stats = run_training(&config)?;

    output_result(
        "Model training complete",
        &TrainingSummary {
            model_dir: config.model_dir.display().to_string(),
            total_features: stats.total_features,
            train_samples: stats.train_samples,
            test_samples: stats.test_samples,
            train_accuracy: stats.train_accuracy,
            train_f1_score: stats.train_f1_score,
            accuracy: stats.accuracy,
            f1_score: stats.f1_score,
            status: stats.status,
        },
        cli_args,
    )
}

/// Run the HTTP API until interrupted.
fn serve(serve_args: &ServeArgs, config: AppConfig) -> Result<()> {
    let addr = serve_args.addr.unwrap_or(config.server.addr);
    let ctx = Arc::new(ServiceContext::open(config));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(server::serve(addr, ctx))
}

/// Classify one sentence pair.
fn predict(predict_args: &PredictArgs, config: AppConfig, cli_args: &PlagioArgs) -> Result<()> {
    let ctx = ServiceContext::open(config);
    let prediction = ctx.predict(&predict_args.sentence1, &predict_args.sentence2)?;
    output_result("Prediction", &prediction, cli_args)
}

/// Word-overlap comparison of two files.
fn compare(compare_args: &CompareArgs, cli_args: &PlagioArgs) -> Result<()> {
    let comparator = OverlapComparator::new()?;
    let preprocess = !compare_args.raw;
    let similarity =
        comparator.compare_files(&compare_args.file1, &compare_args.file2, preprocess)?;

    output_result(
        &format!("Similarity Score: {similarity:.2}%"),
        &ComparisonResult {
            file1: compare_args.file1.display().to_string(),
            file2: compare_args.file2.display().to_string(),
            preprocessed: preprocess,
            similarity,
        },
        cli_args,
    )
}

/// Show the first cleaned dataset records.
fn preview(preview_args: &PreviewArgs, config: AppConfig, cli_args: &PlagioArgs) -> Result<()> {
    let loader = DatasetLoader::new(config.loader)?;
    let dataset = loader.load(&config.data_path)?;
    output_records(dataset.preview(preview_args.limit), cli_args)
}

/// Describe the trained model.
fn info(config: AppConfig, cli_args: &PlagioArgs) -> Result<()> {
    let ctx = ServiceContext::open(config);
    let info = ctx.model_info()?;
    output_result("Model info", &info, cli_args)
}
