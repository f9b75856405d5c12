//! Command line argument parsing for the plagio CLI using clap.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::error::Result;
use crate::ml::classifier::ClassifierKind;

/// plagio - sentence-pair plagiarism detection
#[derive(Parser, Debug, Clone)]
#[command(name = "plagio")]
#[command(about = "Train, serve and query a sentence-pair plagiarism classifier")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct PlagioArgs {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors (overrides verbose)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human", global = true)]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// JSON configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Tab-separated sentence-pair dataset
    #[arg(long, env = "PLAGIO_DATA_PATH", global = true, value_name = "FILE")]
    pub data_path: Option<PathBuf>,

    /// Directory holding the trained artifacts
    #[arg(long, env = "PLAGIO_MODEL_DIR", global = true, value_name = "DIR")]
    pub model_dir: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl PlagioArgs {
    /// Effective verbosity: 0 errors only, 1 warnings (default), 2 info, 3+ debug.
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose.saturating_add(1)
        }
    }

    /// Configuration file (or defaults) with path flags applied on top.
    pub fn app_config(&self) -> Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::from_file(path)?,
            None => AppConfig::default(),
        };
        if let Some(data_path) = &self.data_path {
            config.data_path = data_path.clone();
        }
        if let Some(model_dir) = &self.model_dir {
            config.model_dir = model_dir.clone();
        }
        Ok(config)
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Train the classifier and write the model artifacts
    Train(TrainArgs),

    /// Run the HTTP API
    Serve(ServeArgs),

    /// Classify one sentence pair with the trained model
    Predict(PredictArgs),

    /// Word-overlap similarity of two text files
    Compare(CompareArgs),

    /// Show the first cleaned dataset records
    Preview(PreviewArgs),

    /// Describe the trained model
    Info,
}

/// Arguments for training
#[derive(Parser, Debug, Clone, Default)]
pub struct TrainArgs {
    /// Classifier to fit
    #[arg(long)]
    pub classifier: Option<ClassifierArg>,

    /// Seed for the train/test split
    #[arg(long)]
    pub seed: Option<u64>,

    /// Fail instead of warning when too few rows survive cleaning
    #[arg(long)]
    pub strict: bool,

    /// Skip lemmatization during normalization
    #[arg(long)]
    pub no_lemmatize: bool,
}

/// Arguments for the HTTP server
#[derive(Parser, Debug, Clone)]
pub struct ServeArgs {
    /// Listen address [default: 127.0.0.1:5000]
    #[arg(long)]
    pub addr: Option<SocketAddr>,
}

/// Arguments for a single prediction
#[derive(Parser, Debug, Clone)]
pub struct PredictArgs {
    pub sentence1: String,
    pub sentence2: String,
}

/// Arguments for file comparison
#[derive(Parser, Debug, Clone)]
pub struct CompareArgs {
    pub file1: PathBuf,
    pub file2: PathBuf,

    /// Compare the texts as they are, without lowercasing or stripping punctuation
    #[arg(long)]
    pub raw: bool,
}

/// Arguments for dataset preview
#[derive(Parser, Debug, Clone)]
pub struct PreviewArgs {
    /// Number of records to show
    #[arg(short = 'n', long, default_value_t = 10)]
    pub limit: usize,
}

/// Classifier choice on the command line
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifierArg {
    /// Logistic regression, reports confidence
    Logistic,
    /// Linear SVM, no confidence
    Svm,
}

impl From<ClassifierArg> for ClassifierKind {
    fn from(arg: ClassifierArg) -> Self {
        match arg {
            ClassifierArg::Logistic => ClassifierKind::LogisticRegression,
            ClassifierArg::Svm => ClassifierKind::LinearSvm,
        }
    }
}

/// Output formats for CLI
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}
