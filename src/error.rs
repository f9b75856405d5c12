//! Error types for plagio.
//!
//! All fallible operations return [`Result`], whose error type is
//! [`PlagiarismError`]. Dataset and training failures carry their own
//! structured enums ([`DatasetLoadError`], [`TrainingError`]) so the causing
//! condition survives all the way to the CLI or the HTTP boundary.
//!
//! # Examples
//!
//! ```
//! use plagio::error::{PlagiarismError, Result};
//!
//! fn check(sentence: &str) -> Result<()> {
//!     if sentence.trim().is_empty() {
//!         return Err(PlagiarismError::invalid_request("sentence is empty"));
//!     }
//!     Ok(())
//! }
//!
//! let err = check("  ").unwrap_err();
//! assert!(err.is_client_error());
//! ```

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// The main error type for plagio operations.
#[derive(Error, Debug)]
pub enum PlagiarismError {
    /// I/O errors (file operations, sockets, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The dataset could not be turned into training records.
    #[error("Dataset load error: {0}")]
    DatasetLoad(#[from] DatasetLoadError),

    /// The classifier could not be fit.
    #[error("Training error: {0}")]
    Training(#[from] TrainingError),

    /// Serving was attempted before training artifacts were available.
    #[error("Model not loaded from {}: {reason}", .model_dir.display())]
    ModelNotLoaded { model_dir: PathBuf, reason: String },

    /// The caller sent a request that cannot be served.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Another process holds the training lock on the artifact directory.
    #[error("Artifact directory {} is locked by another training run", .0.display())]
    ArtifactsLocked(PathBuf),

    /// Analysis-related errors (tokenization, filtering, etc.)
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Binary artifact encoding/decoding errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for operations that may fail with PlagiarismError.
pub type Result<T> = std::result::Result<T, PlagiarismError>;

impl PlagiarismError {
    /// Create a new invalid request error.
    pub fn invalid_request<S: Into<String>>(msg: S) -> Self {
        PlagiarismError::InvalidRequest(msg.into())
    }

    /// Create a new analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        PlagiarismError::Analysis(msg.into())
    }

    /// Create a new configuration error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        PlagiarismError::Config(msg.into())
    }

    /// Create a new serialization error.
    pub fn serialization<S: Into<String>>(msg: S) -> Self {
        PlagiarismError::Serialization(msg.into())
    }

    /// Create a new model-not-loaded error.
    pub fn model_not_loaded<P: Into<PathBuf>, S: Into<String>>(model_dir: P, reason: S) -> Self {
        PlagiarismError::ModelNotLoaded {
            model_dir: model_dir.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error was caused by the caller rather than by server state.
    pub fn is_client_error(&self) -> bool {
        matches!(self, PlagiarismError::InvalidRequest(_))
    }
}

/// Reasons a dataset could not be loaded.
#[derive(Error, Debug)]
pub enum DatasetLoadError {
    #[error("dataset not found at {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read dataset {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("line {line}: expected 3 tab-separated fields, found {found}")]
    Malformed { line: u64, found: usize },

    #[error("line {line}: label {value:?} is not a valid class")]
    InvalidLabel { line: u64, value: String },

    #[error("dataset {} has no usable rows after cleaning", .0.display())]
    Empty(PathBuf),

    #[error("only {actual} usable rows after cleaning, need at least {min_rows}")]
    TooFewRows { min_rows: usize, actual: usize },
}

/// Reasons the classifier could not be fit.
#[derive(Error, Debug)]
pub enum TrainingError {
    #[error("training data contains a single label class ({label}); a binary classifier needs both")]
    SingleClass { label: u8 },

    #[error("need at least {min_samples} samples to train, got {actual}")]
    InsufficientData { min_samples: usize, actual: usize },

    #[error("classifier fit failed: {0}")]
    Fit(String),
}
