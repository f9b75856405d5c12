//! Application configuration.
//!
//! Every section has a `Default`, so a config file only needs the keys it
//! changes:
//!
//! ```json
//! {
//!   "model_dir": "artifacts",
//!   "loader": { "strictness": "strict" },
//!   "trainer": { "classifier": "linear_svm", "seed": 7 }
//! }
//! ```

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::dataset::LoaderConfig;
use crate::error::{PlagiarismError, Result};
use crate::ml::tfidf::TfIdfConfig;
use crate::ml::trainer::TrainerConfig;

pub const DEFAULT_DATA_PATH: &str = "data/plagiarism_dataset.txt";
pub const DEFAULT_MODEL_DIR: &str = "model";
pub const DEFAULT_ADDR: &str = "127.0.0.1:5000";

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    /// Number of records returned by `GET /load_data`.
    pub preview_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 5000)),
            preview_limit: 10,
        }
    }
}

/// Top-level configuration shared by training and serving.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub data_path: PathBuf,
    pub model_dir: PathBuf,
    pub loader: LoaderConfig,
    pub tfidf: TfIdfConfig,
    pub trainer: TrainerConfig,
    pub server: ServerConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            model_dir: PathBuf::from(DEFAULT_MODEL_DIR),
            loader: LoaderConfig::default(),
            tfidf: TfIdfConfig::default(),
            trainer: TrainerConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Read a JSON config file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|err| {
            PlagiarismError::config(format!("cannot read {}: {err}", path.display()))
        })?;
        Self::from_json(&content)
            .map_err(|err| PlagiarismError::config(format!("{}: {err}", path.display())))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings no run could succeed with.
    pub fn validate(&self) -> Result<()> {
        let test_size = self.trainer.test_size;
        if !(test_size > 0.0 && test_size < 1.0) {
            return Err(PlagiarismError::config(format!(
                "trainer.test_size must be in (0, 1), got {test_size}"
            )));
        }
        if self.trainer.params.learning_rate <= 0.0 {
            return Err(PlagiarismError::config(
                "trainer.params.learning_rate must be positive",
            ));
        }
        if self.trainer.params.l2 < 0.0 {
            return Err(PlagiarismError::config(
                "trainer.params.l2 must not be negative",
            ));
        }
        Ok(())
    }
}
