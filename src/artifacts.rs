//! Persistence of trained artifacts.
//!
//! A model directory holds three files:
//!
//! - `plagiarism_model.bin`: the fitted classifier and the CRC32 of the
//!   vectorizer file it was trained with (bincode)
//! - `tfidf_vectorizer.bin`: the vectorizer and the normalizer settings it was
//!   fit with (bincode)
//! - `training_stats.json`: the [`TrainingStats`] of the run (JSON)
//!
//! All three are staged as temporary files in the target directory and only
//! renamed into place once every one of them has been written. Writers take
//! an exclusive advisory lock on `.train.lock`, readers a shared one. A model
//! and vectorizer from different runs are refused on load.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::analysis::normalizer::NormalizerConfig;
use crate::error::{PlagiarismError, Result};
use crate::ml::classifier::TrainedModel;
use crate::ml::tfidf::TfIdfVectorizer;
use crate::ml::trainer::TrainingStats;

pub const MODEL_FILE: &str = "plagiarism_model.bin";
pub const VECTORIZER_FILE: &str = "tfidf_vectorizer.bin";
pub const STATS_FILE: &str = "training_stats.json";
pub const LOCK_FILE: &str = ".train.lock";

/// File locations inside a model directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    dir: PathBuf,
}

impl ArtifactPaths {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn model(&self) -> PathBuf {
        self.dir.join(MODEL_FILE)
    }

    pub fn vectorizer(&self) -> PathBuf {
        self.dir.join(VECTORIZER_FILE)
    }

    pub fn stats(&self) -> PathBuf {
        self.dir.join(STATS_FILE)
    }

    pub fn lock(&self) -> PathBuf {
        self.dir.join(LOCK_FILE)
    }
}

/// Vectorizer artifact: the fitted vectorizer plus the normalizer settings
/// its vocabulary was built with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureArtifact {
    pub normalizer: NormalizerConfig,
    pub vectorizer: TfIdfVectorizer,
}

/// Model artifact: the classifier plus the checksum of the encoded
/// [`FeatureArtifact`] it was fit against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub vectorizer_checksum: u32,
    pub model: TrainedModel,
}

/// Everything the inference service needs, loaded as one unit.
#[derive(Debug, Clone)]
pub struct ModelBundle {
    pub model: TrainedModel,
    pub vectorizer: TfIdfVectorizer,
    pub normalizer: NormalizerConfig,
    /// Absent when the stats file is missing or unreadable.
    pub stats: Option<TrainingStats>,
}

/// Reads and writes the artifacts of one model directory.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    paths: ArtifactPaths,
}

impl ArtifactStore {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self {
            paths: ArtifactPaths::new(dir),
        }
    }

    pub fn paths(&self) -> &ArtifactPaths {
        &self.paths
    }

    /// Whether both binary artifacts are present.
    pub fn exists(&self) -> bool {
        self.paths.model().is_file() && self.paths.vectorizer().is_file()
    }

    /// Run `f` while holding the exclusive training lock of this directory.
    ///
    /// Fails immediately with [`PlagiarismError::ArtifactsLocked`] if another
    /// process holds the lock.
    pub fn with_exclusive<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        fs::create_dir_all(self.paths.dir())?;
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.paths.lock())?;

        let mut lock = fd_lock::RwLock::new(file);
        let _guard = match lock.try_write() {
            Ok(guard) => guard,
            Err(err) if err.kind() == io::ErrorKind::WouldBlock => {
                return Err(PlagiarismError::ArtifactsLocked(self.paths.dir().to_path_buf()));
            }
            Err(err) => return Err(err.into()),
        };

        tracing::debug!(lock = %self.paths.lock().display(), "acquired training lock");
        f()
    }

    /// Write all artifacts. Nothing is replaced unless every file was staged.
    pub fn save(
        &self,
        model: &TrainedModel,
        features: &FeatureArtifact,
        stats: &TrainingStats,
    ) -> Result<()> {
        let dir = self.paths.dir();
        fs::create_dir_all(dir)?;

        let feature_bytes = encode(features)?;
        let model_artifact = ModelArtifact {
            vectorizer_checksum: crc32fast::hash(&feature_bytes),
            model: model.clone(),
        };

        let staged = [
            (stage(dir, &encode(&model_artifact)?)?, self.paths.model()),
            (stage(dir, &feature_bytes)?, self.paths.vectorizer()),
            (
                stage(dir, &serde_json::to_vec_pretty(stats)?)?,
                self.paths.stats(),
            ),
        ];

        for (tmp, dest) in staged {
            tmp.persist(&dest).map_err(|err| err.error)?;
            tracing::debug!(path = %dest.display(), "wrote artifact");
        }
        sync_dir(dir);

        tracing::info!(dir = %dir.display(), "saved model artifacts");
        Ok(())
    }

    /// Load the model, vectorizer and (if readable) the stats.
    ///
    /// Fails with [`PlagiarismError::ArtifactsLocked`] while a training run
    /// holds the directory, and with [`PlagiarismError::ModelNotLoaded`] when
    /// the model was not trained against the vectorizer on disk.
    pub fn load(&self) -> Result<ModelBundle> {
        self.with_shared(|| {
            let feature_bytes = self.read_binary(&self.paths.vectorizer())?;
            let artifact: ModelArtifact = self.load_binary(&self.paths.model())?;
            let features: FeatureArtifact = decode(&self.paths.vectorizer(), &feature_bytes)?;

            let checksum = crc32fast::hash(&feature_bytes);
            if artifact.vectorizer_checksum != checksum {
                return Err(PlagiarismError::model_not_loaded(
                    self.paths.dir(),
                    format!(
                        "{} was trained against a different {} (checksum {:08x}, found {:08x}), retrain the model",
                        MODEL_FILE, VECTORIZER_FILE, artifact.vectorizer_checksum, checksum
                    ),
                ));
            }

            let stats = match self.load_stats() {
                Ok(stats) => stats,
                Err(err) => {
                    tracing::warn!(error = %err, "ignoring unreadable training stats");
                    None
                }
            };

            Ok(ModelBundle {
                model: artifact.model,
                vectorizer: features.vectorizer,
                normalizer: features.normalizer,
                stats,
            })
        })
    }

    /// Run `f` while holding a shared lock on the training lock file, if one
    /// exists. Fails immediately while a training run holds it.
    fn with_shared<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        let file = match File::open(self.paths.lock()) {
            Ok(file) => file,
            // Nothing has trained into this directory yet.
            Err(err) if err.kind() == io::ErrorKind::NotFound => return f(),
            Err(err) => return Err(err.into()),
        };

        let lock = fd_lock::RwLock::new(file);
        let _guard = match lock.try_read() {
            Ok(guard) => guard,
            Err(err) if err.kind() == io::ErrorKind::WouldBlock => {
                return Err(PlagiarismError::ArtifactsLocked(self.paths.dir().to_path_buf()));
            }
            Err(err) => return Err(err.into()),
        };
        f()
    }

    /// Read `training_stats.json`; `Ok(None)` when it does not exist.
    pub fn load_stats(&self) -> Result<Option<TrainingStats>> {
        let path = self.paths.stats();
        if !path.is_file() {
            return Ok(None);
        }
        let file = File::open(&path)?;
        Ok(Some(serde_json::from_reader(io::BufReader::new(file))?))
    }

    fn load_binary<T: DeserializeOwned>(&self, path: &Path) -> Result<T> {
        decode(path, &self.read_binary(path)?)
    }

    fn read_binary(&self, path: &Path) -> Result<Vec<u8>> {
        match fs::read(path) {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                Err(PlagiarismError::model_not_loaded(
                    self.paths.dir(),
                    format!("{} is missing, train the model first", path.display()),
                ))
            }
            Err(err) => Err(err.into()),
        }
    }
}

fn decode<T: DeserializeOwned>(path: &Path, bytes: &[u8]) -> Result<T> {
    let (value, _) = bincode::serde::decode_from_slice(bytes, bincode::config::standard())
        .map_err(|err| PlagiarismError::serialization(format!("{}: {err}", path.display())))?;
    Ok(value)
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    bincode::serde::encode_to_vec(value, bincode::config::standard())
        .map_err(|err| PlagiarismError::serialization(err.to_string()))
}

fn stage(dir: &Path, data: &[u8]) -> Result<NamedTempFile> {
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.as_file().sync_all()?;
    Ok(tmp)
}

#[cfg(unix)]
fn sync_dir(dir: &Path) {
    if let Ok(dir) = File::open(dir) {
        let _ = dir.sync_all();
    }
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) {}
