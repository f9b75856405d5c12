//! Sentence-pair dataset loading.
//!
//! The dataset is a tab-separated file without a header where every row is
//! `sentence1 \t sentence2 \t label`. Loading cleans each row, normalizes
//! both sentences with a [`TextNormalizer`] and keeps only rows where both
//! sentences still have content.
//!
//! # Examples
//!
//! ```no_run
//! use plagio::dataset::{DatasetLoader, LoaderConfig};
//! use plagio::ml::tfidf::TfIdfConfig;
//!
//! let loader = DatasetLoader::new(LoaderConfig::default()).unwrap();
//! let dataset = loader.load("data/plagiarism_dataset.txt").unwrap();
//! let training_set = dataset.vectorize(TfIdfConfig::default()).unwrap();
//! println!("{} rows, {} features", training_set.len(), training_set.vectorizer.vocabulary_size());
//! ```

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::analysis::normalizer::{NormalizerConfig, TextNormalizer};
use crate::error::{DatasetLoadError, Result};
use crate::ml::tfidf::{TfIdfConfig, TfIdfVectorizer};
use crate::ml::trainer::TrainingSet;

/// Placeholder for blank sentence fields.
pub const EMPTY_PLACEHOLDER: &str = "empty";

/// What to do when the usable row count is below `min_rows`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strictness {
    /// Log a warning and continue.
    #[default]
    Soft,
    /// Fail with [`DatasetLoadError::TooFewRows`].
    Strict,
}

/// What to do with a row whose label is not 0 or 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelPolicy {
    /// Skip the row.
    #[default]
    Drop,
    /// Fail with [`DatasetLoadError::InvalidLabel`].
    Reject,
}

/// Loader settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    pub min_rows: usize,
    pub strictness: Strictness,
    pub label_policy: LabelPolicy,
    pub normalizer: NormalizerConfig,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            min_rows: 10,
            strictness: Strictness::Soft,
            label_policy: LabelPolicy::Drop,
            normalizer: NormalizerConfig::default(),
        }
    }
}

/// A cleaned, normalized dataset row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentencePair {
    pub sentence1: String,
    pub sentence2: String,
    pub label: u8,
    pub sentence1_word_count: usize,
    pub sentence2_word_count: usize,
}

impl SentencePair {
    /// The text the vectorizer sees: both sentences joined by a space.
    pub fn document(&self) -> String {
        format!("{} {}", self.sentence1, self.sentence2)
    }
}

/// Row counts collected while loading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadReport {
    pub rows_read: usize,
    pub malformed: usize,
    pub invalid_label: usize,
    pub empty_after_normalization: usize,
    pub kept: usize,
}

impl LoadReport {
    pub fn dropped(&self) -> usize {
        self.malformed + self.invalid_label + self.empty_after_normalization
    }
}

/// The cleaned records of one dataset file.
#[derive(Debug, Clone)]
pub struct Dataset {
    path: PathBuf,
    records: Vec<SentencePair>,
    report: LoadReport,
}

impl Dataset {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn records(&self) -> &[SentencePair] {
        &self.records
    }

    pub fn report(&self) -> &LoadReport {
        &self.report
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The first `n` records.
    pub fn preview(&self, n: usize) -> &[SentencePair] {
        &self.records[..n.min(self.records.len())]
    }

    pub fn labels(&self) -> Vec<u8> {
        self.records.iter().map(|r| r.label).collect()
    }

    /// Fit a vectorizer on every record and return the feature matrix.
    pub fn vectorize(&self, config: TfIdfConfig) -> Result<TrainingSet> {
        let documents: Vec<String> = self.records.iter().map(SentencePair::document).collect();
        let mut vectorizer = TfIdfVectorizer::new(config);
        let features = vectorizer.fit_transform(&documents)?;

        tracing::info!(
            documents = documents.len(),
            features = vectorizer.vocabulary_size(),
            "vectorized dataset"
        );

        Ok(TrainingSet {
            features,
            labels: self.labels(),
            vectorizer,
        })
    }
}

/// Reads and cleans sentence-pair files.
#[derive(Debug, Clone)]
pub struct DatasetLoader {
    config: LoaderConfig,
    normalizer: TextNormalizer,
}

struct RawRow {
    line: u64,
    sentence1: String,
    sentence2: String,
    label: u8,
}

impl DatasetLoader {
    pub fn new(config: LoaderConfig) -> Result<Self> {
        let normalizer = TextNormalizer::new(config.normalizer)?;
        Ok(Self { config, normalizer })
    }

    /// Use a normalizer other than the one `config.normalizer` describes.
    pub fn with_normalizer(config: LoaderConfig, normalizer: TextNormalizer) -> Self {
        Self { config, normalizer }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub fn normalizer(&self) -> &TextNormalizer {
        &self.normalizer
    }

    /// Load and clean the dataset at `path`.
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<Dataset> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(DatasetLoadError::NotFound(path.to_path_buf()).into());
        }

        let mut report = LoadReport::default();
        let raw_rows = self.read_rows(path, &mut report)?;

        let normalized: Vec<(u64, Option<SentencePair>)> = raw_rows
            .into_par_iter()
            .map(|row| -> Result<(u64, Option<SentencePair>)> {
                let record = self.clean(&row)?;
                Ok((row.line, record))
            })
            .collect::<Result<_>>()?;

        let mut records = Vec::with_capacity(normalized.len());
        for (line, record) in normalized {
            match record {
                Some(record) => records.push(record),
                None => {
                    tracing::debug!(line, "sentence empty after normalization, row dropped");
                    report.empty_after_normalization += 1;
                }
            }
        }
        report.kept = records.len();

        tracing::info!(
            path = %path.display(),
            rows_read = report.rows_read,
            kept = report.kept,
            dropped = report.dropped(),
            "loaded dataset"
        );

        if records.is_empty() {
            return Err(DatasetLoadError::Empty(path.to_path_buf()).into());
        }

        if records.len() < self.config.min_rows {
            match self.config.strictness {
                Strictness::Soft => tracing::warn!(
                    rows = records.len(),
                    min_rows = self.config.min_rows,
                    "dataset has very few rows after cleaning"
                ),
                Strictness::Strict => {
                    return Err(DatasetLoadError::TooFewRows {
                        min_rows: self.config.min_rows,
                        actual: records.len(),
                    }
                    .into());
                }
            }
        }

        Ok(Dataset {
            path: path.to_path_buf(),
            records,
            report,
        })
    }

    fn read_rows(&self, path: &Path, report: &mut LoadReport) -> Result<Vec<RawRow>> {
        let read_error = |source: csv::Error| DatasetLoadError::Read {
            path: path.to_path_buf(),
            source,
        };

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .quoting(false)
            .flexible(true)
            .from_path(path)
            .map_err(read_error)?;

        let mut rows = Vec::new();
        let mut record = csv::ByteRecord::new();
        while reader.read_byte_record(&mut record).map_err(read_error)? {
            report.rows_read += 1;
            let line = record.position().map_or(0, |p| p.line());

            if record.len() != 3 {
                tracing::debug!(line, fields = record.len(), "malformed row dropped");
                report.malformed += 1;
                continue;
            }

            let field = |i: usize| String::from_utf8_lossy(&record[i]).into_owned();
            let raw_label = field(2);
            let Some(label) = parse_label(&raw_label) else {
                match self.config.label_policy {
                    LabelPolicy::Drop => {
                        tracing::debug!(line, label = %raw_label, "invalid label, row dropped");
                        report.invalid_label += 1;
                        continue;
                    }
                    LabelPolicy::Reject => {
                        return Err(DatasetLoadError::InvalidLabel {
                            line,
                            value: raw_label,
                        }
                        .into());
                    }
                }
            };

            rows.push(RawRow {
                line,
                sentence1: or_placeholder(field(0)),
                sentence2: or_placeholder(field(1)),
                label,
            });
        }

        Ok(rows)
    }

    fn clean(&self, row: &RawRow) -> Result<Option<SentencePair>> {
        let sentence1 = self.normalizer.normalize(&row.sentence1)?;
        let sentence2 = self.normalizer.normalize(&row.sentence2)?;
        if sentence1.is_empty() || sentence2.is_empty() {
            return Ok(None);
        }

        Ok(Some(SentencePair {
            sentence1_word_count: sentence1.split_whitespace().count(),
            sentence2_word_count: sentence2.split_whitespace().count(),
            sentence1,
            sentence2,
            label: row.label,
        }))
    }
}

fn or_placeholder(field: String) -> String {
    if field.trim().is_empty() {
        EMPTY_PLACEHOLDER.to_string()
    } else {
        field
    }
}

/// Parse a label into class 0 or 1. Integral floats such as `"1.0"` are accepted.
pub fn parse_label(value: &str) -> Option<u8> {
    let value: f64 = value.trim().parse().ok()?;
    if value == 0.0 {
        Some(0)
    } else if value == 1.0 {
        Some(1)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;
    use crate::error::PlagiarismError;

    fn write_dataset(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    fn loader(config: LoaderConfig) -> DatasetLoader {
        DatasetLoader::new(config).unwrap()
    }

    #[test]
    fn test_parse_label() {
        assert_eq!(parse_label("1"), Some(1));
        assert_eq!(parse_label(" 0 "), Some(0));
        assert_eq!(parse_label("1.0"), Some(1));
        assert_eq!(parse_label("2"), None);
        assert_eq!(parse_label("yes"), None);
        assert_eq!(parse_label(""), None);
        assert_eq!(parse_label("NaN"), None);
    }

    #[test]
    fn test_load_cleans_rows() {
        let file = write_dataset(
            "The cats sat on the mat.\tA cat was sitting on a mat.\t1\n\
             Stocks fell sharply today.\tThe weather is sunny.\t0\n\
             only two fields\t1\n\
             The dogs barked.\tDogs were barking loudly.\tmaybe\n\
             The and of\tto be or\t1\n\
             \tSomething was written here.\t0\n",
        );

        let dataset = loader(LoaderConfig::default()).load(file.path()).unwrap();
        let report = dataset.report();

        assert_eq!(report.rows_read, 6);
        assert_eq!(report.malformed, 1);
        assert_eq!(report.invalid_label, 1);
        assert_eq!(report.empty_after_normalization, 1);
        assert_eq!(report.kept, 3);
        assert_eq!(dataset.len(), 3);

        let first = &dataset.records()[0];
        assert_eq!(first.sentence1, "cat sat mat");
        assert_eq!(first.sentence2, "cat sitting mat");
        assert_eq!(first.label, 1);
        assert_eq!(first.sentence1_word_count, 3);

        let blank = &dataset.records()[2];
        assert_eq!(blank.sentence1, EMPTY_PLACEHOLDER);
        assert_eq!(blank.label, 0);
    }

    #[test]
    fn test_preview() {
        let content: String = (0..15)
            .map(|i| format!("essay number {i} copied\tessay copied again\t{}\n", i % 2))
            .collect();
        let file = write_dataset(&content);

        let dataset = loader(LoaderConfig::default()).load(file.path()).unwrap();
        assert_eq!(dataset.preview(10).len(), 10);
        assert_eq!(dataset.preview(100).len(), 15);
    }

    #[test]
    fn test_missing_file() {
        let result = loader(LoaderConfig::default()).load("/definitely/not/here.tsv");
        assert!(matches!(
            result,
            Err(PlagiarismError::DatasetLoad(DatasetLoadError::NotFound(_)))
        ));
    }

    #[test]
    fn test_empty_after_cleaning() {
        let file = write_dataset("the and\tof to\t1\nbad row\n");
        let result = loader(LoaderConfig::default()).load(file.path());
        assert!(matches!(
            result,
            Err(PlagiarismError::DatasetLoad(DatasetLoadError::Empty(_)))
        ));
    }

    #[test]
    fn test_row_count_strictness() {
        let file = write_dataset("cats sat\tdogs ran\t1\nbirds flew\tfish swam\t0\n");

        let soft = loader(LoaderConfig::default()).load(file.path()).unwrap();
        assert_eq!(soft.len(), 2);

        let strict = loader(LoaderConfig {
            strictness: Strictness::Strict,
            ..LoaderConfig::default()
        })
        .load(file.path());
        assert!(matches!(
            strict,
            Err(PlagiarismError::DatasetLoad(DatasetLoadError::TooFewRows {
                min_rows: 10,
                actual: 2
            }))
        ));
    }

    #[test]
    fn test_reject_invalid_labels() {
        let file = write_dataset("cats sat\tdogs ran\t1\nbirds flew\tfish swam\tx\n");
        let result = loader(LoaderConfig {
            label_policy: LabelPolicy::Reject,
            ..LoaderConfig::default()
        })
        .load(file.path());

        match result {
            Err(PlagiarismError::DatasetLoad(DatasetLoadError::InvalidLabel { line, value })) => {
                assert_eq!(line, 2);
                assert_eq!(value, "x");
            }
            other => panic!("expected InvalidLabel, got {other:?}"),
        }
    }

    #[test]
    fn test_vectorize() {
        let file = write_dataset(
            "cats sat mat\tcat sat mat\t1\n\
             stock market fell\tsunny weather\t0\n",
        );
        let dataset = loader(LoaderConfig::default()).load(file.path()).unwrap();
        let set = dataset.vectorize(TfIdfConfig::default()).unwrap();

        assert_eq!(set.len(), 2);
        assert_eq!(set.labels, vec![1, 0]);
        assert_eq!(set.features[0].len(), set.vectorizer.vocabulary_size());
        let names: Vec<&str> = set.vectorizer.feature_names().collect();
        assert_eq!(names, vec!["cat", "fell", "market", "mat", "sat", "stock", "sunny", "weather"]);
    }
}
