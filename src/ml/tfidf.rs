//! TF-IDF vectorizer for sentence-pair feature extraction.
//!
//! The vectorizer is fit on documents that have already been normalized, so
//! tokenization here is a plain whitespace split. The vocabulary is kept in
//! lexicographic order: fitting the same corpus twice yields identical term
//! indices and identical serialized artifacts.

use std::collections::{BTreeMap, BTreeSet};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::analysis::tokenizer::WhitespaceTokenizer;
use crate::error::{Result, TrainingError};

/// Dense tf-idf row, one entry per vocabulary term.
pub type FeatureVector = Vec<f64>;

/// How inverse document frequency is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdfWeighting {
    /// `ln((1 + N) / (1 + df)) + 1`; never zero, so every seen term counts.
    #[default]
    Smooth,
    /// `ln(N / (1 + df))`; terms present in nearly every document go to zero or below.
    Plain,
}

impl IdfWeighting {
    fn idf(self, n_documents: usize, document_frequency: usize) -> f64 {
        let n = n_documents as f64;
        let df = document_frequency as f64;
        match self {
            IdfWeighting::Smooth => ((1.0 + n) / (1.0 + df)).ln() + 1.0,
            IdfWeighting::Plain => (n / (1.0 + df)).ln(),
        }
    }
}

/// Vectorizer settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TfIdfConfig {
    /// IDF formula.
    pub idf: IdfWeighting,
    /// Scale every row to unit euclidean length.
    pub l2_normalize: bool,
}

impl Default for TfIdfConfig {
    fn default() -> Self {
        Self {
            idf: IdfWeighting::Smooth,
            l2_normalize: true,
        }
    }
}

/// TF-IDF vectorizer with a fixed, ordered vocabulary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfIdfVectorizer {
    /// Vocabulary: term -> column index.
    vocabulary: BTreeMap<String, usize>,
    /// Inverse document frequency per column.
    idf: Vec<f64>,
    /// Number of documents seen by `fit`.
    n_documents: usize,
    config: TfIdfConfig,
}

impl Default for TfIdfVectorizer {
    fn default() -> Self {
        Self::new(TfIdfConfig::default())
    }
}

impl TfIdfVectorizer {
    /// Create an unfitted vectorizer.
    pub fn new(config: TfIdfConfig) -> Self {
        Self {
            vocabulary: BTreeMap::new(),
            idf: Vec::new(),
            n_documents: 0,
            config,
        }
    }

    /// Fit the vocabulary and idf weights, replacing any previous fit.
    pub fn fit<S: AsRef<str>>(&mut self, documents: &[S]) -> Result<()> {
        if documents.is_empty() {
            return Err(TrainingError::InsufficientData {
                min_samples: 1,
                actual: 0,
            }
            .into());
        }

        let mut document_frequency: BTreeMap<&str, usize> = BTreeMap::new();
        for doc in documents {
            let unique: BTreeSet<&str> = WhitespaceTokenizer::words(doc.as_ref()).collect();
            for term in unique {
                *document_frequency.entry(term).or_insert(0) += 1;
            }
        }

        if document_frequency.is_empty() {
            return Err(TrainingError::Fit("corpus contains no terms".to_string()).into());
        }

        let n_documents = documents.len();
        let mut vocabulary = BTreeMap::new();
        let mut idf = Vec::with_capacity(document_frequency.len());
        // BTreeMap iteration is sorted, so indices follow term order.
        for (idx, (term, df)) in document_frequency.into_iter().enumerate() {
            vocabulary.insert(term.to_string(), idx);
            idf.push(self.config.idf.idf(n_documents, df));
        }

        tracing::debug!(
            vocabulary_size = vocabulary.len(),
            n_documents,
            "fitted tf-idf vocabulary"
        );

        self.vocabulary = vocabulary;
        self.idf = idf;
        self.n_documents = n_documents;
        Ok(())
    }

    /// Fit on `documents` and return their feature rows.
    pub fn fit_transform<S: AsRef<str> + Sync>(
        &mut self,
        documents: &[S],
    ) -> Result<Vec<FeatureVector>> {
        self.fit(documents)?;
        Ok(self.transform_batch(documents))
    }

    /// Transform one normalized document. Terms outside the vocabulary are ignored.
    pub fn transform(&self, document: &str) -> FeatureVector {
        let mut row = vec![0.0; self.vocabulary.len()];

        for term in WhitespaceTokenizer::words(document) {
            if let Some(&idx) = self.vocabulary.get(term) {
                row[idx] += 1.0;
            }
        }

        for (weight, idf) in row.iter_mut().zip(&self.idf) {
            *weight *= idf;
        }

        if self.config.l2_normalize {
            let norm = row.iter().map(|w| w * w).sum::<f64>().sqrt();
            if norm > 0.0 {
                row.iter_mut().for_each(|w| *w /= norm);
            }
        }

        row
    }

    /// Transform many documents in parallel, preserving input order.
    pub fn transform_batch<S: AsRef<str> + Sync>(&self, documents: &[S]) -> Vec<FeatureVector> {
        documents
            .par_iter()
            .map(|doc| self.transform(doc.as_ref()))
            .collect()
    }

    /// Vocabulary terms in column order.
    pub fn feature_names(&self) -> impl Iterator<Item = &str> {
        // Indices were assigned in key order.
        self.vocabulary.keys().map(String::as_str)
    }

    /// Column index of `term`, if it is in the vocabulary.
    pub fn term_index(&self, term: &str) -> Option<usize> {
        self.vocabulary.get(term).copied()
    }

    /// Idf weight per column.
    pub fn idf(&self) -> &[f64] {
        &self.idf
    }

    /// Get the size of the vocabulary.
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// Number of documents the vectorizer was fit on.
    pub fn n_documents(&self) -> usize {
        self.n_documents
    }

    pub fn is_fitted(&self) -> bool {
        !self.vocabulary.is_empty()
    }

    pub fn config(&self) -> &TfIdfConfig {
        &self.config
    }
}
