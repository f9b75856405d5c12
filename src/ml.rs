//! Feature extraction and classification.
//!
//! - [`tfidf`]: vocabulary and idf fitting, row vectorization
//! - [`classifier`]: linear binary classifiers behind the [`Classifier`](classifier::Classifier) trait
//! - [`metrics`]: accuracy and weighted F1
//! - [`trainer`]: seeded split, fit and evaluation

pub mod classifier;
pub mod metrics;
pub mod tfidf;
pub mod trainer;
