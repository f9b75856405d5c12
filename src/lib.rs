//! # plagio
//!
//! Sentence-pair plagiarism detection.
//!
//! ## Features
//!
//! - Deterministic English normalization (stop words, digits, lemmas)
//! - TF-IDF features with a fixed, sorted vocabulary
//! - Logistic regression and linear SVM classifiers with held-out evaluation
//! - Atomic, lock-protected model artifacts
//! - An HTTP API with hot reload, and a word-overlap baseline
//!
//! ## Example
//!
//! ```no_run
//! use plagio::config::AppConfig;
//! use plagio::pipeline::run_training;
//! use plagio::service::ServiceContext;
//!
//! let config = AppConfig::default();
//! let stats = run_training(&config).unwrap();
//! println!("test accuracy {:.3}", stats.accuracy);
//!
//! let ctx = ServiceContext::open(config);
//! let prediction = ctx
//!     .predict("The cat sat on the mat.", "A cat was sitting on the mat.")
//!     .unwrap();
//! println!("{} ({})", prediction.prediction, prediction.confidence);
//! ```

pub mod analysis;
pub mod artifacts;
pub mod cli;
pub mod comparison;
pub mod config;
pub mod dataset;
pub mod error;
pub mod logging;
pub mod ml;
pub mod pipeline;
pub mod server;
pub mod service;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
