//! Text analysis.
//!
//! Normalization is built as a pipeline: char filters rewrite the raw text,
//! a tokenizer splits it, token filters rewrite or stop tokens. The
//! [`normalizer`] module wraps the English pipeline for the rest of the
//! crate.

pub mod analyzer;
pub mod char_filter;
pub mod normalizer;
pub mod token;
pub mod token_filter;
pub mod tokenizer;

pub use normalizer::{NormalizerConfig, TextNormalizer};
