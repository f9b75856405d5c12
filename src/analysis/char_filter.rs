//! Char filters rewrite the raw string before it reaches the tokenizer.
//!
//! The normalization pipeline uses them to collapse punctuation into spaces
//! and to drop digit runs, so the tokenizer only ever sees word characters
//! separated by whitespace.
//!
//! # Examples
//!
//! ```
//! use plagio::analysis::char_filter::CharFilter;
//! use plagio::analysis::char_filter::pattern_replace::PatternReplaceCharFilter;
//!
//! let filter = PatternReplaceCharFilter::new(r"\W+", " ").unwrap();
//! assert_eq!(filter.filter("hello, world!"), "hello world ");
//! ```

pub mod pattern_replace;

pub use pattern_replace::PatternReplaceCharFilter;

/// Trait for character filters that transform text before tokenization.
pub trait CharFilter: Send + Sync {
    /// Apply this filter to the input text and return the rewritten text.
    fn filter(&self, input: &str) -> String;

    /// Get the name of this char filter.
    fn name(&self) -> &'static str;
}
