//! Word-overlap baseline comparison.
//!
//! Needs no trained state. The score is the share of `text1`'s whitespace
//! tokens that also occur somewhere in `text2`, as a percentage. It is
//! asymmetric: `compare_by_overlap(a, b)` and `compare_by_overlap(b, a)`
//! generally differ.

use std::collections::HashSet;
use std::path::Path;

use crate::analysis::char_filter::{CharFilter, PatternReplaceCharFilter};
use crate::analysis::tokenizer::WhitespaceTokenizer;
use crate::error::Result;

/// Anything that is neither a word character nor whitespace.
const PUNCTUATION_PATTERN: &str = r"[^\w\s]";

/// Percentage (0 to 100) of `text1` tokens found in `text2`.
///
/// Duplicated tokens in `text1` are counted once per occurrence. Returns
/// `0.0` when `text1` has no tokens.
///
/// ```
/// use plagio::comparison::compare_by_overlap;
///
/// assert_eq!(compare_by_overlap("a b c d", "d c x"), 50.0);
/// assert_eq!(compare_by_overlap("", "anything"), 0.0);
/// ```
pub fn compare_by_overlap(text1: &str, text2: &str) -> f64 {
    let candidates: HashSet<&str> = WhitespaceTokenizer::words(text2).collect();

    let mut total = 0usize;
    let mut matching = 0usize;
    for word in WhitespaceTokenizer::words(text1) {
        total += 1;
        if candidates.contains(word) {
            matching += 1;
        }
    }

    if total == 0 {
        return 0.0;
    }
    matching as f64 / total as f64 * 100.0
}

/// Overlap comparison with optional light preprocessing.
#[derive(Debug, Clone)]
pub struct OverlapComparator {
    punctuation: PatternReplaceCharFilter,
}

impl OverlapComparator {
    pub fn new() -> Result<Self> {
        Ok(Self {
            punctuation: PatternReplaceCharFilter::new(PUNCTUATION_PATTERN, "")?,
        })
    }

    /// Lowercase and strip punctuation. Whitespace is kept as is.
    pub fn preprocess(&self, text: &str) -> String {
        self.punctuation.filter(&text.to_lowercase())
    }

    /// Compare two texts, preprocessing both first when `preprocess` is set.
    pub fn compare(&self, text1: &str, text2: &str, preprocess: bool) -> f64 {
        if preprocess {
            compare_by_overlap(&self.preprocess(text1), &self.preprocess(text2))
        } else {
            compare_by_overlap(text1, text2)
        }
    }

    /// Compare the contents of two UTF-8 files.
    pub fn compare_files<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        path1: P,
        path2: Q,
        preprocess: bool,
    ) -> Result<f64> {
        let text1 = std::fs::read_to_string(path1.as_ref())?;
        let text2 = std::fs::read_to_string(path2.as_ref())?;
        let score = self.compare(&text1, &text2, preprocess);

        tracing::debug!(
            file1 = %path1.as_ref().display(),
            file2 = %path2.as_ref().display(),
            preprocess,
            score,
            "compared files"
        );
        Ok(score)
    }
}
