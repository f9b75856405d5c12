use std::fmt::Debug;
use std::fmt::Formatter;
use std::sync::Arc;

use crate::analysis::analyzer::Analyzer;
use crate::analysis::analyzer::pipeline::PipelineAnalyzer;
use crate::analysis::char_filter::PatternReplaceCharFilter;
use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::{LemmatizeFilter, LowercaseFilter, StopFilter};
use crate::analysis::tokenizer::WhitespaceTokenizer;
use crate::error::Result;

/// Runs of non-word characters collapse into one space.
const NON_WORD_PATTERN: &str = r"\W+";
/// Digit runs are dropped outright.
const DIGIT_PATTERN: &str = r"\d+";

/// The English normalization pipeline shared by training and serving.
///
/// Non-word runs become spaces, digits are removed, the rest is split on
/// whitespace, lowercased and stripped of stop words. With lemmatization on,
/// tokens are reduced to their lemma and the stop list is applied once more,
/// since a lemma can itself be a stop word.
pub struct EnglishAnalyzer {
    inner: PipelineAnalyzer,
    lemmatize: bool,
}

impl EnglishAnalyzer {
    /// Create the analyzer with lemmatization enabled.
    pub fn new() -> Result<Self> {
        Self::with_lemmatization(true)
    }

    /// Create the analyzer, choosing whether tokens are lemmatized.
    pub fn with_lemmatization(lemmatize: bool) -> Result<Self> {
        let stop_filter = Arc::new(StopFilter::new());

        let mut analyzer = PipelineAnalyzer::new(Arc::new(WhitespaceTokenizer::new()))
            .add_char_filter(Arc::new(PatternReplaceCharFilter::new(
                NON_WORD_PATTERN,
                " ",
            )?))
            .add_char_filter(Arc::new(PatternReplaceCharFilter::new(DIGIT_PATTERN, "")?))
            .add_filter(Arc::new(LowercaseFilter::new()))
            .add_filter(stop_filter.clone());

        if lemmatize {
            analyzer = analyzer
                .add_filter(Arc::new(LemmatizeFilter::new()))
                .add_filter(stop_filter);
        }

        Ok(Self {
            inner: analyzer.with_name("english"),
            lemmatize,
        })
    }

    /// Whether this analyzer lemmatizes tokens.
    pub fn lemmatizes(&self) -> bool {
        self.lemmatize
    }
}

impl Analyzer for EnglishAnalyzer {
    fn analyze(&self, text: &str) -> Result<TokenStream> {
        self.inner.analyze(text)
    }

    fn name(&self) -> &'static str {
        "english"
    }
}

impl Debug for EnglishAnalyzer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnglishAnalyzer")
            .field("inner", &self.inner)
            .field("lemmatize", &self.lemmatize)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::token::Token;

    fn texts(analyzer: &EnglishAnalyzer, input: &str) -> Vec<String> {
        analyzer
            .analyze(input)
            .unwrap()
            .map(|token: Token| token.text)
            .collect()
    }

    #[test]
    fn test_english_analyzer() {
        let analyzer = EnglishAnalyzer::new().unwrap();

        assert_eq!(
            texts(&analyzer, "The students copied 3 essays, word-for-word!"),
            vec!["student", "copied", "essay", "word", "word"]
        );
    }

    #[test]
    fn test_without_lemmatization() {
        let analyzer = EnglishAnalyzer::with_lemmatization(false).unwrap();

        assert!(!analyzer.lemmatizes());
        assert_eq!(texts(&analyzer, "Cats and DOGS"), vec!["cats", "dogs"]);
    }

    #[test]
    fn test_digits_inside_words_are_removed() {
        let analyzer = EnglishAnalyzer::new().unwrap();

        assert_eq!(texts(&analyzer, "abc123def 2024"), vec!["abcdef"]);
    }

    #[test]
    fn test_all_stop_words() {
        let analyzer = EnglishAnalyzer::new().unwrap();

        assert!(texts(&analyzer, "It is what it is.").is_empty());
    }

    #[test]
    fn test_english_analyzer_name() {
        let analyzer = EnglishAnalyzer::new().unwrap();

        assert_eq!(analyzer.name(), "english");
    }
}
