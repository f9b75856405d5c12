//! Lemmatizing token filter and lemmatizer implementations.

pub mod rule;

pub use rule::RuleLemmatizer;

use super::Filter;
use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Trait for lemmatization algorithms.
///
/// Implementations must be idempotent: `lemmatize(lemmatize(w)) ==
/// lemmatize(w)`. The normalizer relies on this to stay idempotent itself.
pub trait Lemmatizer: Send + Sync {
    /// Reduce a lowercase word to its dictionary form.
    fn lemmatize(&self, word: &str) -> String;

    /// Get the name of this lemmatizer.
    fn name(&self) -> &'static str;
}

/// Filter that replaces every token with its lemma.
pub struct LemmatizeFilter {
    lemmatizer: Box<dyn Lemmatizer>,
}

impl std::fmt::Debug for LemmatizeFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LemmatizeFilter")
            .field("lemmatizer", &self.lemmatizer.name())
            .finish()
    }
}

impl LemmatizeFilter {
    /// Create a new lemmatize filter with the rule-based English lemmatizer.
    pub fn new() -> Self {
        LemmatizeFilter {
            lemmatizer: Box::new(RuleLemmatizer::new()),
        }
    }

    /// Create a lemmatize filter with a custom lemmatizer.
    pub fn with_lemmatizer(lemmatizer: Box<dyn Lemmatizer>) -> Self {
        LemmatizeFilter { lemmatizer }
    }
}

impl Default for LemmatizeFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl Filter for LemmatizeFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let filtered_tokens = tokens
            .map(|token| {
                let lemma = self.lemmatizer.lemmatize(&token.text);
                token.with_text(lemma)
            })
            .collect::<Vec<_>>();

        Ok(Box::new(filtered_tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        "lemmatize"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::token::Token;

    #[test]
    fn test_lemmatize_filter() {
        let filter = LemmatizeFilter::new();
        let tokens = vec![
            Token::new("cats", 0),
            Token::new("children", 1),
            Token::new("boxes", 2),
        ];

        let result: Vec<Token> = filter.filter(Box::new(tokens.into_iter())).unwrap().collect();

        assert_eq!(result[0].text, "cat");
        assert_eq!(result[1].text, "child");
        assert_eq!(result[2].text, "box");
        assert_eq!(result[2].position, 2);
    }

    #[test]
    fn test_filter_name() {
        assert_eq!(LemmatizeFilter::new().name(), "lemmatize");
    }
}
