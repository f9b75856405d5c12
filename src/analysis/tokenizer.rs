//! Tokenizers split normalized text into tokens.
//!
//! Tokenizers are the first token-producing step of the analysis pipeline;
//! everything before them works on the raw string (see
//! [`char_filter`](crate::analysis::char_filter)), everything after them on
//! the token stream (see [`token_filter`](crate::analysis::token_filter)).
//!
//! # Examples
//!
//! ```
//! use plagio::analysis::tokenizer::Tokenizer;
//! use plagio::analysis::tokenizer::whitespace::WhitespaceTokenizer;
//!
//! let tokenizer = WhitespaceTokenizer::new();
//! let tokens: Vec<_> = tokenizer.tokenize("Hello world").unwrap().collect();
//! assert_eq!(tokens.len(), 2);
//! ```

pub mod whitespace;

pub use whitespace::WhitespaceTokenizer;

use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Trait for tokenizers that convert text into tokens.
///
/// The trait requires `Send + Sync` so a tokenizer can sit inside an
/// analyzer shared between request handlers.
pub trait Tokenizer: Send + Sync {
    /// Tokenize the given text into a stream of tokens.
    fn tokenize(&self, text: &str) -> Result<TokenStream>;

    /// Get the name of this tokenizer (for debugging and configuration).
    fn name(&self) -> &'static str;
}
