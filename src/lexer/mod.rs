//! Lexer module - Tokenization
//!
//! The analyzer works on a [`TokenStream`]. Hosts that already tokenize PHP
//! build one with [`TokenStream::from_tokens`]; [`tokenize`] is the reference
//! tokenizer used by the CLI and the tests.

mod scanner;
mod structure;
mod token;

pub(crate) use scanner::parse_int_literal;
pub use token::*;

/// Tokenize PHP source code
pub fn tokenize(source: &str, profile: TokenizerProfile) -> TokenStream {
    let tokens = scanner::Scanner::new(source, profile).scan();
    tracing::trace!(tokens = tokens.len(), ?profile, "tokenized source");
    TokenStream::from_tokens(tokens, profile)
}
