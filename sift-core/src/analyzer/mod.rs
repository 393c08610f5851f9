//! Text analysis pipeline.
//!
//! This module provides the text processing components:
//! - **Normalizer**: Cleans raw document text and normalizes single terms
//! - **Tokenizer**: Splits normalized text into tokens
//! - **K-gram**: Extracts boundary-marked character grams for wildcard lookup

pub mod kgram;
pub mod normalizer;
pub mod tokenizer;

pub use normalizer::{normalize_term, TextNormalizer};
pub use tokenizer::Tokenizer;

/// Normalizer and tokenizer bundled with a reusable scratch buffer.
#[derive(Debug, Default)]
pub struct Analyzer {
    normalizer: TextNormalizer,
    tokenizer: Tokenizer,
    buf: String,
}

impl Analyzer {
    pub fn new() -> Self {
        Self {
            normalizer: TextNormalizer::new(),
            tokenizer: Tokenizer::new(),
            buf: String::with_capacity(256),
        }
    }

    /// Emits the normalized term of every token in `text`, duplicates included.
    pub fn analyze<F>(&mut self, text: &str, mut emit: F)
    where
        F: FnMut(String),
    {
        self.normalizer.normalize_into(text, &mut self.buf);
        self.tokenizer.tokenize(&self.buf, |token, _| {
            if let Some(term) = normalize_term(token) {
                emit(term);
            }
        });
    }

    /// Collects the normalized terms of `text`.
    pub fn terms(&mut self, text: &str) -> Vec<String> {
        let mut out = Vec::new();
        self.analyze(text, |t| out.push(t));
        out
    }
}
