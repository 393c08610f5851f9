//! Streaming Tokenizer Module
//!
//! Splits preprocessed text into tokens without allocating. Given input like
//! `"hello world foo"`, it emits each word with its position:
//!
//! ```ignore
//! ("hello", 0)
//! ("world", 1)
//! ("foo", 2)
//! ```
//!
//! ## The Input Contract
//!
//! The tokenizer expects the output of
//! [`TextNormalizer`](super::normalizer::TextNormalizer):
//! - No leading or trailing whitespace
//! - Single ASCII spaces between words
//!
//! Violations panic in debug builds.

use memchr::memchr_iter;

/// Streaming tokenizer - splits normalized text on ASCII spaces.
///
/// Tokens are slices of the input; the only work is a `memchr` scan for
/// `0x20` bytes.
///
/// ```
/// use sift_core::analyzer::tokenizer::Tokenizer;
///
/// let mut count = 0;
/// Tokenizer::new().tokenize("hello world foo", |_text, _pos| count += 1);
/// assert_eq!(count, 3);
/// ```
#[derive(Debug, Default, Copy, Clone)]
pub struct Tokenizer;

impl Tokenizer {
    #[inline]
    pub const fn new() -> Self {
        Self
    }

    /// Tokenizes normalized input and emits `(text, position)`.
    ///
    /// Position is `u32`. After emitting a token at position `u32::MAX`,
    /// further emissions stop.
    #[inline(always)]
    pub fn tokenize<'n, F>(&self, normalized: &'n str, mut emit: F)
    where
        F: FnMut(&'n str, u32),
    {
        let bytes = normalized.as_bytes();

        debug_assert!(
            bytes.first().is_none_or(|&b| b != b' '),
            "tokenizer: leading whitespace: normalizer contract violated"
        );

        debug_assert!(
            bytes.last().is_none_or(|&b| b != b' '),
            "tokenizer: trailing whitespace: normalizer contract violated"
        );

        debug_assert!(
            !normalized.contains("  "),
            "tokenizer: consecutive spaces: normalizer contract violated"
        );

        if bytes.is_empty() {
            return;
        }

        let mut start = 0usize;
        let mut pos = 0u32;

        for i in memchr_iter(b' ', bytes) {
            if start < i {
                // ASCII space is never inside a multi-byte sequence, so both
                // ends are char boundaries.
                emit(&normalized[start..i], pos);
                if pos == u32::MAX {
                    return;
                }
                pos += 1;
            }
            start = i + 1;
        }

        if start < bytes.len() {
            emit(&normalized[start..], pos);
        }
    }
}
