//! Text preprocessing.
//!
//! Two stages run before anything is indexed:
//!
//! 1. [`TextNormalizer`] cleans a whole document: line markers and a small
//!    punctuation set become spaces, non-ASCII is dropped, whitespace runs
//!    collapse to one space and the ends are trimmed. The output satisfies the
//!    tokenizer's input contract.
//! 2. [`normalize_term`] turns one token into index form: lowercase, with
//!    surrounding `, . # @ : "` stripped.
//!
//! Case is preserved by stage 1 and folded by stage 2, so a document can be
//! preprocessed once and tokenized without a second copy.

/// Literal line-break markers found in exported corpora.
const LINE_MARKERS: [&str; 2] = ["[newline]", "[NEWLINE]"];

/// Characters replaced by a space during preprocessing.
const SEPARATORS: [char; 6] = [',', '"', '\u{201C}', '\u{201D}', '?', '!'];

/// Characters stripped from both ends of a token.
const TERM_TRIM: [char; 6] = [',', '.', '#', '@', ':', '"'];

/// Document-level text cleaner.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextNormalizer;

impl TextNormalizer {
    pub const fn new() -> Self {
        Self
    }

    /// Normalizes text into an existing buffer.
    ///
    /// Clears the buffer first and reuses its capacity.
    pub fn normalize_into(&self, input: &str, out: &mut String) {
        out.clear();
        out.reserve(input.len());

        let mut rest = input;
        let mut pending_space = false;

        while let Some(c) = rest.chars().next() {
            if c == '[' {
                if let Some(marker) = LINE_MARKERS.iter().find(|m| rest.starts_with(**m)) {
                    rest = &rest[marker.len()..];
                    pending_space = true;
                    continue;
                }
            }
            rest = &rest[c.len_utf8()..];

            if c.is_ascii_whitespace() || SEPARATORS.contains(&c) {
                pending_space = true;
                continue;
            }
            if !c.is_ascii() {
                continue;
            }

            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(c);
        }
    }

    /// Allocating convenience wrapper around [`TextNormalizer::normalize_into`].
    pub fn normalize(&self, input: &str) -> String {
        let mut out = String::with_capacity(input.len());
        self.normalize_into(input, &mut out);
        out
    }
}

/// Converts a token into its index form, or `None` if nothing is left.
///
/// Non-ASCII characters are dropped so that query terms normalize exactly like
/// document tokens.
pub fn normalize_term(token: &str) -> Option<String> {
    let trimmed = token.trim_matches(TERM_TRIM.as_slice());
    let mut term = String::with_capacity(trimmed.len());
    term.extend(
        trimmed
            .chars()
            .filter(char::is_ascii)
            .map(|c| c.to_ascii_lowercase()),
    );
    // Stripping non-ASCII can expose more trimmable characters.
    let cleaned = term.trim_matches(TERM_TRIM.as_slice());
    if cleaned.is_empty() {
        None
    } else if cleaned.len() == term.len() {
        Some(term)
    } else {
        Some(cleaned.to_owned())
    }
}
