//! K-gram extraction.
//!
//! A term is wrapped in `$` boundary sentinels and cut into every window of
//! `k` characters. For `"cat"` and `k = 2` that yields `$c ca at t$`.
//!
//! Wildcard patterns go through the same window walk, but only windows free
//! of `*` are kept, and a sentinel is added only on a side that is not
//! already open (`"ca*"` → `$c ca`).

use smallvec::SmallVec;

/// Boundary sentinel marking the start and end of a term.
pub const BOUNDARY: char = '$';

/// Wildcard character in query patterns.
pub const WILDCARD: char = '*';

/// Emits every `k`-character window of `text`.
///
/// Text shorter than `k` characters is emitted whole.
fn for_each_window<'t, F>(text: &'t str, k: usize, mut emit: F)
where
    F: FnMut(&'t str),
{
    let bounds: SmallVec<[usize; 32]> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(core::iter::once(text.len()))
        .collect();
    let chars = bounds.len() - 1;

    if chars == 0 {
        return;
    }
    if chars <= k {
        emit(text);
        return;
    }

    for i in 0..=(chars - k) {
        emit(&text[bounds[i]..bounds[i + k]]);
    }
}

/// Extracts the grams of an indexed term, in order of appearance.
///
/// Repeated grams (`"banana"` → `an`, `na` twice) are emitted every time.
///
/// # Example
///
/// ```
/// use sift_core::analyzer::kgram::extract_grams;
///
/// let mut grams = Vec::new();
/// extract_grams("cat", 2, |g| grams.push(g.to_string()));
/// assert_eq!(grams, ["$c", "ca", "at", "t$"]);
/// ```
pub fn extract_grams<F>(term: &str, k: usize, mut emit: F)
where
    F: FnMut(&str),
{
    if term.is_empty() || k == 0 {
        return;
    }

    let mut padded = String::with_capacity(term.len() + 2);
    padded.push(BOUNDARY);
    padded.push_str(term);
    padded.push(BOUNDARY);

    for_each_window(&padded, k, |gram| emit(gram));
}

/// Collects the grams of a term into an owned list.
pub fn fetch_grams_raw(term: &str, k: usize) -> Vec<String> {
    let mut grams = Vec::new();
    extract_grams(term, k, |g| grams.push(g.to_owned()));
    grams
}

/// Extracts the literal grams a wildcard pattern requires, deduplicated and
/// sorted.
///
/// An empty result means the pattern has no literal run long enough to be
/// looked up.
pub fn wildcard_grams(pattern: &str, k: usize) -> SmallVec<[String; 8]> {
    let mut grams: SmallVec<[String; 8]> = SmallVec::new();
    if pattern.is_empty() || k == 0 {
        return grams;
    }

    let mut padded = String::with_capacity(pattern.len() + 2);
    if !pattern.starts_with(WILDCARD) {
        padded.push(BOUNDARY);
    }
    padded.push_str(pattern);
    if !pattern.ends_with(WILDCARD) {
        padded.push(BOUNDARY);
    }

    for_each_window(&padded, k, |window| {
        if !window.contains(WILDCARD) && window.chars().count() == k {
            grams.push(window.to_owned());
        }
    });

    grams.sort_unstable();
    grams.dedup();
    grams
}

/// Counts grams without allocating.
#[inline]
pub fn count_grams(term: &str, k: usize) -> usize {
    if term.is_empty() || k == 0 {
        return 0;
    }
    let chars = term.chars().count() + 2;
    if chars <= k {
        1
    } else {
        chars - k + 1
    }
}
