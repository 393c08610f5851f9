//! K-gram index: gram text → [`Gram`], used to expand wildcard patterns.
//!
//! Two build strategies, picked by [`KGramConfig::late_sort`]:
//!
//! - **Ordered**: each word is inserted into its grams' ordered sets as it
//!   arrives. Every insertion pays a binary search plus a shift.
//! - **Buffered**: words are appended to per-gram buffers and each buffer is
//!   sort-deduplicated once in [`KGramIndex::finalize`], then merged into the
//!   words already present.
//!
//! Both strategies produce the same word sets.

use rustc_hash::FxHashMap;
use sift_types::{IndexError, IndexKind, KGramConfig};
use smallvec::SmallVec;
use tracing::debug;

use crate::analyzer::kgram::{extract_grams, wildcard_grams};
use crate::index::types::Gram;
use crate::sorted::{intersect_sorted, merge_sorted_dedup, SortedVec};

/// Gram → words map.
#[derive(Debug, Clone)]
pub struct KGramIndex {
    config: KGramConfig,
    grams: FxHashMap<String, Gram>,
    built: bool,
    pending: usize,
}

impl KGramIndex {
    pub fn new(config: KGramConfig) -> Self {
        Self {
            config,
            grams: FxHashMap::default(),
            built: false,
            pending: 0,
        }
    }

    #[inline(always)]
    pub fn config(&self) -> &KGramConfig {
        &self.config
    }

    #[inline(always)]
    pub fn is_built(&self) -> bool {
        self.built
    }

    /// Number of distinct grams.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.grams.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.grams.is_empty()
    }

    #[inline]
    pub fn gram(&self, text: &str) -> Option<&Gram> {
        self.grams.get(text)
    }

    /// Grams sorted by text.
    pub fn sorted_grams(&self) -> Vec<&Gram> {
        let mut grams: Vec<&Gram> = self.grams.values().collect();
        grams.sort_unstable_by(|a, b| a.text.cmp(&b.text));
        grams
    }

    /// Total number of (gram, word) entries.
    pub fn total_words(&self) -> usize {
        self.grams.values().map(|g| g.words.len()).sum()
    }

    pub fn clear(&mut self) {
        self.grams.clear();
        self.built = false;
        self.pending = 0;
    }

    /// Registers one word under each of its grams.
    ///
    /// Words matching an ignore prefix are skipped. In buffered mode the word
    /// is not visible to lookups until [`KGramIndex::finalize`].
    pub fn add_term(&mut self, word: &str) {
        if word.is_empty() || self.config.is_ignored(word) {
            return;
        }

        let late_sort = self.config.late_sort;
        let grams = &mut self.grams;
        let pending = &mut self.pending;

        extract_grams(word, self.config.k, |text| {
            if !grams.contains_key(text) {
                grams.insert(text.to_owned(), Gram::new(text));
            }
            let Some(gram) = grams.get_mut(text) else {
                return;
            };
            if late_sort {
                gram.buffer.push(word.to_owned());
                *pending += 1;
            } else {
                gram.words.insert(word.to_owned());
            }
        });
    }

    /// Flushes every gram buffer into its ordered word set.
    pub fn finalize(&mut self) {
        if self.pending == 0 {
            return;
        }
        for gram in self.grams.values_mut() {
            gram.finalize();
        }
        debug!(flushed = self.pending, grams = self.grams.len(), "finalized gram buffers");
        self.pending = 0;
    }

    /// Rebuilds from scratch over `words`.
    pub fn build<'a, I>(&mut self, words: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.clear();
        self.extend(words);
    }

    /// Adds `words` to the existing index and finalizes.
    pub fn extend<'a, I>(&mut self, words: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        for word in words {
            self.add_term(word);
        }
        self.finalize();
        self.built = true;
    }

    /// Words that may match `pattern`, ascending.
    ///
    /// Every gram of the pattern must exist, otherwise nothing matches. The
    /// result is the intersection of the gram word sets, so it can contain
    /// words whose grams appear in a different arrangement than the pattern.
    ///
    /// # Errors
    ///
    /// [`IndexError::NotBuilt`] before the first build.
    pub fn expand_wildcard(&self, pattern: &str) -> Result<SortedVec<String>, IndexError> {
        if !self.built {
            return Err(IndexError::NotBuilt(IndexKind::KGram));
        }

        let grams = wildcard_grams(pattern, self.config.k);
        if grams.is_empty() {
            debug!(pattern, "wildcard pattern has no literal gram");
            return Ok(SortedVec::new());
        }

        let mut sets: SmallVec<[&SortedVec<String>; 8]> = SmallVec::with_capacity(grams.len());
        for text in &grams {
            match self.grams.get(text.as_str()) {
                Some(gram) => sets.push(&gram.words),
                None => {
                    debug!(pattern, gram = %text, "wildcard gram not indexed");
                    return Ok(SortedVec::new());
                }
            }
        }

        // Smallest set first keeps every intermediate result small.
        sets.sort_unstable_by_key(|s| s.len());
        let mut words: Vec<String> = sets[0].as_slice().to_vec();
        for set in &sets[1..] {
            if words.is_empty() {
                break;
            }
            words = intersect_sorted(&words, set.as_slice());
        }

        debug!(pattern, grams = grams.len(), matches = words.len(), "expanded wildcard");
        Ok(SortedVec::from_vec(words))
    }

    /// Union of the word sets of every gram of `word`; candidates for
    /// spelling suggestions.
    pub fn candidates(&self, word: &str) -> SortedVec<String> {
        let mut acc: Vec<String> = Vec::new();
        let mut scratch: Vec<String> = Vec::new();
        extract_grams(word, self.config.k, |text| {
            if let Some(gram) = self.grams.get(text) {
                scratch.clear();
                merge_sorted_dedup(&acc, gram.words.as_slice(), &mut scratch);
                core::mem::swap(&mut acc, &mut scratch);
            }
        });
        SortedVec::from_vec(acc)
    }
}
