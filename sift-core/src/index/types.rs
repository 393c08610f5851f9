//! Index types.

use core::cmp::Ordering;
use core::hash::{Hash, Hasher};

use sift_types::{DocId, IndexConfig};

use crate::analyzer::Analyzer;
use crate::index::docs::DocStore;
use crate::index::inverted::InvertedIndex;
use crate::index::kgram::KGramIndex;
use crate::index::scoring::calc_tf;
use crate::sorted::{SortedVec, UnorderedBuffer};

/// Occurrence record of one term in one document.
///
/// Ordering, equality and hashing look at the document id only, so a posting
/// list is a set of documents.
#[derive(Debug, Clone)]
pub struct Posting {
    pub(crate) doc_id: DocId,
    pub(crate) count: u32,
    pub(crate) tf: f64,
}

impl Posting {
    /// First occurrence of a term in a document.
    pub fn new(doc_id: DocId) -> Self {
        Self {
            doc_id,
            count: 1,
            tf: calc_tf(1),
        }
    }

    #[inline(always)]
    pub fn doc_id(&self) -> &DocId {
        &self.doc_id
    }

    /// Occurrences of the term in the document.
    #[inline(always)]
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Weighted term frequency, `calc_tf(count)` once weights are current.
    #[inline(always)]
    pub fn tf(&self) -> f64 {
        self.tf
    }

    /// Records one more occurrence.
    #[inline]
    pub(crate) fn bump(&mut self, update_tf: bool) {
        self.count = self.count.saturating_add(1);
        if update_tf {
            self.refresh_tf();
        }
    }

    #[inline]
    pub(crate) fn refresh_tf(&mut self) {
        self.tf = calc_tf(self.count);
    }
}

impl PartialEq for Posting {
    fn eq(&self, other: &Self) -> bool {
        self.doc_id == other.doc_id
    }
}

impl Eq for Posting {}

impl PartialOrd for Posting {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Posting {
    fn cmp(&self, other: &Self) -> Ordering {
        self.doc_id.cmp(&other.doc_id)
    }
}

impl Hash for Posting {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.doc_id.hash(state);
    }
}

/// A normalized term with its posting list.
#[derive(Debug, Clone)]
pub struct Term {
    pub(crate) text: String,
    pub(crate) postings: SortedVec<Posting>,
    pub(crate) count: usize,
    pub(crate) idf: f64,
}

impl Term {
    /// A term seen once in `doc_id`.
    pub fn new(text: impl Into<String>, doc_id: DocId) -> Self {
        let mut postings = SortedVec::new();
        postings.insert(Posting::new(doc_id));
        Self {
            text: text.into(),
            postings,
            count: 1,
            idf: 0.0,
        }
    }

    #[inline(always)]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Postings ordered ascending by document id.
    #[inline(always)]
    pub fn postings(&self) -> &SortedVec<Posting> {
        &self.postings
    }

    /// Number of documents containing the term.
    #[inline(always)]
    pub fn doc_freq(&self) -> usize {
        self.count
    }

    #[inline(always)]
    pub fn idf(&self) -> f64 {
        self.idf
    }

    /// Binary-searches the posting of one document.
    pub fn posting(&self, doc_id: &DocId) -> Option<&Posting> {
        self.postings
            .search_by(|p| p.doc_id.cmp(doc_id))
            .ok()
            .and_then(|i| self.postings.get(i))
    }

    /// Weighted term frequency in `doc_id`, zero when absent.
    #[inline]
    pub fn tf_in(&self, doc_id: &DocId) -> f64 {
        self.posting(doc_id).map_or(0.0, Posting::tf)
    }

    /// Document ids of the postings, ascending.
    pub fn doc_ids(&self) -> impl Iterator<Item = &DocId> + '_ {
        self.postings.iter().map(|p| &p.doc_id)
    }
}

/// A k-gram and the distinct terms containing it.
#[derive(Debug, Clone, Default)]
pub struct Gram {
    pub(crate) text: String,
    pub(crate) words: SortedVec<String>,
    pub(crate) buffer: UnorderedBuffer<String>,
}

impl Gram {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            words: SortedVec::new(),
            buffer: UnorderedBuffer::new(),
        }
    }

    #[inline(always)]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Finalized words, ascending and unique.
    #[inline(always)]
    pub fn words(&self) -> &SortedVec<String> {
        &self.words
    }

    /// Words appended since the last finalize.
    #[inline(always)]
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Sort-deduplicates the buffer once and merges it into the word set.
    pub(crate) fn finalize(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        let run = self.buffer.drain_sorted();
        self.words.merge_from(run);
    }
}

/// Owns the corpus and every index built over it.
pub struct IndexController {
    pub(crate) config: IndexConfig,
    pub(crate) documents: DocStore,
    pub(crate) inverted: InvertedIndex,
    pub(crate) kgram: Option<KGramIndex>,
    pub(crate) analyzer: Analyzer,
    /// Documents stored but not yet merged into the indexes.
    pub(crate) pending: Vec<DocId>,
    pub(crate) needs_rebuild: bool,
    /// Total number of queries executed
    pub(crate) query_count: u64,
    /// Total number of documents accepted
    pub(crate) documents_added: u64,
    pub(crate) builds: u64,
}

impl Default for IndexController {
    fn default() -> Self {
        Self::new()
    }
}

impl IndexController {
    /// Creates a controller with an inverted index and a bigram index.
    pub fn new() -> Self {
        Self::with_config(IndexConfig::default())
    }

    /// Creates a controller with custom configuration.
    pub fn with_config(config: IndexConfig) -> Self {
        Self {
            config,
            documents: DocStore::new(),
            inverted: InvertedIndex::new(),
            kgram: config.kgram.map(KGramIndex::new),
            analyzer: Analyzer::new(),
            pending: Vec::new(),
            needs_rebuild: false,
            query_count: 0,
            documents_added: 0,
            builds: 0,
        }
    }

    #[inline(always)]
    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Returns the number of documents in the corpus.
    #[inline(always)]
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Returns `true` if the corpus is empty.
    #[inline(always)]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Removes all documents and resets every index.
    pub fn clear(&mut self) {
        self.documents.clear();
        self.reset_indexes();
        self.pending.clear();
        self.needs_rebuild = false;
        self.query_count = 0;
        self.documents_added = 0;
        self.builds = 0;
    }

    pub(crate) fn reset_indexes(&mut self) {
        self.inverted = InvertedIndex::new();
        self.kgram = self.config.kgram.map(KGramIndex::new);
    }

    /// Returns basic metrics about the controller's operation.
    #[inline(always)]
    #[must_use]
    pub fn metrics(&self) -> ControllerMetrics {
        ControllerMetrics {
            documents_indexed: self.documents_added,
            queries_executed: self.query_count,
            builds: self.builds,
            current_doc_count: self.documents.len() as u64,
        }
    }
}

/// Basic operational metrics for a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerMetrics {
    /// Total number of documents accepted (including those that may have been cleared).
    pub documents_indexed: u64,
    /// Total number of queries executed through the controller.
    pub queries_executed: u64,
    /// Number of builds, full or incremental, that changed an index.
    pub builds: u64,
    /// Current number of documents in the corpus.
    pub current_doc_count: u64,
}
