//! Core types shared across the sift retrieval engine.
//!
//! This crate holds the value types that cross crate boundaries:
//!
//! - **Identity**: [`DocId`] and [`Document`], the unit of ingestion
//! - **Results**: [`QueryHit`] and [`Similarity`], what a query hands back
//! - **Configuration**: [`IndexConfig`], [`KGramConfig`], [`QueryOptions`],
//!   [`DisplayOptions`]
//! - **Errors**: one enum per failure domain
//!
//! The engine itself lives in `sift-core`; the CLI only depends on these
//! types plus the engine's public surface.

#![warn(missing_docs)]

use core::cmp::Ordering;
use core::fmt;
use std::borrow::Borrow;
use std::sync::Arc;

/// Stable, totally ordered document identifier.
///
/// Identifiers are shared by every posting that references the document, so
/// the text lives behind an `Arc` and clones are a reference-count bump.
/// Ordering is plain lexicographic string ordering and is the sort and
/// tie-break key used throughout the engine.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocId(Arc<str>);

impl DocId {
    /// Creates an identifier from any string-like value.
    #[inline]
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier text.
    #[inline(always)]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the identifier is the empty string.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for DocId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for DocId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl Borrow<str> for DocId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A document as handed over by a corpus loader.
///
/// Documents are immutable once created. Indexers read them, never write
/// them. Ranking scores are carried by [`QueryHit`], not stored here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    id: DocId,
    text: String,
    author: Option<String>,
    timestamp: Option<String>,
    labels: Vec<String>,
}

impl Document {
    /// Creates a document.
    ///
    /// # Errors
    ///
    /// Returns `DocumentError::EmptyId` if the identifier is empty.
    /// Returns `DocumentError::InvalidInput` if the text contains control
    /// characters other than whitespace.
    pub fn new(id: impl Into<DocId>, text: impl Into<String>) -> Result<Self, DocumentError> {
        let id = id.into();
        if id.is_empty() {
            return Err(DocumentError::EmptyId);
        }

        let text = text.into();
        if contains_invalid_controls(&text) {
            return Err(DocumentError::InvalidInput {
                id: id.as_str().to_owned(),
                reason: "control characters (0x00-0x1F excluding whitespace) are not allowed",
            });
        }

        Ok(Self {
            id,
            text,
            author: None,
            timestamp: None,
            labels: Vec::new(),
        })
    }

    /// Attaches an author identifier.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Attaches a timestamp, kept verbatim.
    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    /// Attaches classification labels. Duplicates are removed.
    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = labels.into_iter().map(Into::into).collect();
        self.labels.sort_unstable();
        self.labels.dedup();
        self
    }

    /// Returns the document identifier.
    #[inline(always)]
    pub fn id(&self) -> &DocId {
        &self.id
    }

    /// Returns the raw document text.
    #[inline(always)]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the author, if any.
    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    /// Returns the timestamp, if any.
    pub fn timestamp(&self) -> Option<&str> {
        self.timestamp.as_deref()
    }

    /// Returns the sorted label set.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)?;
        if let Some(author) = &self.author {
            write!(f, " \tauthored by {author}")?;
        }
        if let Some(timestamp) = &self.timestamp {
            write!(f, " \tat {timestamp}")?;
        }
        Ok(())
    }
}

/// Checks if input contains invalid control characters (other than whitespace).
fn contains_invalid_controls(input: &str) -> bool {
    input
        .bytes()
        .any(|b| matches!(b, 0x00..=0x08 | 0x0B | 0x0C | 0x0E..=0x1F | 0x7F))
}

/// Outcome of a cosine-similarity computation.
///
/// A zero-magnitude vector has no direction, so its similarity to anything is
/// undefined. That case is kept distinct from a real score of `0.0`, which
/// would rank as a legitimate (if poor) match.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Similarity {
    /// Cosine similarity in `[0, 1]` for non-negative weights.
    Score(f64),
    /// At least one of the vectors had zero magnitude.
    Undefined,
}

impl Similarity {
    /// Returns the score if defined.
    #[inline(always)]
    pub const fn score(self) -> Option<f64> {
        match self {
            Similarity::Score(score) => Some(score),
            Similarity::Undefined => None,
        }
    }

    /// Returns `true` for [`Similarity::Score`].
    #[inline(always)]
    pub const fn is_defined(self) -> bool {
        matches!(self, Similarity::Score(_))
    }

    /// Total order where every defined score outranks `Undefined`.
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Similarity::Score(a), Similarity::Score(b)) => a.total_cmp(b),
            (Similarity::Score(_), Similarity::Undefined) => Ordering::Greater,
            (Similarity::Undefined, Similarity::Score(_)) => Ordering::Less,
            (Similarity::Undefined, Similarity::Undefined) => Ordering::Equal,
        }
    }
}

impl fmt::Display for Similarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Similarity::Score(score) => write!(f, "{:.2}%", score * 100.0),
            Similarity::Undefined => f.write_str("undefined"),
        }
    }
}

/// A single query result.
///
/// Boolean queries leave `similarity` empty. Ranked queries attach the cosine
/// similarity between the query and the document.
///
/// Hits are ordered by relevance: a hit with a better similarity is
/// "greater", and among equal similarities the smaller document id is
/// "greater". Sorting descending therefore yields the presentation order.
#[derive(Debug, Clone)]
pub struct QueryHit {
    /// Document identifier
    pub doc_id: DocId,
    /// Relevance, for ranked queries only
    pub similarity: Option<Similarity>,
}

impl QueryHit {
    /// Creates an unranked hit.
    #[inline]
    pub fn unranked(doc_id: DocId) -> Self {
        Self {
            doc_id,
            similarity: None,
        }
    }

    /// Creates a ranked hit.
    #[inline]
    pub fn ranked(doc_id: DocId, similarity: Similarity) -> Self {
        Self {
            doc_id,
            similarity: Some(similarity),
        }
    }

    /// Returns the score of a ranked hit with a defined similarity.
    #[inline]
    pub fn score(&self) -> Option<f64> {
        self.similarity.and_then(Similarity::score)
    }
}

impl PartialEq for QueryHit {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueryHit {}

impl PartialOrd for QueryHit {
    #[inline(always)]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueryHit {
    fn cmp(&self, other: &Self) -> Ordering {
        let by_similarity = match (&self.similarity, &other.similarity) {
            (Some(a), Some(b)) => a.total_cmp(b),
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => Ordering::Equal,
        };
        by_similarity.then_with(|| other.doc_id.cmp(&self.doc_id))
    }
}

impl fmt::Display for QueryHit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.similarity {
            Some(similarity) => write!(f, "[RANK: {similarity}] [DOC: {}]", self.doc_id),
            None => write!(f, "[DOC: {}]", self.doc_id),
        }
    }
}

/// Identifies one index component of a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexKind {
    /// Term → postings
    Inverted,
    /// Gram → terms
    KGram,
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IndexKind::Inverted => "inverted index",
            IndexKind::KGram => "k-gram index",
        };
        f.write_str(name)
    }
}

/// Errors that can occur when creating a document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DocumentError {
    /// The identifier was empty.
    #[error("document id must not be empty")]
    EmptyId,
    /// The text contains characters the engine refuses to index.
    #[error("document {id} contains invalid input: {reason}")]
    InvalidInput {
        /// Offending document.
        id: String,
        /// Description of the invalid content.
        reason: &'static str,
    },
}

/// Errors raised by TF-IDF arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ScoringError {
    /// Document frequency outside `1..=total_docs`.
    #[error("idf undefined: term appears in {doc_freq} of {total_docs} documents")]
    IdfDomain {
        /// Number of documents the term appears in.
        doc_freq: usize,
        /// Number of documents in the corpus.
        total_docs: usize,
    },
    /// Query and document vectors have different lengths.
    #[error("vector length mismatch: query has {query} dimensions, document has {document}")]
    DimensionMismatch {
        /// Query vector length.
        query: usize,
        /// Document vector length.
        document: usize,
    },
}

/// Errors raised by the index controller and its components.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IndexError {
    /// The controller was configured without this component.
    #[error("{0} is not registered")]
    ComponentNotFound(IndexKind),
    /// The component exists but has not been built yet.
    #[error("{0} has not been built")]
    NotBuilt(IndexKind),
    /// A term broke the posting-count invariant during a merge.
    #[error("index corrupted at term {term:?}")]
    Corrupted {
        /// Term whose statistics were inconsistent.
        term: String,
        /// Underlying arithmetic failure.
        #[source]
        source: ScoringError,
    },
}

/// Errors raised by the k-means clusterer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClusterError {
    /// No instances to cluster.
    #[error("no instances to cluster")]
    Empty,
    /// `k` is zero or exceeds the number of instances.
    #[error("cannot form {k} clusters from {instances} instances")]
    InvalidK {
        /// Requested cluster count.
        k: usize,
        /// Available instances.
        instances: usize,
    },
    /// Instances do not share one dimensionality.
    #[error("instance has {found} dimensions, expected {expected}")]
    DimensionMismatch {
        /// Dimensionality of the first instance.
        expected: usize,
        /// Dimensionality of the offending instance.
        found: usize,
    },
}

/// K-gram index configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KGramConfig {
    /// Gram length in characters, boundary sentinel included. Default: 2
    pub k: usize,
    /// Buffer words per gram and sort once at the end of a build instead of
    /// inserting into each gram's ordered set as words arrive.
    pub late_sort: bool,
    /// Terms starting with any of these prefixes are not gram-indexed.
    pub ignore_prefixes: &'static [&'static str],
}

impl Default for KGramConfig {
    fn default() -> Self {
        Self::buffered()
    }
}

impl KGramConfig {
    /// URL-like prefixes that pollute the gram space.
    pub const DEFAULT_IGNORE_PREFIXES: &'static [&'static str] = &["http:", "https:"];

    /// Bigram index using the buffered (late-sort) strategy.
    pub const fn buffered() -> Self {
        Self {
            k: 2,
            late_sort: true,
            ignore_prefixes: Self::DEFAULT_IGNORE_PREFIXES,
        }
    }

    /// Bigram index using ordered insertion.
    pub const fn ordered() -> Self {
        Self {
            k: 2,
            late_sort: false,
            ignore_prefixes: Self::DEFAULT_IGNORE_PREFIXES,
        }
    }

    /// Same strategy with a different gram length. Values below 2 are raised
    /// to 2, since a unigram carries no boundary information.
    pub const fn with_k(self, k: usize) -> Self {
        Self {
            k: if k < 2 { 2 } else { k },
            ..self
        }
    }

    /// Returns `true` if the term must not be gram-indexed.
    pub fn is_ignored(&self, term: &str) -> bool {
        self.ignore_prefixes.iter().any(|p| term.starts_with(p))
    }
}

/// Controller configuration: which index components exist and how they build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexConfig {
    /// K-gram index settings, or `None` to run without wildcard support.
    pub kgram: Option<KGramConfig>,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            kgram: Some(KGramConfig::default()),
        }
    }
}

impl IndexConfig {
    /// Inverted index only; wildcard queries and suggestions are unavailable.
    pub const fn without_kgram() -> Self {
        Self { kgram: None }
    }

    /// Inverted index plus a k-gram index with the given settings.
    pub const fn with_kgram(kgram: KGramConfig) -> Self {
        Self { kgram: Some(kgram) }
    }
}

/// Per-query options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QueryOptions {
    /// Expand terms containing `*` through the k-gram index.
    pub wildcard: bool,
    /// Rank by cosine similarity instead of returning the boolean AND.
    pub ranked: bool,
    /// Maximum number of hits to return.
    pub limit: Option<usize>,
}

impl QueryOptions {
    /// Exact-term boolean AND.
    pub const fn exact() -> Self {
        Self {
            wildcard: false,
            ranked: false,
            limit: None,
        }
    }

    /// Boolean AND with wildcard expansion.
    pub const fn wildcard() -> Self {
        Self {
            wildcard: true,
            ranked: false,
            limit: None,
        }
    }

    /// Ranked retrieval.
    pub const fn ranked() -> Self {
        Self {
            wildcard: false,
            ranked: true,
            limit: None,
        }
    }

    /// Same mode with wildcard expansion enabled.
    pub const fn with_wildcard(self) -> Self {
        Self {
            wildcard: true,
            ..self
        }
    }

    /// Caps the number of hits.
    pub const fn with_limit(self, limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..self
        }
    }
}

/// Options for the tabular debug rendering of an index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayOptions {
    /// Also list the first `max_items` postings or words of each row.
    pub verbose: bool,
    /// Maximum number of rows, `None` for all.
    pub max_rows: Option<usize>,
    /// Items listed per row in verbose mode.
    pub max_items: usize,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            verbose: false,
            max_rows: None,
            max_items: 3,
        }
    }
}

impl DisplayOptions {
    /// Verbose rendering with default limits.
    pub const fn verbose() -> Self {
        Self {
            verbose: true,
            max_rows: None,
            max_items: 3,
        }
    }

    /// Caps the number of rows.
    pub const fn with_max_rows(self, rows: usize) -> Self {
        Self {
            max_rows: Some(rows),
            ..self
        }
    }
}
