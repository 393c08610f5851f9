//! Query evaluation.
//!
//! ## Boolean mode
//!
//! Every query term becomes one slot: the ascending doc-id list of an exact
//! term, or the union over the expansions of a wildcard term. Slots are
//! intersected smallest-first with a two-pointer walk, so the result is in
//! ascending doc-id order regardless of term order.
//!
//! ## Ranked mode
//!
//! The query becomes a vector with one dimension per distinct term (wildcard
//! expansions each add a dimension). Every document in the corpus is scored
//! by cosine similarity against it and hits are returned best-first, as
//! long as at least one query term is indexed. Documents with no query term
//! score [`Similarity::Undefined`](sift_types::Similarity::Undefined) and
//! sort last.

use rustc_hash::FxHashMap;
use sift_types::{DocId, IndexError, IndexKind, QueryHit, QueryOptions};
use smallvec::SmallVec;
use tracing::{debug, warn};

use crate::analyzer::kgram::WILDCARD;
use crate::analyzer::normalize_term;
use crate::index::docs::DocStore;
use crate::index::inverted::InvertedIndex;
use crate::index::kgram::KGramIndex;
use crate::index::scoring::{calc_tf, cosine_similarity, IDF_MULTIPLIER};
use crate::index::types::{IndexController, Term};
use crate::sorted::{intersect_sorted, merge_sorted_dedup, SortedVec};

/// Read-only view over built indexes.
#[derive(Debug, Clone, Copy)]
pub struct Searcher<'a> {
    pub(crate) documents: &'a DocStore,
    pub(crate) inverted: &'a InvertedIndex,
    pub(crate) kgram: Option<&'a KGramIndex>,
}

/// One dimension of a ranked query.
struct Dimension<'a> {
    term: Option<&'a Term>,
    occurrences: u32,
}

impl<'a> Searcher<'a> {
    pub(crate) fn new(
        documents: &'a DocStore,
        inverted: &'a InvertedIndex,
        kgram: Option<&'a KGramIndex>,
    ) -> Self {
        Self {
            documents,
            inverted,
            kgram,
        }
    }

    /// Runs a query.
    ///
    /// Terms are normalized like document tokens. A term that normalizes to
    /// nothing matches no document, so a boolean query containing one is
    /// empty and a ranked query gets no dimension from it. An empty query
    /// returns no hits.
    ///
    /// # Errors
    ///
    /// [`IndexError::ComponentNotFound`] for a wildcard term when the
    /// controller has no k-gram index.
    pub fn query(
        &self,
        terms: &[&str],
        options: QueryOptions,
    ) -> Result<Vec<QueryHit>, IndexError> {
        let normalized: SmallVec<[Option<String>; 8]> =
            terms.iter().map(|t| normalize_term(t)).collect();
        if normalized.is_empty() {
            return Ok(Vec::new());
        }
        if !options.ranked && normalized.iter().any(Option::is_none) {
            debug!("query term normalizes to nothing");
            return Ok(Vec::new());
        }
        let terms: SmallVec<[String; 8]> = normalized.into_iter().flatten().collect();
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let mut hits = if options.ranked {
            self.ranked(&terms, options.wildcard)?
        } else {
            self.boolean(&terms, options.wildcard)?
                .into_iter()
                .map(QueryHit::unranked)
                .collect()
        };

        if let Some(limit) = options.limit {
            hits.truncate(limit);
        }
        Ok(hits)
    }

    /// Documents containing every term, ascending by id.
    pub fn boolean(&self, terms: &[String], wildcard: bool) -> Result<Vec<DocId>, IndexError> {
        let mut slots: SmallVec<[Vec<DocId>; 4]> = SmallVec::with_capacity(terms.len());
        for term in terms {
            let slot = self.slot(term, wildcard)?;
            if slot.is_empty() {
                debug!(term = %term, "term matches no document");
                return Ok(Vec::new());
            }
            slots.push(slot);
        }

        if slots.is_empty() {
            return Ok(Vec::new());
        }

        slots.sort_unstable_by_key(Vec::len);
        let mut docs = core::mem::take(&mut slots[0]);
        for slot in &slots[1..] {
            if docs.is_empty() {
                break;
            }
            docs = intersect_sorted(&docs, slot);
        }
        Ok(docs)
    }

    /// Every document scored against the query, best first.
    pub fn ranked(&self, terms: &[String], wildcard: bool) -> Result<Vec<QueryHit>, IndexError> {
        let dims = self.dimensions(terms, wildcard)?;
        if dims.iter().all(|d| d.term.is_none()) {
            debug!("no query term is indexed");
            return Ok(Vec::new());
        }

        let qtf: Vec<f64> = dims.iter().map(|d| calc_tf(d.occurrences)).collect();
        let qidf: Vec<f64> = vec![IDF_MULTIPLIER; dims.len()];
        let didf: Vec<f64> = dims.iter().map(|d| d.term.map_or(0.0, Term::idf)).collect();

        if didf.iter().all(|idf| *idf == 0.0) {
            warn!(terms = dims.len(), "every query term has zero idf; ranking is undefined");
        }
        debug!(?qtf, ?didf, "ranked query vector");

        let mut dtf: Vec<f64> = vec![0.0; dims.len()];
        let mut hits = Vec::with_capacity(self.documents.len());
        for id in self.documents.ids() {
            for (slot, dim) in dtf.iter_mut().zip(&dims) {
                *slot = dim.term.map_or(0.0, |t| t.tf_in(id));
            }
            let similarity = cosine_similarity(&qtf, &qidf, &dtf, &didf).map_err(|source| {
                IndexError::Corrupted {
                    term: terms.join(" "),
                    source,
                }
            })?;
            hits.push(QueryHit::ranked(id.clone(), similarity));
        }

        hits.sort_unstable_by(|a, b| b.cmp(a));
        Ok(hits)
    }

    /// Words a wildcard pattern may match, ascending.
    ///
    /// # Errors
    ///
    /// [`IndexError::ComponentNotFound`] without a k-gram index.
    pub fn expand(&self, pattern: &str) -> Result<SortedVec<String>, IndexError> {
        let kgram = self
            .kgram
            .ok_or(IndexError::ComponentNotFound(IndexKind::KGram))?;
        kgram.expand_wildcard(pattern)
    }

    #[inline]
    fn is_wildcard(term: &str, wildcard: bool) -> bool {
        wildcard && term.contains(WILDCARD)
    }

    fn slot(&self, term: &str, wildcard: bool) -> Result<Vec<DocId>, IndexError> {
        if !Self::is_wildcard(term, wildcard) {
            return Ok(self.inverted.doc_ids(term));
        }

        let mut acc: Vec<DocId> = Vec::new();
        let mut scratch: Vec<DocId> = Vec::new();
        for word in self.expand(term)?.iter() {
            let docs = self.inverted.doc_ids(word);
            scratch.clear();
            merge_sorted_dedup(&acc, &docs, &mut scratch);
            core::mem::swap(&mut acc, &mut scratch);
        }
        Ok(acc)
    }

    fn dimensions(
        &self,
        terms: &[String],
        wildcard: bool,
    ) -> Result<Vec<Dimension<'a>>, IndexError> {
        let mut dims: Vec<Dimension<'a>> = Vec::new();
        let mut by_text: FxHashMap<String, usize> = FxHashMap::default();

        let mut push = |text: &str, dims: &mut Vec<Dimension<'a>>| match by_text.get(text) {
            Some(&i) => dims[i].occurrences += 1,
            None => {
                by_text.insert(text.to_owned(), dims.len());
                dims.push(Dimension {
                    term: self.inverted.get(text),
                    occurrences: 1,
                });
            }
        };

        for term in terms {
            if Self::is_wildcard(term, wildcard) {
                for word in self.expand(term)?.iter() {
                    push(word, &mut dims);
                }
            } else {
                push(term, &mut dims);
            }
        }
        Ok(dims)
    }
}

impl IndexController {
    /// Builds if needed, then runs a query.
    ///
    /// # Errors
    ///
    /// Build failures, and the errors of [`Searcher::query`].
    pub fn query(
        &mut self,
        terms: &[&str],
        options: QueryOptions,
    ) -> Result<Vec<QueryHit>, IndexError> {
        self.query_count += 1;
        self.build(false)?;
        self.searcher()?.query(terms, options)
    }
}
