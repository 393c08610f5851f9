//! Inverted index: term text → [`Term`].
//!
//! ## Merge
//!
//! Each document contributes one [`Term`] per token, each carrying a single
//! posting. Merging a token into the index:
//!
//! ```text
//! unseen text          → insert the term as is (count 1)
//! seen, doc absent     → binary-search the postings, insert at position
//! seen, doc present    → count += 1, tf recomputed unless deferred
//! ```
//!
//! Postings are ordered by document id, so a merge never rescans a list, and
//! merging documents one at a time yields the same index whatever order they
//! arrive in.

use rustc_hash::FxHashMap;
use sift_types::{DocId, Document, IndexError};
use tracing::debug;

use crate::analyzer::Analyzer;
use crate::index::scoring::calc_idf;
use crate::index::types::{Posting, Term};

/// Splits a document into one [`Term`] per token.
///
/// Repeated tokens are not collapsed here; the merge counts them.
pub fn fetch_terms(analyzer: &mut Analyzer, doc: &Document) -> Vec<Term> {
    let mut terms = Vec::new();
    analyzer.analyze(doc.text(), |text| {
        terms.push(Term::new(text, doc.id().clone()));
    });
    terms
}

/// Term → postings map.
#[derive(Debug, Default, Clone)]
pub struct InvertedIndex {
    terms: FxHashMap<String, Term>,
    built: bool,
    total_docs: usize,
}

impl InvertedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` once a build has completed.
    #[inline(always)]
    pub fn is_built(&self) -> bool {
        self.built
    }

    /// Corpus size the current IDFs were computed against.
    #[inline(always)]
    pub fn total_docs(&self) -> usize {
        self.total_docs
    }

    /// Number of distinct terms.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    #[inline]
    pub fn get(&self, text: &str) -> Option<&Term> {
        self.terms.get(text)
    }

    /// Terms in arbitrary order.
    pub fn terms(&self) -> impl Iterator<Item = &Term> + '_ {
        self.terms.values()
    }

    /// Terms sorted by text.
    pub fn sorted_terms(&self) -> Vec<&Term> {
        let mut terms: Vec<&Term> = self.terms.values().collect();
        terms.sort_unstable_by(|a, b| a.text.cmp(&b.text));
        terms
    }

    /// Total number of postings over all terms.
    pub fn total_postings(&self) -> usize {
        self.terms.values().map(|t| t.postings.len()).sum()
    }

    /// Discards everything, leaving an unbuilt index.
    pub fn clear(&mut self) {
        self.terms.clear();
        self.built = false;
        self.total_docs = 0;
    }

    /// Builds from scratch over `docs`, iterated in the given order.
    ///
    /// TFs are deferred during the merge and finalized once at the end.
    pub fn build<'a, I>(
        &mut self,
        analyzer: &mut Analyzer,
        docs: I,
        total_docs: usize,
    ) -> Result<(), IndexError>
    where
        I: IntoIterator<Item = &'a Document>,
    {
        self.clear();
        for doc in docs {
            let terms = fetch_terms(analyzer, doc);
            self.merge_terms(terms, total_docs, false)?;
        }
        self.refresh_weights(total_docs, true)?;
        self.built = true;
        Ok(())
    }

    /// Merges additional documents into a built index.
    ///
    /// Returns the distinct term texts the documents contributed.
    pub fn add<'a, I>(
        &mut self,
        analyzer: &mut Analyzer,
        docs: I,
        total_docs: usize,
    ) -> Result<Vec<String>, IndexError>
    where
        I: IntoIterator<Item = &'a Document>,
    {
        let mut touched: Vec<String> = Vec::new();
        for doc in docs {
            let terms = fetch_terms(analyzer, doc);
            touched.extend(terms.iter().map(|t| t.text.clone()));
            self.merge_terms(terms, total_docs, true)?;
        }
        // Corpus size changed, so every IDF is stale.
        self.refresh_weights(total_docs, false)?;
        self.built = true;

        touched.sort_unstable();
        touched.dedup();
        Ok(touched)
    }

    /// Merges the terms of one document.
    ///
    /// Every incoming term is expected to carry exactly one posting. With
    /// `update_tfs = false` the TF of bumped postings is left stale until
    /// [`InvertedIndex::refresh_weights`] runs.
    ///
    /// # Errors
    ///
    /// [`IndexError::Corrupted`] if a term ends up in more documents than
    /// `total_docs`.
    pub fn merge_terms(
        &mut self,
        terms: Vec<Term>,
        total_docs: usize,
        update_tfs: bool,
    ) -> Result<(), IndexError> {
        for incoming in terms {
            let Term { text, postings, .. } = incoming;

            if let Some(term) = self.terms.get_mut(&text) {
                for posting in postings.into_vec() {
                    merge_posting(term, posting, update_tfs);
                }
                update_stats(term, total_docs)?;
                continue;
            }

            let mut term = Term {
                text: text.clone(),
                postings,
                count: 0,
                idf: 0.0,
            };
            update_stats(&mut term, total_docs)?;
            self.terms.insert(text, term);
        }
        Ok(())
    }

    /// Recomputes every IDF against `total_docs`, and every TF if requested.
    pub fn refresh_weights(
        &mut self,
        total_docs: usize,
        recompute_tfs: bool,
    ) -> Result<(), IndexError> {
        for term in self.terms.values_mut() {
            if recompute_tfs {
                for i in 0..term.postings.len() {
                    if let Some(p) = term.postings.get_mut(i) {
                        p.refresh_tf();
                    }
                }
            }
            update_stats(term, total_docs)?;
        }
        self.total_docs = total_docs;
        debug!(terms = self.terms.len(), total_docs, "refreshed term weights");
        Ok(())
    }

    /// Document ids containing `text`, ascending.
    pub fn doc_ids(&self, text: &str) -> Vec<DocId> {
        self.terms
            .get(text)
            .map(|t| t.doc_ids().cloned().collect())
            .unwrap_or_default()
    }
}

#[inline]
fn merge_posting(term: &mut Term, posting: Posting, update_tfs: bool) {
    match term.postings.search_by(|p| p.doc_id.cmp(&posting.doc_id)) {
        Ok(i) => {
            if let Some(existing) = term.postings.get_mut(i) {
                existing.bump(update_tfs);
            }
        }
        Err(i) => term.postings.insert_at(i, posting),
    }
}

#[inline]
fn update_stats(term: &mut Term, total_docs: usize) -> Result<(), IndexError> {
    term.count = term.postings.len();
    term.idf = calc_idf(term.count, total_docs).map_err(|source| IndexError::Corrupted {
        term: term.text.clone(),
        source,
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: &str, text: &str) -> Document {
        Document::new(id, text).expect("valid document")
    }

    fn built(docs: &[Document]) -> InvertedIndex {
        let mut index = InvertedIndex::new();
        index
            .build(&mut Analyzer::new(), docs, docs.len())
            .expect("should build");
        index
    }

    #[test]
    fn fetch_terms_keeps_duplicates() {
        let d = doc("a", "to be or not to be");
        let terms = fetch_terms(&mut Analyzer::new(), &d);
        assert_eq!(terms.len(), 6);
        assert!(terms.iter().all(|t| t.postings().len() == 1));
    }

    #[test]
    fn repeated_tokens_bump_counts() {
        let index = built(&[doc("a", "to be or not to be")]);
        let to = index.get("to").expect("indexed");
        assert_eq!(to.doc_freq(), 1);
        let posting = to.posting(&DocId::from("a")).expect("posting");
        assert_eq!(posting.count(), 2);
        assert_eq!(posting.tf().round(), 1301.0);
    }

    #[test]
    fn postings_sorted_by_doc_id() {
        let docs = [doc("c", "x"), doc("a", "x"), doc("b", "x")];
        let index = built(&docs);
        let ids: Vec<&str> = index.get("x").expect("indexed").doc_ids().map(DocId::as_str).collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[test]
    fn idf_tracks_corpus_size() {
        let index = built(&[doc("a", "x y"), doc("b", "x")]);
        assert_eq!(index.get("x").map(Term::idf), Some(0.0));
        assert_eq!(index.get("y").map(|t| t.idf().round()), Some(301.0));
    }

    #[test]
    fn remerging_a_document_increments_counts() {
        let mut analyzer = Analyzer::new();
        let d = doc("a", "hello world");
        let mut index = built(core::slice::from_ref(&d));

        let terms = fetch_terms(&mut analyzer, &d);
        index.merge_terms(terms, 1, true).expect("should merge");

        let hello = index.get("hello").expect("indexed");
        assert_eq!(hello.doc_freq(), 1);
        assert_eq!(hello.posting(&DocId::from("a")).map(Posting::count), Some(2));
    }

    #[test]
    fn deferred_tfs_are_finalized_by_refresh() {
        let mut analyzer = Analyzer::new();
        let d = doc("a", "go go go");
        let mut index = InvertedIndex::new();
        index
            .merge_terms(fetch_terms(&mut analyzer, &d), 1, false)
            .expect("should merge");
        let stale = index.get("go").and_then(|t| t.posting(&DocId::from("a"))).map(Posting::tf);
        assert_eq!(stale, Some(1000.0));

        index.refresh_weights(1, true).expect("should refresh");
        let fresh = index.get("go").and_then(|t| t.posting(&DocId::from("a"))).map(Posting::tf);
        assert_eq!(fresh.map(f64::round), Some(1477.0));
    }

    #[test]
    fn corpus_smaller_than_doc_freq_is_corruption() {
        let mut analyzer = Analyzer::new();
        let mut index = InvertedIndex::new();
        index
            .merge_terms(fetch_terms(&mut analyzer, &doc("a", "x")), 1, true)
            .expect("should merge");
        let err = index.merge_terms(fetch_terms(&mut analyzer, &doc("b", "x")), 1, true);
        assert!(matches!(err, Err(IndexError::Corrupted { ref term, .. }) if term == "x"));
    }

    #[test]
    fn add_reports_touched_terms() {
        let mut analyzer = Analyzer::new();
        let mut index = built(&[doc("a", "alpha")]);
        let touched = index
            .add(&mut analyzer, [&doc("b", "beta alpha beta")], 2)
            .expect("should add");
        assert_eq!(touched, ["alpha", "beta"]);
        assert_eq!(index.total_docs(), 2);
        assert_eq!(index.get("alpha").map(Term::doc_freq), Some(2));
    }
}
