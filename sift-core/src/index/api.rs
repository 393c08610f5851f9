//! Public API for loading documents and reaching the built components.

use sift_types::{DocId, Document, IndexError, IndexKind};
use tracing::warn;

use crate::analyzer::normalize_term;
use crate::cluster::Instance;
use crate::index::docs::DocStore;
use crate::index::inverted::InvertedIndex;
use crate::index::kgram::KGramIndex;
use crate::index::search::Searcher;
use crate::index::types::IndexController;

impl IndexController {
    /// Replaces the corpus and invalidates every index.
    ///
    /// Documents sharing an id with an earlier one in `docs` are skipped.
    /// Returns the number of documents stored.
    pub fn set_documents<I>(&mut self, docs: I) -> usize
    where
        I: IntoIterator<Item = Document>,
    {
        self.documents.clear();
        self.reset_indexes();
        self.pending.clear();

        let mut stored = 0usize;
        for doc in docs {
            let id = doc.id().clone();
            if self.documents.insert(doc) {
                stored += 1;
            } else {
                warn!(doc_id = %id, "skipping duplicate document");
            }
        }

        self.documents_added += stored as u64;
        self.needs_rebuild = true;
        stored
    }

    /// Adds documents to the corpus.
    ///
    /// Ids already present are skipped. If the indexes are built, the new
    /// documents are merged into them right away; otherwise they are indexed
    /// by the next build. Returns the number of documents added.
    ///
    /// # Errors
    ///
    /// Propagates merge failures from [`IndexController::build`].
    pub fn add_documents<I>(&mut self, docs: I) -> Result<usize, IndexError>
    where
        I: IntoIterator<Item = Document>,
    {
        let was_built = self.is_built();
        let mut added = 0usize;
        for doc in docs {
            let id = doc.id().clone();
            if self.documents.insert(doc) {
                self.pending.push(id);
                added += 1;
            } else {
                warn!(doc_id = %id, "skipping duplicate document");
            }
        }
        self.documents_added += added as u64;

        if added > 0 && was_built {
            self.build(false)?;
        } else if added > 0 {
            self.needs_rebuild = true;
        }
        Ok(added)
    }

    /// Retrieves a document by its id.
    #[inline(always)]
    pub fn get(&self, id: &str) -> Option<&Document> {
        self.documents.get(id)
    }

    /// The document store.
    #[inline(always)]
    pub fn documents(&self) -> &DocStore {
        &self.documents
    }

    /// `true` when every stored document is reflected in the indexes.
    #[inline]
    pub fn is_built(&self) -> bool {
        !self.needs_rebuild && self.pending.is_empty() && self.inverted.is_built()
    }

    /// # Errors
    ///
    /// [`IndexError::NotBuilt`] until the controller is built.
    pub fn inverted_index(&self) -> Result<&InvertedIndex, IndexError> {
        if !self.is_built() {
            return Err(IndexError::NotBuilt(IndexKind::Inverted));
        }
        Ok(&self.inverted)
    }

    /// # Errors
    ///
    /// [`IndexError::ComponentNotFound`] when configured without a k-gram
    /// index, [`IndexError::NotBuilt`] until the controller is built.
    pub fn kgram_index(&self) -> Result<&KGramIndex, IndexError> {
        let kgram = self
            .kgram
            .as_ref()
            .ok_or(IndexError::ComponentNotFound(IndexKind::KGram))?;
        if !self.is_built() || !kgram.is_built() {
            return Err(IndexError::NotBuilt(IndexKind::KGram));
        }
        Ok(kgram)
    }

    /// Read-only query handle over the built indexes.
    ///
    /// Any number of searchers may coexist; none of them can outlive a
    /// mutation of the controller.
    pub fn searcher(&self) -> Result<Searcher<'_>, IndexError> {
        let inverted = self.inverted_index()?;
        let kgram = match self.kgram_index() {
            Ok(kgram) => Some(kgram),
            Err(IndexError::ComponentNotFound(_)) => None,
            Err(e) => return Err(e),
        };
        Ok(Searcher::new(&self.documents, inverted, kgram))
    }

    /// One TF×IDF vector per document, ascending by id, over the given
    /// vocabulary.
    ///
    /// Dimension terms are normalized like query terms; a term that is not
    /// indexed contributes a zero component.
    pub fn term_vectors(&self, dimensions: &[&str]) -> Result<Vec<Instance<DocId>>, IndexError> {
        let inverted = self.inverted_index()?;
        let terms: Vec<_> = dimensions
            .iter()
            .map(|d| normalize_term(d).and_then(|t| inverted.get(&t)))
            .collect();

        let vectors = self
            .documents
            .ids()
            .map(|id| {
                let values = terms
                    .iter()
                    .map(|term| term.map_or(0.0, |t| t.tf_in(id) * t.idf()))
                    .collect();
                Instance::with_payload(values, id.clone())
            })
            .collect();
        Ok(vectors)
    }
}
