//! Statistics and IndexStats.

use std::collections::BTreeMap;

use crate::index::types::IndexController;

/// A snapshot of index statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexStats {
    /// Number of documents in the corpus.
    pub num_documents: usize,
    /// Number of distinct terms.
    pub num_terms: usize,
    /// Total number of postings.
    pub total_postings: usize,
    /// Number of distinct grams, zero without a k-gram index.
    pub num_grams: usize,
    /// Total number of (gram, word) entries.
    pub gram_words: usize,
    /// Document frequency → number of terms with that frequency.
    pub df_histogram: BTreeMap<usize, usize>,
}

impl IndexController {
    /// Returns index statistics for the indexes as currently built.
    pub fn stats(&self) -> IndexStats {
        let mut df_histogram = BTreeMap::new();
        for term in self.inverted.terms() {
            *df_histogram.entry(term.doc_freq()).or_insert(0) += 1;
        }

        let (num_grams, gram_words) = self
            .kgram
            .as_ref()
            .map_or((0, 0), |k| (k.len(), k.total_words()));

        IndexStats {
            num_documents: self.documents.len(),
            num_terms: self.inverted.len(),
            total_postings: self.inverted.total_postings(),
            num_grams,
            gram_words,
            df_histogram,
        }
    }
}

impl IndexStats {
    /// Mean number of postings per term.
    pub fn avg_postings(&self) -> f64 {
        if self.num_terms == 0 {
            return 0.0;
        }
        self.total_postings as f64 / self.num_terms as f64
    }

    /// Terms that occur in exactly one document.
    pub fn hapax_terms(&self) -> usize {
        self.df_histogram.get(&1).copied().unwrap_or(0)
    }
}

impl core::fmt::Display for IndexStats {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{} docs, {} terms, {} postings",
            self.num_documents, self.num_terms, self.total_postings
        )?;

        if self.num_grams > 0 {
            write!(f, ", {} grams ({} entries)", self.num_grams, self.gram_words)?;
        }

        Ok(())
    }
}
