//! Tabular debug rendering.
//!
//! ```text
//! [TERM - DOC_COUNT - IDF] -> [DOC - TERM_COUNT - TF]
//! [hello - 2 - 0] -> [a - 1 - 1000] [b - 1 - 1000]
//! ```
//!
//! Exact padding is not stable; only the information is.

use core::fmt;

use sift_types::{DisplayOptions, IndexError};

use crate::index::docs::DocStore;
use crate::index::inverted::InvertedIndex;
use crate::index::kgram::KGramIndex;
use crate::index::types::IndexController;

/// Term rows sorted by term text.
#[derive(Debug, Clone, Copy)]
pub struct InvertedTable<'a> {
    pub index: &'a InvertedIndex,
    pub options: DisplayOptions,
}

impl fmt::Display for InvertedTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[TERM - DOC_COUNT - IDF] -> [DOC - TERM_COUNT - TF]")?;

        let terms = self.index.sorted_terms();
        let rows = self.options.max_rows.unwrap_or(usize::MAX);
        let max_items = self.options.max_items;
        for term in terms.iter().take(rows) {
            write!(f, "[{} - {} - {:.0}]", term.text(), term.doc_freq(), term.idf())?;
            if self.options.verbose {
                f.write_str(" ->")?;
                for posting in term.postings().bounded(Some(max_items)) {
                    write!(
                        f,
                        " [{} - {} - {:.0}]",
                        posting.doc_id(),
                        posting.count(),
                        posting.tf()
                    )?;
                }
                if term.postings().len() > max_items {
                    f.write_str(" ...")?;
                }
            }
            f.write_str("\n")?;
        }

        if terms.len() > rows {
            writeln!(f, "... {} more terms", terms.len() - rows)?;
        }
        Ok(())
    }
}

/// Gram rows sorted by gram text.
#[derive(Debug, Clone, Copy)]
pub struct KGramTable<'a> {
    pub index: &'a KGramIndex,
    pub options: DisplayOptions,
}

impl fmt::Display for KGramTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[GRAM - WORD_COUNT] -> [WORD]")?;

        let grams = self.index.sorted_grams();
        let rows = self.options.max_rows.unwrap_or(usize::MAX);
        let max_items = self.options.max_items;
        for gram in grams.iter().take(rows) {
            write!(f, "[{} - {}]", gram.text(), gram.words().len())?;
            if self.options.verbose {
                f.write_str(" ->")?;
                for word in gram.words().bounded(Some(max_items)) {
                    write!(f, " [{word}]")?;
                }
                if gram.words().len() > max_items {
                    f.write_str(" ...")?;
                }
            }
            f.write_str("\n")?;
        }

        if grams.len() > rows {
            writeln!(f, "... {} more grams", grams.len() - rows)?;
        }
        Ok(())
    }
}

/// Document rows, ascending by id.
#[derive(Debug, Clone, Copy)]
pub struct DocumentTable<'a> {
    pub documents: &'a DocStore,
    pub options: DisplayOptions,
}

impl fmt::Display for DocumentTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows = self.options.max_rows.unwrap_or(usize::MAX);
        for doc in self.documents.iter().take(rows) {
            writeln!(f, "{doc}")?;
            if self.options.verbose {
                writeln!(f, "\t{}", doc.text())?;
            }
        }
        Ok(())
    }
}

pub fn render_inverted(index: &InvertedIndex, options: DisplayOptions) -> String {
    InvertedTable { index, options }.to_string()
}

pub fn render_kgram(index: &KGramIndex, options: DisplayOptions) -> String {
    KGramTable { index, options }.to_string()
}

impl IndexController {
    /// # Errors
    ///
    /// [`IndexError::NotBuilt`] until the controller is built.
    pub fn render_inverted(&self, options: DisplayOptions) -> Result<String, IndexError> {
        Ok(render_inverted(self.inverted_index()?, options))
    }

    /// # Errors
    ///
    /// [`IndexError::ComponentNotFound`] without a k-gram index,
    /// [`IndexError::NotBuilt`] until the controller is built.
    pub fn render_kgram(&self, options: DisplayOptions) -> Result<String, IndexError> {
        Ok(render_kgram(self.kgram_index()?, options))
    }

    pub fn render_documents(&self, options: DisplayOptions) -> String {
        DocumentTable {
            documents: &self.documents,
            options,
        }
        .to_string()
    }
}
