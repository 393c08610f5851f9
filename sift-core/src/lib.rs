//! In-memory information retrieval.
//!
//! Documents go through the [`analyzer`] into an inverted index (term →
//! postings) and a k-gram index (gram → terms). The [`IndexController`] owns
//! the corpus and both indexes and answers boolean, wildcard and ranked
//! queries. Term vectors exported from the controller feed the [`cluster`]
//! module.
//!
//! ```
//! use sift_core::IndexController;
//! use sift_types::{Document, QueryOptions};
//!
//! let mut index = IndexController::new();
//! index.set_documents([
//!     Document::new("a", "hello world").unwrap(),
//!     Document::new("b", "hello rust").unwrap(),
//! ]);
//! let hits = index.query(&["hello"], QueryOptions::exact()).unwrap();
//! assert_eq!(hits.len(), 2);
//! ```

pub mod analyzer;
pub mod cluster;
pub mod index;
pub mod sorted;

pub use index::{
    BuildKind, BuildReport, ControllerMetrics, DocStore, Gram, IndexController, IndexStats,
    InvertedIndex, KGramIndex, Posting, Searcher, Suggestion, Term,
};
pub use sorted::{OnDuplicate, Scan, SortedVec, UnorderedBuffer};
