//! Index building logic.

use std::time::{Duration, Instant};

use sift_types::{DocId, IndexError};
use tracing::{debug, info};

use crate::index::types::{IndexController, Term};

/// What a call to [`IndexController::build`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildKind {
    /// Everything was rebuilt from the document store.
    Full,
    /// Pending documents were merged into the existing indexes.
    Incremental,
    /// Nothing to do.
    Skipped,
}

/// Summary of a build.
#[derive(Debug, Clone, Copy)]
pub struct BuildReport {
    pub kind: BuildKind,
    /// Documents merged by this build.
    pub documents: usize,
    /// Distinct terms after the build.
    pub terms: usize,
    /// Distinct grams after the build, zero without a k-gram index.
    pub grams: usize,
    pub elapsed: Duration,
}

impl IndexController {
    /// Brings every index up to date with the document store.
    ///
    /// ## Full build
    ///
    /// Runs on the first build, after [`IndexController::set_documents`], or
    /// when `force` is set. The inverted index is rebuilt with TFs deferred
    /// and finalized once, then the k-gram index is rebuilt from its terms.
    ///
    /// ## Incremental build
    ///
    /// Documents added to a built controller are merged into the existing
    /// postings and their terms into the existing grams. All IDFs are
    /// refreshed since the corpus size changed. The result equals a full
    /// build over the same documents.
    ///
    /// Without `force`, a controller that is already up to date is left
    /// untouched.
    pub fn build(&mut self, force: bool) -> Result<BuildReport, IndexError> {
        let start = Instant::now();

        let (kind, documents) = if force || self.needs_rebuild || !self.inverted.is_built() {
            (BuildKind::Full, self.rebuild_all()?)
        } else if !self.pending.is_empty() {
            (BuildKind::Incremental, self.merge_pending()?)
        } else {
            (BuildKind::Skipped, 0)
        };

        let report = BuildReport {
            kind,
            documents,
            terms: self.inverted.len(),
            grams: self.kgram.as_ref().map_or(0, |k| k.len()),
            elapsed: start.elapsed(),
        };

        if kind == BuildKind::Skipped {
            debug!("indexes up to date, build skipped");
        } else {
            self.builds += 1;
            info!(
                kind = ?report.kind,
                documents = report.documents,
                terms = report.terms,
                grams = report.grams,
                elapsed_ms = report.elapsed.as_secs_f64() * 1000.0,
                "build finished"
            );
        }
        Ok(report)
    }

    fn rebuild_all(&mut self) -> Result<usize, IndexError> {
        let total = self.documents.len();
        info!(documents = total, "full build started");

        self.pending.clear();
        self.needs_rebuild = true;

        self.inverted
            .build(&mut self.analyzer, self.documents.iter(), total)?;

        if let Some(kgram) = self.kgram.as_mut() {
            kgram.build(self.inverted.terms().map(Term::text));
        }

        self.needs_rebuild = false;
        Ok(total)
    }

    pub(crate) fn merge_pending(&mut self) -> Result<usize, IndexError> {
        let mut ids: Vec<DocId> = core::mem::take(&mut self.pending);
        ids.sort_unstable();
        let total = self.documents.len();
        debug!(documents = ids.len(), total, "merging pending documents");

        let documents = &self.documents;
        let docs = ids.iter().filter_map(|id| documents.get(id.as_str()));
        let touched = match self.inverted.add(&mut self.analyzer, docs, total) {
            Ok(touched) => touched,
            Err(e) => {
                // The partial merge cannot be undone; rebuild on next use.
                self.needs_rebuild = true;
                return Err(e);
            }
        };

        if let Some(kgram) = self.kgram.as_mut() {
            kgram.extend(touched.iter().map(String::as_str));
        }
        Ok(ids.len())
    }
}
