//! Edit distance and "did you mean" suggestions.

use core::fmt;

use sift_types::IndexError;
use tracing::debug;

use crate::analyzer::normalize_term;
use crate::index::search::Searcher;

/// Levenshtein distance over characters, two rows of state.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=a.len()).collect();
    let mut curr: Vec<usize> = vec![0; a.len() + 1];

    for (i, cb) in b.iter().enumerate() {
        curr[0] = i + 1;
        for (j, ca) in a.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != cb);
            let deletion = prev[j + 1] + 1;
            let insertion = curr[j] + 1;
            curr[j + 1] = substitution.min(deletion).min(insertion);
        }
        core::mem::swap(&mut prev, &mut curr);
    }
    prev[a.len()]
}

/// Full dynamic-programming table between two words, for inspection.
///
/// Row `i` corresponds to the first `i` characters of `target`, column `j`
/// to the first `j` characters of `source`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditMatrix {
    source: Vec<char>,
    target: Vec<char>,
    rows: Vec<Vec<usize>>,
}

impl EditMatrix {
    pub fn new(source: &str, target: &str) -> Self {
        let source: Vec<char> = source.chars().collect();
        let target: Vec<char> = target.chars().collect();

        let mut rows: Vec<Vec<usize>> = Vec::with_capacity(target.len() + 1);
        rows.push((0..=source.len()).collect());

        for (i, ct) in target.iter().enumerate() {
            let mut row = Vec::with_capacity(source.len() + 1);
            row.push(i + 1);
            for (j, cs) in source.iter().enumerate() {
                let above = rows[i][j + 1] + 1;
                let left = row[j] + 1;
                let diag = rows[i][j] + usize::from(cs != ct);
                row.push(above.min(left).min(diag));
            }
            rows.push(row);
        }

        Self {
            source,
            target,
            rows,
        }
    }

    /// Bottom-right cell.
    pub fn distance(&self) -> usize {
        self.rows
            .last()
            .and_then(|row| row.last())
            .copied()
            .unwrap_or(0)
    }

    pub fn rows(&self) -> &[Vec<usize>] {
        &self.rows
    }
}

impl fmt::Display for EditMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "   ")?;
        for c in &self.source {
            write!(f, "  {c}")?;
        }
        writeln!(f)?;
        for (i, row) in self.rows.iter().enumerate() {
            let label = if i == 0 { ' ' } else { self.target[i - 1] };
            write!(f, "{label}|")?;
            for cell in row {
                write!(f, "{cell:>3}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// An indexed term close to a query term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub term: String,
    pub distance: usize,
    /// Number of documents containing the term.
    pub doc_freq: usize,
}

impl Searcher<'_> {
    /// Indexed terms within `max_distance` edits of `term`, closest first,
    /// ties broken alphabetically.
    ///
    /// Candidates are the words sharing at least one k-gram with `term`.
    ///
    /// # Errors
    ///
    /// [`IndexError::ComponentNotFound`] without a k-gram index.
    pub fn suggest(
        &self,
        term: &str,
        max_distance: usize,
        limit: usize,
    ) -> Result<Vec<Suggestion>, IndexError> {
        let kgram = self
            .kgram
            .ok_or(IndexError::ComponentNotFound(sift_types::IndexKind::KGram))?;
        let Some(term) = normalize_term(term) else {
            return Ok(Vec::new());
        };

        let candidates = kgram.candidates(&term);
        let mut out: Vec<Suggestion> = candidates
            .iter()
            .filter_map(|word| {
                let distance = levenshtein(&term, word);
                (distance <= max_distance).then(|| Suggestion {
                    term: word.clone(),
                    distance,
                    doc_freq: self.inverted.get(word).map_or(0, |t| t.doc_freq()),
                })
            })
            .collect();

        out.sort_unstable_by(|a, b| a.distance.cmp(&b.distance).then_with(|| a.term.cmp(&b.term)));
        out.truncate(limit);
        debug!(term = %term, candidates = candidates.len(), kept = out.len(), "suggestions");
        Ok(out)
    }
}
