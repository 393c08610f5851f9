//! TF-IDF weights and cosine similarity.
//!
//! Weights are scaled by 1000 so that tables stay readable as integers:
//!
//! ```text
//! tf(count)      = (1 + log10(count)) * 1000      count >= 1, else 0
//! idf(df, N)     = log10(N / df) * 1000           1 <= df <= N
//! ```

use sift_types::{ScoringError, Similarity};

/// Scale applied to term frequencies.
pub const TF_MULTIPLIER: f64 = 1000.0;

/// Scale applied to inverse document frequencies.
pub const IDF_MULTIPLIER: f64 = 1000.0;

/// Log-scaled term frequency.
#[inline(always)]
pub fn calc_tf(count: u32) -> f64 {
    if count < 1 {
        return 0.0;
    }
    (1.0 + f64::from(count).log10()) * TF_MULTIPLIER
}

/// Inverse document frequency of a term found in `doc_freq` of `total_docs`
/// documents.
///
/// # Errors
///
/// [`ScoringError::IdfDomain`] when `doc_freq` is zero or exceeds `total_docs`.
#[inline]
pub fn calc_idf(doc_freq: usize, total_docs: usize) -> Result<f64, ScoringError> {
    if doc_freq == 0 || doc_freq > total_docs {
        return Err(ScoringError::IdfDomain {
            doc_freq,
            total_docs,
        });
    }
    Ok((total_docs as f64 / doc_freq as f64).log10() * IDF_MULTIPLIER)
}

/// Cosine of the angle between the query vector `qtf * qidf` and the document
/// vector `dtf * didf`, component-wise.
///
/// # Errors
///
/// [`ScoringError::DimensionMismatch`] unless all four slices have the same
/// length.
pub fn cosine_similarity(
    qtf: &[f64],
    qidf: &[f64],
    dtf: &[f64],
    didf: &[f64],
) -> Result<Similarity, ScoringError> {
    if qtf.len() != qidf.len() {
        return Err(ScoringError::DimensionMismatch {
            query: qtf.len(),
            document: qidf.len(),
        });
    }
    if dtf.len() != didf.len() || dtf.len() != qtf.len() {
        return Err(ScoringError::DimensionMismatch {
            query: qtf.len(),
            document: dtf.len().max(didf.len()),
        });
    }

    let mut dot = 0.0f64;
    let mut q_norm = 0.0f64;
    let mut d_norm = 0.0f64;

    for i in 0..qtf.len() {
        let q = qtf[i] * qidf[i];
        let d = dtf[i] * didf[i];
        dot += q * d;
        q_norm += q * q;
        d_norm += d * d;
    }

    let magnitude = q_norm.sqrt() * d_norm.sqrt();
    if magnitude == 0.0 {
        return Ok(Similarity::Undefined);
    }
    Ok(Similarity::Score(dot / magnitude))
}
