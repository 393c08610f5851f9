//! K-means clustering over document term vectors.
//!
//! Instances are dense `f64` vectors, typically produced by
//! [`IndexController::term_vectors`](crate::IndexController::term_vectors).
//! Clusters refer to their members by index into the training slice, so the
//! caller keeps ownership of the instances and their payloads.

mod kmeans;

pub use kmeans::{Cluster, Clustering, KMeans, KMeansOptimizer};

use core::fmt;

/// A point in N dimensions with an optional payload, e.g. a document id.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance<P = ()> {
    values: Vec<f64>,
    payload: Option<P>,
}

impl<P> Instance<P> {
    /// Vectors wider than this print as a summary.
    const MAX_DIMENSION_VIS: usize = 10;

    pub fn new(values: Vec<f64>) -> Self {
        Self {
            values,
            payload: None,
        }
    }

    pub fn with_payload(values: Vec<f64>, payload: P) -> Self {
        Self {
            values,
            payload: Some(payload),
        }
    }

    #[inline(always)]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    #[inline(always)]
    pub fn dimensions(&self) -> usize {
        self.values.len()
    }

    #[inline(always)]
    pub fn payload(&self) -> Option<&P> {
        self.payload.as_ref()
    }

    /// Squared Euclidean distance to `point`.
    ///
    /// Extra dimensions on either side are ignored.
    #[inline]
    pub fn distance_squared(&self, point: &[f64]) -> f64 {
        self.values
            .iter()
            .zip(point)
            .map(|(a, b)| (a - b) * (a - b))
            .sum()
    }

    #[inline]
    pub fn distance(&self, point: &[f64]) -> f64 {
        self.distance_squared(point).sqrt()
    }
}

impl<P: fmt::Display> fmt::Display for Instance<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(payload) = &self.payload {
            write!(f, "{payload} ")?;
        }
        if self.values.len() > Self::MAX_DIMENSION_VIS {
            return write!(f, "point in {} dimensions", self.values.len());
        }
        f.write_str("[")?;
        for (i, v) in self.values.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{v:.3}")?;
        }
        f.write_str("]")
    }
}
