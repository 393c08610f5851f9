//! Lloyd's algorithm with deterministic seeding.
//!
//! Seed `0` uses the first `k` instances as initial centroids; any other seed
//! samples `k` distinct instances with a seeded generator, so every run is
//! reproducible. Each iteration reassigns every instance to its nearest
//! centroid (lowest cluster index on ties) and recomputes the centroids. A
//! cluster left without members keeps its previous centroid. Training stops
//! once the RSS moves by less than the tolerance.

use core::fmt;

use sift_types::ClusterError;
use tracing::{debug, info};

use crate::cluster::Instance;

/// One cluster of a [`Clustering`].
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    label: usize,
    centroid: Vec<f64>,
    members: Vec<usize>,
    rss: f64,
}

impl Cluster {
    fn new(label: usize, centroid: Vec<f64>) -> Self {
        Self {
            label,
            centroid,
            members: Vec::new(),
            rss: 0.0,
        }
    }

    #[inline(always)]
    pub fn label(&self) -> usize {
        self.label
    }

    #[inline(always)]
    pub fn centroid(&self) -> &[f64] {
        &self.centroid
    }

    /// Indices of the member instances in the training slice, ascending.
    #[inline(always)]
    pub fn members(&self) -> &[usize] {
        &self.members
    }

    /// Sum of member distances to the centroid.
    #[inline(always)]
    pub fn rss(&self) -> f64 {
        self.rss
    }

    /// Member indices ordered by distance to the centroid, closest first.
    pub fn members_by_distance<P>(&self, instances: &[Instance<P>]) -> Vec<usize> {
        let mut members = self.members.clone();
        members.sort_by(|&a, &b| {
            let da = instances[a].distance_squared(&self.centroid);
            let db = instances[b].distance_squared(&self.centroid);
            da.total_cmp(&db)
        });
        members
    }

    fn update_centroid<P>(&mut self, instances: &[Instance<P>]) {
        if self.members.is_empty() {
            return;
        }
        let mut sum = vec![0.0; self.centroid.len()];
        for &m in &self.members {
            for (s, v) in sum.iter_mut().zip(instances[m].values()) {
                *s += v;
            }
        }
        let n = self.members.len() as f64;
        for s in &mut sum {
            *s /= n;
        }
        self.centroid = sum;
    }

    fn update_rss<P>(&mut self, instances: &[Instance<P>]) {
        self.rss = self
            .members
            .iter()
            .map(|&m| instances[m].distance(&self.centroid))
            .sum();
    }
}

impl fmt::Display for Cluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {} members | rss {:.3}",
            self.label,
            self.members.len(),
            self.rss
        )
    }
}

/// Result of a k-means run.
#[derive(Debug, Clone, PartialEq)]
pub struct Clustering {
    clusters: Vec<Cluster>,
    rss: f64,
    iterations: usize,
    seed: u64,
}

impl Clustering {
    #[inline(always)]
    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    /// Per-cluster RSS averaged over the cluster count.
    #[inline(always)]
    pub fn rss(&self) -> f64 {
        self.rss
    }

    #[inline(always)]
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    #[inline(always)]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Cluster label of the instance at `index`.
    pub fn cluster_of(&self, index: usize) -> Option<usize> {
        self.clusters
            .iter()
            .find(|c| c.members.binary_search(&index).is_ok())
            .map(|c| c.label)
    }
}

impl fmt::Display for Clustering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for cluster in &self.clusters {
            writeln!(f, "- cluster #{cluster}")?;
        }
        write!(f, "rss {:.3} after {} iterations", self.rss, self.iterations)
    }
}

/// K-means trainer configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KMeans {
    pub k: usize,
    pub max_iterations: usize,
    /// Training stops when the RSS changes by less than this.
    pub tolerance: f64,
}

impl Default for KMeans {
    fn default() -> Self {
        Self::new(2)
    }
}

impl KMeans {
    pub const fn new(k: usize) -> Self {
        Self {
            k,
            max_iterations: 100,
            tolerance: 1e-5,
        }
    }

    pub const fn with_max_iterations(self, max_iterations: usize) -> Self {
        Self {
            max_iterations,
            ..self
        }
    }

    /// Clusters `instances`.
    ///
    /// # Errors
    ///
    /// [`ClusterError::Empty`] for no instances, [`ClusterError::InvalidK`]
    /// when `k` is zero or exceeds the instance count, and
    /// [`ClusterError::DimensionMismatch`] when instances differ in width.
    pub fn train<P>(
        &self,
        instances: &[Instance<P>],
        seed: u64,
    ) -> Result<Clustering, ClusterError> {
        let dims = validate(instances, self.k)?;

        let mut clusters: Vec<Cluster> = initial_centroids(instances.len(), self.k, seed)
            .into_iter()
            .enumerate()
            .map(|(label, i)| Cluster::new(label, instances[i].values().to_vec()))
            .collect();
        debug_assert!(clusters.iter().all(|c| c.centroid.len() == dims));

        let mut rss_old = f64::INFINITY;
        let mut rss = 0.0;
        let mut iterations = 0usize;

        while iterations < self.max_iterations {
            iterations += 1;

            for cluster in &mut clusters {
                cluster.members.clear();
            }
            for (i, instance) in instances.iter().enumerate() {
                let nearest = nearest_cluster(instance, &clusters);
                clusters[nearest].members.push(i);
            }

            for cluster in &mut clusters {
                cluster.update_centroid(instances);
                cluster.update_rss(instances);
            }

            rss = clusters.iter().map(Cluster::rss).sum::<f64>() / self.k as f64;
            debug!(iteration = iterations, rss, "k-means iteration");

            if (rss_old - rss).abs() < self.tolerance {
                break;
            }
            rss_old = rss;
        }

        Ok(Clustering {
            clusters,
            rss,
            iterations,
            seed,
        })
    }
}

/// Runs k-means once per seed and keeps the lowest-RSS clustering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KMeansOptimizer {
    pub kmeans: KMeans,
    /// Seeds `0..seeds` are tried.
    pub seeds: u64,
}

impl KMeansOptimizer {
    pub const fn new(kmeans: KMeans, seeds: u64) -> Self {
        Self { kmeans, seeds }
    }

    /// # Errors
    ///
    /// The errors of [`KMeans::train`].
    pub fn train<P>(&self, instances: &[Instance<P>]) -> Result<Clustering, ClusterError> {
        let mut best = self.kmeans.train(instances, 0)?;
        for seed in 1..self.seeds {
            let run = self.kmeans.train(instances, seed)?;
            debug!(seed, rss = run.rss, "k-means seed finished");
            if run.rss < best.rss {
                best = run;
            }
        }
        info!(k = self.kmeans.k, seed = best.seed, rss = best.rss, "k-means optimized");
        Ok(best)
    }
}

fn validate<P>(instances: &[Instance<P>], k: usize) -> Result<usize, ClusterError> {
    let first = instances.first().ok_or(ClusterError::Empty)?;
    if k == 0 || k > instances.len() {
        return Err(ClusterError::InvalidK {
            k,
            instances: instances.len(),
        });
    }
    let expected = first.dimensions();
    if let Some(bad) = instances.iter().find(|i| i.dimensions() != expected) {
        return Err(ClusterError::DimensionMismatch {
            expected,
            found: bad.dimensions(),
        });
    }
    Ok(expected)
}

/// Indices of the instances used as initial centroids.
fn initial_centroids(n: usize, k: usize, seed: u64) -> Vec<usize> {
    if seed == 0 {
        return (0..k).collect();
    }
    let mut rng = fastrand::Rng::with_seed(seed);
    let mut indices: Vec<usize> = (0..n).collect();
    rng.shuffle(&mut indices);
    indices.truncate(k);
    indices
}

#[inline]
fn nearest_cluster<P>(instance: &Instance<P>, clusters: &[Cluster]) -> usize {
    let mut best = 0usize;
    let mut best_dist = f64::INFINITY;
    for (i, cluster) in clusters.iter().enumerate() {
        let d = instance.distance_squared(&cluster.centroid);
        if d < best_dist {
            best = i;
            best_dist = d;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points(coords: &[(f64, f64)]) -> Vec<Instance> {
        coords.iter().map(|&(x, y)| Instance::new(vec![x, y])).collect()
    }

    fn two_blobs() -> Vec<Instance> {
        points(&[
            (0.0, 0.0),
            (100.0, 100.0),
            (0.5, 0.2),
            (99.0, 101.0),
            (0.1, 0.9),
            (100.5, 99.5),
        ])
    }

    #[test]
    fn separates_two_blobs() {
        let instances = two_blobs();
        let clustering = KMeans::new(2).train(&instances, 0).expect("valid input");

        let a = clustering.cluster_of(0).expect("assigned");
        let b = clustering.cluster_of(1).expect("assigned");
        assert_ne!(a, b);
        for i in [2, 4] {
            assert_eq!(clustering.cluster_of(i), Some(a));
        }
        for i in [3, 5] {
            assert_eq!(clustering.cluster_of(i), Some(b));
        }
    }

    #[test]
    fn seed_zero_starts_from_first_instances() {
        assert_eq!(initial_centroids(5, 3, 0), [0, 1, 2]);
    }

    #[test]
    fn seeded_initialization_is_reproducible_and_distinct() {
        let a = initial_centroids(20, 5, 7);
        let b = initial_centroids(20, 5, 7);
        assert_eq!(a, b);
        let mut sorted = a.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), 5);
    }

    #[test]
    fn empty_cluster_keeps_its_centroid() {
        // Every distance ties, and ties go to the lowest cluster index.
        let instances = points(&[(1.0, 1.0), (1.0, 1.0), (1.0, 1.0)]);
        let clustering = KMeans::new(2).train(&instances, 0).expect("valid input");
        let empty = &clustering.clusters()[1];
        assert!(empty.members().is_empty());
        assert_eq!(empty.centroid(), [1.0, 1.0]);
    }

    #[test]
    fn optimizer_never_worse_than_seed_zero() {
        let instances = two_blobs();
        let kmeans = KMeans::new(3);
        let base = kmeans.train(&instances, 0).expect("valid input");
        let best = KMeansOptimizer::new(kmeans, 5).train(&instances).expect("valid input");
        assert!(best.rss() <= base.rss());
    }

    #[test]
    fn invalid_input() {
        let empty: Vec<Instance> = Vec::new();
        assert_eq!(KMeans::new(2).train(&empty, 0), Err(ClusterError::Empty));

        let instances = two_blobs();
        assert_eq!(
            KMeans::new(0).train(&instances, 0),
            Err(ClusterError::InvalidK { k: 0, instances: 6 })
        );
        assert_eq!(
            KMeans::new(7).train(&instances, 0),
            Err(ClusterError::InvalidK { k: 7, instances: 6 })
        );

        let ragged: Vec<Instance> = vec![Instance::new(vec![0.0, 1.0]), Instance::new(vec![0.0])];
        assert_eq!(
            KMeans::new(1).train(&ragged, 0),
            Err(ClusterError::DimensionMismatch {
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn members_by_distance_orders_closest_first() {
        let instances = points(&[(0.0, 0.0), (5.0, 0.0), (1.0, 0.0)]);
        let clustering = KMeans::new(1).train(&instances, 0).expect("valid input");
        let order = clustering.clusters()[0].members_by_distance(&instances);
        assert_eq!(order[0], 2);
    }
}
