//! K-means clustering for discovered feature vectors.
//!
//! This module provides a pure Rust implementation of K-means clustering
//! over normalized feature vectors. It uses Euclidean distance everywhere
//! (seeding, assignment and later quality scoring) and K-means++ for
//! centroid initialization.
//!
//! # Algorithm Details
//! - Distance metric: Euclidean
//! - Initialization: K-means++ driven by a caller-supplied RNG
//! - Max iterations: 100 by default
//! - Convergence: assignments unchanged between consecutive iterations
//!
//! # Degenerate Input
//! Empty input, `k == 0`, `k > n` and mixed dimensions all produce an empty
//! [`KMeansResult`] instead of an error, so orchestrators can treat
//! "nothing to cluster" as a normal case.

use super::distance::{nearest_centroid, squared_euclidean_distance};
use rand::Rng;
use tracing::{debug, warn};

/// Default maximum number of Lloyd iterations.
pub const DEFAULT_MAX_ITERATIONS: usize = 100;

/// Result of a K-means clustering run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct KMeansResult {
    /// Cluster id (`0..k`) for each input vector.
    pub assignments: Vec<usize>,

    /// Cluster centroids, each of the same dimension as the input vectors.
    pub centroids: Vec<Vec<f32>>,

    /// Number of assignment passes performed.
    pub iterations: usize,

    /// Whether the run stopped because assignments stopped changing.
    pub converged: bool,
}

impl KMeansResult {
    /// The no-op result returned for degenerate input.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns true when nothing was clustered.
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Number of clusters (centroids) in this result.
    pub fn k(&self) -> usize {
        self.centroids.len()
    }

    /// Member indices of each cluster, indexed by cluster id.
    pub fn members(&self) -> Vec<Vec<usize>> {
        let mut members = vec![Vec::new(); self.centroids.len()];
        for (index, &cluster) in self.assignments.iter().enumerate() {
            members[cluster].push(index);
        }
        members
    }
}

/// Configured K-means clusterer.
///
/// The clusterer holds no RNG state of its own; pass a seeded RNG to
/// [`KMeansClusterer::cluster`] for reproducible runs.
#[derive(Debug, Clone, Copy)]
pub struct KMeansClusterer {
    k: usize,
    max_iterations: usize,
}

impl KMeansClusterer {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    /// Set the iteration cap.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Cluster `vectors` into `k` groups.
    #[must_use = "clustering results should be used or the computation is wasted"]
    pub fn cluster<R: Rng + ?Sized>(&self, vectors: &[Vec<f32>], rng: &mut R) -> KMeansResult {
        kmeans_clustering(vectors, self.k, self.max_iterations, rng)
    }
}

/// Performs K-means clustering on a set of vectors using Euclidean distance.
///
/// # Arguments
/// * `vectors` - Input vectors to cluster (same dimension)
/// * `k` - Number of clusters (1..=vectors.len())
/// * `max_iterations` - Iteration cap; at least one pass is always made
/// * `rng` - Random source used only for K-means++ seeding
///
/// # Algorithm
/// 1. Initialize centroids using K-means++
/// 2. Iterate until assignments repeat or the cap is reached:
///    - Assign each vector to its nearest centroid
///    - Update centroids as the mean of their assigned vectors
#[must_use = "clustering results should be used or the computation is wasted"]
pub fn kmeans_clustering<R: Rng + ?Sized>(
    vectors: &[Vec<f32>],
    k: usize,
    max_iterations: usize,
    rng: &mut R,
) -> KMeansResult {
    if vectors.is_empty() || k == 0 {
        debug!(
            "Skipping clustering: {} vectors, k = {}",
            vectors.len(),
            k
        );
        return KMeansResult::empty();
    }

    if k > vectors.len() {
        warn!(
            "Cannot build {k} clusters from {} vectors; reduce k first",
            vectors.len()
        );
        return KMeansResult::empty();
    }

    let dimension = vectors[0].len();
    if vectors.iter().any(|v| v.len() != dimension) {
        warn!("Dimension mismatch in clustering input; expected {dimension} everywhere");
        return KMeansResult::empty();
    }

    let mut centroids = initialize_centroids_kmeans_plus_plus(vectors, k, rng);
    let mut assignments: Vec<usize> = Vec::new();
    let mut iterations = 0;
    let mut converged = false;

    while iterations < max_iterations.max(1) {
        iterations += 1;

        // Assignment step: assign each vector to nearest centroid
        let new_assignments: Vec<usize> = vectors
            .iter()
            .map(|vector| assign_to_nearest_centroid(vector, &centroids))
            .collect();

        // Check for convergence (no assignment changes)
        if new_assignments == assignments {
            converged = true;
            break;
        }
        assignments = new_assignments;

        // Update step: recompute centroids
        centroids = update_centroids(vectors, &assignments, &centroids);
    }

    if converged {
        debug!("K-means converged after {iterations} iterations (k = {k})");
    } else {
        // Note: We still return results even if not fully converged
        debug!("K-means stopped at the iteration cap ({iterations}) without converging");
    }

    KMeansResult {
        assignments,
        centroids,
        iterations,
        converged,
    }
}

/// Assigns a vector to the nearest centroid by Euclidean distance.
///
/// Ties go to the lowest cluster index. `centroids` must be non-empty.
pub fn assign_to_nearest_centroid(vector: &[f32], centroids: &[Vec<f32>]) -> usize {
    nearest_centroid(vector, centroids)
        .map(|(index, _)| index)
        .unwrap_or(0)
}

/// Updates centroids as the mean of their assigned vectors.
///
/// A cluster that lost all of its members keeps its previous centroid.
fn update_centroids(
    vectors: &[Vec<f32>],
    assignments: &[usize],
    previous: &[Vec<f32>],
) -> Vec<Vec<f32>> {
    let dimension = vectors[0].len();
    let k = previous.len();
    let mut sums = vec![vec![0.0f64; dimension]; k];
    let mut cluster_sizes = vec![0usize; k];

    // Sum vectors for each cluster
    for (vector, &cluster) in vectors.iter().zip(assignments.iter()) {
        for (sum, &value) in sums[cluster].iter_mut().zip(vector.iter()) {
            *sum += f64::from(value);
        }
        cluster_sizes[cluster] += 1;
    }

    sums.into_iter()
        .zip(cluster_sizes)
        .zip(previous.iter())
        .map(|((sum, size), old)| {
            if size == 0 {
                old.clone()
            } else {
                sum.into_iter().map(|s| (s / size as f64) as f32).collect()
            }
        })
        .collect()
}

/// Initializes centroids using the K-means++ algorithm.
///
/// The first centroid is drawn uniformly; each following one is drawn with
/// probability proportional to the squared distance to its nearest chosen
/// centroid. When every point coincides with a chosen centroid, the next one
/// is drawn uniformly.
fn initialize_centroids_kmeans_plus_plus<R: Rng + ?Sized>(
    vectors: &[Vec<f32>],
    k: usize,
    rng: &mut R,
) -> Vec<Vec<f32>> {
    let mut centroids: Vec<Vec<f32>> = Vec::with_capacity(k);

    // Choose first centroid randomly
    let first_idx = rng.random_range(0..vectors.len());
    centroids.push(vectors[first_idx].clone());

    // Squared distance of every vector to its nearest chosen centroid
    let mut distances: Vec<f64> = vectors
        .iter()
        .map(|v| f64::from(squared_euclidean_distance(v, &centroids[0])))
        .collect();

    while centroids.len() < k {
        let total_distance: f64 = distances.iter().sum();

        let selected = if total_distance > 0.0 {
            // Roulette-wheel selection over the cumulative sum
            let target = rng.random::<f64>() * total_distance;
            let mut cumulative = 0.0;
            let mut chosen = None;

            for (i, &distance) in distances.iter().enumerate() {
                if distance <= 0.0 {
                    continue;
                }
                cumulative += distance;
                if cumulative >= target {
                    chosen = Some(i);
                    break;
                }
            }

            // Rounding can leave the target just past the final sum
            chosen.unwrap_or_else(|| {
                distances
                    .iter()
                    .rposition(|&d| d > 0.0)
                    .unwrap_or(vectors.len() - 1)
            })
        } else {
            rng.random_range(0..vectors.len())
        };

        let centroid = vectors[selected].clone();
        for (distance, vector) in distances.iter_mut().zip(vectors.iter()) {
            let candidate = f64::from(squared_euclidean_distance(vector, &centroid));
            if candidate < *distance {
                *distance = candidate;
            }
        }
        centroids.push(centroid);
    }

    centroids
}
