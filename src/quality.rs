//! Cluster quality measures.
//!
//! Pure, read-only computations over a finished clustering:
//! - **Inertia**: sum of squared distances to the assigned centroid (lower is tighter)
//! - **Silhouette**: mean of `(b - a) / max(a, b)` over points, in `[-1, 1]`
//!   (higher is better separation)
//!
//! Points that are the only member of their cluster have no `a(i)` and are
//! left out of the silhouette mean. With fewer than two non-empty clusters
//! there is nothing to compare against and the score is `0.0`.

use crate::cluster::{KMeansClusterer, euclidean_distance, squared_euclidean_distance};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Summary of a clustering's quality.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ClusterQuality {
    pub inertia: f32,
    pub silhouette: f32,
    /// Number of non-empty clusters
    pub clusters: usize,
}

/// Sum over all vectors of the squared distance to their assigned centroid.
pub fn inertia(vectors: &[Vec<f32>], assignments: &[usize], centroids: &[Vec<f32>]) -> f32 {
    vectors
        .iter()
        .zip(assignments.iter())
        .filter_map(|(vector, &cluster)| centroids.get(cluster).map(|c| (vector, c)))
        .map(|(vector, centroid)| squared_euclidean_distance(vector, centroid))
        .sum()
}

/// Mean silhouette coefficient of a clustering.
pub fn silhouette(vectors: &[Vec<f32>], assignments: &[usize]) -> f32 {
    let n = vectors.len().min(assignments.len());
    if n == 0 {
        return 0.0;
    }

    let k = assignments[..n].iter().max().map_or(0, |&m| m + 1);
    let mut cluster_sizes = vec![0usize; k];
    for &cluster in &assignments[..n] {
        cluster_sizes[cluster] += 1;
    }

    if cluster_sizes.iter().filter(|&&size| size > 0).count() < 2 {
        return 0.0;
    }

    let mut total = 0.0f64;
    let mut counted = 0usize;
    let mut distance_sums = vec![0.0f64; k];

    for i in 0..n {
        let own = assignments[i];
        if cluster_sizes[own] < 2 {
            continue;
        }

        distance_sums.iter_mut().for_each(|d| *d = 0.0);
        for j in 0..n {
            if i != j {
                distance_sums[assignments[j]] += f64::from(euclidean_distance(&vectors[i], &vectors[j]));
            }
        }

        let a = distance_sums[own] / (cluster_sizes[own] - 1) as f64;
        let b = (0..k)
            .filter(|&c| c != own && cluster_sizes[c] > 0)
            .map(|c| distance_sums[c] / cluster_sizes[c] as f64)
            .fold(f64::INFINITY, f64::min);

        let max = a.max(b);
        total += if max > 0.0 { (b - a) / max } else { 0.0 };
        counted += 1;
    }

    if counted == 0 {
        0.0
    } else {
        (total / counted as f64) as f32
    }
}

/// Computes inertia, silhouette and the number of non-empty clusters.
pub fn evaluate(vectors: &[Vec<f32>], assignments: &[usize], centroids: &[Vec<f32>]) -> ClusterQuality {
    let mut used = vec![false; centroids.len()];
    for &cluster in assignments {
        if let Some(slot) = used.get_mut(cluster) {
            *slot = true;
        }
    }

    ClusterQuality {
        inertia: inertia(vectors, assignments, centroids),
        silhouette: silhouette(vectors, assignments),
        clusters: used.into_iter().filter(|&u| u).count(),
    }
}

/// Heuristic cluster count for `n` points: `round(sqrt(n / 2))`, within `[1, n]`.
pub fn default_k(n: usize) -> usize {
    if n == 0 {
        return 0;
    }
    ((n as f64 / 2.0).sqrt().round() as usize).clamp(1, n)
}

/// Picks the k in `2..=max_k` with the highest silhouette score.
///
/// Candidates are bounded by `n - 1` so every run leaves at least one
/// cluster with two members. Ties keep the smaller k. Returns `None` when
/// fewer than three vectors are available.
pub fn select_k<R: Rng + ?Sized>(
    vectors: &[Vec<f32>],
    max_k: usize,
    max_iterations: usize,
    rng: &mut R,
) -> Option<usize> {
    let upper = max_k.min(vectors.len().saturating_sub(1));
    let mut best: Option<(usize, f32)> = None;

    for k in 2..=upper {
        let result = KMeansClusterer::new(k)
            .with_max_iterations(max_iterations)
            .cluster(vectors, rng);
        if result.is_empty() {
            continue;
        }

        let score = silhouette(vectors, &result.assignments);
        debug!("k = {k}: silhouette {score:.4}");
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((k, score)),
        }
    }

    best.map(|(k, _)| k)
}
