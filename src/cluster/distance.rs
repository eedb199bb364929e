//! Euclidean distance helpers shared by seeding, assignment and scoring.

/// Computes the squared Euclidean distance between two vectors.
///
/// Both vectors must have the same dimension.
#[inline]
pub fn squared_euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "Vectors must have same dimension");

    a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum()
}

/// Computes the Euclidean distance between two vectors.
#[inline]
pub fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    squared_euclidean_distance(a, b).sqrt()
}

/// Returns the index of the nearest centroid and the distance to it.
///
/// Ties resolve to the lowest index (the first minimum found).
/// Returns `None` when `centroids` is empty.
pub fn nearest_centroid(vector: &[f32], centroids: &[Vec<f32>]) -> Option<(usize, f32)> {
    let mut best: Option<(usize, f32)> = None;

    for (i, centroid) in centroids.iter().enumerate() {
        let distance = squared_euclidean_distance(vector, centroid);
        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => best = Some((i, distance)),
        }
    }

    best.map(|(i, squared)| (i, squared.sqrt()))
}
