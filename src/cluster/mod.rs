//! K-means clustering over feature vectors.
//!
//! Vectors are partitioned with Lloyd's algorithm after K-means++ seeding.
//! The same Euclidean metric is used for seeding, assignment, quality
//! scoring and anomaly ranking, so every stage agrees on what "close" means.
//!
//! Randomness only enters through seeding, and the random source is always
//! supplied by the caller. Two runs over the same input with identically
//! seeded RNGs produce identical assignments and centroids.

mod distance;
mod kmeans;

pub use distance::{euclidean_distance, nearest_centroid, squared_euclidean_distance};
pub use kmeans::{
    DEFAULT_MAX_ITERATIONS, KMeansClusterer, KMeansResult, assign_to_nearest_centroid,
    kmeans_clustering,
};
