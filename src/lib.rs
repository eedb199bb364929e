//! Unsupervised pattern discovery over code structure and issue text.

pub mod cluster;
pub mod config;
pub mod documents;
pub mod error;
pub mod features;
pub mod normalize;
pub mod parsing;
pub mod patterns;
pub mod pipeline;
pub mod quality;

// Explicit exports for better API clarity
pub use cluster::{KMeansClusterer, KMeansResult, kmeans_clustering};
pub use config::Settings;
pub use error::{DiscoveryError, DiscoveryResult};
pub use features::{CodeNode, Document, Entity, FeatureExtractor, FeatureVector, NodeKind};
pub use normalize::{Normalization, NormalizeError, NormalizedVector, VectorNormalizer};
pub use patterns::{LabelRules, Pattern, PatternLabeler};
pub use pipeline::{DiscoveryReport, PatternLearner};
pub use quality::{ClusterQuality, evaluate, inertia, silhouette};
