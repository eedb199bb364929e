//! Interpretable pattern records built from clusters.
//!
//! Every cluster with at least `min_cluster_size` members becomes a
//! [`Pattern`] with a rule-derived name and category, a confidence score
//! (`1 / (1 + mean distance to centroid)`), its support (share of all points)
//! and up to five representative examples closest to the centroid. A final
//! pattern with id `"anomaly"` lists the points farthest from their own
//! centroid; those points also stay in their original cluster.

mod labeler;
mod rules;

pub use labeler::{
    DEFAULT_ANOMALY_FRACTION, DEFAULT_MAX_EXAMPLES, Domain, LabelingInput, PatternLabeler,
    distances_to_centroids, distances_to_retained,
};
pub use rules::{Comparison, Condition, FeatureProfile, KeywordCategory, LabelRule, LabelRules};

use serde::{Deserialize, Serialize};

/// Id of the pattern aggregating outliers.
pub const ANOMALY_PATTERN_ID: &str = "anomaly";

/// A discovered pattern. Created once per run and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    pub id: String,
    pub name: String,
    pub category: String,
    pub description: String,
    pub centroid: Vec<f32>,
    pub members: Vec<usize>,
    pub size: usize,
    /// In `(0, 1]`; higher means a tighter cluster
    pub confidence: f32,
    /// Fraction of all points in this pattern
    pub support: f32,
    pub examples: Vec<usize>,
}

impl Pattern {
    pub fn is_anomaly(&self) -> bool {
        self.id == ANOMALY_PATTERN_ID
    }

    /// Rewrites member and example indices through `mapping`.
    ///
    /// Used when vectors were built from a subset of the caller's entities;
    /// `mapping[row]` is the entity index of vector row `row`.
    pub fn remap(mut self, mapping: &[usize]) -> Self {
        let translate = |i: &mut usize| {
            if let Some(&original) = mapping.get(*i) {
                *i = original;
            }
        };
        self.members.iter_mut().for_each(translate);
        self.examples.iter_mut().for_each(translate);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remap_indices() {
        let pattern = Pattern {
            id: "cluster-0".to_string(),
            name: "Small helpers".to_string(),
            category: "size".to_string(),
            description: String::new(),
            centroid: vec![0.0],
            members: vec![0, 1, 2],
            size: 3,
            confidence: 1.0,
            support: 1.0,
            examples: vec![2],
        };

        let remapped = pattern.remap(&[4, 7, 9]);
        assert_eq!(remapped.members, vec![4, 7, 9]);
        assert_eq!(remapped.examples, vec![9]);
        assert!(!remapped.is_anomaly());
    }
}
