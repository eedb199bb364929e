//! Turns a finished clustering into [`Pattern`] records.

use super::rules::{FeatureProfile, LabelRules};
use super::{ANOMALY_PATTERN_ID, Pattern};
use crate::cluster::{KMeansResult, euclidean_distance};
use tracing::debug;

/// Default fraction of points reported as anomalies.
pub const DEFAULT_ANOMALY_FRACTION: f32 = 0.05;

/// Default number of representative examples per pattern.
pub const DEFAULT_MAX_EXAMPLES: usize = 5;

/// Which rule family names the clusters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Domain {
    /// Profiles are structural features; code rules apply
    Code,
    /// Profiles are term counts; feature names are the vocabulary
    Text,
}

/// Everything the labeler reads.
#[derive(Debug, Clone, Copy)]
pub struct LabelingInput<'a> {
    /// Normalized vectors the clustering ran on
    pub vectors: &'a [Vec<f32>],
    /// Raw (un-normalized) vectors, row-aligned with `vectors`
    pub raw: &'a [Vec<f32>],
    pub feature_names: &'a [String],
    pub clustering: &'a KMeansResult,
    pub domain: Domain,
}

/// Builds named patterns and the anomaly set from a clustering.
#[derive(Debug, Clone)]
pub struct PatternLabeler {
    rules: LabelRules,
    min_cluster_size: usize,
    anomaly_fraction: f32,
    max_examples: usize,
}

impl PatternLabeler {
    pub fn new(rules: LabelRules, min_cluster_size: usize) -> Self {
        Self {
            rules,
            min_cluster_size,
            anomaly_fraction: DEFAULT_ANOMALY_FRACTION,
            max_examples: DEFAULT_MAX_EXAMPLES,
        }
    }

    pub fn with_anomaly_fraction(mut self, fraction: f32) -> Self {
        self.anomaly_fraction = fraction;
        self
    }

    pub fn with_max_examples(mut self, max_examples: usize) -> Self {
        self.max_examples = max_examples;
        self
    }

    /// Label every cluster of at least `min_cluster_size` members, followed
    /// by the anomaly pattern. Indices refer to rows of `input.vectors`.
    pub fn label(&self, input: &LabelingInput<'_>) -> Vec<Pattern> {
        let clustering = input.clustering;
        let n = clustering.assignments.len();
        if n == 0 || input.vectors.len() != n || input.raw.len() != n {
            return Vec::new();
        }

        let distances = distances_to_centroids(input.vectors, clustering);
        let clusters = clustering.members();
        let retained: Vec<usize> = clusters
            .iter()
            .enumerate()
            .filter(|(_, members)| members.len() >= self.min_cluster_size.max(1))
            .map(|(cluster_id, _)| cluster_id)
            .collect();
        let mut patterns = Vec::new();

        for (cluster_id, members) in clusters.into_iter().enumerate() {
            if !retained.contains(&cluster_id) {
                if !members.is_empty() {
                    debug!(
                        "Dropping cluster {cluster_id} with {} members (minimum {})",
                        members.len(),
                        self.min_cluster_size
                    );
                }
                continue;
            }

            patterns.push(self.cluster_pattern(input, cluster_id, members, &distances));
        }

        let outlying = distances_to_retained(input.vectors, clustering, &retained);
        patterns.push(self.anomaly_pattern(input, &outlying));
        patterns
    }

    fn cluster_pattern(
        &self,
        input: &LabelingInput<'_>,
        cluster_id: usize,
        members: Vec<usize>,
        distances: &[f32],
    ) -> Pattern {
        let n = input.vectors.len();
        let size = members.len();
        let mean_distance = mean(members.iter().map(|&i| distances[i]));

        // Closest members first; ties keep index order
        let mut ranked = members.clone();
        ranked.sort_by(|&a, &b| distances[a].total_cmp(&distances[b]));
        ranked.truncate(self.max_examples);

        let profile_values = mean_vector(input.raw, &members);
        let profile = FeatureProfile::new(input.feature_names, &profile_values);
        let (name, category, description) = self.describe(input, &profile, &profile_values, size);

        Pattern {
            id: format!("cluster-{cluster_id}"),
            name,
            category,
            description,
            centroid: input.clustering.centroids[cluster_id].clone(),
            members,
            size,
            confidence: 1.0 / (1.0 + mean_distance),
            support: size as f32 / n as f32,
            examples: ranked,
        }
    }

    fn describe(
        &self,
        input: &LabelingInput<'_>,
        profile: &FeatureProfile<'_>,
        profile_values: &[f32],
        size: usize,
    ) -> (String, String, String) {
        match input.domain {
            Domain::Code => {
                let rule = self.rules.code_label(profile);
                let description = if rule.description.is_empty() {
                    format!("{size} members")
                } else {
                    format!("{} ({size} members)", rule.description)
                };
                (rule.name.clone(), rule.category.clone(), description)
            }
            Domain::Text => {
                let terms = top_terms(input.feature_names, profile_values, self.rules.top_terms);
                if terms.is_empty() {
                    return (
                        "Uncategorized issues".to_string(),
                        "general".to_string(),
                        format!("{size} documents without dominant terms"),
                    );
                }
                let joined = terms.join(", ");
                (
                    format!("Issues about {joined}"),
                    self.rules.text_category(&terms).to_string(),
                    format!("{size} documents dominated by {joined}"),
                )
            }
        }
    }

    /// The points farthest from the retained clusters, most distant first.
    fn anomaly_pattern(&self, input: &LabelingInput<'_>, distances: &[f32]) -> Pattern {
        let n = distances.len();
        let count = ((n as f32 * self.anomaly_fraction).ceil() as usize).clamp(1, n);

        let mut ranked: Vec<usize> = (0..n).collect();
        ranked.sort_by(|&a, &b| distances[b].total_cmp(&distances[a]));
        ranked.truncate(count);

        let mean_distance = mean(ranked.iter().map(|&i| distances[i]));
        let mut examples = ranked.clone();
        examples.truncate(self.max_examples);

        Pattern {
            id: ANOMALY_PATTERN_ID.to_string(),
            name: "Anomalies".to_string(),
            category: "anomaly".to_string(),
            description: format!(
                "{count} points farthest from any retained cluster (mean distance {mean_distance:.3})"
            ),
            centroid: mean_vector(input.vectors, &ranked),
            size: ranked.len(),
            members: ranked,
            confidence: 1.0 / (1.0 + mean_distance),
            support: count as f32 / n as f32,
            examples,
        }
    }
}

/// Distance from every vector to its assigned centroid.
pub fn distances_to_centroids(vectors: &[Vec<f32>], clustering: &KMeansResult) -> Vec<f32> {
    vectors
        .iter()
        .zip(clustering.assignments.iter())
        .map(|(vector, &cluster)| euclidean_distance(vector, &clustering.centroids[cluster]))
        .collect()
}

/// Distance from every vector to the nearest centroid among `retained`.
///
/// Members of dropped clusters are measured against the clusters that were
/// kept, so a lone outlier in its own cluster still stands out. Falls back
/// to the assigned centroid when no cluster was retained.
pub fn distances_to_retained(
    vectors: &[Vec<f32>],
    clustering: &KMeansResult,
    retained: &[usize],
) -> Vec<f32> {
    if retained.is_empty() {
        return distances_to_centroids(vectors, clustering);
    }
    vectors
        .iter()
        .map(|vector| {
            retained
                .iter()
                .map(|&cluster| euclidean_distance(vector, &clustering.centroids[cluster]))
                .fold(f32::INFINITY, f32::min)
        })
        .collect()
}

fn mean(values: impl Iterator<Item = f32>) -> f32 {
    let (sum, count) = values.fold((0.0f32, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 { 0.0 } else { sum / count as f32 }
}

/// Coordinate-wise mean of the selected rows.
fn mean_vector(rows: &[Vec<f32>], selected: &[usize]) -> Vec<f32> {
    let Some(&first) = selected.first() else {
        return Vec::new();
    };
    let mut sum = vec![0.0f32; rows[first].len()];
    for &i in selected {
        for (s, &v) in sum.iter_mut().zip(rows[i].iter()) {
            *s += v;
        }
    }
    let count = selected.len() as f32;
    sum.iter_mut().for_each(|s| *s /= count);
    sum
}

/// Names of the `limit` largest positive profile values.
fn top_terms(names: &[String], values: &[f32], limit: usize) -> Vec<String> {
    let mut ranked: Vec<(usize, f32)> = values
        .iter()
        .copied()
        .enumerate()
        .filter(|&(_, v)| v > 0.0)
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    ranked
        .into_iter()
        .take(limit)
        .filter_map(|(i, _)| names.get(i).cloned())
        .collect()
}
