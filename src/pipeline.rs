//! One-shot discovery runs.
//!
//! [`PatternLearner`] wires feature extraction, normalization, k selection,
//! clustering, quality evaluation and labeling together. Each call is
//! independent: nothing fitted in one run is reused by the next.

use crate::cluster::KMeansClusterer;
use crate::config::Settings;
use crate::features::{CodeNode, Document, Entity, FeatureExtractor, FeatureVector};
use crate::normalize::Normalization;
use crate::patterns::{Domain, LabelingInput, Pattern, PatternLabeler};
use crate::quality::{ClusterQuality, default_k, evaluate, select_k};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Result of one discovery run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryReport {
    /// Cluster patterns followed by the anomaly pattern
    pub patterns: Vec<Pattern>,
    pub quality: ClusterQuality,
    /// Entities handed to the run
    pub entity_count: usize,
    /// Entities dropped during feature extraction
    pub skipped: usize,
    /// Cluster count actually used, 0 when nothing was clustered
    pub k: usize,
}

impl DiscoveryReport {
    fn empty(entity_count: usize, skipped: usize) -> Self {
        Self {
            entity_count,
            skipped,
            ..Self::default()
        }
    }

    /// Patterns backed by a cluster, without the anomaly pattern.
    pub fn cluster_patterns(&self) -> impl Iterator<Item = &Pattern> {
        self.patterns.iter().filter(|p| !p.is_anomaly())
    }

    pub fn anomaly(&self) -> Option<&Pattern> {
        self.patterns.iter().find(|p| p.is_anomaly())
    }
}

/// Runs pattern discovery with one set of settings.
#[derive(Debug, Clone)]
pub struct PatternLearner {
    settings: Settings,
}

impl PatternLearner {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Discover structural patterns among syntax nodes.
    pub fn discover_code<R: Rng + ?Sized>(&self, nodes: &[CodeNode], rng: &mut R) -> DiscoveryReport {
        let entities: Vec<Entity> = nodes.iter().cloned().map(Entity::CodeNode).collect();
        let extractor = FeatureExtractor::for_code();
        self.discover(
            &extractor,
            &entities,
            self.settings.clustering.code_normalization,
            Domain::Code,
            rng,
        )
    }

    /// Discover topical patterns among documents.
    pub fn discover_documents<R: Rng + ?Sized>(
        &self,
        documents: &[Document],
        rng: &mut R,
    ) -> DiscoveryReport {
        let entities: Vec<Entity> = documents.iter().cloned().map(Entity::Document).collect();
        let extractor = FeatureExtractor::for_documents(documents, &self.settings.text);
        self.discover(
            &extractor,
            &entities,
            self.settings.clustering.text_normalization,
            Domain::Text,
            rng,
        )
    }

    fn discover<R: Rng + ?Sized>(
        &self,
        extractor: &FeatureExtractor,
        entities: &[Entity],
        normalization: Normalization,
        domain: Domain,
        rng: &mut R,
    ) -> DiscoveryReport {
        let config = &self.settings.clustering;

        let (mapping, raw): (Vec<usize>, Vec<FeatureVector>) =
            extractor.extract_batch(entities).into_iter().unzip();
        let skipped = entities.len() - raw.len();
        if raw.is_empty() {
            info!("No entities to cluster ({skipped} skipped)");
            return DiscoveryReport::empty(entities.len(), skipped);
        }

        let vectors = match normalization.fit_transform(&raw) {
            Ok(vectors) => vectors,
            Err(e) => {
                warn!("Normalization ({normalization}) failed: {e}");
                return DiscoveryReport::empty(entities.len(), skipped);
            }
        };

        let k = self.choose_k(&vectors, rng);
        let clustering = KMeansClusterer::new(k)
            .with_max_iterations(config.max_iterations)
            .cluster(&vectors, rng);
        if clustering.is_empty() {
            return DiscoveryReport::empty(entities.len(), skipped);
        }
        debug!(
            "Clustered {} vectors into {k} clusters in {} iterations (converged: {})",
            vectors.len(),
            clustering.iterations,
            clustering.converged
        );

        let quality = evaluate(&vectors, &clustering.assignments, &clustering.centroids);
        let feature_names = extractor.feature_names();
        let labeler = PatternLabeler::new(self.settings.labeling.clone(), config.min_cluster_size)
            .with_anomaly_fraction(config.anomaly_fraction)
            .with_max_examples(config.max_examples);
        let patterns: Vec<Pattern> = labeler
            .label(&LabelingInput {
                vectors: &vectors,
                raw: &raw,
                feature_names: &feature_names,
                clustering: &clustering,
                domain,
            })
            .into_iter()
            .map(|pattern| pattern.remap(&mapping))
            .collect();

        info!(
            "Discovered {} patterns (k = {k}, silhouette {:.3}, inertia {:.3})",
            patterns.len(),
            quality.silhouette,
            quality.inertia
        );

        DiscoveryReport {
            patterns,
            quality,
            entity_count: entities.len(),
            skipped,
            k,
        }
    }

    /// Configured k, or the best silhouette over `2..=max_k`, clamped to the
    /// number of vectors.
    fn choose_k<R: Rng + ?Sized>(&self, vectors: &[Vec<f32>], rng: &mut R) -> usize {
        let config = &self.settings.clustering;
        let n = vectors.len();
        let k = match config.k {
            Some(k) => k,
            None => select_k(vectors, config.max_k, config.max_iterations, rng)
                .unwrap_or_else(|| default_k(n)),
        };
        k.min(n)
    }
}
