//! Feature extraction from raw entities.
//!
//! Entities come in two shapes, syntax nodes and free-text documents, and are
//! modelled as the [`Entity`] sum type. [`FeatureExtractor::extract`] turns
//! one entity into a fixed-length [`FeatureVector`] or `None` when the entity
//! cannot be represented. Extraction is best-effort per entity: a failure
//! only drops that entity from the batch.
//!
//! Document vectors are raw term counts over a [`Vocabulary`] fitted on the
//! whole batch, so a document extractor has to be built from the batch first
//! (see [`FeatureExtractor::for_documents`]).

mod code;
mod text;

pub use code::{CODE_FEATURE_DIMENSION, CODE_FEATURE_NAMES, CodeNode, NamingStyle, NodeKind};
pub use text::{Document, Vocabulary, tokenize};

use crate::config::TextConfig;
use tracing::debug;

/// Fixed-length numeric representation of one entity.
pub type FeatureVector = Vec<f32>;

/// A raw input entity.
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    CodeNode(CodeNode),
    Document(Document),
}

impl From<CodeNode> for Entity {
    fn from(node: CodeNode) -> Self {
        Self::CodeNode(node)
    }
}

impl From<Document> for Entity {
    fn from(document: Document) -> Self {
        Self::Document(document)
    }
}

/// Turns entities into feature vectors of one declared dimension.
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    vocabulary: Option<Vocabulary>,
    text: TextConfig,
}

impl FeatureExtractor {
    /// Extractor for syntax nodes.
    pub fn for_code() -> Self {
        Self {
            vocabulary: None,
            text: TextConfig::default(),
        }
    }

    /// Extractor for documents, with a vocabulary fitted on `documents`.
    pub fn for_documents(documents: &[Document], config: &TextConfig) -> Self {
        let tokenized: Vec<Vec<String>> = documents
            .iter()
            .map(|d| tokenize(&d.text(), config))
            .collect();
        let vocabulary = Vocabulary::fit(
            &tokenized,
            config.min_document_frequency,
            config.max_vocabulary,
        );
        debug!(
            "Fitted vocabulary of {} terms over {} documents",
            vocabulary.len(),
            documents.len()
        );

        Self {
            vocabulary: Some(vocabulary),
            text: config.clone(),
        }
    }

    /// Dimension of every vector this extractor produces.
    pub fn dimension(&self) -> usize {
        match &self.vocabulary {
            Some(vocabulary) => vocabulary.len(),
            None => CODE_FEATURE_DIMENSION,
        }
    }

    /// Names of the features, in vector order.
    pub fn feature_names(&self) -> Vec<String> {
        match &self.vocabulary {
            Some(vocabulary) => vocabulary.terms().to_vec(),
            None => CODE_FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn vocabulary(&self) -> Option<&Vocabulary> {
        self.vocabulary.as_ref()
    }

    /// Extract one entity.
    ///
    /// Returns `None` for entities this extractor cannot represent: a node
    /// handed to a document extractor (or the reverse), a document with no
    /// vocabulary terms, or any non-finite component.
    pub fn extract(&self, entity: &Entity) -> Option<FeatureVector> {
        let vector = match (entity, &self.vocabulary) {
            (Entity::CodeNode(node), None) => node.features(),
            (Entity::Document(document), Some(vocabulary)) => {
                let tokens = tokenize(&document.text(), &self.text);
                vocabulary.count_vector(&tokens)?
            }
            _ => return None,
        };

        (vector.len() == self.dimension() && vector.iter().all(|v| v.is_finite()))
            .then_some(vector)
    }

    /// Extract a batch, keeping the index of every entity that succeeded.
    pub fn extract_batch(&self, entities: &[Entity]) -> Vec<(usize, FeatureVector)> {
        let extracted: Vec<(usize, FeatureVector)> = entities
            .iter()
            .enumerate()
            .filter_map(|(i, entity)| self.extract(entity).map(|v| (i, v)))
            .collect();

        let skipped = entities.len() - extracted.len();
        if skipped > 0 {
            debug!("Skipped {skipped} of {} entities during extraction", entities.len());
        }
        extracted
    }
}
