//! Loading issue documents from JSON exports.
//!
//! The input is a JSON array of `{ "id", "title", "body", "labels"? }`
//! objects. Ids may be strings or issue numbers.

use crate::error::{DiscoveryError, DiscoveryResult};
use crate::features::Document;
use std::path::Path;

/// Read documents from a JSON file.
pub fn load_documents(path: impl AsRef<Path>) -> DiscoveryResult<Vec<Document>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(DiscoveryError::PathNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|source| DiscoveryError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let documents: Vec<Document> =
        serde_json::from_str(&content).map_err(|source| DiscoveryError::DocumentFormat {
            path: path.to_path_buf(),
            source,
        })?;

    tracing::debug!(
        path = %path.display(),
        count = documents.len(),
        "loaded documents"
    );
    Ok(documents)
}
