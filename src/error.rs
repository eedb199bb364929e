//! Error types for the pattern discovery system
//!
//! This module provides structured error types using thiserror for better
//! error handling and actionable error messages. Clustering itself never
//! fails; these cover the I/O and configuration edges around it.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for discovery runs
#[derive(Error, Debug)]
pub enum DiscoveryError {
    /// File system errors
    #[error("Failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write file '{path}': {source}")]
    FileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Document input errors
    #[error("Failed to parse documents from '{path}': {source}")]
    DocumentFormat {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Path '{path}' does not exist")]
    PathNotFound { path: PathBuf },

    /// Configuration errors
    #[error("Invalid configuration: {reason}")]
    ConfigError { reason: String },

    /// Report serialization errors
    #[error("Failed to serialize report: {0}")]
    Serialization(#[from] serde_json::Error),

    /// General errors for cases where we need to preserve existing behavior
    #[error("{0}")]
    General(String),
}

impl DiscoveryError {
    /// Get a stable status code for this error type.
    ///
    /// Returns a string identifier that can be used in JSON responses
    /// for programmatic error handling.
    pub fn status_code(&self) -> String {
        match self {
            Self::FileRead { .. } => "FILE_READ_ERROR",
            Self::FileWrite { .. } => "FILE_WRITE_ERROR",
            Self::DocumentFormat { .. } => "DOCUMENT_FORMAT_ERROR",
            Self::PathNotFound { .. } => "PATH_NOT_FOUND",
            Self::ConfigError { .. } => "CONFIG_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
            Self::General(_) => "GENERAL_ERROR",
        }
        .to_string()
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            Self::FileRead { .. } => vec![
                "Check that the file exists and you have read permissions",
                "Ensure the file is not locked by another process",
            ],
            Self::DocumentFormat { .. } => vec![
                "Documents must be a JSON array of objects with 'id', 'title' and 'body'",
                "Export issues with 'gh issue list --json number,title,body' and rename 'number' to 'id'",
            ],
            Self::PathNotFound { .. } => {
                vec!["Pass an existing file or directory to analyze"]
            }
            Self::ConfigError { .. } => vec![
                "Run 'pattern-learner config' to inspect the effective settings",
                "Run 'pattern-learner init --force' to regenerate the settings file",
            ],
            _ => vec![],
        }
    }
}

/// Result type alias for discovery operations
pub type DiscoveryResult<T> = Result<T, DiscoveryError>;
