//! Configuration module for the pattern discovery system.
//!
//! This module provides a layered configuration system that supports:
//! - Default values
//! - TOML configuration file
//! - Environment variable overrides
//! - CLI argument overrides
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `PL_` and use double underscores
//! to separate nested levels:
//! - `PL_CLUSTERING__K=6` sets `clustering.k`
//! - `PL_CLUSTERING__MIN_CLUSTER_SIZE=3` sets `clustering.min_cluster_size`
//! - `PL_TEXT__MIN_TERM_LENGTH=4` sets `text.min_term_length`

use crate::normalize::Normalization;
use crate::patterns::LabelRules;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory holding the settings file.
pub const CONFIG_DIR: &str = ".pattern-learner";

/// Settings file name inside [`CONFIG_DIR`].
pub const CONFIG_FILE: &str = "settings.toml";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Settings {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: u32,

    /// Global debug mode
    #[serde(default = "default_false")]
    pub debug: bool,

    /// Clustering parameters
    #[serde(default)]
    pub clustering: ClusteringConfig,

    /// Tokenization and vocabulary settings for documents
    #[serde(default)]
    pub text: TextConfig,

    /// Source discovery settings
    #[serde(default)]
    pub discovery: DiscoveryConfig,

    /// Pattern naming rule tables
    #[serde(default)]
    pub labeling: LabelRules,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ClusteringConfig {
    /// Fixed cluster count; chosen by silhouette when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub k: Option<usize>,

    /// Largest k tried during automatic selection
    #[serde(default = "default_max_k")]
    pub max_k: usize,

    /// Iteration cap for Lloyd's algorithm
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    /// Clusters smaller than this are treated as noise
    #[serde(default = "default_min_cluster_size")]
    pub min_cluster_size: usize,

    /// Seed for K-means++ initialization; random when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// Fraction of points reported as anomalies
    #[serde(default = "default_anomaly_fraction")]
    pub anomaly_fraction: f32,

    /// Representative examples kept per pattern
    #[serde(default = "default_max_examples")]
    pub max_examples: usize,

    /// Normalization applied to code features
    #[serde(default = "default_code_normalization")]
    pub code_normalization: Normalization,

    /// Normalization applied to document term counts
    #[serde(default = "default_text_normalization")]
    pub text_normalization: Normalization,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct TextConfig {
    /// Shorter tokens are dropped
    #[serde(default = "default_min_term_length")]
    pub min_term_length: usize,

    /// Terms must appear in at least this many documents
    #[serde(default = "default_min_document_frequency")]
    pub min_document_frequency: usize,

    /// Vocabulary size cap
    #[serde(default = "default_max_vocabulary")]
    pub max_vocabulary: usize,

    /// Tokens never counted as terms
    #[serde(default = "default_stopwords")]
    pub stopwords: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct DiscoveryConfig {
    /// Number of parallel threads for parsing source files
    #[serde(default = "default_parallel_threads")]
    pub parallel_threads: usize,

    /// Patterns to ignore while walking source trees
    #[serde(default)]
    pub ignore_patterns: Vec<String>,

    /// Languages to parse ("rust", "python")
    #[serde(default = "default_languages")]
    pub languages: Vec<String>,

    /// Stop after this many files
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_files: Option<usize>,
}

// Default value functions
fn default_version() -> u32 {
    1
}
fn default_false() -> bool {
    false
}
fn default_max_k() -> usize {
    8
}
fn default_max_iterations() -> usize {
    crate::cluster::DEFAULT_MAX_ITERATIONS
}
fn default_min_cluster_size() -> usize {
    2
}
fn default_anomaly_fraction() -> f32 {
    crate::patterns::DEFAULT_ANOMALY_FRACTION
}
fn default_max_examples() -> usize {
    crate::patterns::DEFAULT_MAX_EXAMPLES
}
fn default_code_normalization() -> Normalization {
    Normalization::MinMax
}
fn default_text_normalization() -> Normalization {
    Normalization::TfIdf
}
fn default_min_term_length() -> usize {
    3
}
fn default_min_document_frequency() -> usize {
    1
}
fn default_max_vocabulary() -> usize {
    500
}
fn default_stopwords() -> Vec<String> {
    [
        "the", "and", "for", "with", "this", "that", "from", "are", "was", "were", "but", "not",
        "have", "has", "had", "when", "what", "which", "will", "would", "should", "could", "can",
        "into", "than", "then", "there", "their", "they", "our", "you", "your", "its", "also",
        "been", "being", "does", "did", "doing", "any", "all", "some", "more", "most", "very",
        "just", "only", "about", "after", "before", "while", "where", "how", "why", "who",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
fn default_parallel_threads() -> usize {
    num_cpus::get()
}
fn default_languages() -> Vec<String> {
    vec!["rust".to_string(), "python".to_string()]
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            debug: false,
            clustering: ClusteringConfig::default(),
            text: TextConfig::default(),
            discovery: DiscoveryConfig::default(),
            labeling: LabelRules::default(),
        }
    }
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            k: None,
            max_k: default_max_k(),
            max_iterations: default_max_iterations(),
            min_cluster_size: default_min_cluster_size(),
            seed: None,
            anomaly_fraction: default_anomaly_fraction(),
            max_examples: default_max_examples(),
            code_normalization: default_code_normalization(),
            text_normalization: default_text_normalization(),
        }
    }
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            min_term_length: default_min_term_length(),
            min_document_frequency: default_min_document_frequency(),
            max_vocabulary: default_max_vocabulary(),
            stopwords: default_stopwords(),
        }
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            parallel_threads: default_parallel_threads(),
            ignore_patterns: vec![
                "target/**".to_string(),
                "node_modules/**".to_string(),
                ".git/**".to_string(),
                "*.generated.*".to_string(),
            ],
            languages: default_languages(),
            max_files: None,
        }
    }
}

impl Settings {
    /// Load configuration from all sources
    pub fn load() -> Result<Self, Box<figment::Error>> {
        // Try to find the workspace root by looking for the config directory
        let config_path = Self::find_workspace_config()
            .unwrap_or_else(|| PathBuf::from(CONFIG_DIR).join(CONFIG_FILE));

        Self::load_from(config_path)
    }

    /// Load configuration from a specific file
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, Box<figment::Error>> {
        Self::figment(path.as_ref()).extract().map_err(Box::new)
    }

    /// Defaults, then the TOML file if it exists, then `PL_` variables.
    fn figment(path: &Path) -> Figment {
        Figment::new()
            // Start with defaults
            .merge(Serialized::defaults(Settings::default()))
            // Layer in config file if it exists
            .merge(Toml::file(path))
            // Double underscore (__) separates nested levels
            .merge(Env::prefixed("PL_").map(|key| {
                key.as_str()
                    .to_lowercase()
                    .replace("__", ".")
                    .into()
            }))
    }

    /// Find the settings file by looking for the config directory
    /// Searches from current directory up to root
    fn find_workspace_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;

        for ancestor in current.ancestors() {
            let config_dir = ancestor.join(CONFIG_DIR);
            if config_dir.is_dir() {
                return Some(config_dir.join(CONFIG_FILE));
            }
        }

        None
    }

    /// Save current configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Box<dyn std::error::Error>> {
        let parent = path.as_ref().parent().ok_or("Invalid path")?;
        std::fs::create_dir_all(parent)?;

        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;

        Ok(())
    }

    /// Render the effective settings as TOML
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Create a default settings file with helpful comments
    pub fn init_config_file(
        root: impl AsRef<Path>,
        force: bool,
    ) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let config_path = root.as_ref().join(CONFIG_DIR).join(CONFIG_FILE);

        if !force && config_path.exists() {
            return Err("Configuration file already exists. Use --force to overwrite".into());
        }

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let template = format!(
            r#"# pattern-learner configuration

# Version of the configuration schema
version = 1

# Global debug mode
debug = false

[clustering]
# Fixed number of clusters. When unset, k is chosen by silhouette score
# between 2 and max_k.
# k = 6
max_k = 8

# Iteration cap for Lloyd's algorithm
max_iterations = 100

# Clusters with fewer members are dropped as noise
min_cluster_size = 2

# Seed for K-means++ initialization (omit for a random seed)
# seed = 42

# Fraction of points reported in the "anomaly" pattern
anomaly_fraction = 0.05

# Representative examples kept per pattern
max_examples = 5

# "min_max" or "tf_idf"
code_normalization = "min_max"
text_normalization = "tf_idf"

[text]
min_term_length = 3
min_document_frequency = 1
max_vocabulary = 500

[discovery]
# Number of parallel threads for parsing (defaults to CPU count)
# parallel_threads = {}

ignore_patterns = ["target/**", "node_modules/**", ".git/**", "*.generated.*"]

# Currently supported: rust, python
languages = ["rust", "python"]

# Label rule tables ([labeling]) use built-in defaults unless overridden here.
"#,
            num_cpus::get()
        );

        std::fs::write(&config_path, template)?;

        Ok(config_path)
    }
}
