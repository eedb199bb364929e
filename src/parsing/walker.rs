//! File system walker for discovering source files to analyze
//!
//! This module provides directory traversal with support for:
//! - .gitignore rules
//! - Custom ignore patterns from configuration and `.patternignore` files
//! - Language filtering
//! - Hidden file handling
//!
//! Discovered files are parsed in parallel, each worker holding its own
//! tree-sitter parsers.

use crate::config::DiscoveryConfig;
use crate::error::{DiscoveryError, DiscoveryResult};
use crate::features::CodeNode;
use crate::parsing::{CodeNodeParser, Language, create_parser};
use ignore::WalkBuilder;
use ignore::overrides::OverrideBuilder;
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Name of the per-directory ignore file honored next to `.gitignore`
pub const IGNORE_FILE_NAME: &str = ".patternignore";

/// Walks directories to find source files to analyze
#[derive(Debug)]
pub struct FileWalker {
    languages: Vec<Language>,
    ignore_patterns: Vec<String>,
}

impl FileWalker {
    /// Create a new file walker from discovery settings.
    ///
    /// Unknown language keys are logged and ignored.
    pub fn new(config: &DiscoveryConfig) -> Self {
        let languages = config
            .languages
            .iter()
            .filter_map(|key| {
                let language = Language::from_config_key(key);
                if language.is_none() {
                    tracing::warn!(language = %key, "unsupported language in configuration");
                }
                language
            })
            .collect();

        Self {
            languages,
            ignore_patterns: config.ignore_patterns.clone(),
        }
    }

    /// Walk a directory and return an iterator of files to analyze
    pub fn walk(&self, root: &Path) -> DiscoveryResult<impl Iterator<Item = PathBuf> + '_> {
        let mut builder = WalkBuilder::new(root);

        builder
            .hidden(false)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .follow_links(false)
            .require_git(false);

        builder.add_custom_ignore_filename(IGNORE_FILE_NAME);

        if !self.ignore_patterns.is_empty() {
            // Overrides whitelist by default; a leading '!' turns a glob into an exclusion
            let mut overrides = OverrideBuilder::new(root);
            for pattern in &self.ignore_patterns {
                overrides
                    .add(&format!("!{pattern}"))
                    .map_err(|e| DiscoveryError::ConfigError {
                        reason: format!("invalid ignore pattern '{pattern}': {e}"),
                    })?;
            }
            let overrides = overrides.build().map_err(|e| DiscoveryError::ConfigError {
                reason: format!("invalid ignore patterns: {e}"),
            })?;
            builder.overrides(overrides);
        }

        Ok(builder
            .build()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_some_and(|ft| ft.is_file()))
            .filter_map(move |entry| {
                let path = entry.path();

                if path
                    .file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| name.starts_with('.'))
                {
                    return None;
                }

                let language = Language::from_path(path)?;
                self.languages
                    .contains(&language)
                    .then(|| path.to_path_buf())
            }))
    }
}

/// Code nodes gathered from a source tree.
#[derive(Debug, Default)]
pub struct CodeCollection {
    pub nodes: Vec<CodeNode>,
    /// Files that were parsed
    pub files: usize,
    /// Files that could not be read or parsed
    pub skipped_files: usize,
}

/// Walk `root` and summarize every supported definition found.
///
/// Files are visited in sorted order so node order is stable across runs.
/// Unreadable or unparseable files are counted and skipped.
pub fn collect_code_nodes(root: &Path, config: &DiscoveryConfig) -> DiscoveryResult<CodeCollection> {
    if !root.exists() {
        return Err(DiscoveryError::PathNotFound {
            path: root.to_path_buf(),
        });
    }

    let walker = FileWalker::new(config);
    let mut files: Vec<PathBuf> = walker.walk(root)?.collect();
    files.sort();
    if let Some(max_files) = config.max_files {
        if files.len() > max_files {
            tracing::info!(found = files.len(), max_files, "limiting files to analyze");
            files.truncate(max_files);
        }
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.parallel_threads.max(1))
        .build()
        .map_err(|e| DiscoveryError::General(format!("Failed to build thread pool: {e}")))?;

    let parsed: Vec<Option<Vec<CodeNode>>> = pool.install(|| {
        files
            .par_iter()
            .map_init(HashMap::new, |parsers, path| parse_file(parsers, path))
            .collect()
    });

    let mut collection = CodeCollection::default();
    for result in parsed {
        match result {
            Some(nodes) => {
                collection.files += 1;
                collection.nodes.extend(nodes);
            }
            None => collection.skipped_files += 1,
        }
    }

    tracing::info!(
        files = collection.files,
        skipped = collection.skipped_files,
        nodes = collection.nodes.len(),
        "collected code nodes"
    );
    Ok(collection)
}

fn parse_file(
    parsers: &mut HashMap<Language, Box<dyn CodeNodeParser>>,
    path: &Path,
) -> Option<Vec<CodeNode>> {
    let language = Language::from_path(path)?;

    let code = match std::fs::read_to_string(path) {
        Ok(code) => code,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "skipping unreadable file");
            return None;
        }
    };

    let parser = match parsers.entry(language) {
        std::collections::hash_map::Entry::Occupied(entry) => entry.into_mut(),
        std::collections::hash_map::Entry::Vacant(entry) => match create_parser(language) {
            Ok(parser) => entry.insert(parser),
            Err(e) => {
                tracing::warn!(language = %language, error = %e, "parser unavailable");
                return None;
            }
        },
    };

    match parser.extract_nodes(&code, path) {
        Ok(nodes) => Some(nodes),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "skipping unparseable file");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn rust_only() -> DiscoveryConfig {
        DiscoveryConfig {
            languages: vec!["rust".to_string()],
            ..DiscoveryConfig::default()
        }
    }

    #[test]
    fn test_walk_directory() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::write(root.join("main.rs"), "fn main() {}").unwrap();
        fs::write(root.join("lib.rs"), "pub fn lib() {}").unwrap();
        fs::write(root.join("test.py"), "def test(): pass").unwrap();
        fs::write(root.join("README.md"), "# Test").unwrap();

        let walker = FileWalker::new(&rust_only());
        let files: Vec<_> = walker.walk(root).unwrap().collect();

        assert_eq!(files.len(), 2);
        assert!(files.iter().any(|p| p.ends_with("main.rs")));
        assert!(files.iter().any(|p| p.ends_with("lib.rs")));
    }

    #[test]
    fn test_ignore_patterns_and_files() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir_all(root.join("src")).unwrap();
        fs::create_dir_all(root.join("generated")).unwrap();
        fs::create_dir_all(root.join("vendor")).unwrap();
        fs::write(root.join("src/lib.rs"), "fn a() {}").unwrap();
        fs::write(root.join("generated/out.rs"), "fn b() {}").unwrap();
        fs::write(root.join("vendor/dep.rs"), "fn c() {}").unwrap();
        fs::write(root.join(".hidden.rs"), "fn d() {}").unwrap();
        fs::write(root.join(IGNORE_FILE_NAME), "vendor/\n").unwrap();

        let config = DiscoveryConfig {
            ignore_patterns: vec!["generated/**".to_string()],
            ..rust_only()
        };
        let files: Vec<_> = FileWalker::new(&config).walk(root).unwrap().collect();

        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("src/lib.rs"));
    }

    #[test]
    fn test_collect_code_nodes() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::write(root.join("a.rs"), "fn alpha(x: u8) {}\nstruct Beta;\n").unwrap();
        fs::write(root.join("b.py"), "def gamma(a, b):\n    return a\n").unwrap();
        fs::write(root.join("c.rs"), [0xff_u8, 0xfe, 0x00]).unwrap();

        let config = DiscoveryConfig {
            parallel_threads: 2,
            ..DiscoveryConfig::default()
        };
        let collection = collect_code_nodes(root, &config).unwrap();

        assert_eq!(collection.files, 2);
        assert_eq!(collection.skipped_files, 1);
        let names: Vec<_> = collection.nodes.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "Beta", "gamma"]);
    }

    #[test]
    fn test_max_files_and_missing_root() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        for name in ["a.rs", "b.rs", "c.rs"] {
            fs::write(root.join(name), "fn f() {}").unwrap();
        }

        let config = DiscoveryConfig {
            max_files: Some(2),
            ..rust_only()
        };
        let collection = collect_code_nodes(root, &config).unwrap();
        assert_eq!(collection.files, 2);

        let missing = collect_code_nodes(&root.join("nope"), &config);
        assert!(matches!(missing, Err(DiscoveryError::PathNotFound { .. })));
    }
}
