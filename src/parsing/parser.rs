//! Syntax-node parser trait
//!
//! This module defines the common interface that language front ends
//! implement to turn source text into [`CodeNode`] entities, plus the
//! control-flow measuring shared by all of them.

use super::Language;
use crate::features::CodeNode;
use std::path::Path;
use thiserror::Error;
use tree_sitter::Node;

/// Errors specific to parsing operations
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Failed to initialize {language} parser: {reason}")]
    ParserInit { language: String, reason: String },

    #[error("Failed to parse '{path}'")]
    Unparseable { path: String },
}

/// Result type alias for parse operations
pub type ParseResult<T> = Result<T, ParseError>;

/// Common interface for all syntax-node front ends
pub trait CodeNodeParser: Send {
    fn language(&self) -> Language;

    /// Parse source code and summarize its definitions.
    ///
    /// Definitions that contain syntax errors are left out.
    fn extract_nodes(&mut self, code: &str, path: &Path) -> ParseResult<Vec<CodeNode>>;
}

/// Create the front end for `language`
pub fn create_parser(language: Language) -> ParseResult<Box<dyn CodeNodeParser>> {
    Ok(match language {
        Language::Rust => Box::new(super::RustNodeParser::new()?),
        Language::Python => Box::new(super::PythonNodeParser::new()?),
    })
}

/// Node kinds that shape control flow for one grammar.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FlowKinds {
    /// Each occurrence adds a branch point
    pub branches: &'static [&'static str],
    /// Each occurrence adds one nesting level for its descendants
    pub nesting: &'static [&'static str],
    /// Nested definitions measured on their own
    pub boundaries: &'static [&'static str],
}

/// Branch count and deepest nesting below `node`.
///
/// Walks with an explicit stack so deeply nested input cannot exhaust the
/// thread stack.
pub(crate) fn measure_flow(node: Node, kinds: &FlowKinds) -> (u32, u32) {
    let mut branches = 0;
    let mut max_depth = 0;
    let mut stack = vec![(node, 0u32)];

    while let Some((current, depth)) = stack.pop() {
        let mut cursor = current.walk();
        for child in current.children(&mut cursor) {
            let kind = child.kind();
            if kinds.boundaries.contains(&kind) {
                continue;
            }
            if kinds.branches.contains(&kind) {
                branches += 1;
            }

            let child_depth = if kinds.nesting.contains(&kind) {
                depth + 1
            } else {
                depth
            };
            max_depth = max_depth.max(child_depth);
            stack.push((child, child_depth));
        }
    }

    (branches, max_depth)
}

/// 1-based inclusive line span of a node
pub(crate) fn line_span(node: Node) -> (u32, u32) {
    (
        node.start_position().row as u32 + 1,
        node.end_position().row as u32 + 1,
    )
}

/// Number of lines a node spans
pub(crate) fn line_count(node: Node) -> u32 {
    let (start, end) = line_span(node);
    end - start + 1
}
