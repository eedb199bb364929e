//! Rust syntax-node extraction using tree-sitter
//!
//! Summarizes functions, methods, structs, enums, traits and impl blocks
//! into [`CodeNode`] entities.

use crate::features::{CodeNode, NodeKind};
use crate::parsing::parser::{FlowKinds, line_count, line_span, measure_flow};
use crate::parsing::{CodeNodeParser, Language, ParseError, ParseResult};
use std::path::Path;
use tree_sitter::{Node, Parser};

const RUST_FLOW: FlowKinds = FlowKinds {
    branches: &[
        "if_expression",
        "match_arm",
        "while_expression",
        "for_expression",
        "loop_expression",
        "&&",
        "||",
    ],
    nesting: &[
        "if_expression",
        "match_expression",
        "while_expression",
        "for_expression",
        "loop_expression",
        "closure_expression",
    ],
    boundaries: &[
        "function_item",
        "struct_item",
        "enum_item",
        "trait_item",
        "impl_item",
        "mod_item",
    ],
};

pub struct RustNodeParser {
    parser: Parser,
}

impl std::fmt::Debug for RustNodeParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RustNodeParser")
            .field("language", &"Rust")
            .finish()
    }
}

impl RustNodeParser {
    pub fn new() -> ParseResult<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_rust::LANGUAGE.into())
            .map_err(|e| ParseError::ParserInit {
                language: Language::Rust.to_string(),
                reason: format!("tree-sitter error: {e}"),
            })?;

        Ok(Self { parser })
    }
}

impl CodeNodeParser for RustNodeParser {
    fn language(&self) -> Language {
        Language::Rust
    }

    fn extract_nodes(&mut self, code: &str, path: &Path) -> ParseResult<Vec<CodeNode>> {
        let tree = self
            .parser
            .parse(code, None)
            .ok_or_else(|| ParseError::Unparseable {
                path: path.display().to_string(),
            })?;

        let mut nodes = Vec::new();
        visit(tree.root_node(), code, path, false, &mut nodes);
        Ok(nodes)
    }
}

fn visit(node: Node, code: &str, path: &Path, in_impl: bool, out: &mut Vec<CodeNode>) {
    for child in node.children(&mut node.walk()) {
        match child.kind() {
            "function_item" | "function_signature_item" => {
                if !child.has_error() {
                    if let Some(summary) = summarize_function(child, code, path, in_impl) {
                        out.push(summary);
                    }
                }
                // Nested items inside a body are free functions again
                visit(child, code, path, false, out);
            }
            "impl_item" | "trait_item" => {
                if !child.has_error() {
                    if let Some(summary) = summarize_container(child, code, path) {
                        out.push(summary);
                    }
                }
                visit(child, code, path, true, out);
            }
            "struct_item" | "enum_item" => {
                if !child.has_error() {
                    if let Some(summary) = summarize_container(child, code, path) {
                        out.push(summary);
                    }
                }
            }
            _ => visit(child, code, path, in_impl, out),
        }
    }
}

fn node_text<'a>(node: Node, code: &'a str) -> &'a str {
    &code[node.byte_range()]
}

fn summarize_function(node: Node, code: &str, path: &Path, in_impl: bool) -> Option<CodeNode> {
    let name = node_text(node.child_by_field_name("name")?, code).to_string();

    let parameter_count = node
        .child_by_field_name("parameters")
        .map(|params| {
            params
                .named_children(&mut params.walk())
                .filter(|p| matches!(p.kind(), "parameter" | "variadic_parameter"))
                .count() as u32
        })
        .unwrap_or(0);

    let is_async = node
        .children(&mut node.walk())
        .filter(|c| c.kind() == "function_modifiers")
        .any(|m| m.children(&mut m.walk()).any(|t| t.kind() == "async"));

    let (branch_count, nesting_depth) = node
        .child_by_field_name("body")
        .map(|body| measure_flow(body, &RUST_FLOW))
        .unwrap_or((0, 0));

    let (line_start, line_end) = line_span(node);
    Some(CodeNode {
        kind: if in_impl {
            NodeKind::Method
        } else {
            NodeKind::Function
        },
        name,
        file_path: path.to_path_buf(),
        line_start,
        line_end,
        parameter_count,
        nesting_depth,
        branch_count,
        has_doc: has_doc_comment(node, code),
        is_async,
        child_count: 0,
        child_lines: 0,
    })
}

/// Structs, enums, traits and impl blocks. Children are the fields,
/// variants or associated items in the body.
fn summarize_container(node: Node, code: &str, path: &Path) -> Option<CodeNode> {
    let (kind, name_field) = match node.kind() {
        "struct_item" => (NodeKind::Struct, "name"),
        "enum_item" => (NodeKind::Enum, "name"),
        "trait_item" => (NodeKind::Trait, "name"),
        "impl_item" => (NodeKind::Impl, "type"),
        _ => return None,
    };
    let name = node_text(node.child_by_field_name(name_field)?, code).to_string();

    let mut child_count = 0;
    let mut child_lines = 0;
    if let Some(body) = node.child_by_field_name("body") {
        for member in body.named_children(&mut body.walk()) {
            if is_member(member.kind()) {
                child_count += 1;
                child_lines += line_count(member);
            }
        }
    }

    let (line_start, line_end) = line_span(node);
    Some(CodeNode {
        kind,
        name,
        file_path: path.to_path_buf(),
        line_start,
        line_end,
        parameter_count: 0,
        nesting_depth: 0,
        branch_count: 0,
        has_doc: has_doc_comment(node, code),
        is_async: false,
        child_count,
        child_lines,
    })
}

fn is_member(kind: &str) -> bool {
    !matches!(
        kind,
        "attribute_item"
            | "inner_attribute_item"
            | "line_comment"
            | "block_comment"
            | "visibility_modifier"
            | "macro_invocation"
    )
}

/// Outer doc comments (`///` or `/** */`) directly above the item,
/// looking past attributes.
fn has_doc_comment(node: Node, code: &str) -> bool {
    let mut current = node.prev_sibling();
    while let Some(sibling) = current {
        match sibling.kind() {
            "attribute_item" => current = sibling.prev_sibling(),
            "line_comment" | "block_comment" => {
                let text = node_text(sibling, code);
                return (text.starts_with("///") && !text.starts_with("////"))
                    || (text.starts_with("/**") && !text.starts_with("/***"));
            }
            _ => return false,
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(code: &str) -> Vec<CodeNode> {
        let mut parser = RustNodeParser::new().unwrap();
        parser.extract_nodes(code, Path::new("lib.rs")).unwrap()
    }

    fn find<'a>(nodes: &'a [CodeNode], name: &str) -> &'a CodeNode {
        nodes.iter().find(|n| n.name == name).unwrap()
    }

    #[test]
    fn test_function_metrics() {
        let code = r#"
/// Adds things.
pub fn add(a: i32, b: i32, c: i32) -> i32 {
    if a > 0 {
        for i in 0..b {
            if i == c && a > 1 {
                return i;
            }
        }
    }
    a + b + c
}
"#;
        let nodes = parse(code);
        assert_eq!(nodes.len(), 1);
        let add = &nodes[0];
        assert_eq!(add.kind, NodeKind::Function);
        assert_eq!(add.parameter_count, 3);
        assert!(add.has_doc);
        assert!(!add.is_async);
        assert_eq!(add.nesting_depth, 3);
        // if, for, if, &&
        assert_eq!(add.branch_count, 4);
        assert_eq!(add.line_start, 3);
        assert_eq!(add.line_end, 12);
    }

    #[test]
    fn test_methods_and_containers() {
        let code = r#"
#[derive(Debug)]
/// A point.
struct Point {
    x: f32,
    y: f32,
}

impl Point {
    fn norm(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    async fn fetch(&mut self, scale: f32) {}
}

enum Shape { Circle, Square }
"#;
        let nodes = parse(code);

        let point = nodes
            .iter()
            .find(|n| n.name == "Point" && n.kind == NodeKind::Struct)
            .unwrap();
        assert_eq!(point.child_count, 2);
        assert!(point.has_doc);

        let imp = nodes.iter().find(|n| n.kind == NodeKind::Impl).unwrap();
        assert_eq!(imp.name, "Point");
        assert_eq!(imp.child_count, 2);

        let norm = find(&nodes, "norm");
        assert_eq!(norm.kind, NodeKind::Method);
        assert_eq!(norm.parameter_count, 0);

        let fetch = find(&nodes, "fetch");
        assert!(fetch.is_async);
        assert_eq!(fetch.parameter_count, 1);

        let shape = find(&nodes, "Shape");
        assert_eq!(shape.kind, NodeKind::Enum);
        assert_eq!(shape.child_count, 2);
    }

    #[test]
    fn test_doc_comment_detection() {
        let code = r#"
/// Documented.
#[inline]
fn documented() {}

// plain comment
fn plain() {}

fn bare() {}
"#;
        let nodes = parse(code);
        assert!(find(&nodes, "documented").has_doc);
        assert!(!find(&nodes, "plain").has_doc);
        assert!(!find(&nodes, "bare").has_doc);
    }

    #[test]
    fn test_broken_item_skipped() {
        let code = "fn ok() {}\nfn broken( {\n";
        let nodes = parse(code);
        assert!(nodes.iter().any(|n| n.name == "ok"));
        assert!(nodes.iter().all(|n| n.name != "broken"));
    }
}
