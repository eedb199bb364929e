//! Python syntax-node extraction using tree-sitter
//!
//! Summarizes functions, methods and classes into [`CodeNode`] entities.
//! Decorated definitions are unwrapped; a docstring counts as documentation.

use crate::features::{CodeNode, NodeKind};
use crate::parsing::parser::{FlowKinds, line_count, line_span, measure_flow};
use crate::parsing::{CodeNodeParser, Language, ParseError, ParseResult};
use std::path::Path;
use tree_sitter::{Node, Parser};

const PYTHON_FLOW: FlowKinds = FlowKinds {
    branches: &[
        "if_statement",
        "elif_clause",
        "for_statement",
        "while_statement",
        "except_clause",
        "conditional_expression",
        "boolean_operator",
        "case_clause",
    ],
    nesting: &[
        "if_statement",
        "for_statement",
        "while_statement",
        "try_statement",
        "with_statement",
        "match_statement",
    ],
    boundaries: &["function_definition", "class_definition"],
};

/// Parameter kinds that are syntax, not parameters
const PARAMETER_SEPARATORS: &[&str] = &["keyword_separator", "positional_separator"];

pub struct PythonNodeParser {
    parser: Parser,
}

impl std::fmt::Debug for PythonNodeParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PythonNodeParser")
            .field("language", &"Python")
            .finish()
    }
}

impl PythonNodeParser {
    /// Create a new Python parser instance
    pub fn new() -> ParseResult<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .map_err(|e| ParseError::ParserInit {
                language: Language::Python.to_string(),
                reason: format!("tree-sitter error: {e}"),
            })?;

        Ok(Self { parser })
    }
}

impl CodeNodeParser for PythonNodeParser {
    fn language(&self) -> Language {
        Language::Python
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

fn visit(node: Node, code: &str, path: &Path, in_class: bool, out: &mut Vec<CodeNode>) {
    for child in node.children(&mut node.walk()) {
        match child.kind() {
            "function_definition" => {
                if !child.has_error() {
                    if let Some(summary) = summarize_function(child, code, path, in_class) {
                        out.push(summary);
                    }
                }
                visit(child, code, path, false, out);
            }
            "class_definition" => {
                if !child.has_error() {
                    if let Some(summary) = summarize_class(child, code, path) {
                        out.push(summary);
                    }
                }
                visit(child, code, path, true, out);
            }
            _ => visit(child, code, path, in_class, out),
        }
    }
}

fn node_text<'a>(node: Node, code: &'a str) -> &'a str {
    &code[node.byte_range()]
}

fn summarize_function(node: Node, code: &str, path: &Path, in_class: bool) -> Option<CodeNode> {
    let name = node_text(node.child_by_field_name("name")?, code).to_string();

    let parameter_count = node
        .child_by_field_name("parameters")
        .map(|params| {
            params
                .named_children(&mut params.walk())
                .filter(|p| !PARAMETER_SEPARATORS.contains(&p.kind()))
                .enumerate()
                .filter(|(i, p)| {
                    // Receiver of a method
                    !(in_class
                        && *i == 0
                        && p.kind() == "identifier"
                        && matches!(node_text(*p, code), "self" | "cls"))
                })
                .count() as u32
        })
        .unwrap_or(0);

    let is_async = node
        .children(&mut node.walk())
        .any(|c| c.kind() == "async");

    let body = node.child_by_field_name("body");
    let (branch_count, nesting_depth) = body
        .map(|body| measure_flow(body, &PYTHON_FLOW))
        .unwrap_or((0, 0));

    let (line_start, line_end) = line_span(node);
    Some(CodeNode {
        kind: if in_class {
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
        has_doc: body.is_some_and(has_docstring),
        is_async,
        child_count: 0,
        child_lines: 0,
    })
}

fn summarize_class(node: Node, code: &str, path: &Path) -> Option<CodeNode> {
    let name = node_text(node.child_by_field_name("name")?, code).to_string();
    let body = node.child_by_field_name("body");

    let mut child_count = 0;
    let mut child_lines = 0;
    if let Some(body) = body {
        for statement in body.named_children(&mut body.walk()) {
            let definition = if statement.kind() == "decorated_definition" {
                statement.child_by_field_name("definition")
            } else {
                Some(statement)
            };
            if definition.is_some_and(|d| d.kind() == "function_definition") {
                child_count += 1;
                child_lines += line_count(statement);
            }
        }
    }

    let (line_start, line_end) = line_span(node);
    Some(CodeNode {
        kind: NodeKind::Class,
        name,
        file_path: path.to_path_buf(),
        line_start,
        line_end,
        parameter_count: 0,
        nesting_depth: 0,
        branch_count: 0,
        has_doc: body.is_some_and(has_docstring),
        is_async: false,
        child_count,
        child_lines,
    })
}

/// First statement of the body is a bare string literal
fn has_docstring(body: Node) -> bool {
    body.named_child(0)
        .filter(|first| first.kind() == "expression_statement")
        .and_then(|first| first.named_child(0))
        .is_some_and(|expr| expr.kind() == "string")
}
