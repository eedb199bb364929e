//! Syntax-node entities and their numeric feature layout.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Number of features produced for a code node.
pub const CODE_FEATURE_DIMENSION: usize = 12;

/// Feature names, in vector order.
pub const CODE_FEATURE_NAMES: [&str; CODE_FEATURE_DIMENSION] = [
    "line_count",
    "parameter_count",
    "nesting_depth",
    "complexity",
    "has_doc",
    "name_length",
    "snake_case",
    "camel_case",
    "pascal_case",
    "is_async",
    "child_count",
    "avg_child_size",
];

/// Kind of syntax node an entity was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Function,
    Method,
    Class,
    Struct,
    Enum,
    Trait,
    Impl,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Function => "function",
            Self::Method => "method",
            Self::Class => "class",
            Self::Struct => "struct",
            Self::Enum => "enum",
            Self::Trait => "trait",
            Self::Impl => "impl",
        }
    }
}

/// A parsed syntax node summarized for clustering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeNode {
    pub kind: NodeKind,
    pub name: String,
    #[serde(default)]
    pub file_path: PathBuf,
    /// 1-based, inclusive
    pub line_start: u32,
    /// 1-based, inclusive
    pub line_end: u32,
    pub parameter_count: u32,
    /// Deepest control-flow nesting inside the node
    pub nesting_depth: u32,
    /// Branch points (if/loop/match arm/boolean operator/except...)
    pub branch_count: u32,
    pub has_doc: bool,
    pub is_async: bool,
    /// Methods or nested items directly owned by the node
    #[serde(default)]
    pub child_count: u32,
    /// Total lines spanned by those children
    #[serde(default)]
    pub child_lines: u32,
}

impl CodeNode {
    /// Lines spanned by the node, at least 1.
    pub fn line_count(&self) -> u32 {
        self.line_end.saturating_sub(self.line_start) + 1
    }

    /// Cyclomatic-style complexity: branch points plus one.
    pub fn complexity(&self) -> u32 {
        self.branch_count + 1
    }

    /// Mean child size in lines, 0 when there are no children.
    pub fn average_child_size(&self) -> f32 {
        if self.child_count == 0 {
            0.0
        } else {
            self.child_lines as f32 / self.child_count as f32
        }
    }

    pub fn naming_style(&self) -> NamingStyle {
        NamingStyle::detect(&self.name)
    }

    /// Feature vector in [`CODE_FEATURE_NAMES`] order.
    pub fn features(&self) -> Vec<f32> {
        let style = self.naming_style();
        vec![
            self.line_count() as f32,
            self.parameter_count as f32,
            self.nesting_depth as f32,
            self.complexity() as f32,
            flag(self.has_doc),
            self.name.chars().count() as f32,
            flag(style == NamingStyle::SnakeCase),
            flag(style == NamingStyle::CamelCase),
            flag(style == NamingStyle::PascalCase),
            flag(self.is_async),
            self.child_count as f32,
            self.average_child_size(),
        ]
    }
}

fn flag(value: bool) -> f32 {
    if value { 1.0 } else { 0.0 }
}

/// Identifier naming convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamingStyle {
    /// `lower_case` (a single lowercase word counts here)
    SnakeCase,
    /// `lowerCamel`
    CamelCase,
    /// `UpperCamel` (a single capitalized word counts here)
    PascalCase,
    /// `SCREAMING_CASE`
    ScreamingCase,
    Other,
}

impl NamingStyle {
    pub fn detect(name: &str) -> Self {
        let trimmed = name.trim_start_matches('_');
        let mut chars = trimmed.chars();
        let Some(first) = chars.next() else {
            return Self::Other;
        };
        if !trimmed.chars().all(|c| c.is_alphanumeric() || c == '_') {
            return Self::Other;
        }

        let has_upper = trimmed.chars().any(|c| c.is_uppercase());
        let has_lower = trimmed.chars().any(|c| c.is_lowercase());
        let has_underscore = trimmed.contains('_');

        if !has_upper {
            Self::SnakeCase
        } else if !has_lower {
            Self::ScreamingCase
        } else if has_underscore {
            Self::Other
        } else if first.is_uppercase() {
            Self::PascalCase
        } else {
            Self::CamelCase
        }
    }
}
