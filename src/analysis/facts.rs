//! Fact structures extracted from AST analysis.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Source location span with byte offsets and line/column positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    /// Start byte offset (0-indexed).
    pub start_byte: usize,
    /// End byte offset (0-indexed, exclusive).
    pub end_byte: usize,
    /// Start line (1-indexed).
    pub start_line: usize,
    /// Start column (1-indexed).
    pub start_col: usize,
    /// End line (1-indexed).
    pub end_line: usize,
    /// End column (1-indexed).
    pub end_col: usize,
}

impl Span {
    /// Create a span from a tree-sitter node.
    pub fn from_node(node: tree_sitter::Node) -> Self {
        let start = node.start_position();
        let end = node.end_position();
        Self {
            start_byte: node.start_byte(),
            end_byte: node.end_byte(),
            start_line: start.row + 1, // tree-sitter is 0-indexed
            start_col: start.column + 1,
            end_line: end.row + 1,
            end_col: end.column + 1,
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start_line, self.start_col)
    }
}

/// Which functions a run is interested in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Direct payload of an export statement.
    Exported,
    /// Function-like and not exported.
    Internal,
    /// Passed literally as a call argument, regardless of export status.
    Callback,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Exported, Category::Internal, Category::Callback];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Exported => "exported",
            Category::Internal => "internal",
            Category::Callback => "callback",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "exported" => Ok(Category::Exported),
            "internal" => Ok(Category::Internal),
            "callback" => Ok(Category::Callback),
            other => Err(format!("unknown function type: {:?}", other)),
        }
    }
}

/// Parse a comma-separated list of categories.
///
/// Unknown entries are skipped with a warning. Fails only when nothing
/// valid is left, so `"exported,bogus"` still checks exported functions.
pub fn parse_categories(list: &str) -> anyhow::Result<BTreeSet<Category>> {
    let mut categories = BTreeSet::new();

    for token in list.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        match token.parse::<Category>() {
            Ok(category) => {
                categories.insert(category);
            }
            Err(e) => tracing::warn!("ignoring {}", e),
        }
    }

    if categories.is_empty() {
        anyhow::bail!(
            "invalid function types {:?}: use 'exported', 'internal', 'callback', or a comma-separated combination",
            list
        );
    }

    Ok(categories)
}

/// Structural shape a candidate was matched under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionShape {
    /// `function foo() {}`
    Plain,
    /// `const foo = () => {}`
    ArrowAssigned,
    /// `const foo = function () {}`
    ExpressionAssigned,
    /// Class or object method.
    Method,
    /// `call(() => {})`
    CallbackArgument,
    /// `export default () => {}`
    DefaultExport,
}

impl FunctionShape {
    /// Map a query capture name to a shape.
    pub fn from_capture(name: &str) -> Option<Self> {
        match name {
            "plain" => Some(FunctionShape::Plain),
            "arrow_assigned" => Some(FunctionShape::ArrowAssigned),
            "expression_assigned" => Some(FunctionShape::ExpressionAssigned),
            "method" => Some(FunctionShape::Method),
            "callback_argument" => Some(FunctionShape::CallbackArgument),
            "default_export" => Some(FunctionShape::DefaultExport),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FunctionShape::Plain => "function",
            FunctionShape::ArrowAssigned => "arrow function",
            FunctionShape::ExpressionAssigned => "function expression",
            FunctionShape::Method => "method",
            FunctionShape::CallbackArgument => "callback",
            FunctionShape::DefaultExport => "default export",
        }
    }
}

impl fmt::Display for FunctionShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A function-like node selected by a category query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionCandidate {
    /// Category whose query produced this candidate.
    pub category: Category,
    pub shape: FunctionShape,
    /// Exact source span of the function node.
    pub span: Span,
    /// Result of the ancestor walk.
    pub exported: bool,
    /// Declared name, or the name of the variable it is assigned to.
    pub name: Option<String>,
}

impl FunctionCandidate {
    /// Deduplication key: the start byte of the node.
    pub fn identity(&self) -> usize {
        self.span.start_byte
    }

    /// 1-indexed line used for reporting.
    pub fn line(&self) -> usize {
        self.span.start_line
    }
}
