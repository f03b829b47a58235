//! Core traits for language analysis.

use std::path::Path;

use super::{Category, FunctionCandidate};

/// A parsed source file: its text and the tree built from it.
///
/// Byte offsets in the tree index into `text`. The text is decoded
/// lossily, so a file with stray invalid UTF-8 still gets analyzed.
pub struct SourceFile {
    /// The file path (for reporting).
    pub path: String,
    /// The source code the tree was parsed from.
    pub text: String,
    /// The tree-sitter parse tree, if the parser produced one.
    pub tree: Option<tree_sitter::Tree>,
    /// Byte offset of the first character of each line.
    line_starts: Vec<usize>,
}

impl SourceFile {
    pub fn new(path: impl Into<String>, text: String, tree: Option<tree_sitter::Tree>) -> Self {
        let line_starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self {
            path: path.into(),
            text,
            tree,
            line_starts,
        }
    }

    /// Get text for a byte range, empty if out of bounds.
    pub fn slice(&self, start: usize, end: usize) -> &str {
        self.text.get(start..end).unwrap_or("")
    }

    /// Physical line `line` (1-indexed), if it exists.
    pub fn line(&self, line: usize) -> Option<&str> {
        let start = *self.line_starts.get(line.checked_sub(1)?)?;
        let end = self
            .line_starts
            .get(line)
            .map(|next| next - 1)
            .unwrap_or(self.text.len());
        self.text.get(start..end)
    }

    /// Whether the tree contains ERROR or MISSING nodes.
    pub fn has_parse_errors(&self) -> bool {
        self.tree
            .as_ref()
            .map(|t| t.root_node().has_error())
            .unwrap_or(true)
    }
}

/// Language-specific analyzer trait.
///
/// Implementations hold compiled queries, so they are built once and shared
/// across worker threads.
///
/// # Thread Safety
///
/// Note: tree_sitter::Parser is not Sync, so implementations create a
/// parser per `parse` call.
pub trait LanguageAnalyzer: Send + Sync {
    /// Returns the language identifier (e.g., "typescript", "tsx").
    fn language_id(&self) -> &'static str;

    /// Returns file extensions this analyzer handles (without dot).
    fn file_extensions(&self) -> &'static [&'static str];

    /// Parse source bytes into a `SourceFile`.
    ///
    /// A tree with ERROR nodes is still returned; only a failure to bind
    /// the grammar is an error.
    fn parse(&self, path: &Path, source: &[u8]) -> anyhow::Result<SourceFile>;

    /// Enumerate the candidates of one category, in document order.
    fn candidates(&self, file: &SourceFile, category: Category) -> Vec<FunctionCandidate>;

    /// Check if this analyzer handles the given file extension.
    fn handles_extension(&self, ext: &str) -> bool {
        self.file_extensions().contains(&ext)
    }
}
