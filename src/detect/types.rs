//! Core types for detection results.

use serde::{Deserialize, Serialize};

use crate::analysis::{Category, FunctionShape};

/// Why a function failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueKind {
    /// Required code block is absent.
    Missing,
    /// Forbidden code block is present.
    Forbidden,
}

impl IssueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueKind::Missing => "missing",
            IssueKind::Forbidden => "forbidden",
        }
    }

    /// Per-issue message.
    pub fn message(&self) -> &'static str {
        match self {
            IssueKind::Missing => "Missing required code block",
            IssueKind::Forbidden => "Contains forbidden code block",
        }
    }
}

impl std::fmt::Display for IssueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single failing function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Function start line (1-indexed).
    pub line: usize,
    pub kind: IssueKind,
    pub category: Category,
    pub shape: FunctionShape,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Outcome for one file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileVerdict {
    pub path: String,
    /// Distinct candidates found, ignored ones included.
    pub functions_found: usize,
    /// Candidates skipped by an ignore comment.
    pub ignored: usize,
    /// Candidates checked against the pattern.
    pub evaluated: usize,
    pub diagnostics: Vec<Diagnostic>,
    #[serde(default)]
    pub has_parse_errors: bool,
    /// Set when the file could not be read or parsed; such a file never passes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileVerdict {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// A verdict for a file that could not be analyzed at all.
    pub fn failed(path: impl Into<String>, error: impl std::fmt::Display) -> Self {
        Self {
            path: path.into(),
            error: Some(error.to_string()),
            ..Default::default()
        }
    }

    pub fn issue_count(&self) -> usize {
        self.diagnostics.len()
    }

    /// Pass iff no evaluated function failed. Zero functions is a pass.
    pub fn passed(&self) -> bool {
        self.error.is_none() && self.diagnostics.is_empty()
    }
}

/// Outcome for a whole run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunResult {
    /// Verdicts sorted by path.
    pub files: Vec<FileVerdict>,
    /// Number of files analyzed.
    pub scanned: usize,
}

impl RunResult {
    /// Merge independently computed verdicts, keeping path order.
    pub fn from_verdicts(mut files: Vec<FileVerdict>) -> Self {
        files.sort_by(|a, b| a.path.cmp(&b.path));
        Self {
            scanned: files.len(),
            files,
        }
    }

    pub fn passed(&self) -> bool {
        self.files.iter().all(FileVerdict::passed)
    }

    /// Files that did not pass, in path order.
    pub fn failing_files(&self) -> impl Iterator<Item = &FileVerdict> {
        self.files.iter().filter(|f| !f.passed())
    }

    pub fn total_issues(&self) -> usize {
        self.files.iter().map(FileVerdict::issue_count).sum()
    }

    pub fn functions_found(&self) -> usize {
        self.files.iter().map(|f| f.functions_found).sum()
    }
}
