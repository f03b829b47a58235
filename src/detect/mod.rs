//! Detection of functions that miss (or contain) a code block.

mod matcher;
mod runner;
mod suppress;
mod types;

pub use matcher::{has_pattern, is_comment_line, Pattern, PatternError, Polarity};
pub use runner::{CheckOptions, Runner};
pub use suppress::{has_ignore_marker, is_ignored, IGNORE_MARKER};
pub use types::{Diagnostic, FileVerdict, IssueKind, RunResult};
