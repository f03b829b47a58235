//! Per-function suppression via an ignore comment.
//!
//! A function is skipped when the line right above its first line contains
//! the marker:
//!
//! ```typescript
//! // @ts-analyzer-ignore
//! export function legacy() { ... }
//! ```
//!
//! The test is a raw substring match on that line, so the marker also works
//! inside a block comment. Blank lines in between disable it.

use crate::analysis::{FunctionCandidate, SourceFile};

/// Marker text that exempts the next function.
pub const IGNORE_MARKER: &str = "@ts-analyzer-ignore";

/// Whether the line before `line` (1-indexed) carries the ignore marker.
pub fn has_ignore_marker(file: &SourceFile, line: usize) -> bool {
    if line <= 1 {
        return false;
    }
    file.line(line - 1)
        .map(|prev| prev.trim().contains(IGNORE_MARKER))
        .unwrap_or(false)
}

/// Whether a candidate is exempt from checking.
pub fn is_ignored(file: &SourceFile, candidate: &FunctionCandidate) -> bool {
    has_ignore_marker(file, candidate.line())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(text: &str) -> SourceFile {
        SourceFile::new("test.ts", text.to_string(), None)
    }

    #[test]
    fn test_marker_on_previous_line() {
        let f = file("// @ts-analyzer-ignore\nexport function a() {}\n");
        assert!(has_ignore_marker(&f, 2));
    }

    #[test]
    fn test_first_line_is_never_ignored() {
        let f = file("export function a() {} // @ts-analyzer-ignore\n");
        assert!(!has_ignore_marker(&f, 1));
    }

    #[test]
    fn test_regular_comment() {
        let f = file("// This is a regular comment\nexport function a() {}\n");
        assert!(!has_ignore_marker(&f, 2));
    }

    #[test]
    fn test_blank_line_breaks_marker() {
        let f = file("// @ts-analyzer-ignore\n\nexport function a() {}\n");
        assert!(!has_ignore_marker(&f, 3));
    }

    #[test]
    fn test_indented_and_block_marker() {
        let f = file("class A {\n    /* @ts-analyzer-ignore */\n    run() {}\n}\n");
        assert!(has_ignore_marker(&f, 3));
    }

    #[test]
    fn test_line_past_end() {
        let f = file("a\n");
        assert!(!has_ignore_marker(&f, 10));
    }
}
