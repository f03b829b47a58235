//! Output formatting for ts-analyzer results.
//!
//! Supports two output formats:
//! - Pretty: colored terminal output, one line per failing function
//! - JSON: structured output for programmatic consumption

use colored::*;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};

use crate::detect::{CheckOptions, FileVerdict, IssueKind, Polarity, RunResult};

// =============================================================================
// JSON Format
// =============================================================================

/// JSON report structure.
#[derive(Serialize, Deserialize)]
pub struct JsonReport {
    pub version: String,
    pub pattern: String,
    pub regex: bool,
    pub polarity: Polarity,
    pub categories: Vec<String>,
    pub files_scanned: usize,
    pub functions_found: usize,
    pub passed: bool,
    pub total_issues: usize,
    pub files: Vec<JsonFile>,
}

/// A file that did not pass.
#[derive(Serialize, Deserialize)]
pub struct JsonFile {
    pub path: String,
    pub issue_count: usize,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub has_parse_errors: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub issues: Vec<JsonIssue>,
}

#[derive(Serialize, Deserialize)]
pub struct JsonIssue {
    pub line: usize,
    pub kind: IssueKind,
    pub category: String,
    pub shape: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub message: String,
}

/// Build the JSON report for a run.
pub fn json_report(options: &CheckOptions, result: &RunResult) -> JsonReport {
    JsonReport {
        version: env!("CARGO_PKG_VERSION").to_string(),
        pattern: options.pattern.as_str().to_string(),
        regex: options.pattern.is_regex(),
        polarity: options.polarity,
        categories: options
            .categories
            .iter()
            .map(|c| c.as_str().to_string())
            .collect(),
        files_scanned: result.scanned,
        functions_found: result.functions_found(),
        passed: result.passed(),
        total_issues: result.total_issues(),
        files: result.failing_files().map(file_to_json).collect(),
    }
}

fn file_to_json(f: &FileVerdict) -> JsonFile {
    JsonFile {
        path: f.path.clone(),
        issue_count: f.issue_count(),
        has_parse_errors: f.has_parse_errors,
        error: f.error.clone(),
        issues: f
            .diagnostics
            .iter()
            .map(|d| JsonIssue {
                line: d.line,
                kind: d.kind,
                category: d.category.as_str().to_string(),
                shape: d.shape.as_str().to_string(),
                name: d.name.clone(),
                message: d.kind.message().to_string(),
            })
            .collect(),
    }
}

/// Write results in JSON format.
pub fn write_json<W: Write>(out: &mut W, options: &CheckOptions, result: &RunResult) -> anyhow::Result<()> {
    let report = json_report(options, result);
    let json = serde_json::to_string_pretty(&report)?;
    writeln!(out, "{}", json)?;
    Ok(())
}

// =============================================================================
// Pretty Format
// =============================================================================

/// Write results in pretty (human-readable) format.
pub fn write_pretty<W: Write>(
    out: &mut W,
    options: &CheckOptions,
    result: &RunResult,
    verbose: bool,
) -> io::Result<()> {
    for file in &result.files {
        write_issues(out, file)?;
    }

    if result.passed() {
        if verbose {
            writeln!(out, "{}", "All functions contain the required code block".green())?;
        }
        return Ok(());
    }

    writeln!(out)?;
    writeln!(out, "{}", "Summary of files with issues:".bold())?;
    let summary = match options.polarity {
        Polarity::Require => "missing required code block",
        Polarity::Forbid => "containing forbidden code block",
    };

    let mut failing = 0;
    for file in result.failing_files() {
        failing += 1;
        match &file.error {
            Some(error) => writeln!(out, "{}: {}", file.path.blue(), error.red())?,
            None => writeln!(
                out,
                "{}: {} function(s) {}",
                file.path.blue(),
                file.issue_count(),
                summary
            )?,
        }
    }

    writeln!(out)?;
    writeln!(out, "{}", format!("Total: {} file(s) with issues", failing).red())?;
    Ok(())
}

fn write_issues<W: Write>(out: &mut W, file: &FileVerdict) -> io::Result<()> {
    for d in &file.diagnostics {
        writeln!(
            out,
            "{}{} - {}",
            file.path.blue(),
            format!(":{}", d.line).dimmed(),
            d.kind.message().yellow()
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{Category, FunctionShape};
    use crate::detect::{Diagnostic, Pattern};

    fn options(polarity: Polarity) -> CheckOptions {
        CheckOptions::new(
            Pattern::new("requiredCode", false).unwrap(),
            polarity,
            [Category::Exported, Category::Callback].into_iter().collect(),
        )
    }

    fn result(kind: IssueKind) -> RunResult {
        let mut bad = FileVerdict::new("src/b.ts");
        for line in [3, 7] {
            bad.diagnostics.push(Diagnostic {
                line,
                kind,
                category: Category::Exported,
                shape: FunctionShape::Plain,
                name: Some("f".to_string()),
            });
        }
        RunResult::from_verdicts(vec![bad, FileVerdict::new("src/a.ts")])
    }

    fn render_pretty(options: &CheckOptions, result: &RunResult, verbose: bool) -> String {
        colored::control::set_override(false);
        let mut buf = Vec::new();
        write_pretty(&mut buf, options, result, verbose).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_pretty_missing() {
        let text = render_pretty(&options(Polarity::Require), &result(IssueKind::Missing), false);
        assert!(text.contains("src/b.ts:3 - Missing required code block\n"));
        assert!(text.contains("src/b.ts:7 - Missing required code block\n"));
        assert!(text.contains("Summary of files with issues:"));
        assert!(text.contains("src/b.ts: 2 function(s) missing required code block"));
        assert!(text.contains("Total: 1 file(s) with issues"));
        assert!(!text.contains("src/a.ts"));
    }

    #[test]
    fn test_pretty_forbidden() {
        let text = render_pretty(&options(Polarity::Forbid), &result(IssueKind::Forbidden), false);
        assert!(text.contains("src/b.ts:3 - Contains forbidden code block"));
        assert!(text.contains("src/b.ts: 2 function(s) containing forbidden code block"));
    }

    #[test]
    fn test_pretty_pass_is_quiet_unless_verbose() {
        let passing = RunResult::from_verdicts(vec![FileVerdict::new("a.ts")]);
        let opts = options(Polarity::Require);
        assert_eq!(render_pretty(&opts, &passing, false), "");
        assert!(render_pretty(&opts, &passing, true)
            .contains("All functions contain the required code block"));
    }

    #[test]
    fn test_json_report() {
        let report = json_report(&options(Polarity::Require), &result(IssueKind::Missing));
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["pattern"], "requiredCode");
        assert_eq!(json["regex"], false);
        assert_eq!(json["polarity"], "require");
        assert_eq!(json["categories"], serde_json::json!(["exported", "callback"]));
        assert_eq!(json["files_scanned"], 2);
        assert_eq!(json["functions_found"], 0);
        assert_eq!(json["passed"], false);
        assert_eq!(json["total_issues"], 2);
        assert_eq!(json["files"].as_array().unwrap().len(), 1);
        assert_eq!(json["files"][0]["issues"][0]["line"], 3);
        assert_eq!(json["files"][0]["issues"][0]["kind"], "missing");
        assert!(json["files"][0].get("error").is_none());
    }
}
