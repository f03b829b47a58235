//! Detection runner that drives the per-file pipeline.

use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::analysis::{default_analyzers, Category, LanguageAnalyzer, SourceFile};

use super::{is_ignored, Diagnostic, FileVerdict, Pattern, Polarity, RunResult};

/// What to look for and where.
#[derive(Debug, Clone)]
pub struct CheckOptions {
    pub pattern: Pattern,
    pub polarity: Polarity,
    pub categories: BTreeSet<Category>,
}

impl CheckOptions {
    pub fn new(pattern: Pattern, polarity: Polarity, categories: BTreeSet<Category>) -> Self {
        Self {
            pattern,
            polarity,
            categories,
        }
    }
}

/// Checks files against a set of options.
///
/// A runner is shared across worker threads; each file is analyzed
/// independently and verdicts are merged afterwards.
pub struct Runner {
    options: CheckOptions,
    analyzers: Vec<Box<dyn LanguageAnalyzer>>,
}

impl Runner {
    /// Create a runner with the TypeScript and TSX analyzers.
    pub fn new(options: CheckOptions) -> anyhow::Result<Self> {
        Ok(Self::with_analyzers(options, default_analyzers()?))
    }

    /// Create a runner with explicit analyzers. The first one is the
    /// fallback for unknown extensions.
    pub fn with_analyzers(options: CheckOptions, analyzers: Vec<Box<dyn LanguageAnalyzer>>) -> Self {
        Self { options, analyzers }
    }

    pub fn options(&self) -> &CheckOptions {
        &self.options
    }

    fn analyzer_for(&self, path: &Path) -> Option<&dyn LanguageAnalyzer> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        self.analyzers
            .iter()
            .find(|a| a.handles_extension(ext))
            .or_else(|| self.analyzers.first())
            .map(|a| a.as_ref())
    }

    /// Analyze every file in parallel.
    pub fn run(&self, files: &[PathBuf]) -> RunResult {
        let verdicts: Vec<FileVerdict> = files.par_iter().map(|p| self.check_path(p)).collect();
        RunResult::from_verdicts(verdicts)
    }

    /// Read and analyze one file. Read failures become a failed verdict.
    pub fn check_path(&self, path: &Path) -> FileVerdict {
        tracing::info!("Checking file: {}", path.display());

        match std::fs::read(path) {
            Ok(source) => self.check_source(path, &source),
            Err(e) => {
                tracing::warn!("Error reading file {}: {}", path.display(), e);
                FileVerdict::failed(path.to_string_lossy(), format!("reading file: {}", e))
            }
        }
    }

    /// Analyze in-memory source as if it lived at `path`.
    pub fn check_source(&self, path: &Path, source: &[u8]) -> FileVerdict {
        let Some(analyzer) = self.analyzer_for(path) else {
            return FileVerdict::failed(path.to_string_lossy(), "no analyzer available");
        };

        tracing::debug!("{}: parsing as {}", path.display(), analyzer.language_id());
        match analyzer.parse(path, source) {
            Ok(file) => self.check_file(analyzer, &file),
            Err(e) => {
                tracing::warn!("Error parsing {}: {}", path.display(), e);
                FileVerdict::failed(path.to_string_lossy(), e)
            }
        }
    }

    /// Evaluate every requested category in one pass over a parsed file.
    ///
    /// A span is evaluated at most once: the first category that yields it
    /// owns it.
    pub fn check_file(&self, analyzer: &dyn LanguageAnalyzer, file: &SourceFile) -> FileVerdict {
        let mut verdict = FileVerdict::new(file.path.clone());
        verdict.has_parse_errors = file.has_parse_errors();
        if verdict.has_parse_errors {
            tracing::warn!("{}: source has syntax errors, results may be incomplete", file.path);
        }

        let mut seen = HashSet::new();

        for &category in &self.options.categories {
            for candidate in analyzer.candidates(file, category) {
                if !seen.insert(candidate.identity()) {
                    continue;
                }
                verdict.functions_found += 1;

                if is_ignored(file, &candidate) {
                    tracing::debug!(
                        "{}:{} - Skipping function due to @ts-analyzer-ignore comment",
                        file.path,
                        candidate.line()
                    );
                    verdict.ignored += 1;
                    continue;
                }

                verdict.evaluated += 1;
                let text = file.slice(candidate.span.start_byte, candidate.span.end_byte);
                let present = self.options.pattern.is_present(text);

                tracing::debug!(
                    "{}:{} - {} {} {}{}: code block {}",
                    file.path,
                    candidate.line(),
                    candidate.category,
                    candidate.shape,
                    if candidate.exported { "export " } else { "" },
                    candidate.name.as_deref().unwrap_or("<anonymous>"),
                    if present { "present" } else { "absent" }
                );

                if !self.options.polarity.passes(present) {
                    verdict.diagnostics.push(Diagnostic {
                        line: candidate.line(),
                        kind: self.options.polarity.issue_kind(),
                        category: candidate.category,
                        shape: candidate.shape,
                        name: candidate.name,
                    });
                }
            }
        }

        if verdict.functions_found == 0 {
            tracing::debug!("No functions found in {}", file.path);
        }

        verdict.diagnostics.sort_by_key(|d| d.line);
        verdict
    }
}
