//! ts-analyzer - code-block presence checks for TypeScript functions.
//!
//! Every function of the selected kinds (exported, internal, callback) is
//! located with tree-sitter and its source text is checked for a literal
//! or regex code block. Depending on polarity, functions that lack the
//! block (require) or contain it (forbid) are reported.
//!
//! # Architecture
//!
//! - `analysis`: Parsing, structural queries and export classification
//! - `detect`: Ignore comments, content matching and per-file verdicts
//! - `config`: YAML config schema and discovery
//! - `report`: Output formatting (pretty, JSON)
//! - `cli`: Flag parsing, file discovery and exit codes

pub mod analysis;
pub mod cli;
pub mod config;
pub mod detect;
pub mod report;

pub use analysis::{Category, FunctionCandidate, LanguageAnalyzer, TypeScriptAnalyzer};
pub use config::Config;
pub use detect::{has_pattern, CheckOptions, FileVerdict, Pattern, Polarity, RunResult, Runner};
