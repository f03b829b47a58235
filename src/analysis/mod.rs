//! AST-backed function discovery.
//!
//! This module turns TypeScript source into function candidates:
//! - Parsing with tree-sitter (TypeScript and TSX grammars)
//! - Structural queries, one per category
//! - Export classification by ancestor walk
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐     ┌────────────────────┐     ┌───────────────────┐
//! │ Source bytes │────▶│ TypeScriptAnalyzer │────▶│ FunctionCandidate │
//! └──────────────┘     │ (category queries) │     │ (shape, span,     │
//!                      └────────────────────┘     │  exported, name)  │
//!                                │                └───────────────────┘
//!                                ▼
//!                      ┌────────────────────┐
//!                      │ classify           │
//!                      │ (ancestor walk)    │
//!                      └────────────────────┘
//! ```

mod classify;
mod facts;
mod traits;
mod typescript;

pub use classify::{function_name, is_exported, NodeKind};
pub use facts::{parse_categories, Category, FunctionCandidate, FunctionShape, Span};
pub use traits::{LanguageAnalyzer, SourceFile};
pub use typescript::{AnalysisError, Dialect, TypeScriptAnalyzer};

/// Build the analyzers for every supported grammar.
pub fn default_analyzers() -> Result<Vec<Box<dyn LanguageAnalyzer>>, AnalysisError> {
    let analyzers: Vec<Box<dyn LanguageAnalyzer>> = vec![
        Box::new(TypeScriptAnalyzer::typescript()?),
        Box::new(TypeScriptAnalyzer::tsx()?),
    ];
    Ok(analyzers)
}

/// File extensions any default analyzer handles (without dot).
pub const SUPPORTED_EXTENSIONS: &[&str] = &["ts", "tsx", "mts", "cts"];
