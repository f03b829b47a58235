//! TypeScript language analyzer using tree-sitter.

use std::path::Path;

use streaming_iterator::StreamingIterator;
use thiserror::Error;
use tree_sitter::{Language, Parser, Query, QueryCursor};

use super::classify::{function_name, is_exported};
use super::{Category, FunctionCandidate, FunctionShape, LanguageAnalyzer, SourceFile, Span};

/// Functions that are the direct payload of an export statement.
const EXPORTED_QUERY: &str = r#"
(export_statement
  (function_declaration) @plain)

(export_statement
  (lexical_declaration
    (variable_declarator
      value: (arrow_function) @arrow_assigned)))

(export_statement
  (lexical_declaration
    (variable_declarator
      value: (function_expression) @expression_assigned)))

(export_statement
  (variable_declaration
    (variable_declarator
      value: (arrow_function) @arrow_assigned)))

(export_statement
  (variable_declaration
    (variable_declarator
      value: (function_expression) @expression_assigned)))

; export default () => {} / export default function () {}
(export_statement
  value: (arrow_function) @default_export)

(export_statement
  value: (function_expression) @default_export)
"#;

/// Every named function-like construct. Exported ones are filtered out
/// after matching.
const INTERNAL_QUERY: &str = r#"
(function_declaration) @plain

(method_definition) @method

(variable_declarator
  name: (identifier)
  value: (arrow_function) @arrow_assigned)

(variable_declarator
  name: (identifier)
  value: (function_expression) @expression_assigned)
"#;

/// Functions passed literally as a call argument.
const CALLBACK_QUERY: &str = r#"
(call_expression
  arguments: (arguments
    (arrow_function) @callback_argument))

(call_expression
  arguments: (arguments
    (function_expression) @callback_argument))
"#;

/// Errors raised while building an analyzer.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("compiling {category} query for {language}: {source}")]
    Query {
        category: Category,
        language: &'static str,
        #[source]
        source: tree_sitter::QueryError,
    },
    #[error("binding {language} grammar: {source}")]
    Language {
        language: &'static str,
        #[source]
        source: tree_sitter::LanguageError,
    },
}

/// Grammar flavour. TSX needs its own grammar to parse JSX.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    TypeScript,
    Tsx,
}

impl Dialect {
    fn language(self) -> Language {
        match self {
            Dialect::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Dialect::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        }
    }

    fn id(self) -> &'static str {
        match self {
            Dialect::TypeScript => "typescript",
            Dialect::Tsx => "tsx",
        }
    }
}

pub struct TypeScriptAnalyzer {
    dialect: Dialect,
    language: Language,
    exported: Query,
    internal: Query,
    callback: Query,
}

impl TypeScriptAnalyzer {
    /// Build an analyzer, compiling all category queries up front.
    pub fn new(dialect: Dialect) -> Result<Self, AnalysisError> {
        let language = dialect.language();
        let compile = |category: Category, source: &str| {
            Query::new(&language, source).map_err(|source| AnalysisError::Query {
                category,
                language: dialect.id(),
                source,
            })
        };

        Ok(Self {
            exported: compile(Category::Exported, EXPORTED_QUERY)?,
            internal: compile(Category::Internal, INTERNAL_QUERY)?,
            callback: compile(Category::Callback, CALLBACK_QUERY)?,
            dialect,
            language,
        })
    }

    pub fn typescript() -> Result<Self, AnalysisError> {
        Self::new(Dialect::TypeScript)
    }

    pub fn tsx() -> Result<Self, AnalysisError> {
        Self::new(Dialect::Tsx)
    }

    fn create_parser(&self) -> Result<Parser, AnalysisError> {
        let mut parser = Parser::new();
        parser
            .set_language(&self.language)
            .map_err(|source| AnalysisError::Language {
                language: self.dialect.id(),
                source,
            })?;
        Ok(parser)
    }

    fn query_for(&self, category: Category) -> &Query {
        match category {
            Category::Exported => &self.exported,
            Category::Internal => &self.internal,
            Category::Callback => &self.callback,
        }
    }
}

impl LanguageAnalyzer for TypeScriptAnalyzer {
    fn language_id(&self) -> &'static str {
        self.dialect.id()
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        match self.dialect {
            Dialect::TypeScript => &["ts", "mts", "cts"],
            Dialect::Tsx => &["tsx"],
        }
    }

    fn parse(&self, path: &Path, source: &[u8]) -> anyhow::Result<SourceFile> {
        let mut parser = self.create_parser()?;
        let text = String::from_utf8_lossy(source).into_owned();
        let tree = parser.parse(&text, None);

        if tree.is_none() {
            tracing::warn!("parser produced no tree for {}", path.display());
        }

        Ok(SourceFile::new(path.to_string_lossy(), text, tree))
    }

    fn candidates(&self, file: &SourceFile, category: Category) -> Vec<FunctionCandidate> {
        let Some(tree) = file.tree.as_ref() else {
            return Vec::new();
        };

        let query = self.query_for(category);
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(query, tree.root_node(), file.text.as_bytes());

        let mut candidates = Vec::new();

        while let Some(m) = matches.next() {
            for capture in m.captures {
                let capture_name = query.capture_names()[capture.index as usize];
                let Some(shape) = FunctionShape::from_capture(capture_name) else {
                    continue;
                };

                let node = capture.node;
                let exported = is_exported(node);
                if category == Category::Internal && exported {
                    continue;
                }

                candidates.push(FunctionCandidate {
                    category,
                    shape,
                    span: Span::from_node(node),
                    exported,
                    name: function_name(node, &file.text),
                });
            }
        }

        candidates.sort_by_key(|c| c.span.start_byte);
        candidates
    }
}
