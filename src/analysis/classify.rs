//! Category classification by walking a node's ancestors.

use tree_sitter::Node;

/// Node kinds the classifier distinguishes. Everything else is `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    ExportStatement,
    LexicalDeclaration,
    VariableDeclaration,
    VariableDeclarator,
    FunctionDeclaration,
    FunctionExpression,
    ArrowFunction,
    MethodDefinition,
    Other,
}

impl NodeKind {
    pub fn of(node: Node) -> Self {
        match node.kind() {
            "export_statement" => NodeKind::ExportStatement,
            "lexical_declaration" => NodeKind::LexicalDeclaration,
            "variable_declaration" => NodeKind::VariableDeclaration,
            "variable_declarator" => NodeKind::VariableDeclarator,
            "function_declaration" => NodeKind::FunctionDeclaration,
            "function_expression" => NodeKind::FunctionExpression,
            "arrow_function" => NodeKind::ArrowFunction,
            "method_definition" => NodeKind::MethodDefinition,
            _ => NodeKind::Other,
        }
    }

    fn is_declaration_list(self) -> bool {
        matches!(
            self,
            NodeKind::LexicalDeclaration | NodeKind::VariableDeclaration
        )
    }
}

/// Whether a function node is exported.
///
/// True when the parent is an export statement, or when an arrow function or
/// function expression is the value of a declarator whose declaration sits
/// directly inside an export statement. Returns false as soon as the chain
/// runs out.
pub fn is_exported(node: Node) -> bool {
    let Some(parent) = node.parent() else {
        return false;
    };

    match (NodeKind::of(node), NodeKind::of(parent)) {
        (_, NodeKind::ExportStatement) => true,
        (NodeKind::ArrowFunction | NodeKind::FunctionExpression, NodeKind::VariableDeclarator) => {
            let Some(declaration) = parent.parent() else {
                return false;
            };
            NodeKind::of(declaration).is_declaration_list()
                && declaration
                    .parent()
                    .map(|n| NodeKind::of(n) == NodeKind::ExportStatement)
                    .unwrap_or(false)
        }
        _ => false,
    }
}

/// The name a function is known by, if any.
///
/// Uses the node's own `name` field, falling back to the declarator the
/// function is assigned to.
pub fn function_name(node: Node, source: &str) -> Option<String> {
    let name_node = node.child_by_field_name("name").or_else(|| {
        node.parent()
            .filter(|p| NodeKind::of(*p) == NodeKind::VariableDeclarator)
            .and_then(|p| p.child_by_field_name("name"))
    })?;

    source
        .get(name_node.byte_range())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
