//! Method signature extraction from Java source using tree-sitter.

use serde::Serialize;
use std::collections::BTreeSet;
use tracing::warn;
use tree_sitter::{Node, Parser, Tree};

use crate::error::{Result, ScoutError};

/// Builtin and collection types never looked up as data classes. Compared
/// case-insensitively against the full declared type text.
pub const PRIMITIVE_TYPES: [&str; 10] = [
    "string", "int", "long", "double", "boolean", "list", "map", "void", "object", "integer",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SignatureStatus {
    Parsed,
    ParseFailed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSignatures {
    pub param_types: BTreeSet<String>,
    pub return_types: BTreeSet<String>,
    pub status: SignatureStatus,
}

impl MethodSignatures {
    fn empty(status: SignatureStatus) -> Self {
        Self {
            param_types: BTreeSet::new(),
            return_types: BTreeSet::new(),
            status,
        }
    }
}

pub fn is_primitive_type(type_name: &str) -> bool {
    let lower = type_name.to_lowercase();
    PRIMITIVE_TYPES.contains(&lower.as_str())
}

/// Collects the non-primitive parameter and return types of every method in
/// `source`. A file with syntax errors yields empty sets marked
/// [`SignatureStatus::ParseFailed`].
pub fn extract_signatures(source: &str) -> MethodSignatures {
    let tree = match parse_java(source) {
        Ok(tree) => tree,
        Err(err) => {
            warn!(error = %err, "controller signatures unavailable");
            return MethodSignatures::empty(SignatureStatus::ParseFailed);
        }
    };

    let mut signatures = MethodSignatures::empty(SignatureStatus::Parsed);
    let bytes = source.as_bytes();
    let mut methods = Vec::new();
    collect_methods(tree.root_node(), &mut methods);

    for method in methods {
        if let Some(params) = method.child_by_field_name("parameters") {
            let mut cursor = params.walk();
            for param in params.named_children(&mut cursor) {
                if let Some(type_name) = parameter_type(&param, bytes)
                    && !is_primitive_type(&type_name)
                {
                    signatures.param_types.insert(type_name);
                }
            }
        }

        if let Some(ret) = method.child_by_field_name("type") {
            let type_name = normalize_whitespace(node_text(&ret, bytes));
            if type_name != "void" && !is_primitive_type(&type_name) {
                signatures.return_types.insert(type_name);
            }
        }
    }

    signatures
}

fn parse_java(source: &str) -> Result<Tree> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_java::LANGUAGE.into())
        .map_err(|e| ScoutError::Parse(format!("java grammar unavailable: {e}")))?;
    let tree = parser
        .parse(source, None)
        .ok_or_else(|| ScoutError::Parse("parser returned no tree".to_string()))?;
    if tree.root_node().has_error() {
        return Err(ScoutError::Parse("source contains syntax errors".to_string()));
    }
    Ok(tree)
}

fn collect_methods<'a>(node: Node<'a>, out: &mut Vec<Node<'a>>) {
    if node.kind() == "method_declaration" {
        out.push(node);
    }
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        collect_methods(child, out);
    }
}

fn parameter_type(param: &Node, source: &[u8]) -> Option<String> {
    match param.kind() {
        "formal_parameter" => param
            .child_by_field_name("type")
            .map(|t| normalize_whitespace(node_text(&t, source))),
        // `String... args`: the element type is the first non-modifier child.
        "spread_parameter" => {
            let mut cursor = param.walk();
            let ty = param
                .named_children(&mut cursor)
                .find(|c| c.kind() != "modifiers" && c.kind() != "variable_declarator");
            ty.map(|t| normalize_whitespace(node_text(&t, source)))
        }
        _ => None,
    }
}

fn node_text<'a>(node: &Node, source: &'a [u8]) -> &'a str {
    node.utf8_text(source).unwrap_or("")
}

fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
