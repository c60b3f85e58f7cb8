//! JavaScript / TypeScript entity extraction

use super::parser::node_text;
use super::{clean_block_comment, leading_comments, unquote};
use super::{EntityExtractor, EntityKind};
use tree_sitter::Node;

const FUNCTION_NODES: &[&str] = &[
    "function_declaration",
    "generator_function_declaration",
    "method_definition",
];

const CLASS_NODES: &[&str] = &[
    "class_declaration",
    "abstract_class_declaration",
    "interface_declaration",
];

pub struct JavaScriptExtractor;

impl EntityExtractor for JavaScriptExtractor {
    fn entity_kind(&self, node: Node) -> Option<EntityKind> {
        let kind = node.kind();
        if FUNCTION_NODES.contains(&kind) {
            return Some(EntityKind::Function);
        }
        if CLASS_NODES.contains(&kind) {
            return Some(EntityKind::Class);
        }
        // const handler = () => {} and const f = function() {}
        if kind == "variable_declarator" {
            let value = node.child_by_field_name("value")?;
            if matches!(value.kind(), "arrow_function" | "function_expression" | "function") {
                return Some(EntityKind::Function);
            }
        }
        None
    }

    fn docstring(&self, source: &str, node: Node) -> Option<String> {
        let anchor = doc_anchor(node);
        let comments = leading_comments(source, anchor, |t| t.starts_with("/**"), |_| false);
        let last = comments.last()?;
        Some(clean_block_comment(last)).filter(|d| !d.is_empty())
    }

    fn decorators(&self, source: &str, node: Node) -> Vec<String> {
        let mut found = Vec::new();
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            if child.kind() == "decorator" {
                found.push(decorator_text(source, child));
            }
        }
        // Decorators on exported classes hang off the export statement
        if let Some(parent) = node.parent().filter(|p| p.kind() == "export_statement") {
            let mut cursor = parent.walk();
            for child in parent.named_children(&mut cursor) {
                if child.kind() == "decorator" {
                    found.push(decorator_text(source, child));
                }
            }
        }
        found
    }

    fn import_targets(&self, source: &str, node: Node) -> Vec<String> {
        match node.kind() {
            "import_statement" => node
                .child_by_field_name("source")
                .map(|s| unquote(node_text(source, s)))
                .into_iter()
                .collect(),
            "call_expression" => {
                let is_require = node
                    .child_by_field_name("function")
                    .is_some_and(|f| node_text(source, f) == "require");
                if !is_require {
                    return Vec::new();
                }
                node.child_by_field_name("arguments")
                    .and_then(|args| args.named_child(0))
                    .filter(|arg| arg.kind() == "string")
                    .map(|arg| unquote(node_text(source, arg)))
                    .into_iter()
                    .collect()
            }
            _ => Vec::new(),
        }
    }
}

/// The outermost statement a definition's doc comment would precede
fn doc_anchor(node: Node) -> Node {
    let mut anchor = node;
    while let Some(parent) = anchor.parent() {
        match parent.kind() {
            "export_statement" | "lexical_declaration" | "variable_declaration" => {
                anchor = parent;
            }
            _ => break,
        }
    }
    anchor
}

fn decorator_text(source: &str, node: Node) -> String {
    node_text(source, node)
        .trim()
        .trim_start_matches('@')
        .trim()
        .to_string()
}
