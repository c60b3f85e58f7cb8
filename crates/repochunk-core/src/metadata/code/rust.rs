//! Rust entity extraction

use super::parser::node_text;
use super::{clean_block_comment, clean_line_comments, leading_comments};
use super::{EntityExtractor, EntityKind};
use tree_sitter::Node;

pub struct RustExtractor;

fn is_doc_comment(text: &str) -> bool {
    let text = text.trim_start();
    (text.starts_with("///") && !text.starts_with("////")) || text.starts_with("/**")
}

impl EntityExtractor for RustExtractor {
    fn entity_kind(&self, node: Node) -> Option<EntityKind> {
        match node.kind() {
            "function_item" => Some(EntityKind::Function),
            "struct_item" | "enum_item" | "trait_item" | "union_item" => Some(EntityKind::Class),
            _ => None,
        }
    }

    fn docstring(&self, source: &str, node: Node) -> Option<String> {
        let comments = leading_comments(source, node, is_doc_comment, |n| {
            n.kind() == "attribute_item"
        });
        if comments.iter().any(|c| c.trim_start().starts_with("/**")) {
            let text = comments
                .iter()
                .map(|c| clean_block_comment(c))
                .collect::<Vec<_>>()
                .join("\n");
            return Some(text).filter(|t| !t.is_empty());
        }
        clean_line_comments(&comments, "///")
    }

    fn decorators(&self, source: &str, node: Node) -> Vec<String> {
        let mut attributes = Vec::new();
        let mut current = node.prev_sibling();
        while let Some(prev) = current {
            match prev.kind() {
                "attribute_item" => {
                    let text = node_text(source, prev).trim();
                    let inner = text
                        .strip_prefix("#[")
                        .and_then(|t| t.strip_suffix(']'))
                        .unwrap_or(text);
                    attributes.push(inner.trim().to_string());
                }
                "line_comment" | "block_comment" => {}
                _ => break,
            }
            current = prev.prev_sibling();
        }
        attributes.reverse();
        attributes
    }

    fn import_targets(&self, source: &str, node: Node) -> Vec<String> {
        match node.kind() {
            "use_declaration" => node
                .child_by_field_name("argument")
                .map(|arg| node_text(source, arg).to_string())
                .into_iter()
                .collect(),
            "extern_crate_declaration" => node
                .child_by_field_name("name")
                .map(|name| node_text(source, name).to_string())
                .into_iter()
                .collect(),
            _ => Vec::new(),
        }
    }
}
