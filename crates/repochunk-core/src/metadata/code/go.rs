//! Go entity extraction

use super::parser::node_text;
use super::{clean_line_comments, leading_comments, unquote};
use super::{EntityExtractor, EntityKind};
use tree_sitter::Node;

pub struct GoExtractor;

impl EntityExtractor for GoExtractor {
    fn entity_kind(&self, node: Node) -> Option<EntityKind> {
        match node.kind() {
            "function_declaration" | "method_declaration" => Some(EntityKind::Function),
            "type_spec" => {
                let ty = node.child_by_field_name("type")?;
                matches!(ty.kind(), "struct_type" | "interface_type").then_some(EntityKind::Class)
            }
            _ => None,
        }
    }

    fn docstring(&self, source: &str, node: Node) -> Option<String> {
        // `type Foo struct {}` documents the declaration, not the type_spec
        let anchor = match node.parent() {
            Some(parent) if node.kind() == "type_spec" && parent.kind() == "type_declaration" => {
                parent
            }
            _ => node,
        };
        let comments = leading_comments(source, anchor, |t| t.starts_with("//"), |_| false);
        clean_line_comments(&comments, "//")
    }

    fn import_targets(&self, source: &str, node: Node) -> Vec<String> {
        if node.kind() != "import_spec" {
            return Vec::new();
        }
        node.child_by_field_name("path")
            .map(|p| unquote(node_text(source, p)))
            .into_iter()
            .collect()
    }

    fn file_imports(&self, source: &str, root: Node) -> Vec<String> {
        let mut cursor = root.walk();
        root.named_children(&mut cursor)
            .filter(|child| child.kind() == "import_declaration")
            .flat_map(|decl| self.subtree_imports(source, decl))
            .collect()
    }
}
