//! Tree-sitter parser wrapper

use super::language::Language;
use crate::error::{Error, Result};
use tree_sitter::{Node, Parser, Tree};

/// Parse source code into a tree-sitter AST
pub fn parse(source: &str, language: Language) -> Result<Tree> {
    let mut parser = Parser::new();
    parser
        .set_language(&language.grammar())
        .map_err(|e| Error::Parse(e.to_string()))?;
    parser
        .parse(source, None)
        .ok_or_else(|| Error::Parse("Failed to parse source".to_string()))
}

/// Source text covered by a node
pub fn node_text<'a>(source: &'a str, node: Node) -> &'a str {
    &source[node.start_byte()..node.end_byte()]
}

/// 1-indexed (start, end) line numbers of a node
pub fn line_span(node: Node) -> (usize, usize) {
    (node.start_position().row + 1, node.end_position().row + 1)
}

/// Location of the first syntax error in a tree, if any
pub fn first_error(root: Node) -> Option<(usize, usize)> {
    if !root.has_error() {
        return None;
    }
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            let pos = node.start_position();
            return Some((pos.row + 1, pos.column + 1));
        }
        let mut cursor = node.walk();
        let children: Vec<Node> = node.children(&mut cursor).collect();
        stack.extend(children.into_iter().rev());
    }
    Some((root.start_position().row + 1, 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_python() {
        let source = "def main():\n    print('Hello')";
        let tree = parse(source, Language::Python).unwrap();
        assert_eq!(tree.root_node().kind(), "module");
        assert!(first_error(tree.root_node()).is_none());
    }

    #[test]
    fn test_parse_rust() {
        let source = "fn main() { println!(\"Hello\"); }";
        let tree = parse(source, Language::Rust).unwrap();
        assert_eq!(tree.root_node().kind(), "source_file");
    }

    #[test]
    fn test_parse_go() {
        let source = "package main\n\nfunc main() { fmt.Println(\"Hello\") }";
        let tree = parse(source, Language::Go).unwrap();
        assert_eq!(tree.root_node().kind(), "source_file");
    }

    #[test]
    fn test_syntax_error_location() {
        let source = "def broken(:\n    pass\n";
        let tree = parse(source, Language::Python).unwrap();
        let (line, _) = first_error(tree.root_node()).unwrap();
        assert_eq!(line, 1);
    }

    #[test]
    fn test_line_span() {
        let source = "\n\ndef f():\n    pass\n";
        let tree = parse(source, Language::Python).unwrap();
        let func = tree.root_node().named_child(0).unwrap();
        assert_eq!(line_span(func), (3, 4));
    }
}
