//! Code entity extraction
//!
//! Source files are parsed with tree-sitter and walked for function and class
//! definitions. Each language supplies the node classification, docstring,
//! decorator and import rules through [`EntityExtractor`]; the walk itself is
//! shared.

pub mod go;
pub mod javascript;
pub mod language;
pub mod parser;
pub mod python;
pub mod rust;

pub use go::GoExtractor;
pub use javascript::JavaScriptExtractor;
pub use language::Language;
pub use python::PythonExtractor;
pub use rust::RustExtractor;

use super::MetadataIssue;
use parser::{line_span, node_text};
use serde::Serialize;
use std::collections::BTreeSet;
use tree_sitter::Node;

/// Kind of extracted definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Function,
    Class,
}

/// A function or class definition found in a source file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CodeEntity {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EntityKind,
    pub docstring: Option<String>,
    /// 1-indexed
    pub start_line: usize,
    /// 1-indexed, inclusive
    pub end_line: usize,
    pub decorators: Vec<String>,
    /// Modules imported anywhere inside the definition
    pub dependencies: BTreeSet<String>,
}

/// Structural metadata for a source file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CodeMetadata {
    pub language: Language,
    pub entities: Vec<CodeEntity>,
    pub imports: Vec<String>,
    pub has_main: bool,
    pub doc_coverage: f64,
}

impl CodeMetadata {
    pub fn functions(&self) -> impl Iterator<Item = &CodeEntity> {
        self.entities
            .iter()
            .filter(|e| e.kind == EntityKind::Function)
    }

    pub fn classes(&self) -> impl Iterator<Item = &CodeEntity> {
        self.entities.iter().filter(|e| e.kind == EntityKind::Class)
    }
}

/// Fraction of entities that carry a docstring, 0 when there are none
pub fn doc_coverage(entities: &[CodeEntity]) -> f64 {
    if entities.is_empty() {
        return 0.0;
    }
    let documented = entities.iter().filter(|e| e.docstring.is_some()).count();
    documented as f64 / entities.len() as f64
}

/// Language-specific rules for entity extraction
pub trait EntityExtractor: Send + Sync {
    /// Classify a node as a definition, if it is one
    fn entity_kind(&self, node: Node) -> Option<EntityKind>;

    /// Name of a definition node
    fn entity_name(&self, source: &str, node: Node) -> Option<String> {
        node.child_by_field_name("name")
            .map(|n| node_text(source, n).to_string())
    }

    /// Documentation attached to a definition node
    fn docstring(&self, source: &str, node: Node) -> Option<String>;

    /// Decorator expressions applied to a definition node
    fn decorators(&self, _source: &str, _node: Node) -> Vec<String> {
        Vec::new()
    }

    /// Module names imported by `node` if it is an import construct
    fn import_targets(&self, source: &str, node: Node) -> Vec<String>;

    /// File-scope imports
    fn file_imports(&self, source: &str, root: Node) -> Vec<String> {
        let mut cursor = root.walk();
        root.named_children(&mut cursor)
            .flat_map(|child| self.import_targets(source, child))
            .collect()
    }

    /// Walk the whole tree collecting definitions in document order
    fn extract_entities(&self, source: &str, root: Node) -> Vec<CodeEntity> {
        let mut entities = Vec::new();
        let mut stack = vec![root];

        while let Some(node) = stack.pop() {
            if let Some(kind) = self.entity_kind(node) {
                if let Some(name) = self.entity_name(source, node) {
                    let (start_line, end_line) = line_span(node);
                    entities.push(CodeEntity {
                        name,
                        kind,
                        docstring: self.docstring(source, node),
                        start_line,
                        end_line,
                        decorators: self.decorators(source, node),
                        dependencies: self.subtree_imports(source, node),
                    });
                }
            }
            push_children_reversed(&mut stack, node);
        }

        entities
    }

    /// Imports found anywhere in the subtree rooted at `node`
    fn subtree_imports(&self, source: &str, node: Node) -> BTreeSet<String> {
        let mut found = BTreeSet::new();
        let mut stack = vec![node];
        while let Some(n) = stack.pop() {
            found.extend(self.import_targets(source, n));
            push_children_reversed(&mut stack, n);
        }
        found
    }
}

/// Enum-based extractor dispatch to avoid heap allocation
pub enum LanguageExtractor {
    Python(PythonExtractor),
    Rust(RustExtractor),
    JavaScript(JavaScriptExtractor),
    Go(GoExtractor),
}

impl LanguageExtractor {
    pub fn for_language(language: Language) -> Self {
        match language {
            Language::Python => Self::Python(PythonExtractor),
            Language::Rust => Self::Rust(RustExtractor),
            Language::JavaScript | Language::TypeScript | Language::TypeScriptTsx => {
                Self::JavaScript(JavaScriptExtractor)
            }
            Language::Go => Self::Go(GoExtractor),
        }
    }

    fn as_extractor(&self) -> &dyn EntityExtractor {
        match self {
            Self::Python(e) => e,
            Self::Rust(e) => e,
            Self::JavaScript(e) => e,
            Self::Go(e) => e,
        }
    }

    pub fn extract_entities(&self, source: &str, root: Node) -> Vec<CodeEntity> {
        self.as_extractor().extract_entities(source, root)
    }

    pub fn file_imports(&self, source: &str, root: Node) -> Vec<String> {
        self.as_extractor().file_imports(source, root)
    }
}

/// Extract code metadata, failing soft on syntax errors
///
/// A source that does not parse cleanly still gets its file-scope imports,
/// but no entities.
pub fn extract_code_metadata(
    source: &str,
    language: Language,
) -> (CodeMetadata, Option<MetadataIssue>) {
    let extractor = LanguageExtractor::for_language(language);

    let tree = match parser::parse(source, language) {
        Ok(tree) => tree,
        Err(e) => {
            let issue = MetadataIssue::CodeSyntax {
                line: 0,
                column: 0,
                detail: e.to_string(),
            };
            return (empty_code_metadata(language, Vec::new()), Some(issue));
        }
    };
    let root = tree.root_node();
    let imports = extractor.file_imports(source, root);

    if let Some((line, column)) = parser::first_error(root) {
        let issue = MetadataIssue::CodeSyntax {
            line,
            column,
            detail: format!("{} syntax error", language.as_str()),
        };
        return (empty_code_metadata(language, imports), Some(issue));
    }

    let entities = extractor.extract_entities(source, root);
    let metadata = CodeMetadata {
        language,
        has_main: entities.iter().any(|e| e.name == "__main__"),
        doc_coverage: doc_coverage(&entities),
        entities,
        imports,
    };
    (metadata, None)
}

fn empty_code_metadata(language: Language, imports: Vec<String>) -> CodeMetadata {
    CodeMetadata {
        language,
        entities: Vec::new(),
        imports,
        has_main: false,
        doc_coverage: 0.0,
    }
}

fn push_children_reversed<'t>(stack: &mut Vec<Node<'t>>, node: Node<'t>) {
    let mut cursor = node.walk();
    let children: Vec<Node<'t>> = node.named_children(&mut cursor).collect();
    stack.extend(children.into_iter().rev());
}

/// Contiguous comment block directly above `node`, top to bottom
///
/// `skip` lets languages step over nodes such as attributes that sit between
/// a doc comment and the definition.
pub(crate) fn leading_comments<'a>(
    source: &'a str,
    node: Node,
    is_comment: impl Fn(&str) -> bool,
    skip: impl Fn(Node) -> bool,
) -> Vec<&'a str> {
    let mut lines = Vec::new();
    let mut expected_row = node.start_position().row;
    let mut current = node.prev_sibling();

    while let Some(prev) = current {
        if skip(prev) {
            expected_row = prev.start_position().row;
            current = prev.prev_sibling();
            continue;
        }
        let text = node_text(source, prev);
        if prev.kind() != "comment"
            && prev.kind() != "line_comment"
            && prev.kind() != "block_comment"
        {
            break;
        }
        if !is_comment(text) || prev.end_position().row + 1 < expected_row {
            break;
        }
        lines.push(text);
        expected_row = prev.start_position().row;
        current = prev.prev_sibling();
    }

    lines.reverse();
    lines
}

/// Strip `/** ... */` framing and leading `*` gutters from a block comment
pub(crate) fn clean_block_comment(text: &str) -> String {
    let inner = text
        .trim()
        .trim_start_matches("/**")
        .trim_end_matches("*/");
    inner
        .lines()
        .map(|line| {
            let line = line.trim();
            line.strip_prefix('*').map(str::trim_start).unwrap_or(line)
        })
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Join line comments after removing their marker and one following space
pub(crate) fn clean_line_comments(lines: &[&str], marker: &str) -> Option<String> {
    if lines.is_empty() {
        return None;
    }
    let text = lines
        .iter()
        .map(|line| {
            let body = line.trim().trim_start_matches(marker);
            body.strip_prefix(' ').unwrap_or(body).trim_end()
        })
        .collect::<Vec<_>>()
        .join("\n");
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Strip the quotes around a string literal
pub(crate) fn unquote(text: &str) -> String {
    text.trim()
        .trim_matches(|c| c == '"' || c == '\'' || c == '`')
        .to_string()
}
