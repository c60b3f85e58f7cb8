//! Python entity extraction

use super::parser::node_text;
use super::{EntityExtractor, EntityKind};
use lazy_static::lazy_static;
use regex::Regex;
use tree_sitter::Node;

lazy_static! {
    static ref IMPORT_LINE_RE: Regex = Regex::new(r"(?m)^(?:from|import)\s+(\S+)").unwrap();
}

pub struct PythonExtractor;

impl EntityExtractor for PythonExtractor {
    fn entity_kind(&self, node: Node) -> Option<EntityKind> {
        match node.kind() {
            "function_definition" => Some(EntityKind::Function),
            "class_definition" => Some(EntityKind::Class),
            _ => None,
        }
    }

    fn docstring(&self, source: &str, node: Node) -> Option<String> {
        let body = node.child_by_field_name("body")?;
        let mut cursor = body.walk();
        let first = body
            .named_children(&mut cursor)
            .find(|child| child.kind() != "comment")?;
        if first.kind() != "expression_statement" || first.named_child_count() != 1 {
            return None;
        }
        let literal = first.named_child(0)?;
        let doc = match literal.kind() {
            "string" => string_literal_value(node_text(source, literal))?,
            "concatenated_string" => {
                let mut cursor = literal.walk();
                let parts = literal
                    .named_children(&mut cursor)
                    .filter(|part| part.kind() == "string")
                    .map(|part| string_literal_value(node_text(source, part)))
                    .collect::<Option<Vec<_>>>()?;
                parts.concat()
            }
            _ => return None,
        };
        let doc = clean_docstring(&doc);
        if doc.is_empty() {
            None
        } else {
            Some(doc)
        }
    }

    fn decorators(&self, source: &str, node: Node) -> Vec<String> {
        let Some(parent) = node.parent() else {
            return Vec::new();
        };
        if parent.kind() != "decorated_definition" {
            return Vec::new();
        }
        let mut cursor = parent.walk();
        parent
            .named_children(&mut cursor)
            .filter(|child| child.kind() == "decorator")
            .map(|d| {
                node_text(source, d)
                    .trim()
                    .trim_start_matches('@')
                    .trim()
                    .to_string()
            })
            .collect()
    }

    fn import_targets(&self, source: &str, node: Node) -> Vec<String> {
        match node.kind() {
            "import_statement" => {
                let mut cursor = node.walk();
                node.children_by_field_name("name", &mut cursor)
                    .filter_map(|name| {
                        let dotted = if name.kind() == "aliased_import" {
                            name.child_by_field_name("name")?
                        } else {
                            name
                        };
                        Some(node_text(source, dotted).to_string())
                    })
                    .collect()
            }
            "import_from_statement" => node
                .child_by_field_name("module_name")
                .map(|module| node_text(source, module).trim_start_matches('.').to_string())
                .filter(|module| !module.is_empty())
                .into_iter()
                .collect(),
            "future_import_statement" => vec!["__future__".to_string()],
            _ => Vec::new(),
        }
    }

    fn file_imports(&self, source: &str, _root: Node) -> Vec<String> {
        IMPORT_LINE_RE
            .captures_iter(source)
            .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
            .collect()
    }
}

/// Value of a plain (non-bytes, non-f) string literal
fn string_literal_value(literal: &str) -> Option<String> {
    let quote_start = literal.find(['"', '\''])?;
    let prefix = literal[..quote_start].to_ascii_lowercase();
    if prefix.contains('f') || prefix.contains('b') {
        return None;
    }
    let body = &literal[quote_start..];
    let inner = ["\"\"\"", "'''", "\"", "'"]
        .iter()
        .find_map(|q| body.strip_prefix(q).and_then(|rest| rest.strip_suffix(q)))?;
    if prefix.contains('r') {
        Some(inner.to_string())
    } else {
        Some(unescape(inner))
    }
}

/// Decode backslash escapes; unknown escapes keep their backslash
fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\n') => {}
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some('a') => out.push('\u{7}'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('v') => out.push('\u{b}'),
            Some(q @ ('\\' | '\'' | '"')) => out.push(q),
            Some(kind @ ('x' | 'u' | 'U')) => {
                let width = match kind {
                    'x' => 2,
                    'u' => 4,
                    _ => 8,
                };
                let mut digits = String::with_capacity(width);
                while digits.len() < width {
                    match chars.peek() {
                        Some(d) if d.is_ascii_hexdigit() => {
                            digits.push(*d);
                            chars.next();
                        }
                        _ => break,
                    }
                }
                match u32::from_str_radix(&digits, 16).ok().and_then(char::from_u32) {
                    Some(decoded) if digits.len() == width => out.push(decoded),
                    _ => {
                        out.push('\\');
                        out.push(kind);
                        out.push_str(&digits);
                    }
                }
            }
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Leading whitespace of a line, in chars
fn indent_width(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count()
}

/// Normalize docstring indentation the way Python's `inspect.cleandoc` does
///
/// The margin is counted in chars, so lines indented with non-ASCII
/// whitespace are cut on character boundaries.
pub fn clean_docstring(doc: &str) -> String {
    let expanded = doc.replace('\t', "        ");
    let lines: Vec<&str> = expanded.split('\n').collect();

    let margin = lines
        .iter()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .map(|line| indent_width(line))
        .min()
        .unwrap_or(0);

    let mut cleaned: Vec<String> = Vec::with_capacity(lines.len());
    for (i, line) in lines.iter().enumerate() {
        if i == 0 {
            cleaned.push(line.trim_start().to_string());
            continue;
        }
        match line.char_indices().nth(margin) {
            Some((offset, _)) => cleaned.push(line[offset..].trim_end().to_string()),
            None => cleaned.push(String::new()),
        }
    }

    while cleaned.first().is_some_and(|l| l.trim().is_empty()) {
        cleaned.remove(0);
    }
    while cleaned.last().is_some_and(|l| l.trim().is_empty()) {
        cleaned.pop();
    }
    cleaned.join("\n")
}
