//! File metadata extraction
//!
//! Every file gets generic statistics (size, line count, emptiness, shebang).
//! On top of that, the extension selects a structural extractor:
//!
//! - source code: functions and classes via tree-sitter ([`code`])
//! - markdown: headers, links, code blocks, frontmatter ([`markdown`])
//! - jinja templates: inheritance, blocks, includes, macros ([`template`])
//! - YAML / JSON: top-level document shape ([`structured`])
//!
//! Structural extraction never fails a file. Problems are returned as a
//! [`MetadataIssue`] next to metadata that simply omits the structure.

pub mod code;
pub mod markdown;
pub mod repository;
pub mod structured;
pub mod template;

pub use code::{CodeEntity, CodeMetadata, EntityKind, Language};
pub use markdown::MarkdownMetadata;
pub use repository::RepositoryMetadata;
pub use structured::{DataFormat, DataStructure};
pub use template::TemplateMetadata;

use crate::error::panic_message;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::panic::catch_unwind;
use std::path::Path;
use thiserror::Error;

/// Type-specific facts extracted from a file's content
#[derive(Debug, Clone, PartialEq, Default)]
pub enum StructuralMetadata {
    Code(CodeMetadata),
    Markdown(MarkdownMetadata),
    Template(TemplateMetadata),
    StructuredData(DataStructure),
    #[default]
    None,
}

impl StructuralMetadata {
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Key this variant is published under in `file_level_metadata`
    pub fn key(&self) -> Option<&'static str> {
        match self {
            Self::Code(_) => Some("code"),
            Self::Markdown(_) => Some("markdown"),
            Self::Template(_) => Some("template"),
            Self::StructuredData(d) => Some(d.format.structure_key()),
            Self::None => None,
        }
    }
}

impl Serialize for StructuralMetadata {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if let Some(key) = self.key() {
            match self {
                Self::Code(c) => map.serialize_entry(key, c)?,
                Self::Markdown(m) => map.serialize_entry(key, m)?,
                Self::Template(t) => map.serialize_entry(key, t)?,
                Self::StructuredData(d) => map.serialize_entry(key, d)?,
                Self::None => {}
            }
        }
        map.end()
    }
}

/// Per-file metadata, created once and never mutated
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileMetadata {
    #[serde(rename = "file_path")]
    pub path: String,
    /// Lower-case with leading dot, empty for extensionless files
    #[serde(rename = "file_type")]
    pub extension: String,
    #[serde(rename = "file_name")]
    pub name: String,
    pub directory: String,
    pub size_bytes: usize,
    #[serde(rename = "num_lines")]
    pub line_count: usize,
    pub is_empty: bool,
    pub has_shebang: bool,
    #[serde(
        rename = "file_level_metadata",
        skip_serializing_if = "StructuralMetadata::is_none"
    )]
    pub structural: StructuralMetadata,
}

/// A structural extraction problem that was absorbed
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MetadataIssue {
    #[error("syntax error at {line}:{column}: {detail}")]
    CodeSyntax {
        line: usize,
        column: usize,
        detail: String,
    },

    #[error("malformed frontmatter: {detail}")]
    Frontmatter { detail: String },

    #[error("malformed YAML: {detail}")]
    Yaml { detail: String },

    #[error("malformed JSON: {detail}")]
    Json { detail: String },

    #[error("extractor panicked: {detail}")]
    Panicked { detail: String },
}

/// Normalized extension of a path: lower-case, leading dot, or empty
pub fn file_extension(path: &str) -> String {
    Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_lowercase()))
        .unwrap_or_default()
}

/// Parent directory of a path, empty for top-level files
pub fn file_directory(path: &str) -> String {
    Path::new(path)
        .parent()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Extract metadata for one file, dropping any absorbed issue
pub fn extract_file_metadata(path: &str, content: &str) -> FileMetadata {
    extract_file_metadata_with_issues(path, content).0
}

/// Extract metadata for one file, returning the absorbed issue if any
pub fn extract_file_metadata_with_issues(
    path: &str,
    content: &str,
) -> (FileMetadata, Option<MetadataIssue>) {
    let extension = file_extension(path);
    let (structural, issue) = catch_unwind(|| extract_structural(&extension, content))
        .unwrap_or_else(|payload| {
            let detail = panic_message(payload.as_ref());
            (StructuralMetadata::None, Some(MetadataIssue::Panicked { detail }))
        });

    let metadata = FileMetadata {
        path: path.to_string(),
        name: Path::new(path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        directory: file_directory(path),
        size_bytes: content.len(),
        line_count: content.lines().count(),
        is_empty: content.trim().is_empty(),
        has_shebang: content.starts_with("#!"),
        structural,
        extension,
    };

    if let Some(ref issue) = issue {
        tracing::debug!(path = %path, issue = %issue, "Structural metadata omitted");
    }
    (metadata, issue)
}

fn extract_structural(
    extension: &str,
    content: &str,
) -> (StructuralMetadata, Option<MetadataIssue>) {
    if let Some(language) = Language::from_extension(extension) {
        let (code, issue) = code::extract_code_metadata(content, language);
        return (StructuralMetadata::Code(code), issue);
    }

    if extension == ".md" || extension == ".markdown" {
        let (md, issue) = markdown::extract_markdown_metadata(content);
        return (StructuralMetadata::Markdown(md), issue);
    }

    if template::is_template_extension(extension) {
        let tpl = template::extract_template_metadata(content);
        return (StructuralMetadata::Template(tpl), None);
    }

    if let Some(format) = DataFormat::from_extension(extension) {
        return match structured::extract_data_structure(content, format) {
            Ok(data) => (StructuralMetadata::StructuredData(data), None),
            Err(issue) => (StructuralMetadata::None, Some(issue)),
        };
    }

    (StructuralMetadata::None, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_normalization() {
        assert_eq!(file_extension("src/Main.PY"), ".py");
        assert_eq!(file_extension("Makefile"), "");
        assert_eq!(file_extension(".bashrc"), "");
        assert_eq!(file_extension("dir.d/file"), "");
        assert_eq!(file_extension("archive.tar.gz"), ".gz");
    }

    #[test]
    fn test_generic_fields() {
        let meta = extract_file_metadata("scripts/run.sh", "#!/bin/sh\necho hi\n");
        assert_eq!(meta.extension, ".sh");
        assert_eq!(meta.name, "run.sh");
        assert_eq!(meta.directory, "scripts");
        assert_eq!(meta.size_bytes, 18);
        assert_eq!(meta.line_count, 2);
        assert!(!meta.is_empty);
        assert!(meta.has_shebang);
        assert!(meta.structural.is_none());
    }

    #[test]
    fn test_size_counts_utf8_bytes() {
        let meta = extract_file_metadata("notes.txt", "héllo");
        assert_eq!(meta.size_bytes, 6);
    }

    #[test]
    fn test_empty_file() {
        let meta = extract_file_metadata("empty.py", "  \n");
        assert!(meta.is_empty);
        assert!(matches!(meta.structural, StructuralMetadata::Code(ref c) if c.entities.is_empty()));
        assert_eq!(meta.directory, "");
    }

    #[test]
    fn test_malformed_yaml_has_no_structure_key() {
        let content = "key: [unclosed\n";
        let (meta, issue) = extract_file_metadata_with_issues("c.yaml", content);
        assert_eq!(meta.size_bytes, content.len());
        assert!(issue.is_some());

        let value = serde_json::to_value(&meta).unwrap();
        assert!(value.get("file_level_metadata").is_none());
        assert!(!value.to_string().contains("yaml_structure"));
    }

    #[test]
    fn test_serialized_keys() {
        let meta = extract_file_metadata("config/app.json", r#"{"a": 1}"#);
        let value = serde_json::to_value(&meta).unwrap();
        assert_eq!(value["file_path"], "config/app.json");
        assert_eq!(value["file_type"], ".json");
        assert_eq!(value["num_lines"], 1);
        assert_eq!(
            value["file_level_metadata"]["json_structure"]["top_level_keys"],
            serde_json::json!(["a"])
        );
    }

    #[test]
    fn test_html_gets_no_structure() {
        let meta = extract_file_metadata("index.html", "{% block body %}{% endblock %}");
        assert!(meta.structural.is_none());
    }
}
