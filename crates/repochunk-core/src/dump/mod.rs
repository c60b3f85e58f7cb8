//! Repository dump parsing
//!
//! A dump is one text blob holding many files. Each file section starts with
//! a delimiter line of [`DELIMITER_LEN`] `=` characters, followed by a
//! `File: <path>` header line and the raw file content.

use crate::error::{RepoChunkError, Result};
use serde::Serialize;
use std::path::Path;

/// Number of `=` characters in a section delimiter
pub const DELIMITER_LEN: usize = 48;

/// Section delimiter
pub const DELIMITER: &str = "================================================";

/// Prefix of the first line of every file section
pub const FILE_HEADER_PREFIX: &str = "File: ";

/// One file recovered from a dump
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawFileRecord {
    pub path: String,
    pub content: String,
}

/// Split a dump into ordered per-file records
///
/// Sections that do not start with a header are appended to the previous
/// file's content. Text before the first header has no owner and is dropped.
pub fn parse_dump(dump: &str) -> Vec<RawFileRecord> {
    let mut files = Vec::new();
    let mut current_path: Option<String> = None;
    let mut current_lines: Vec<&str> = Vec::new();

    for part in dump.split(DELIMITER) {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }

        let mut lines = part.split('\n');
        let first = lines.next().unwrap_or_default();

        if let Some(header) = first.strip_prefix(FILE_HEADER_PREFIX) {
            if let Some(path) = current_path.take() {
                files.push(RawFileRecord {
                    path,
                    content: current_lines.join("\n"),
                });
            }
            current_path = Some(header.trim().to_string());
            current_lines = lines.collect();
        } else if current_path.is_some() {
            tracing::debug!(
                preview = %first.chars().take(40).collect::<String>(),
                "Section without file header, treating as continuation"
            );
            current_lines.push(first);
            current_lines.extend(lines);
        } else {
            tracing::debug!("Dropping section before first file header");
        }
    }

    if let Some(path) = current_path {
        files.push(RawFileRecord {
            path,
            content: current_lines.join("\n"),
        });
    }

    files
}

/// Read a dump from disk
///
/// An unreadable or blank dump is the one input condition that aborts a run.
pub fn read_dump(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(RepoChunkError::DumpNotFound(path.display().to_string()));
    }
    let content = std::fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Err(RepoChunkError::EmptyInput(path.display().to_string()));
    }
    Ok(content)
}

/// Render records back into dump form
pub fn render_dump(files: &[RawFileRecord]) -> String {
    let mut out = String::new();
    for file in files {
        out.push_str(DELIMITER);
        out.push('\n');
        out.push_str(FILE_HEADER_PREFIX);
        out.push_str(&file.path);
        out.push('\n');
        out.push_str(DELIMITER);
        out.push('\n');
        out.push_str(&file.content);
        out.push_str("\n\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn section(path: &str, body: &str) -> String {
        format!("{}\nFile: {}\n{}\n", DELIMITER, path, body)
    }

    #[test]
    fn test_delimiter_length() {
        assert_eq!(DELIMITER.len(), DELIMITER_LEN);
        assert!(DELIMITER.chars().all(|c| c == '='));
    }

    #[test]
    fn test_empty_dump() {
        assert!(parse_dump("").is_empty());
        assert!(parse_dump("   \n\n").is_empty());
    }

    #[test]
    fn test_two_sections() {
        let dump = format!(
            "{}{}",
            section("a.py", "def f():\n    pass"),
            section("docs/b.md", "# Title")
        );
        let files = parse_dump(&dump);
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].path, "a.py");
        assert_eq!(files[0].content, "def f():\n    pass");
        assert_eq!(files[1].path, "docs/b.md");
        assert_eq!(files[1].content, "# Title");
    }

    #[test]
    fn test_header_with_empty_body() {
        let dump = section("empty.txt", "");
        let files = parse_dump(&dump);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].content, "");
    }

    #[test]
    fn test_headerless_section_is_continuation() {
        let dump = format!(
            "{}\nFile: a.txt\nfirst half\n{}\nsecond half\n",
            DELIMITER, DELIMITER
        );
        let files = parse_dump(&dump);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].content, "first half\nsecond half");
    }

    #[test]
    fn test_leading_garbage_dropped() {
        let dump = format!("preamble text\n{}", section("a.txt", "body"));
        let files = parse_dump(&dump);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, "a.txt");
    }

    #[test]
    fn test_last_section_without_trailing_delimiter() {
        let dump = format!("{}\nFile: last.rs\nfn main() {{}}", DELIMITER);
        let files = parse_dump(&dump);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].content, "fn main() {}");
    }

    #[test]
    fn test_render_then_parse_matches_paths() {
        let files = vec![
            RawFileRecord {
                path: "src/lib.rs".into(),
                content: "pub fn x() {}".into(),
            },
            RawFileRecord {
                path: "README.md".into(),
                content: "# Readme".into(),
            },
        ];
        let parsed = parse_dump(&render_dump(&files));
        assert_eq!(parsed, files);
    }

    #[test]
    fn test_read_dump_rejects_blank_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("dump.txt");
        std::fs::write(&path, "  \n").unwrap();
        assert!(matches!(read_dump(&path), Err(RepoChunkError::EmptyInput(_))));

        let missing = dir.path().join("missing.txt");
        assert!(matches!(
            read_dump(&missing),
            Err(RepoChunkError::DumpNotFound(_))
        ));
    }

    proptest! {
        #[test]
        fn prop_one_record_per_header(
            bodies in proptest::collection::vec("[a-z ]{0,40}(\n[a-z ]{0,40}){0,3}", 0..8)
        ) {
            let dump: String = bodies
                .iter()
                .enumerate()
                .map(|(i, body)| section(&format!("dir/file{}.txt", i), body))
                .collect();
            let headers = dump.matches("File: ").count();
            prop_assert_eq!(parse_dump(&dump).len(), headers);
        }
    }
}
