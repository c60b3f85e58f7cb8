//! Markdown structural metadata

use super::MetadataIssue;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

lazy_static! {
    static ref HEADER_RE: Regex = Regex::new(r"(?m)^(#{1,6})\s+(.+)$").unwrap();
    static ref LINK_RE: Regex = Regex::new(r"\[([^\]]+)\]\(([^\)]+)\)").unwrap();
    static ref CODE_BLOCK_RE: Regex = Regex::new(r"(?s)```(\w+)?\n(.*?)```").unwrap();
    static ref FRONTMATTER_RE: Regex = Regex::new(r"(?s)^---\n(.*?)\n---").unwrap();
}

/// Language tag used for fenced blocks without one
pub const DEFAULT_CODE_LANGUAGE: &str = "text";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Heading {
    pub level: usize,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub label: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeBlock {
    pub language: String,
    pub code: String,
}

/// Structural metadata for a markdown file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkdownMetadata {
    pub headers: Vec<Heading>,
    pub links: Vec<Link>,
    pub code_blocks: Vec<CodeBlock>,
    pub frontmatter: Option<serde_json::Map<String, serde_json::Value>>,
}

/// Extract headers, links, fenced code blocks and YAML frontmatter
pub fn extract_markdown_metadata(content: &str) -> (MarkdownMetadata, Option<MetadataIssue>) {
    let headers = HEADER_RE
        .captures_iter(content)
        .map(|caps| Heading {
            level: caps[1].len(),
            text: caps[2].to_string(),
        })
        .collect();

    let links = LINK_RE
        .captures_iter(content)
        .map(|caps| Link {
            label: caps[1].to_string(),
            url: caps[2].to_string(),
        })
        .collect();

    let code_blocks = CODE_BLOCK_RE
        .captures_iter(content)
        .map(|caps| CodeBlock {
            language: caps
                .get(1)
                .map(|m| m.as_str().to_string())
                .unwrap_or_else(|| DEFAULT_CODE_LANGUAGE.to_string()),
            code: caps[2].to_string(),
        })
        .collect();

    let (frontmatter, issue) = match parse_frontmatter(content) {
        Ok(fm) => (fm, None),
        Err(detail) => (None, Some(MetadataIssue::Frontmatter { detail })),
    };

    let metadata = MarkdownMetadata {
        headers,
        links,
        code_blocks,
        frontmatter,
    };
    (metadata, issue)
}

/// Parse a leading `---` delimited YAML block into a mapping
///
/// `Ok(None)` when there is no frontmatter, `Err` when there is one but it is
/// not a valid YAML mapping.
fn parse_frontmatter(
    content: &str,
) -> std::result::Result<Option<serde_json::Map<String, serde_json::Value>>, String> {
    if !content.starts_with("---") {
        return Ok(None);
    }
    let Some(caps) = FRONTMATTER_RE.captures(content) else {
        return Ok(None);
    };

    let yaml: serde_yaml::Value = serde_yaml::from_str(&caps[1]).map_err(|e| e.to_string())?;
    match serde_json::to_value(&yaml).map_err(|e| e.to_string())? {
        serde_json::Value::Object(map) => Ok(Some(map)),
        serde_json::Value::Null => Ok(None),
        other => Err(format!("frontmatter is not a mapping: {}", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"---
title: Getting Started
tags: [rust, cli]
---
# Getting Started

See the [guide](https://example.com/guide) and [API](./api.md).

## Install

```bash
cargo install repochunk
```

```
plain block
```

####### not a header
"#;

    #[test]
    fn test_headers() {
        let (meta, _) = extract_markdown_metadata(DOC);
        assert_eq!(
            meta.headers,
            vec![
                Heading { level: 1, text: "Getting Started".into() },
                Heading { level: 2, text: "Install".into() },
            ]
        );
    }

    #[test]
    fn test_links() {
        let (meta, _) = extract_markdown_metadata(DOC);
        assert_eq!(meta.links.len(), 2);
        assert_eq!(meta.links[0].label, "guide");
        assert_eq!(meta.links[1].url, "./api.md");
    }

    #[test]
    fn test_code_blocks_default_language() {
        let (meta, _) = extract_markdown_metadata(DOC);
        assert_eq!(meta.code_blocks.len(), 2);
        assert_eq!(meta.code_blocks[0].language, "bash");
        assert_eq!(meta.code_blocks[0].code, "cargo install repochunk\n");
        assert_eq!(meta.code_blocks[1].language, DEFAULT_CODE_LANGUAGE);
    }

    #[test]
    fn test_frontmatter_mapping() {
        let (meta, issue) = extract_markdown_metadata(DOC);
        assert!(issue.is_none());
        let fm = meta.frontmatter.unwrap();
        assert_eq!(fm["title"], serde_json::json!("Getting Started"));
        assert_eq!(fm["tags"], serde_json::json!(["rust", "cli"]));
    }

    #[test]
    fn test_malformed_frontmatter_ignored() {
        let doc = "---\ntitle: [unclosed\n---\n# Body\n";
        let (meta, issue) = extract_markdown_metadata(doc);
        assert!(meta.frontmatter.is_none());
        assert!(matches!(issue, Some(MetadataIssue::Frontmatter { .. })));
        assert_eq!(meta.headers.len(), 1);
    }

    #[test]
    fn test_no_frontmatter() {
        let (meta, issue) = extract_markdown_metadata("# Title\n\nBody.");
        assert!(meta.frontmatter.is_none());
        assert!(issue.is_none());
    }
}
