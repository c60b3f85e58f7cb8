//! Jinja template metadata

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

lazy_static! {
    static ref EXTENDS_RE: Regex = Regex::new(r#"\{%-?\s*extends\s+['"](.+?)['"]"#).unwrap();
    static ref BLOCK_RE: Regex = Regex::new(r"\{%-?\s*block\s+(\w+)\s*-?%\}").unwrap();
    static ref INCLUDE_RE: Regex = Regex::new(r#"\{%-?\s*include\s+['"](.+?)['"]"#).unwrap();
    static ref MACRO_RE: Regex = Regex::new(r"\{%-?\s*macro\s+(\w+)\s*\(").unwrap();
    static ref VARIABLE_RE: Regex = Regex::new(r"\{\{(.+?)\}\}").unwrap();
}

/// Extensions handled by the template extractor
pub const TEMPLATE_EXTENSIONS: &[&str] = &[".jinja", ".jinja2", ".j2"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TemplateMetadata {
    pub extends: Option<String>,
    pub blocks: Vec<String>,
    pub includes: Vec<String>,
    pub macros: Vec<String>,
    pub variables: Vec<String>,
}

pub fn is_template_extension(ext: &str) -> bool {
    TEMPLATE_EXTENSIONS.contains(&ext)
}

/// Extract inheritance, blocks, includes, macros and `{{ }}` expressions
pub fn extract_template_metadata(content: &str) -> TemplateMetadata {
    let first_group = |re: &Regex| -> Vec<String> {
        re.captures_iter(content)
            .map(|caps| caps[1].to_string())
            .collect()
    };

    TemplateMetadata {
        extends: EXTENDS_RE
            .captures(content)
            .map(|caps| caps[1].to_string()),
        blocks: first_group(&BLOCK_RE),
        includes: first_group(&INCLUDE_RE),
        macros: first_group(&MACRO_RE),
        variables: first_group(&VARIABLE_RE)
            .into_iter()
            .map(|v| v.trim().to_string())
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEMPLATE: &str = r#"{% extends "base.html" %}
{% import "forms.html" as forms %}
{% block title %}{{ page.title }}{% endblock %}
{% block content %}
  {% include 'partials/nav.html' %}
  {% macro input(name, value='') %}<input name="{{name}}">{% endmacro %}
  <p>{{   user.name | upper   }}</p>
{% endblock %}
"#;

    #[test]
    fn test_extends() {
        let meta = extract_template_metadata(TEMPLATE);
        assert_eq!(meta.extends.as_deref(), Some("base.html"));
    }

    #[test]
    fn test_blocks_includes_macros() {
        let meta = extract_template_metadata(TEMPLATE);
        assert_eq!(meta.blocks, vec!["title", "content"]);
        assert_eq!(meta.includes, vec!["partials/nav.html"]);
        assert_eq!(meta.macros, vec!["input"]);
    }

    #[test]
    fn test_variables_trimmed() {
        let meta = extract_template_metadata(TEMPLATE);
        assert_eq!(meta.variables, vec!["page.title", "name", "user.name | upper"]);
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(extract_template_metadata("no tags here"), TemplateMetadata::default());
    }

    #[test]
    fn test_extensions() {
        assert!(is_template_extension(".jinja"));
        assert!(is_template_extension(".j2"));
        assert!(!is_template_extension(".html"));
    }
}
