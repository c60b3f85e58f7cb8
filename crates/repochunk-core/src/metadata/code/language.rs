//! Source language detection from file extensions

use serde::Serialize;
use tree_sitter::Language as TsLanguage;

/// Languages with code entity extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    Rust,
    JavaScript,
    TypeScript,
    TypeScriptTsx,
    Go,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Python => "python",
            Self::Rust => "rust",
            Self::JavaScript => "javascript",
            Self::TypeScript => "typescript",
            Self::TypeScriptTsx => "tsx",
            Self::Go => "go",
        }
    }

    /// Detect language from a normalized extension (lower-case, leading dot)
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            ".py" | ".pyi" => Some(Self::Python),
            ".rs" => Some(Self::Rust),
            ".js" | ".mjs" | ".cjs" | ".jsx" => Some(Self::JavaScript),
            ".ts" | ".mts" | ".cts" => Some(Self::TypeScript),
            ".tsx" => Some(Self::TypeScriptTsx),
            ".go" => Some(Self::Go),
            _ => None,
        }
    }

    pub(crate) fn grammar(&self) -> TsLanguage {
        match self {
            Self::Python => tree_sitter_python::LANGUAGE.into(),
            Self::Rust => tree_sitter_rust::LANGUAGE.into(),
            Self::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
            Self::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Self::TypeScriptTsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
            Self::Go => tree_sitter_go::LANGUAGE.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_python_detection() {
        assert_eq!(Language::from_extension(".py"), Some(Language::Python));
        assert_eq!(Language::from_extension(".pyi"), Some(Language::Python));
    }

    #[test]
    fn test_script_detection() {
        assert_eq!(Language::from_extension(".mjs"), Some(Language::JavaScript));
        assert_eq!(Language::from_extension(".ts"), Some(Language::TypeScript));
        assert_eq!(Language::from_extension(".tsx"), Some(Language::TypeScriptTsx));
    }

    #[test]
    fn test_unsupported() {
        assert_eq!(Language::from_extension(".md"), None);
        assert_eq!(Language::from_extension(""), None);
        assert_eq!(Language::from_extension("py"), None);
    }
}
