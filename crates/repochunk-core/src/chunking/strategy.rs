//! Chunking strategy table
//!
//! Every extension resolves to exactly one [`StrategyKey`]. Unmapped
//! extensions resolve to [`StrategyKey::Default`].

use crate::error::ChunkFailure;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Markdown sections longer than this are re-split
pub const MARKDOWN_RESPLIT_THRESHOLD: usize = 600;

/// Deepest markdown header level that starts a new section
pub const MARKDOWN_MAX_HEADER_LEVEL: usize = 4;

/// Closed set of chunking strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKey {
    Python,
    Markdown,
    Html,
    Jinja,
    Yaml,
    Toml,
    Json,
    Rst,
    Text,
    Default,
}

impl StrategyKey {
    pub const ALL: [StrategyKey; 10] = [
        Self::Python,
        Self::Markdown,
        Self::Html,
        Self::Jinja,
        Self::Yaml,
        Self::Toml,
        Self::Json,
        Self::Rst,
        Self::Text,
        Self::Default,
    ];

    /// Resolve a normalized extension (`.py`) to its strategy
    pub fn for_extension(ext: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|key| key.extensions().contains(&ext))
            .unwrap_or(Self::Default)
    }

    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Self::Python => &[".py", ".pyi"],
            Self::Markdown => &[".md", ".markdown"],
            Self::Html => &[".html", ".htm"],
            Self::Jinja => &[".jinja", ".jinja2", ".j2"],
            Self::Yaml => &[".yml", ".yaml"],
            Self::Toml => &[".toml"],
            Self::Json => &[".json"],
            Self::Rst => &[".rst"],
            Self::Text => &[".txt"],
            Self::Default => &[],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Python => "python",
            Self::Markdown => "markdown",
            Self::Html => "html",
            Self::Jinja => "jinja",
            Self::Yaml => "yaml",
            Self::Toml => "toml",
            Self::Json => "json",
            Self::Rst => "rst",
            Self::Text => "text",
            Self::Default => "default",
        }
    }

    /// Built-in strategy for this key
    pub fn builtin(&self) -> ChunkStrategy {
        let recursive = |size, overlap, separators: &[&str]| {
            ChunkStrategy::Recursive(SplitterConfig::new(size, overlap, separators))
        };
        match self {
            Self::Python => recursive(
                500,
                50,
                &["\nclass ", "\ndef ", "\n\tdef ", "\n\n", "\n", " ", ""],
            ),
            Self::Markdown => ChunkStrategy::MarkdownHeaders {
                max_level: MARKDOWN_MAX_HEADER_LEVEL,
                resplit: SplitterConfig::new(MARKDOWN_RESPLIT_THRESHOLD, 50, &["\n\n", "\n", ". "]),
            },
            Self::Html => recursive(
                500,
                100,
                &["</div>", "</template>", "</section>", "\n\n", "\n"],
            ),
            Self::Jinja => recursive(
                500,
                100,
                &["{% block ", "{% extends ", "{% include ", "\n\n", "\n"],
            ),
            Self::Yaml => recursive(300, 50, &["---", "\n\n", "\n"]),
            Self::Toml => recursive(300, 50, &["\n\n", "\n"]),
            Self::Json => recursive(500, 50, &["},", "}\n", "\n"]),
            Self::Rst => ChunkStrategy::Recursive(SplitterConfig {
                separator_regex: true,
                ..SplitterConfig::new(600, 100, &["\n=+\n", "\n-+\n", "\n\n", "\n"])
            }),
            Self::Text => recursive(500, 50, &["\n\n", "\n", ". "]),
            Self::Default => recursive(400, 50, &["\n\n", "\n", ". ", " "]),
        }
    }
}

impl std::fmt::Display for StrategyKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters of the recursive separator splitter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitterConfig {
    /// Maximum chunk length in characters
    pub chunk_size: usize,
    /// Characters shared between neighbouring chunks
    pub chunk_overlap: usize,
    /// Separators in priority order
    pub separators: Vec<String>,
    /// Treat separators as regular expressions
    #[serde(default)]
    pub separator_regex: bool,
}

impl SplitterConfig {
    pub fn new(chunk_size: usize, chunk_overlap: usize, separators: &[&str]) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
            separators: separators.iter().map(|s| s.to_string()).collect(),
            separator_regex: false,
        }
    }

    pub fn validate(&self) -> Result<(), ChunkFailure> {
        if self.chunk_size == 0 {
            return Err(ChunkFailure::InvalidStrategy(
                "chunk_size must be greater than 0".to_string(),
            ));
        }
        if self.chunk_overlap > self.chunk_size {
            return Err(ChunkFailure::InvalidStrategy(format!(
                "chunk_overlap ({}) is larger than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        if self.separators.is_empty() {
            return Err(ChunkFailure::InvalidStrategy(
                "at least one separator is required".to_string(),
            ));
        }
        Ok(())
    }
}

/// Partial override of a splitter, as written in configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyOverride {
    pub chunk_size: Option<usize>,
    pub chunk_overlap: Option<usize>,
    pub separators: Option<Vec<String>>,
    pub separator_regex: Option<bool>,
}

impl StrategyOverride {
    fn apply(&self, base: &SplitterConfig) -> SplitterConfig {
        SplitterConfig {
            chunk_size: self.chunk_size.unwrap_or(base.chunk_size),
            chunk_overlap: self.chunk_overlap.unwrap_or(base.chunk_overlap),
            separators: self
                .separators
                .clone()
                .unwrap_or_else(|| base.separators.clone()),
            separator_regex: self.separator_regex.unwrap_or(base.separator_regex),
        }
    }
}

/// How one file is cut into chunks
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChunkStrategy {
    /// Recursive separator-priority, size-bounded merge
    Recursive(SplitterConfig),
    /// Split on header hierarchy, then re-split sections over
    /// `resplit.chunk_size` characters
    MarkdownHeaders {
        max_level: usize,
        resplit: SplitterConfig,
    },
}

impl ChunkStrategy {
    pub fn validate(&self) -> Result<(), ChunkFailure> {
        match self {
            Self::Recursive(config) => config.validate(),
            Self::MarkdownHeaders { max_level, resplit } => {
                if *max_level == 0 || *max_level > 6 {
                    return Err(ChunkFailure::InvalidStrategy(format!(
                        "markdown header level must be within 1..=6, got {}",
                        max_level
                    )));
                }
                resplit.validate()
            }
        }
    }

    fn with_override(self, ov: &StrategyOverride) -> Self {
        match self {
            Self::Recursive(config) => Self::Recursive(ov.apply(&config)),
            Self::MarkdownHeaders { max_level, resplit } => Self::MarkdownHeaders {
                max_level,
                resplit: ov.apply(&resplit),
            },
        }
    }
}

/// Resolved strategy for every key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyTable {
    strategies: BTreeMap<StrategyKey, ChunkStrategy>,
}

impl Default for StrategyTable {
    fn default() -> Self {
        Self::with_overrides(&BTreeMap::new())
    }
}

impl StrategyTable {
    /// Built-in table with per-key overrides layered on top
    pub fn with_overrides(overrides: &BTreeMap<StrategyKey, StrategyOverride>) -> Self {
        let strategies = StrategyKey::ALL
            .into_iter()
            .map(|key| {
                let strategy = match overrides.get(&key) {
                    Some(ov) => key.builtin().with_override(ov),
                    None => key.builtin(),
                };
                (key, strategy)
            })
            .collect();
        Self { strategies }
    }

    /// Strategy for a key; every key is always present
    pub fn get(&self, key: StrategyKey) -> ChunkStrategy {
        self.strategies
            .get(&key)
            .cloned()
            .unwrap_or_else(|| key.builtin())
    }

    /// Resolve a normalized extension to its key and strategy
    pub fn resolve(&self, extension: &str) -> (StrategyKey, ChunkStrategy) {
        let key = StrategyKey::for_extension(extension);
        (key, self.get(key))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&StrategyKey, &ChunkStrategy)> {
        self.strategies.iter()
    }

    /// First invalid entry, if any
    pub fn validate(&self) -> Result<(), (StrategyKey, ChunkFailure)> {
        for (key, strategy) in &self.strategies {
            strategy.validate().map_err(|e| (*key, e))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_resolution() {
        assert_eq!(StrategyKey::for_extension(".py"), StrategyKey::Python);
        assert_eq!(StrategyKey::for_extension(".markdown"), StrategyKey::Markdown);
        assert_eq!(StrategyKey::for_extension(".j2"), StrategyKey::Jinja);
        assert_eq!(StrategyKey::for_extension(".yml"), StrategyKey::Yaml);
        assert_eq!(StrategyKey::for_extension(".rs"), StrategyKey::Default);
        assert_eq!(StrategyKey::for_extension(""), StrategyKey::Default);
    }

    #[test]
    fn test_every_extension_maps_to_one_key() {
        for key in StrategyKey::ALL {
            for ext in key.extensions() {
                assert_eq!(StrategyKey::for_extension(ext), key);
            }
        }
    }

    #[test]
    fn test_builtins_are_valid() {
        assert!(StrategyTable::default().validate().is_ok());
    }

    #[test]
    fn test_builtin_values() {
        let table = StrategyTable::default();
        match table.get(StrategyKey::Yaml) {
            ChunkStrategy::Recursive(c) => {
                assert_eq!((c.chunk_size, c.chunk_overlap), (300, 50));
                assert_eq!(c.separators, vec!["---", "\n\n", "\n"]);
            }
            other => panic!("unexpected strategy {:?}", other),
        }
        match table.get(StrategyKey::Rst) {
            ChunkStrategy::Recursive(c) => assert!(c.separator_regex),
            other => panic!("unexpected strategy {:?}", other),
        }
    }

    #[test]
    fn test_override_applies_partially() {
        let mut overrides = BTreeMap::new();
        overrides.insert(
            StrategyKey::Default,
            StrategyOverride {
                chunk_size: Some(1000),
                ..Default::default()
            },
        );
        let table = StrategyTable::with_overrides(&overrides);
        match table.get(StrategyKey::Default) {
            ChunkStrategy::Recursive(c) => {
                assert_eq!(c.chunk_size, 1000);
                assert_eq!(c.chunk_overlap, 50);
            }
            other => panic!("unexpected strategy {:?}", other),
        }
    }

    #[test]
    fn test_markdown_override_sets_resplit() {
        let mut overrides = BTreeMap::new();
        overrides.insert(
            StrategyKey::Markdown,
            StrategyOverride {
                chunk_size: Some(800),
                ..Default::default()
            },
        );
        let table = StrategyTable::with_overrides(&overrides);
        match table.get(StrategyKey::Markdown) {
            ChunkStrategy::MarkdownHeaders { resplit, .. } => assert_eq!(resplit.chunk_size, 800),
            other => panic!("unexpected strategy {:?}", other),
        }
    }

    #[test]
    fn test_overlap_larger_than_size_is_invalid() {
        let config = SplitterConfig::new(10, 20, &["\n"]);
        assert!(matches!(
            config.validate(),
            Err(ChunkFailure::InvalidStrategy(_))
        ));
    }
}
