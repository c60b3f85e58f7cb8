//! Configuration management

use crate::chunking::{StrategyKey, StrategyOverride, StrategyTable};
use crate::error::{RepoChunkError, Result};
use crate::sink::Distance;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Run-level pipeline settings
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Index sink settings
    #[serde(default)]
    pub index: IndexConfig,

    /// Per-strategy splitter overrides
    #[serde(default)]
    pub strategies: BTreeMap<StrategyKey, StrategyOverride>,
}

/// Pipeline concurrency and limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Files chunked concurrently
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Chunks handed to the sink per upsert
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Stop scheduling new files after this many seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            batch_size: default_batch_size(),
            timeout_secs: None,
        }
    }
}

fn default_workers() -> usize {
    std::env::var("REPOCHUNK_WORKERS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
        })
}

fn default_batch_size() -> usize {
    std::env::var("REPOCHUNK_BATCH_SIZE")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(64)
}

/// Target collection in the index sink
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    #[serde(default = "default_collection_name")]
    pub collection_name: String,

    #[serde(default)]
    pub distance: Distance,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            collection_name: default_collection_name(),
            distance: Distance::default(),
        }
    }
}

fn default_collection_name() -> String {
    std::env::var("REPOCHUNK_COLLECTION").unwrap_or_else(|_| "repository".to_string())
}

impl Config {
    /// Load config from default path
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Config::default())
        }
    }

    /// Load config from an explicit path, which must exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(RepoChunkError::Config(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get default config path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::CONFIG_DIR_NAME)
            .join("config.yml")
    }

    /// Strategy table with this config's overrides applied
    pub fn strategy_table(&self) -> StrategyTable {
        StrategyTable::with_overrides(&self.strategies)
    }

    pub fn validate(&self) -> Result<()> {
        if self.pipeline.workers == 0 {
            return Err(RepoChunkError::Config(
                "pipeline.workers must be greater than 0".to_string(),
            ));
        }
        if self.pipeline.batch_size == 0 {
            return Err(RepoChunkError::Config(
                "pipeline.batch_size must be greater than 0".to_string(),
            ));
        }
        if self.index.collection_name.trim().is_empty() {
            return Err(RepoChunkError::Config(
                "index.collection_name must not be empty".to_string(),
            ));
        }
        self.strategy_table()
            .validate()
            .map_err(|(key, e)| RepoChunkError::Config(format!("strategies.{}: {}", key, e)))
    }
}
