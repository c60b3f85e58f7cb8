//! Error types for repochunk

use thiserror::Error;

/// Result type alias using RepoChunkError
pub type Result<T> = std::result::Result<T, RepoChunkError>;

/// Error type alias for convenience
pub type Error = RepoChunkError;

/// Exit codes for CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const NOT_FOUND: i32 = 2;
    pub const INVALID_INPUT: i32 = 3;
}

/// Run-level error type for repochunk
///
/// Only conditions that make the whole input unusable end up here. Problems
/// scoped to a single file are reported through [`ChunkFailure`] and
/// [`crate::metadata::MetadataIssue`] instead.
#[derive(Debug, Error)]
pub enum RepoChunkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Dump not found: {0}")]
    DumpNotFound(String),

    #[error("Empty input: {0}")]
    EmptyInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Index sink error: {0}")]
    Sink(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl RepoChunkError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::DumpNotFound(_) => exit_codes::NOT_FOUND,
            Self::EmptyInput(_) | Self::InvalidInput(_) | Self::Config(_) => {
                exit_codes::INVALID_INPUT
            }
            _ => exit_codes::GENERAL_ERROR,
        }
    }
}

/// Why a single file produced no chunks
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum ChunkFailure {
    #[error("invalid chunking strategy: {0}")]
    InvalidStrategy(String),

    #[error("chunking panicked: {0}")]
    Panicked(String),
}

impl ChunkFailure {
    /// Build a failure from a caught panic payload
    pub fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        Self::Panicked(panic_message(payload.as_ref()))
    }
}

/// Text of a caught panic payload
pub fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(
            RepoChunkError::EmptyInput("dump.txt".into()).exit_code(),
            exit_codes::INVALID_INPUT
        );
        assert_eq!(
            RepoChunkError::DumpNotFound("dump.txt".into()).exit_code(),
            exit_codes::NOT_FOUND
        );
        assert_eq!(
            RepoChunkError::Sink("down".into()).exit_code(),
            exit_codes::GENERAL_ERROR
        );
    }

    #[test]
    fn test_failure_from_panic_payload() {
        let payload = std::panic::catch_unwind(|| panic!("boom")).unwrap_err();
        assert_eq!(
            ChunkFailure::from_panic(payload),
            ChunkFailure::Panicked("boom".to_string())
        );
    }
}
