//! Repochunk Core Library
//!
//! Turns a repository dump into metadata-enriched chunks ready for embedding.
//!
//! # Features
//! - Dump parsing into per-file records
//! - Structural metadata via tree-sitter, markdown, template and YAML/JSON extractors
//! - Per-extension chunking strategies with recursive separator splitting
//! - Markdown header-hierarchy splitting with header paths on every chunk
//! - Concurrent, cancellable runs with per-file failure isolation
//! - Index sink boundary with batched upserts

pub mod chunking;
pub mod compose;
pub mod config;
pub mod dump;
pub mod error;
pub mod metadata;
pub mod pipeline;
pub mod sink;

pub use chunking::{
    Chunk, ChunkRun, ChunkStrategy, ChunkingEngine, SkippedFile, SourceFile, SplitterConfig,
    StrategyKey, StrategyOverride, StrategyTable,
};
pub use compose::{compose, ChunkMetadata, MetadataComposer};
pub use config::{Config, IndexConfig, PipelineConfig};
pub use dump::{parse_dump, read_dump, render_dump, RawFileRecord};
pub use error::{ChunkFailure, Error, RepoChunkError, Result};
pub use metadata::{
    extract_file_metadata, extract_file_metadata_with_issues, FileMetadata, MetadataIssue,
    RepositoryMetadata, StructuralMetadata,
};
pub use pipeline::{
    FileOutcome, Pipeline, PipelineObserver, PreparedRun, RunLimits, RunOutput, RunReport,
    TracingObserver,
};
pub use sink::{index_dump, Distance, Embedder, IndexOptions, IndexSink, JsonlSink, MemorySink};

/// Default config directory name
pub const CONFIG_DIR_NAME: &str = "repochunk";
