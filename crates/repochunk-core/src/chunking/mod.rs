//! Strategy-driven chunking
//!
//! Each file is cut according to the strategy its extension resolves to,
//! and every resulting piece is emitted as a [`Chunk`] carrying composed
//! metadata. A file that fails to chunk is skipped on its own; the rest of
//! the run is unaffected.

pub mod markdown;
pub mod recursive;
pub mod strategy;

pub use markdown::{header_key, HeaderPath, HeaderSection, MarkdownHeaderSplitter};
pub use recursive::{char_len, RecursiveSplitter};
pub use strategy::{
    ChunkStrategy, SplitterConfig, StrategyKey, StrategyOverride, StrategyTable,
    MARKDOWN_MAX_HEADER_LEVEL, MARKDOWN_RESPLIT_THRESHOLD,
};

use crate::compose::{ChunkMetadata, MetadataComposer, CHUNK_INDEX_KEY};
use crate::dump::RawFileRecord;
use crate::error::ChunkFailure;
use crate::metadata::{
    extract_file_metadata_with_issues, FileMetadata, MetadataIssue, RepositoryMetadata,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{debug, warn};

/// A bounded span of one file's text with its composed metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Stable identifier derived from path, position and text
    pub id: String,
    pub text: String,
    pub metadata: ChunkMetadata,
}

/// Stable 32-hex-char chunk identifier
pub fn chunk_id(path: &str, index: usize, text: &str) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(path.as_bytes());
    hasher.update(b"\0");
    hasher.update(index.to_string().as_bytes());
    hasher.update(b"\0");
    hasher.update(text.as_bytes());
    hasher.finalize().to_hex()[..32].to_string()
}

/// A parsed file together with its extracted metadata
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub record: RawFileRecord,
    pub metadata: FileMetadata,
    /// Structural extraction problem absorbed for this file
    pub issue: Option<MetadataIssue>,
}

impl SourceFile {
    pub fn extract(record: RawFileRecord) -> Self {
        let (metadata, issue) = extract_file_metadata_with_issues(&record.path, &record.content);
        Self {
            record,
            metadata,
            issue,
        }
    }

    pub fn path(&self) -> &str {
        &self.record.path
    }
}

/// A piece of text before metadata composition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextPiece {
    pub text: String,
    pub headers: HeaderPath,
}

impl TextPiece {
    fn plain(text: String) -> Self {
        Self {
            text,
            headers: HeaderPath::new(),
        }
    }
}

/// A file that produced no chunks because chunking failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFile {
    pub path: String,
    pub reason: ChunkFailure,
}

/// Result of chunking a batch of files sequentially
#[derive(Debug, Clone, Default)]
pub struct ChunkRun {
    pub chunks: Vec<Chunk>,
    pub skipped: Vec<SkippedFile>,
}

/// Applies the strategy table to files
#[derive(Debug, Clone, Default)]
pub struct ChunkingEngine {
    table: StrategyTable,
}

impl ChunkingEngine {
    pub fn new(table: StrategyTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &StrategyTable {
        &self.table
    }

    /// Cut content into ordered pieces using the strategy for `extension`
    pub fn split(&self, extension: &str, content: &str) -> Result<Vec<TextPiece>, ChunkFailure> {
        let (_, strategy) = self.table.resolve(extension);
        strategy.validate()?;

        match strategy {
            ChunkStrategy::Recursive(config) => {
                let splitter = RecursiveSplitter::new(&config)?;
                Ok(splitter
                    .split_text(content)
                    .into_iter()
                    .map(TextPiece::plain)
                    .collect())
            }
            ChunkStrategy::MarkdownHeaders { max_level, resplit } => {
                let resplitter = RecursiveSplitter::new(&resplit)?;
                let mut pieces = Vec::new();

                for section in MarkdownHeaderSplitter::new(max_level).split_text(content) {
                    if char_len(&section.content) > resplit.chunk_size {
                        pieces.extend(resplitter.split_text(&section.content).into_iter().map(
                            |text| TextPiece {
                                text,
                                headers: section.headers.clone(),
                            },
                        ));
                    } else {
                        let text = section.content.trim();
                        if !text.is_empty() {
                            pieces.push(TextPiece {
                                text: text.to_string(),
                                headers: section.headers,
                            });
                        }
                    }
                }
                Ok(pieces)
            }
        }
    }

    /// Chunk one file, composing metadata for every piece
    pub fn chunk_file(
        &self,
        file: &SourceFile,
        repository: &RepositoryMetadata,
    ) -> Result<Vec<Chunk>, ChunkFailure> {
        let pieces = self.split(&file.metadata.extension, &file.record.content)?;
        let composer = MetadataComposer::new(&file.metadata, repository);

        let chunks: Vec<Chunk> = pieces
            .into_iter()
            .enumerate()
            .map(|(index, piece)| {
                let mut local = Map::new();
                local.insert(CHUNK_INDEX_KEY.to_string(), Value::from(index));
                for (key, value) in piece.headers {
                    local.insert(key, Value::String(value));
                }
                Chunk {
                    id: chunk_id(file.path(), index, &piece.text),
                    metadata: composer.compose(local),
                    text: piece.text,
                }
            })
            .collect();

        debug!(path = %file.path(), chunks = chunks.len(), "Chunked file");
        Ok(chunks)
    }

    /// [`Self::chunk_file`] with panics turned into [`ChunkFailure::Panicked`]
    pub fn chunk_file_isolated(
        &self,
        file: &SourceFile,
        repository: &RepositoryMetadata,
    ) -> Result<Vec<Chunk>, ChunkFailure> {
        catch_unwind(AssertUnwindSafe(|| self.chunk_file(file, repository)))
            .unwrap_or_else(|payload| Err(ChunkFailure::from_panic(payload)))
    }

    /// Chunk files in order, skipping the ones that fail
    pub fn chunk(&self, files: &[SourceFile], repository: &RepositoryMetadata) -> ChunkRun {
        let mut run = ChunkRun::default();
        for file in files {
            match self.chunk_file_isolated(file, repository) {
                Ok(chunks) => run.chunks.extend(chunks),
                Err(reason) => {
                    warn!(path = %file.path(), error = %reason, "Skipping file");
                    run.skipped.push(SkippedFile {
                        path: file.path().to_string(),
                        reason,
                    });
                }
            }
        }
        run
    }
}
