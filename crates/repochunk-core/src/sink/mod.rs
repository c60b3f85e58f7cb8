//! Index sink boundary
//!
//! Embedding and vector storage live outside this crate. They are reached
//! through the [`Embedder`] and [`IndexSink`] traits; [`index_dump`] wires a
//! pipeline run into them with batched upserts.

pub mod jsonl;
pub mod memory;

pub use jsonl::JsonlSink;
pub use memory::MemorySink;

use crate::chunking::Chunk;
use crate::config::Config;
use crate::error::{RepoChunkError, Result};
use crate::pipeline::{Pipeline, PreparedRun, ReportBuilder, RunLimits, RunReport};
use async_trait::async_trait;
use futures::StreamExt;
use serde::{Deserialize, Serialize};

/// Text used to probe the embedder for its vector size
pub const PROBE_TEXT: &str = "test";

/// Embedding generation
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate embedding for single text
    async fn embed_one(&self, text: &str) -> Result<Vec<f32>>;

    /// Get model name
    fn model_name(&self) -> &str {
        "unknown"
    }
}

/// Vector distance metric of a collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Distance {
    #[default]
    Cosine,
    Euclid,
    Dot,
}

impl std::fmt::Display for Distance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Cosine => "cosine",
            Self::Euclid => "euclid",
            Self::Dot => "dot",
        };
        f.write_str(name)
    }
}

/// Destination for finished chunks
#[async_trait]
pub trait IndexSink: Send + Sync {
    /// Create the collection unless it already exists
    async fn ensure_collection(&self, name: &str, dimensions: usize, distance: Distance)
        -> Result<()>;

    /// Insert or replace chunks, keyed by [`Chunk::id`]
    async fn upsert(&self, collection: &str, chunks: &[Chunk]) -> Result<()>;
}

/// Where and how chunks are indexed
#[derive(Debug, Clone)]
pub struct IndexOptions {
    pub collection_name: String,
    pub distance: Distance,
    pub batch_size: usize,
}

impl IndexOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            collection_name: config.index.collection_name.clone(),
            distance: config.index.distance,
            batch_size: config.pipeline.batch_size,
        }
    }
}

/// Chunk a prepared dump and hand the chunks to a sink in batches
///
/// The embedder is called once, before any chunking, to size the
/// collection. Sink failures abort the run; per-file chunking failures do
/// not.
pub async fn index_dump(
    pipeline: &Pipeline,
    prepared: PreparedRun,
    embedder: &dyn Embedder,
    sink: &dyn IndexSink,
    options: &IndexOptions,
    limits: RunLimits,
) -> Result<RunReport> {
    if options.batch_size == 0 {
        return Err(RepoChunkError::InvalidInput(
            "batch_size must be greater than 0".to_string(),
        ));
    }

    let probe = embedder.embed_one(PROBE_TEXT).await?;
    if probe.is_empty() {
        return Err(RepoChunkError::Embedding(format!(
            "model {} returned an empty vector",
            embedder.model_name()
        )));
    }
    sink.ensure_collection(&options.collection_name, probe.len(), options.distance)
        .await?;
    tracing::info!(
        collection = %options.collection_name,
        dimensions = probe.len(),
        distance = %options.distance,
        "Collection ready"
    );

    let mut builder = ReportBuilder::new(prepared.len());
    let mut pending: Vec<Chunk> = Vec::with_capacity(options.batch_size);
    let mut outcomes = pipeline.stream(prepared, limits);

    while let Some(outcome) = outcomes.next().await {
        builder.record(&outcome);
        if let Ok(chunks) = outcome.chunks {
            pending.extend(chunks);
        }
        while pending.len() >= options.batch_size {
            let batch: Vec<Chunk> = pending.drain(..options.batch_size).collect();
            sink.upsert(&options.collection_name, &batch).await?;
        }
    }
    if !pending.is_empty() {
        sink.upsert(&options.collection_name, &pending).await?;
    }

    let report = builder.finish();
    pipeline.observer().on_run_finished(&report);
    Ok(report)
}
