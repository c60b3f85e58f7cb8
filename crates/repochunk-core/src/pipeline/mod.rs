//! Concurrent chunking runs
//!
//! A run parses the dump and computes the repository metadata once
//! ([`Pipeline::prepare`]). Each file is then extracted and chunked as one
//! unit on a bounded pool of blocking workers ([`Pipeline::stream`]). Chunk
//! order within a file is preserved; order across files is not.

pub mod observer;

pub use observer::{PipelineObserver, TracingObserver};

use crate::chunking::{Chunk, ChunkingEngine, SkippedFile, SourceFile};
use crate::config::Config;
use crate::dump::{parse_dump, read_dump, RawFileRecord};
use crate::error::{ChunkFailure, Result};
use crate::metadata::{MetadataIssue, RepositoryMetadata};
use chrono::{DateTime, Utc};
use futures::future;
use futures::stream::{self, BoxStream, StreamExt};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Files chunked concurrently when nothing else is configured
pub const DEFAULT_WORKERS: usize = 4;

/// Parsed dump with repository metadata, ready for chunking
#[derive(Debug, Clone)]
pub struct PreparedRun {
    pub records: Vec<RawFileRecord>,
    pub repository: RepositoryMetadata,
}

impl PreparedRun {
    /// Number of files in the dump
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Stop conditions for a run
///
/// Once cancelled or past the deadline, no new file is scheduled. Files
/// already in flight finish and are reported.
#[derive(Debug, Clone)]
pub struct RunLimits {
    pub cancel: CancellationToken,
    pub deadline: Option<Instant>,
}

impl Default for RunLimits {
    fn default() -> Self {
        Self::none()
    }
}

impl RunLimits {
    pub fn none() -> Self {
        Self {
            cancel: CancellationToken::new(),
            deadline: None,
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            cancel: CancellationToken::new(),
            deadline: Some(Instant::now() + timeout),
        }
    }

    pub fn with_cancel(cancel: CancellationToken) -> Self {
        Self {
            cancel,
            deadline: None,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.cancel.is_cancelled() || self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}

/// What happened to one file
#[derive(Debug, Clone)]
pub struct FileOutcome {
    /// Position of the file in the dump
    pub index: usize,
    pub path: String,
    pub chunks: std::result::Result<Vec<Chunk>, ChunkFailure>,
    pub issues: Vec<MetadataIssue>,
}

/// Summary of a run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub files_total: usize,
    pub files_chunked: usize,
    pub files_skipped: Vec<SkippedFile>,
    /// Files never started because the run was cancelled
    pub files_not_scheduled: usize,
    pub chunks_emitted: usize,
    pub metadata_issues: usize,
    pub cancelled: bool,
}

/// Accumulates a [`RunReport`] from file outcomes
pub struct ReportBuilder {
    report: RunReport,
    started: std::time::Instant,
}

impl ReportBuilder {
    pub fn new(files_total: usize) -> Self {
        Self {
            report: RunReport {
                started_at: Utc::now(),
                duration_ms: 0,
                files_total,
                files_chunked: 0,
                files_skipped: Vec::new(),
                files_not_scheduled: 0,
                chunks_emitted: 0,
                metadata_issues: 0,
                cancelled: false,
            },
            started: std::time::Instant::now(),
        }
    }

    pub fn record(&mut self, outcome: &FileOutcome) {
        self.report.metadata_issues += outcome.issues.len();
        match &outcome.chunks {
            Ok(chunks) => {
                self.report.files_chunked += 1;
                self.report.chunks_emitted += chunks.len();
            }
            Err(reason) => self.report.files_skipped.push(SkippedFile {
                path: outcome.path.clone(),
                reason: reason.clone(),
            }),
        }
    }

    pub fn finish(mut self) -> RunReport {
        let seen = self.report.files_chunked + self.report.files_skipped.len();
        self.report.files_not_scheduled = self.report.files_total.saturating_sub(seen);
        self.report.cancelled = self.report.files_not_scheduled > 0;
        self.report.duration_ms = self
            .started
            .elapsed()
            .as_millis()
            .try_into()
            .unwrap_or(u64::MAX);
        self.report
    }
}

/// Chunks plus the report of a completed run
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub chunks: Vec<Chunk>,
    pub report: RunReport,
}

/// Drives dumps through extraction and chunking
#[derive(Clone)]
pub struct Pipeline {
    engine: Arc<ChunkingEngine>,
    workers: usize,
    observer: Arc<dyn PipelineObserver>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(ChunkingEngine::default())
    }
}

impl Pipeline {
    pub fn new(engine: ChunkingEngine) -> Self {
        Self {
            engine: Arc::new(engine),
            workers: DEFAULT_WORKERS,
            observer: Arc::new(TracingObserver),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(ChunkingEngine::new(config.strategy_table())).with_workers(config.pipeline.workers)
    }

    pub fn with_workers(self, workers: usize) -> Self {
        Self {
            workers: workers.max(1),
            ..self
        }
    }

    pub fn with_observer(self, observer: Arc<dyn PipelineObserver>) -> Self {
        Self { observer, ..self }
    }

    pub fn engine(&self) -> &ChunkingEngine {
        &self.engine
    }

    pub fn observer(&self) -> &dyn PipelineObserver {
        self.observer.as_ref()
    }

    /// Parse a dump and compute repository metadata
    ///
    /// Per-file extraction is deferred to [`Self::stream`].
    pub fn prepare(&self, dump: &str, repo_url: &str) -> PreparedRun {
        let records = parse_dump(dump);
        let repository = RepositoryMetadata::from_records(repo_url, &records);
        PreparedRun {
            records,
            repository,
        }
    }

    /// Extract and chunk files concurrently, yielding one outcome per file
    pub fn stream(&self, prepared: PreparedRun, limits: RunLimits) -> BoxStream<'static, FileOutcome> {
        let PreparedRun {
            records,
            repository,
        } = prepared;
        let repository = Arc::new(repository);
        let engine = Arc::clone(&self.engine);
        let observer = Arc::clone(&self.observer);

        stream::iter(records.into_iter().enumerate())
            .take_while(move |_| future::ready(!limits.is_expired()))
            .map(move |(index, record)| {
                let engine = Arc::clone(&engine);
                let repository = Arc::clone(&repository);
                async move {
                    let path = record.path.clone();
                    let joined = tokio::task::spawn_blocking(move || {
                        let file = SourceFile::extract(record);
                        let chunks = engine.chunk_file_isolated(&file, &repository);
                        (file.issue, chunks)
                    })
                    .await;
                    let (issues, chunks) = match joined {
                        Ok((issue, chunks)) => (issue.into_iter().collect(), chunks),
                        Err(e) => (Vec::new(), Err(ChunkFailure::Panicked(e.to_string()))),
                    };
                    FileOutcome {
                        index,
                        path,
                        chunks,
                        issues,
                    }
                }
            })
            .buffer_unordered(self.workers)
            .inspect(move |outcome| notify(observer.as_ref(), outcome))
            .boxed()
    }

    /// Run a dump to completion and collect every chunk
    ///
    /// Chunks are returned grouped by file in dump order.
    pub async fn run(&self, dump: &str, repo_url: &str, limits: RunLimits) -> RunOutput {
        let prepared = self.prepare(dump, repo_url);
        tracing::info!(
            files = prepared.len(),
            repository = %prepared.repository.name,
            "Starting run"
        );

        let mut builder = ReportBuilder::new(prepared.len());
        let mut outcomes: Vec<FileOutcome> = self.stream(prepared, limits).collect().await;
        outcomes.sort_by_key(|o| o.index);

        let mut chunks = Vec::new();
        for outcome in outcomes {
            builder.record(&outcome);
            if let Ok(file_chunks) = outcome.chunks {
                chunks.extend(file_chunks);
            }
        }

        let report = builder.finish();
        self.observer.on_run_finished(&report);
        RunOutput { chunks, report }
    }

    /// Read a dump file and run it
    ///
    /// A missing or blank dump file is the only fatal input condition.
    pub async fn run_path(&self, path: &Path, repo_url: &str, limits: RunLimits) -> Result<RunOutput> {
        let dump = read_dump(path)?;
        Ok(self.run(&dump, repo_url, limits).await)
    }
}

fn notify(observer: &dyn PipelineObserver, outcome: &FileOutcome) {
    for issue in &outcome.issues {
        observer.on_metadata_issue(&outcome.path, issue);
    }
    match &outcome.chunks {
        Ok(chunks) => observer.on_file_chunked(&outcome.path, chunks.len()),
        Err(reason) => observer.on_file_skipped(&outcome.path, reason),
    }
}
