//! Run observers

use super::RunReport;
use crate::error::ChunkFailure;
use crate::metadata::MetadataIssue;
use tracing::{debug, info, warn};

/// Receives per-file and per-run events from a pipeline
///
/// All methods default to doing nothing. Observers are called from the task
/// driving the run and should return quickly.
pub trait PipelineObserver: Send + Sync {
    fn on_file_chunked(&self, _path: &str, _chunks: usize) {}

    fn on_file_skipped(&self, _path: &str, _reason: &ChunkFailure) {}

    fn on_metadata_issue(&self, _path: &str, _issue: &MetadataIssue) {}

    fn on_run_finished(&self, _report: &RunReport) {}
}

/// Default observer: emits tracing events
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl PipelineObserver for TracingObserver {
    fn on_file_chunked(&self, path: &str, chunks: usize) {
        debug!(path = %path, chunks, "File chunked");
    }

    fn on_file_skipped(&self, path: &str, reason: &ChunkFailure) {
        warn!(path = %path, error = %reason, "File skipped");
    }

    fn on_metadata_issue(&self, path: &str, issue: &MetadataIssue) {
        info!(path = %path, issue = %issue, "Structural metadata omitted");
    }

    fn on_run_finished(&self, report: &RunReport) {
        info!(
            files = report.files_total,
            chunked = report.files_chunked,
            skipped = report.files_skipped.len(),
            chunks = report.chunks_emitted,
            duration_ms = report.duration_ms,
            cancelled = report.cancelled,
            "Run finished"
        );
    }
}
