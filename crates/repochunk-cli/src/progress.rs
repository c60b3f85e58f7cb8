//! Progress reporting

use repochunk_core::{ChunkFailure, MetadataIssue, PipelineObserver, RunReport, TracingObserver};
use std::io::{self, Write};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Prints a running file count to stderr, forwarding events to tracing
pub struct ProgressReporter {
    total: usize,
    processed: AtomicUsize,
    tracing: TracingObserver,
}

impl ProgressReporter {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            processed: AtomicUsize::new(0),
            tracing: TracingObserver,
        }
    }

    fn increment(&self, path: &str) {
        let processed = self.processed.fetch_add(1, Ordering::Relaxed) + 1;
        eprint!("\r[{}/{}] {:<50}", processed, self.total, truncate(path, 50));
        io::stderr().flush().ok();
    }
}

impl PipelineObserver for ProgressReporter {
    fn on_file_chunked(&self, path: &str, chunks: usize) {
        self.tracing.on_file_chunked(path, chunks);
        self.increment(path);
    }

    fn on_file_skipped(&self, path: &str, reason: &ChunkFailure) {
        self.tracing.on_file_skipped(path, reason);
        self.increment(path);
    }

    fn on_metadata_issue(&self, path: &str, issue: &MetadataIssue) {
        self.tracing.on_metadata_issue(path, issue);
    }

    fn on_run_finished(&self, report: &RunReport) {
        self.tracing.on_run_finished(report);
        eprintln!(
            "\rDone ({}/{})                    ",
            self.processed.load(Ordering::Relaxed),
            self.total
        );
    }
}

fn truncate(path: &str, max: usize) -> String {
    let len = path.chars().count();
    if len <= max {
        path.to_string()
    } else {
        let tail: String = path.chars().skip(len - max + 3).collect();
        format!("...{}", tail)
    }
}
