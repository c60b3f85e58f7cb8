//! Chunk command

use crate::app::{ChunkArgs, OutputFormat};
use crate::output::format_report;
use crate::progress::ProgressReporter;
use anyhow::{Context, Result};
use futures::StreamExt;
use repochunk_core::pipeline::ReportBuilder;
use repochunk_core::{read_dump, Config, JsonlSink, Pipeline, RunLimits};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::sync::Arc;
use std::time::Duration;

pub async fn run(args: ChunkArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let dump = read_dump(&args.dump)?;

    let mut pipeline = Pipeline::from_config(config);
    if let Some(workers) = args.workers {
        pipeline = pipeline.with_workers(workers);
    }

    let prepared = pipeline.prepare(&dump, &args.repo_url);
    if args.progress {
        pipeline = pipeline.with_observer(Arc::new(ProgressReporter::new(prepared.len())));
    }

    let limits = match args.timeout_secs.or(config.pipeline.timeout_secs) {
        Some(secs) => RunLimits::with_timeout(Duration::from_secs(secs)),
        None => RunLimits::none(),
    };
    let cancel = limits.cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    let writer: Box<dyn Write + Send> = match &args.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("creating {}", path.display()))?,
        )),
        None => Box::new(io::stdout()),
    };
    let sink = JsonlSink::new(writer);
    let collection = args
        .collection
        .unwrap_or_else(|| config.index.collection_name.clone());

    let mut builder = ReportBuilder::new(prepared.len());
    let mut outcomes = pipeline.stream(prepared, limits);
    while let Some(outcome) = outcomes.next().await {
        builder.record(&outcome);
        if let Ok(chunks) = &outcome.chunks {
            sink.write_chunks(&collection, chunks)?;
        }
    }

    let report = builder.finish();
    pipeline.observer().on_run_finished(&report);
    eprint!("{}", format_report(&report, format));
    Ok(())
}
