//! Index sink boundary tests with fake collaborators

use async_trait::async_trait;
use repochunk_core::sink::PROBE_TEXT;
use repochunk_core::{
    index_dump, render_dump, Chunk, Distance, Embedder, IndexOptions, IndexSink, MemorySink,
    Pipeline, RawFileRecord, RepoChunkError, Result, RunLimits,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

const REPO_URL: &str = "https://github.com/acme/widgets";

struct FakeEmbedder {
    dimensions: usize,
    calls: Mutex<Vec<String>>,
}

impl FakeEmbedder {
    fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Embedder for FakeEmbedder {
    async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.lock().unwrap().push(text.to_string());
        Ok(vec![0.5; self.dimensions])
    }
}

struct FailingEmbedder;

#[async_trait]
impl Embedder for FailingEmbedder {
    async fn embed_one(&self, _text: &str) -> Result<Vec<f32>> {
        Err(RepoChunkError::Embedding("model offline".to_string()))
    }
}

/// Memory sink that also counts upsert batches
#[derive(Default)]
struct CountingSink {
    inner: MemorySink,
    batches: AtomicUsize,
    largest_batch: AtomicUsize,
}

#[async_trait]
impl IndexSink for CountingSink {
    async fn ensure_collection(
        &self,
        name: &str,
        dimensions: usize,
        distance: Distance,
    ) -> Result<()> {
        self.inner.ensure_collection(name, dimensions, distance).await
    }

    async fn upsert(&self, collection: &str, chunks: &[Chunk]) -> Result<()> {
        self.batches.fetch_add(1, Ordering::SeqCst);
        self.largest_batch.fetch_max(chunks.len(), Ordering::SeqCst);
        self.inner.upsert(collection, chunks).await
    }
}

fn sample_dump() -> String {
    let body: String = (0..120).map(|i| format!("line number {}\n", i)).collect();
    let records = vec![
        RawFileRecord {
            path: "notes.txt".into(),
            content: body,
        },
        RawFileRecord {
            path: "README.md".into(),
            content: "# Widgets\n\nA widget library.\n\n## Usage\n\nCall it.".into(),
        },
    ];
    render_dump(&records)
}

fn options(batch_size: usize) -> IndexOptions {
    IndexOptions {
        collection_name: "widgets".to_string(),
        distance: Distance::Cosine,
        batch_size,
    }
}

#[tokio::test]
async fn test_index_dump_probes_once_and_upserts_everything() {
    let pipeline = Pipeline::default();
    let prepared = pipeline.prepare(&sample_dump(), REPO_URL);
    let embedder = FakeEmbedder::new(8);
    let sink = CountingSink::default();

    let report = index_dump(
        &pipeline,
        prepared,
        &embedder,
        &sink,
        &options(2),
        RunLimits::none(),
    )
    .await
    .unwrap();

    assert_eq!(*embedder.calls.lock().unwrap(), vec![PROBE_TEXT.to_string()]);

    let collection = sink.inner.collection("widgets").unwrap();
    assert_eq!(collection.dimensions, 8);
    assert_eq!(collection.distance, Distance::Cosine);
    assert_eq!(collection.chunks.len(), report.chunks_emitted);
    assert!(report.chunks_emitted > 2);
    assert_eq!(report.files_chunked, 2);

    assert!(sink.largest_batch.load(Ordering::SeqCst) <= 2);
    assert_eq!(
        sink.batches.load(Ordering::SeqCst),
        report.chunks_emitted.div_ceil(2)
    );
}

#[tokio::test]
async fn test_index_dump_twice_is_idempotent() {
    let pipeline = Pipeline::default();
    let embedder = FakeEmbedder::new(4);
    let sink = MemorySink::new();

    for _ in 0..2 {
        let prepared = pipeline.prepare(&sample_dump(), REPO_URL);
        index_dump(
            &pipeline,
            prepared,
            &embedder,
            &sink,
            &options(16),
            RunLimits::none(),
        )
        .await
        .unwrap();
    }

    let once = pipeline
        .run(&sample_dump(), REPO_URL, RunLimits::none())
        .await;
    assert_eq!(sink.len("widgets"), once.chunks.len());
}

#[tokio::test]
async fn test_embedder_failure_aborts_before_chunking() {
    let pipeline = Pipeline::default();
    let prepared = pipeline.prepare(&sample_dump(), REPO_URL);
    let sink = MemorySink::new();

    let err = index_dump(
        &pipeline,
        prepared,
        &FailingEmbedder,
        &sink,
        &options(4),
        RunLimits::none(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, RepoChunkError::Embedding(_)));
    assert!(sink.collection("widgets").is_none());
}

#[tokio::test]
async fn test_zero_batch_size_rejected() {
    let pipeline = Pipeline::default();
    let prepared = pipeline.prepare(&sample_dump(), REPO_URL);
    let err = index_dump(
        &pipeline,
        prepared,
        &FakeEmbedder::new(4),
        &MemorySink::new(),
        &options(0),
        RunLimits::none(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, RepoChunkError::InvalidInput(_)));
}
