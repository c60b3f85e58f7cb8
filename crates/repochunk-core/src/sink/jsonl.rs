//! Newline-delimited JSON sink

use super::{Distance, IndexSink};
use crate::chunking::Chunk;
use crate::compose::ChunkMetadata;
use crate::error::{RepoChunkError, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::io::Write;
use std::sync::Mutex;

#[derive(Serialize)]
struct JsonlRecord<'a> {
    collection: &'a str,
    id: &'a str,
    text: &'a str,
    metadata: &'a ChunkMetadata,
}

/// Writes one JSON object per chunk to any writer
pub struct JsonlSink<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonlSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Write chunks as lines and flush
    pub fn write_chunks(&self, collection: &str, chunks: &[Chunk]) -> Result<()> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|e| RepoChunkError::Sink(format!("jsonl sink poisoned: {}", e)))?;
        for chunk in chunks {
            let record = JsonlRecord {
                collection,
                id: &chunk.id,
                text: &chunk.text,
                metadata: &chunk.metadata,
            };
            serde_json::to_writer(&mut *writer, &record)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| RepoChunkError::Sink(format!("jsonl sink poisoned: {}", e)))
    }
}

#[async_trait]
impl<W: Write + Send> IndexSink for JsonlSink<W> {
    async fn ensure_collection(
        &self,
        name: &str,
        dimensions: usize,
        distance: Distance,
    ) -> Result<()> {
        tracing::debug!(collection = %name, dimensions, distance = %distance, "JSONL collection");
        Ok(())
    }

    async fn upsert(&self, collection: &str, chunks: &[Chunk]) -> Result<()> {
        self.write_chunks(collection, chunks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map, Value};

    #[tokio::test]
    async fn test_one_line_per_chunk() {
        let mut metadata = Map::new();
        metadata.insert("file_path".into(), json!("a.py"));
        let chunks = vec![
            Chunk {
                id: "1".into(),
                text: "first\nline".into(),
                metadata: ChunkMetadata::from(metadata),
            },
            Chunk {
                id: "2".into(),
                text: "second".into(),
                metadata: ChunkMetadata::default(),
            },
        ];

        let sink = JsonlSink::new(Vec::new());
        sink.ensure_collection("repo", 4, Distance::Cosine).await.unwrap();
        sink.upsert("repo", &chunks).await.unwrap();
        let output = String::from_utf8(sink.into_inner().unwrap()).unwrap();

        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["collection"], "repo");
        assert_eq!(first["text"], "first\nline");
        assert_eq!(first["metadata"]["file_path"], "a.py");
    }
}
