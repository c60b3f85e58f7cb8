//! In-memory index sink

use super::{Distance, IndexSink};
use crate::chunking::Chunk;
use crate::error::{RepoChunkError, Result};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

/// A collection held by [`MemorySink`]
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryCollection {
    pub dimensions: usize,
    pub distance: Distance,
    /// Chunks keyed by id
    pub chunks: BTreeMap<String, Chunk>,
}

/// Keeps collections in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    collections: Mutex<HashMap<String, MemoryCollection>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, MemoryCollection>>> {
        self.collections
            .lock()
            .map_err(|e| RepoChunkError::Sink(format!("memory sink poisoned: {}", e)))
    }

    /// Snapshot of one collection
    pub fn collection(&self, name: &str) -> Option<MemoryCollection> {
        self.lock().ok()?.get(name).cloned()
    }

    /// Number of chunks stored in a collection
    pub fn len(&self, name: &str) -> usize {
        self.collection(name).map(|c| c.chunks.len()).unwrap_or(0)
    }
}

#[async_trait]
impl IndexSink for MemorySink {
    async fn ensure_collection(
        &self,
        name: &str,
        dimensions: usize,
        distance: Distance,
    ) -> Result<()> {
        let mut collections = self.lock()?;
        match collections.get(name) {
            Some(existing) if existing.dimensions != dimensions => Err(RepoChunkError::Sink(
                format!(
                    "collection {} exists with {} dimensions, requested {}",
                    name, existing.dimensions, dimensions
                ),
            )),
            Some(_) => Ok(()),
            None => {
                collections.insert(
                    name.to_string(),
                    MemoryCollection {
                        dimensions,
                        distance,
                        chunks: BTreeMap::new(),
                    },
                );
                Ok(())
            }
        }
    }

    async fn upsert(&self, collection: &str, chunks: &[Chunk]) -> Result<()> {
        let mut collections = self.lock()?;
        let target = collections
            .get_mut(collection)
            .ok_or_else(|| RepoChunkError::Sink(format!("unknown collection: {}", collection)))?;
        for chunk in chunks {
            target.chunks.insert(chunk.id.clone(), chunk.clone());
        }
        Ok(())
    }
}
