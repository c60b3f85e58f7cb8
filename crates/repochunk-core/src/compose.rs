//! Chunk metadata composition
//!
//! Repository fields are laid down first, file fields overlay them and
//! chunk-local fields overlay both, so the most specific value wins on a key
//! collision. Keys are never renamed.

use crate::metadata::{FileMetadata, RepositoryMetadata};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key holding a chunk's 0-based position within its file
pub const CHUNK_INDEX_KEY: &str = "chunk_index";

/// Flat metadata attached to one chunk
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChunkMetadata(Map<String, Value>);

impl ChunkMetadata {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    fn overlay(&mut self, fields: Map<String, Value>) {
        for (key, value) in fields {
            self.0.insert(key, value);
        }
    }
}

impl From<Map<String, Value>> for ChunkMetadata {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Merge repository, file and chunk-local fields into one record
pub fn compose(
    file: &FileMetadata,
    repository: &RepositoryMetadata,
    local: Map<String, Value>,
) -> ChunkMetadata {
    MetadataComposer::new(file, repository).compose(local)
}

/// Composer with the repository and file layers merged once per file
pub struct MetadataComposer {
    base: ChunkMetadata,
}

impl MetadataComposer {
    pub fn new(file: &FileMetadata, repository: &RepositoryMetadata) -> Self {
        let mut base = ChunkMetadata::default();
        base.overlay(repository.to_fields());
        base.overlay(to_fields(file));
        Self { base }
    }

    pub fn compose(&self, local: Map<String, Value>) -> ChunkMetadata {
        let mut metadata = self.base.clone();
        metadata.overlay(local);
        metadata
    }
}

fn to_fields(file: &FileMetadata) -> Map<String, Value> {
    match serde_json::to_value(file) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            tracing::warn!(path = %file.path, value = %other, "File metadata is not an object");
            Map::new()
        }
        Err(e) => {
            tracing::warn!(path = %file.path, error = %e, "Failed to serialize file metadata");
            Map::new()
        }
    }
}
