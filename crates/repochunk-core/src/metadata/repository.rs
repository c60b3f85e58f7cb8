//! Repository-level metadata shared by every chunk of a run

use super::{file_directory, file_extension};
use crate::dump::RawFileRecord;
use serde::Serialize;
use std::collections::BTreeMap;

/// Directory key used for files at the repository root
pub const ROOT_DIRECTORY: &str = ".";

/// Corpus-level facts, computed once per run and read-only afterwards
///
/// Serializes with flat `repository_`-prefixed keys so it can be overlaid
/// onto file metadata without nesting.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RepositoryMetadata {
    #[serde(rename = "repository_url")]
    pub url: String,
    #[serde(rename = "repository_name")]
    pub name: String,
    #[serde(rename = "repository_organization")]
    pub organization: String,
    #[serde(rename = "repository_total_files")]
    pub total_files: usize,
    /// Extension to file count
    #[serde(rename = "repository_file_types")]
    pub file_types: BTreeMap<String, usize>,
    /// Directory to file count
    #[serde(rename = "repository_directory_structure")]
    pub directory_structure: BTreeMap<String, usize>,
}

impl RepositoryMetadata {
    /// Build repository metadata from the records of one dump
    pub fn from_records(url: &str, records: &[RawFileRecord]) -> Self {
        let (organization, name) = split_repo_url(url);

        let mut file_types = BTreeMap::new();
        let mut directory_structure = BTreeMap::new();
        for record in records {
            *file_types.entry(file_extension(&record.path)).or_insert(0) += 1;

            let dir = file_directory(&record.path);
            let dir = if dir.is_empty() {
                ROOT_DIRECTORY.to_string()
            } else {
                dir
            };
            *directory_structure.entry(dir).or_insert(0) += 1;
        }

        Self {
            url: url.to_string(),
            name,
            organization,
            total_files: records.len(),
            file_types,
            directory_structure,
        }
    }

    /// Flat `repository_*` fields ready for overlay
    pub fn to_fields(&self) -> serde_json::Map<String, serde_json::Value> {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => map,
            _ => serde_json::Map::new(),
        }
    }
}

/// `(organization, name)` from the last two path segments of a repo URL
pub fn split_repo_url(url: &str) -> (String, String) {
    let trimmed = url.trim().trim_end_matches('/');
    let mut segments = trimmed.rsplit('/');
    let name = segments.next().unwrap_or_default();
    let name = name.strip_suffix(".git").unwrap_or(name);
    let organization = segments.next().unwrap_or_default();
    (organization.to_string(), name.to_string())
}
