//! YAML / JSON document structure

use super::MetadataIssue;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataFormat {
    Yaml,
    Json,
}

impl DataFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            ".yml" | ".yaml" => Some(Self::Yaml),
            ".json" => Some(Self::Json),
            _ => None,
        }
    }

    /// Key the structure is published under in file-level metadata
    pub fn structure_key(&self) -> &'static str {
        match self {
            Self::Yaml => "yaml_structure",
            Self::Json => "json_structure",
        }
    }
}

/// Shape of a parsed YAML/JSON document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataStructure {
    #[serde(skip)]
    pub format: DataFormat,
    pub top_level_keys: Vec<String>,
    pub is_collection_root: bool,
}

/// Parse a document and describe its top level
pub fn extract_data_structure(
    content: &str,
    format: DataFormat,
) -> Result<DataStructure, MetadataIssue> {
    match format {
        DataFormat::Yaml => {
            let value: serde_yaml::Value =
                serde_yaml::from_str(content).map_err(|e| MetadataIssue::Yaml {
                    detail: e.to_string(),
                })?;
            let top_level_keys = match &value {
                serde_yaml::Value::Mapping(map) => map.keys().map(yaml_key).collect(),
                _ => Vec::new(),
            };
            Ok(DataStructure {
                format,
                top_level_keys,
                is_collection_root: value.is_sequence(),
            })
        }
        DataFormat::Json => {
            let value: serde_json::Value =
                serde_json::from_str(content).map_err(|e| MetadataIssue::Json {
                    detail: e.to_string(),
                })?;
            let top_level_keys = match &value {
                serde_json::Value::Object(map) => map.keys().cloned().collect(),
                _ => Vec::new(),
            };
            Ok(DataStructure {
                format,
                top_level_keys,
                is_collection_root: value.is_array(),
            })
        }
    }
}

fn yaml_key(key: &serde_yaml::Value) -> String {
    match key {
        serde_yaml::Value::String(s) => s.clone(),
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Null => "null".to_string(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
    }
}
