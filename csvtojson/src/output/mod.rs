//! JSON and YAML encoding of parsed tables.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::MarshalResult;
use crate::parser::Table;

/// Output encoding
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

impl OutputFormat {
    /// Format implied by a file extension, if it names one.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(OutputFormat::Json),
            "yaml" | "yml" => Some(OutputFormat::Yaml),
            _ => None,
        }
    }
}

/// Compact JSON array with one object per record.
pub fn to_json(table: &Table) -> MarshalResult<Vec<u8>> {
    Ok(serde_json::to_vec(table.records())?)
}

/// Indented JSON array with one object per record.
pub fn to_json_pretty(table: &Table) -> MarshalResult<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(table.records())?)
}

/// YAML block sequence of mappings.
pub fn to_yaml(table: &Table) -> MarshalResult<Vec<u8>> {
    Ok(serde_yaml::to_string(table.records())?.into_bytes())
}

impl Table {
    pub fn to_json(&self) -> MarshalResult<Vec<u8>> {
        to_json(self)
    }

    pub fn to_yaml(&self) -> MarshalResult<Vec<u8>> {
        to_yaml(self)
    }

    /// Encode in `format`. `pretty` only affects JSON.
    pub fn marshal(&self, format: OutputFormat, pretty: bool) -> MarshalResult<Vec<u8>> {
        match (format, pretty) {
            (OutputFormat::Json, false) => to_json(self),
            (OutputFormat::Json, true) => to_json_pretty(self),
            (OutputFormat::Yaml, _) => to_yaml(self),
        }
    }
}
