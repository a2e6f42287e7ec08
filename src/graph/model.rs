//! Persisted structured model handed from the render stage to the filter stage.

use super::format::to_mermaid_simple;
use super::view::GraphView;
use crate::error::{ErdError, Result};
use crate::schema::SchemaGraph;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;

/// Version written into every model; bumped on incompatible layout changes.
pub const MODEL_FORMAT_VERSION: u32 = 1;

/// Schema graph plus a fingerprint of the simple diagram rendered from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DiagramModel {
    pub format_version: u32,
    pub graph: SchemaGraph,
    /// Hex SHA-256 of the simple diagram text rendered from `graph`
    pub simple_sha256: String,
}

impl DiagramModel {
    pub fn new(graph: SchemaGraph) -> Self {
        let simple = to_mermaid_simple(&GraphView::full(&graph));
        Self {
            format_version: MODEL_FORMAT_VERSION,
            simple_sha256: digest(&simple),
            graph,
        }
    }

    /// True when `simple_text` is the diagram this model was rendered into.
    pub fn describes(&self, simple_text: &str) -> bool {
        self.simple_sha256 == digest(simple_text)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(text: &str, path: &Path) -> Result<Self> {
        let model: DiagramModel = serde_json::from_str(text).map_err(|e| ErdError::InvalidModel {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        if model.format_version != MODEL_FORMAT_VERSION {
            return Err(ErdError::InvalidModel {
                path: path.to_path_buf(),
                reason: format!(
                    "unsupported format version {} (expected {})",
                    model.format_version, MODEL_FORMAT_VERSION
                ),
            });
        }
        Ok(model)
    }
}

/// Hex SHA-256 of a diagram text
pub fn digest(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}
