//! Flow definition model.
//!
//! A flow definition is an ordered array of node records as exported by the
//! automation engine. Flowlight only looks at the `type` and `label` fields
//! (to find tabs); every other field is carried through untouched so that an
//! upload is byte-for-byte equivalent to the file on disk.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{CoreError, Result};

/// Node type of a tab (a named container of nodes).
pub const TAB_NODE_TYPE: &str = "tab";

/// A single node record of a flow definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowNode {
    /// Node type, e.g. `tab`, `http in`, `function`.
    #[serde(rename = "type")]
    pub kind: String,

    /// Node identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Tab label; only meaningful for tab records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Every other field, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FlowNode {
    /// Create a tab record with the given label.
    #[must_use]
    pub fn tab(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            kind: TAB_NODE_TYPE.to_string(),
            id: Some(id.into()),
            label: Some(label.into()),
            extra: Map::new(),
        }
    }

    /// Whether this record is a tab.
    #[must_use]
    pub fn is_tab(&self) -> bool {
        self.kind == TAB_NODE_TYPE
    }
}

/// An ordered collection of flow nodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlowSet(Vec<FlowNode>);

impl FlowSet {
    /// Wrap a list of nodes.
    #[must_use]
    pub fn new(nodes: Vec<FlowNode>) -> Self {
        Self(nodes)
    }

    /// Decode a flow definition from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidFlows`] if the text is not a JSON array of
    /// node records.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| CoreError::InvalidFlows(e.to_string()))
    }

    /// Read and decode a flow definition file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read, wrapped in the outer
    /// `Result`, and [`CoreError::InvalidFlows`] in the inner one if the
    /// contents do not decode. Callers need to tell the two apart.
    pub fn read_file(path: &Path) -> std::io::Result<Result<Self>> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&text))
    }

    /// Whether a tab with exactly this label exists.
    #[must_use]
    pub fn has_tab(&self, label: &str) -> bool {
        self.tabs().any(|node| node.label.as_deref() == Some(label))
    }

    /// Iterate over tab records.
    pub fn tabs(&self) -> impl Iterator<Item = &FlowNode> {
        self.0.iter().filter(|node| node.is_tab())
    }

    /// Number of node records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no node records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The node records in order.
    #[must_use]
    pub fn nodes(&self) -> &[FlowNode] {
        &self.0
    }
}

impl From<Vec<FlowNode>> for FlowSet {
    fn from(nodes: Vec<FlowNode>) -> Self {
        Self(nodes)
    }
}
