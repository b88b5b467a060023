use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Opaque node identity. JSON numbers and strings both map onto the same textual key, so
/// `1` and `"1"` name the same node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "RawNodeId", into = "String")]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<u64> for NodeId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl From<NodeId> for String {
    fn from(value: NodeId) -> Self {
        value.0
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawNodeId {
    Number(serde_json::Number),
    String(String),
}

impl From<RawNodeId> for NodeId {
    fn from(raw: RawNodeId) -> Self {
        match raw {
            RawNodeId::Number(val) => NodeId(val.to_string()),
            RawNodeId::String(val) => NodeId(val),
        }
    }
}

/// One input record. `level` is assigned by the caller and decides the node's row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub id: NodeId,
    #[serde(default)]
    pub label: String,
    pub level: usize,
    #[serde(default)]
    pub children: Vec<NodeId>,
    /// Extra SVG attributes applied to the node's rectangle.
    #[serde(default, rename = "nodeAttributes")]
    pub attributes: BTreeMap<String, String>,
}

impl GraphNode {
    pub fn new(id: impl Into<NodeId>, label: impl Into<String>, level: usize) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            level,
            children: Vec::new(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_children<I, T>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<NodeId>,
    {
        self.children = children.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_attribute(mut self, key: &str, value: &str) -> Self {
        self.attributes.insert(key.to_string(), value.to_string());
        self
    }
}
