use crate::ir::GraphNode;
use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GraphFile {
    Nodes(Vec<GraphNode>),
    Wrapped { nodes: Vec<GraphNode> },
}

/// Parses a graph document: either a bare JSON array of node records or an object with a
/// `nodes` array. Node order is preserved; the first node is the traversal root.
pub fn parse_graph(input: &str) -> Result<Vec<GraphNode>> {
    let trimmed = input.trim_start_matches('\u{feff}').trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    let parsed: GraphFile =
        serde_json::from_str(trimmed).context("input is not a valid graph document")?;
    Ok(match parsed {
        GraphFile::Nodes(nodes) => nodes,
        GraphFile::Wrapped { nodes } => nodes,
    })
}
