use std::collections::HashMap;

use crate::ir::{GraphNode, NodeId};

use super::error::{LayoutError, Result};

/// Read-only id lookup over the caller's node list. Building it validates that ids are unique
/// and that every child reference resolves.
#[derive(Debug, Clone)]
pub struct GraphIndex<'a> {
    nodes: &'a [GraphNode],
    by_id: HashMap<&'a NodeId, usize>,
}

impl<'a> GraphIndex<'a> {
    pub fn build(nodes: &'a [GraphNode]) -> Result<Self> {
        let mut by_id = HashMap::with_capacity(nodes.len());
        for (idx, node) in nodes.iter().enumerate() {
            if by_id.insert(&node.id, idx).is_some() {
                return Err(LayoutError::DuplicateNode(node.id.clone()));
            }
        }
        for node in nodes {
            if let Some(child) = node.children.iter().find(|child| !by_id.contains_key(child)) {
                return Err(LayoutError::DanglingChild {
                    parent: node.id.clone(),
                    child: child.clone(),
                });
            }
        }
        Ok(Self { nodes, by_id })
    }

    pub fn get(&self, id: &NodeId) -> Option<&'a GraphNode> {
        self.by_id.get(id).map(|idx| &self.nodes[*idx])
    }

    /// Traversal root: the first node in input order.
    pub fn root(&self) -> Option<&'a GraphNode> {
        self.nodes.first()
    }

    /// Nodes in input order.
    pub fn nodes(&self) -> impl Iterator<Item = &'a GraphNode> + use<'a> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
