//! Pluggable layout passes.
//!
//! Node passes rewrite level-grid positions before the matrix is built; edge passes rewrite the
//! routed matrix before geometry is emitted. Both run in the order they were registered. Plain
//! functions with the matching signature can be registered directly.

use std::collections::HashSet;
use std::fmt;

use crate::config::{EdgePassKind, NodePassKind, OptimizationConfig};
use crate::ir::NodeId;

use super::index::GraphIndex;
use super::matrix::Matrix;
use super::positions::{GridPos, NodePositions, RowSlots};

pub trait NodeOptimization {
    fn name(&self) -> &'static str {
        "custom"
    }

    fn optimize(&self, graph: &GraphIndex<'_>, positions: NodePositions) -> NodePositions;
}

pub trait EdgeOptimization {
    fn name(&self) -> &'static str {
        "custom"
    }

    /// `positions` are matrix positions.
    fn optimize(
        &self,
        graph: &GraphIndex<'_>,
        matrix: Matrix,
        positions: &NodePositions,
    ) -> Matrix;
}

impl<F> NodeOptimization for F
where
    F: Fn(&GraphIndex<'_>, NodePositions) -> NodePositions,
{
    fn optimize(&self, graph: &GraphIndex<'_>, positions: NodePositions) -> NodePositions {
        self(graph, positions)
    }
}

impl<F> EdgeOptimization for F
where
    F: Fn(&GraphIndex<'_>, Matrix, &NodePositions) -> Matrix,
{
    fn optimize(
        &self,
        graph: &GraphIndex<'_>,
        matrix: Matrix,
        positions: &NodePositions,
    ) -> Matrix {
        self(graph, matrix, positions)
    }
}

/// Moves the children of every node onto the row right below it, packed left to right in
/// child-list order. Parents are visited in discovery order and a node is moved at most once,
/// so a node reached again through a later (or backward) edge keeps its place.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlignChildren;

impl NodeOptimization for AlignChildren {
    fn name(&self) -> &'static str {
        "alignChildren"
    }

    fn optimize(&self, graph: &GraphIndex<'_>, mut positions: NodePositions) -> NodePositions {
        let Some(root) = graph.root() else {
            return positions;
        };
        let mut placed: HashSet<NodeId> = HashSet::new();
        let mut slots = RowSlots::default();
        if let Some(pos) = positions.get(&root.id) {
            placed.insert(root.id.clone());
            slots.occupy(pos);
        }

        let order = positions.ids().to_vec();
        for parent_id in &order {
            let (Some(parent), Some(parent_pos)) = (graph.get(parent_id), positions.get(parent_id))
            else {
                continue;
            };
            let child_row = parent_pos.row + 1;
            for child in &parent.children {
                if !positions.contains(child) || !placed.insert(child.clone()) {
                    continue;
                }
                positions.set(child, GridPos::new(slots.take(child_row), child_row));
            }
        }
        positions
    }
}

/// A node with both forward and backward children draws both exits through the same cell
/// border. Children on the node's own row leave through the backward lane too. This pass moves
/// the backward exits one padding unit to the right so the two stay distinguishable.
#[derive(Debug, Clone, Copy, Default)]
pub struct SeparateOutgoingEdges;

impl EdgeOptimization for SeparateOutgoingEdges {
    fn name(&self) -> &'static str {
        "separateOutgoingEdges"
    }

    fn optimize(
        &self,
        graph: &GraphIndex<'_>,
        mut matrix: Matrix,
        positions: &NodePositions,
    ) -> Matrix {
        for node in graph.nodes() {
            let Some(pos) = positions.get(&node.id) else {
                continue;
            };
            let mut has_forward = false;
            let mut backward: Vec<&NodeId> = Vec::new();
            for child in &node.children {
                match positions.get(child) {
                    Some(child_pos) if child_pos.row > pos.row => has_forward = true,
                    Some(child_pos) if child_pos != pos => backward.push(child),
                    _ => {}
                }
            }
            if !has_forward || backward.is_empty() {
                continue;
            }
            let Some(exit) = matrix.cell_mut(pos.row + 1, pos.col) else {
                continue;
            };
            for mark in exit.left.marks_mut() {
                if mark.source == node.id && backward.contains(&&mark.target) {
                    mark.offset += 1;
                }
            }
        }
        matrix
    }
}

/// The ordered node and edge passes applied by one layout call.
pub struct Optimizations {
    pub node: Vec<Box<dyn NodeOptimization>>,
    pub edge: Vec<Box<dyn EdgeOptimization>>,
}

impl Optimizations {
    pub fn none() -> Self {
        Self {
            node: Vec::new(),
            edge: Vec::new(),
        }
    }

    pub fn standard() -> Self {
        Self::from_config(&OptimizationConfig::default())
    }

    pub fn from_config(config: &OptimizationConfig) -> Self {
        let node = config
            .node
            .iter()
            .map(|kind| match kind {
                NodePassKind::AlignChildren => Box::new(AlignChildren) as Box<dyn NodeOptimization>,
            })
            .collect();
        let edge = config
            .edge
            .iter()
            .map(|kind| match kind {
                EdgePassKind::SeparateOutgoingEdges => {
                    Box::new(SeparateOutgoingEdges) as Box<dyn EdgeOptimization>
                }
            })
            .collect();
        Self { node, edge }
    }

    pub fn with_node_pass(mut self, pass: impl NodeOptimization + 'static) -> Self {
        self.node.push(Box::new(pass));
        self
    }

    pub fn with_edge_pass(mut self, pass: impl EdgeOptimization + 'static) -> Self {
        self.edge.push(Box::new(pass));
        self
    }

    pub(crate) fn apply_node_passes(
        &self,
        graph: &GraphIndex<'_>,
        mut positions: NodePositions,
    ) -> NodePositions {
        for pass in &self.node {
            tracing::debug!(pass = pass.name(), "applying node pass");
            positions = pass.optimize(graph, positions);
        }
        positions
    }

    pub(crate) fn apply_edge_passes(
        &self,
        graph: &GraphIndex<'_>,
        mut matrix: Matrix,
        positions: &NodePositions,
    ) -> Matrix {
        for pass in &self.edge {
            tracing::debug!(pass = pass.name(), "applying edge pass");
            matrix = pass.optimize(graph, matrix, positions);
        }
        matrix
    }
}

impl Default for Optimizations {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Debug for Optimizations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Optimizations")
            .field("node", &self.node.iter().map(|p| p.name()).collect::<Vec<_>>())
            .field("edge", &self.edge.iter().map(|p| p.name()).collect::<Vec<_>>())
            .finish()
    }
}
