use std::collections::{HashMap, VecDeque};

use serde::Serialize;

use crate::ir::NodeId;

use super::index::GraphIndex;

/// Rows kept free above the top level so edges entering it have room to turn.
pub const TOP_MARGIN_ROWS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct GridPos {
    pub col: usize,
    pub row: usize,
}

impl GridPos {
    pub fn new(col: usize, row: usize) -> Self {
        Self { col, row }
    }
}

/// Node positions keyed by id, iterated in the order nodes were first positioned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodePositions {
    order: Vec<NodeId>,
    by_id: HashMap<NodeId, GridPos>,
}

impl NodePositions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `id` to `pos`. A new id is appended to the iteration order; an existing one keeps
    /// its place.
    pub fn set(&mut self, id: &NodeId, pos: GridPos) {
        if let Some(existing) = self.by_id.get_mut(id) {
            *existing = pos;
        } else {
            self.order.push(id.clone());
            self.by_id.insert(id.clone(), pos);
        }
    }

    pub fn get(&self, id: &NodeId) -> Option<GridPos> {
        self.by_id.get(id).copied()
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NodeId, GridPos)> + '_ {
        self.order.iter().map(|id| (id, self.by_id[id]))
    }

    pub fn ids(&self) -> &[NodeId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn max_col(&self) -> Option<usize> {
        self.by_id.values().map(|pos| pos.col).max()
    }

    pub fn max_row(&self) -> Option<usize> {
        self.by_id.values().map(|pos| pos.row).max()
    }

    /// Maps level-grid positions onto the routing matrix, leaving `horizontal_padding - 1` free
    /// columns between node slots and `vertical_padding - 1` free rows between levels.
    pub fn to_matrix(&self, horizontal_padding: usize, vertical_padding: usize) -> Self {
        let mut out = Self::new();
        for (id, pos) in self.iter() {
            out.set(
                id,
                GridPos::new(
                    pos.col * horizontal_padding,
                    pos.row * vertical_padding + TOP_MARGIN_ROWS,
                ),
            );
        }
        out
    }
}

/// Hands out the next free column of each row.
#[derive(Debug, Default)]
pub(crate) struct RowSlots {
    next: HashMap<usize, usize>,
}

impl RowSlots {
    pub(crate) fn take(&mut self, row: usize) -> usize {
        let slot = self.next.entry(row).or_insert(0);
        let col = *slot;
        *slot += 1;
        col
    }

    pub(crate) fn occupy(&mut self, pos: GridPos) {
        let slot = self.next.entry(pos.row).or_insert(0);
        *slot = (*slot).max(pos.col + 1);
    }
}

#[derive(Debug, Clone, Default)]
pub struct PreliminaryPositions {
    pub positions: NodePositions,
    /// Nodes the traversal from the root never reached; they are left out of the layout.
    pub unplaced: Vec<NodeId>,
}

/// Positions every node reachable from the root: `row` is the node's level and `col` the next
/// free slot of that row. Children discovered together go to the front of the work queue in
/// child-list order, so siblings stay adjacent and the result only depends on input order.
pub fn preliminary_positions(graph: &GraphIndex<'_>) -> PreliminaryPositions {
    let Some(root) = graph.root() else {
        return PreliminaryPositions::default();
    };

    let mut positions = NodePositions::new();
    let mut slots = RowSlots::default();
    positions.set(&root.id, GridPos::new(slots.take(root.level), root.level));

    let mut queue: VecDeque<&NodeId> = VecDeque::from([&root.id]);
    while let Some(id) = queue.pop_front() {
        let Some(node) = graph.get(id) else {
            continue;
        };
        let mut discovered = Vec::new();
        for child_id in &node.children {
            if positions.contains(child_id) {
                continue;
            }
            let Some(child) = graph.get(child_id) else {
                continue;
            };
            positions.set(&child.id, GridPos::new(slots.take(child.level), child.level));
            discovered.push(&child.id);
        }
        for child_id in discovered.into_iter().rev() {
            queue.push_front(child_id);
        }
    }

    let unplaced: Vec<NodeId> = graph
        .nodes()
        .filter(|node| !positions.contains(&node.id))
        .map(|node| node.id.clone())
        .collect();
    for id in &unplaced {
        tracing::warn!(node = %id, "node is not reachable from the root and is left out of the layout");
    }

    PreliminaryPositions {
        positions,
        unplaced,
    }
}
