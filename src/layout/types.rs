use std::collections::BTreeMap;

use serde::Serialize;

use crate::ir::NodeId;

use super::routing::RoutedEdge;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextBlock {
    pub lines: Vec<String>,
    pub width: f32,
    pub height: f32,
}

/// One label line, positioned relative to its node's top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextRun {
    pub x: f32,
    pub y: f32,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeBox {
    pub id: NodeId,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Matrix cell the node occupies.
    pub column: usize,
    pub row: usize,
    pub text: Vec<TextRun>,
    /// Styling overrides copied from the input node.
    pub attributes: BTreeMap<String, String>,
}

impl NodeBox {
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn overlaps(&self, other: &NodeBox) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BorderSide {
    Bottom,
    Left,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineSegment {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub arrow: bool,
    /// Cell border the segment was drawn for.
    pub column: usize,
    pub row: usize,
    pub side: BorderSide,
    /// Source of the first edge recorded at this offset.
    pub source: NodeId,
    pub offset: usize,
}

impl LineSegment {
    pub fn is_vertical(&self) -> bool {
        self.side == BorderSide::Left
    }
}

/// Arrowhead definition shared by every arrow-carrying segment.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrowMarker {
    pub id: String,
    pub path: String,
    pub width: f32,
    pub height: f32,
    pub ref_x: f32,
    pub ref_y: f32,
    pub orient: f32,
}

impl Default for ArrowMarker {
    fn default() -> Self {
        Self {
            id: "arrow".to_string(),
            path: "M2,2 L2,11 L10,6 L2,2".to_string(),
            width: 13.0,
            height: 13.0,
            ref_x: 10.0,
            ref_y: 6.0,
            orient: 90.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub nodes: Vec<NodeBox>,
    pub lines: Vec<LineSegment>,
    pub marker: ArrowMarker,
    pub width: f32,
    pub height: f32,
    /// Final matrix dimensions, after detour columns were appended.
    pub columns: usize,
    pub rows: usize,
    pub edges: Vec<RoutedEdge>,
    /// Nodes not reachable from the root.
    pub unplaced: Vec<NodeId>,
}

impl Layout {
    pub fn node(&self, id: &NodeId) -> Option<&NodeBox> {
        self.nodes.iter().find(|node| &node.id == id)
    }

    /// Lines with per-cell pieces joined, see [`merge_collinear`](super::geometry::merge_collinear).
    pub fn connectors(&self) -> Vec<LineSegment> {
        super::geometry::merge_collinear(&self.lines)
    }
}
