//! Orthogonal edge routing on the layout matrix.
//!
//! Every edge leaves its source through the left border of the cell right below it and enters
//! its target through the left border of the cell right above it. What happens in between
//! depends on the [`EdgeRoute`] the edge is classified as. Straight stubs always sit on offset 0;
//! horizontal and vertical detour segments ask the matrix for an offset so that edges from
//! different sources never draw on top of each other.

use serde::Serialize;

use crate::ir::NodeId;

use super::index::GraphIndex;
use super::matrix::Matrix;
use super::positions::{GridPos, NodePositions};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EdgeRoute {
    /// Same column, target on the next level.
    DirectVertical,
    /// Same column, target further down with other levels in between.
    VerticalAcrossLevels,
    /// Different column, target on the next level.
    NextLevel,
    /// Different column, target further down.
    LongForward,
    /// Target on a higher row than the source, or on the same row.
    Backward,
}

impl EdgeRoute {
    /// Classifies an edge between two matrix positions. An edge to another node on the same row
    /// climbs a lane like a backward edge; a self loop has no route.
    pub fn classify(from: GridPos, to: GridPos, vertical_padding: usize) -> Option<Self> {
        if from == to {
            return None;
        }
        if to.row <= from.row {
            return Some(Self::Backward);
        }
        if to.row < from.row + vertical_padding {
            return None;
        }
        let next_level = to.row == from.row + vertical_padding;
        Some(match (from.col == to.col, next_level) {
            (true, true) => Self::DirectVertical,
            (true, false) => Self::VerticalAcrossLevels,
            (false, true) => Self::NextLevel,
            (false, false) => Self::LongForward,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoutedEdge {
    pub source: NodeId,
    pub target: NodeId,
    pub route: EdgeRoute,
}

/// Endpoints of one edge in matrix coordinates.
#[derive(Debug, Clone, Copy)]
pub struct EdgeEnds<'e> {
    pub source: &'e NodeId,
    pub target: &'e NodeId,
    pub from: GridPos,
    pub to: GridPos,
}

/// Carves every edge of the graph into the matrix, source nodes in input order and children in
/// list order. Returns the route chosen for each edge that could be routed.
pub fn route_edges(
    matrix: &mut Matrix,
    graph: &GraphIndex<'_>,
    positions: &NodePositions,
    vertical_padding: usize,
) -> Vec<RoutedEdge> {
    let mut routed = Vec::new();
    for node in graph.nodes() {
        let Some(from) = positions.get(&node.id) else {
            continue;
        };
        for child in &node.children {
            let Some(to) = positions.get(child) else {
                continue;
            };
            let Some(route) = EdgeRoute::classify(from, to, vertical_padding) else {
                tracing::warn!(source = %node.id, target = %child, "self loop cannot be routed, skipping");
                continue;
            };
            let edge = EdgeEnds {
                source: &node.id,
                target: child,
                from,
                to,
            };
            tracing::trace!(source = %node.id, target = %child, ?route, "routing edge");
            route_edge(matrix, route, &edge);
            routed.push(RoutedEdge {
                source: node.id.clone(),
                target: child.clone(),
                route,
            });
        }
    }
    routed
}

pub fn route_edge(matrix: &mut Matrix, route: EdgeRoute, edge: &EdgeEnds<'_>) {
    match route {
        EdgeRoute::DirectVertical => route_direct_vertical(matrix, edge),
        EdgeRoute::VerticalAcrossLevels => route_vertical_across_levels(matrix, edge),
        EdgeRoute::NextLevel => route_next_level(matrix, edge),
        EdgeRoute::LongForward => route_long_forward(matrix, edge),
        EdgeRoute::Backward => route_backward(matrix, edge),
    }
}

fn exit_stub(matrix: &mut Matrix, edge: &EdgeEnds<'_>) {
    let row = edge.from.row + 1;
    matrix.mark_left(row..=row, edge.from.col, 0, edge.source, edge.target);
}

fn entry_stub(matrix: &mut Matrix, edge: &EdgeEnds<'_>) {
    let row = edge.to.row - 1;
    matrix.mark_left(row..=row, edge.to.col, 0, edge.source, edge.target);
}

fn horizontal(matrix: &mut Matrix, row: usize, cols: std::ops::RangeInclusive<usize>, edge: &EdgeEnds<'_>) {
    let offset = matrix.horizontal_offset(row, cols.clone(), edge.source);
    matrix.mark_bottom(row, cols, offset, edge.source, edge.target);
}

fn vertical(matrix: &mut Matrix, col: usize, rows: std::ops::RangeInclusive<usize>, edge: &EdgeEnds<'_>) {
    let offset = matrix.vertical_offset(col, rows.clone(), edge.source);
    matrix.mark_left(rows, col, offset, edge.source, edge.target);
}

fn route_direct_vertical(matrix: &mut Matrix, edge: &EdgeEnds<'_>) {
    let rows = edge.from.row + 1..=edge.to.row - 1;
    matrix.mark_left(rows, edge.from.col, 0, edge.source, edge.target);
}

fn route_vertical_across_levels(matrix: &mut Matrix, edge: &EdgeEnds<'_>) {
    let (col, y1, y2) = (edge.from.col, edge.from.row, edge.to.row);
    let lane = col + 2;
    matrix.ensure_columns(lane + 1);

    exit_stub(matrix, edge);
    horizontal(matrix, y1 + 1, col..=col + 1, edge);
    vertical(matrix, lane, y1 + 2..=y2 - 2, edge);
    horizontal(matrix, y2 - 2, col..=col + 1, edge);
    entry_stub(matrix, edge);
}

fn route_next_level(matrix: &mut Matrix, edge: &EdgeEnds<'_>) {
    let (x1, x2) = (edge.from.col, edge.to.col);
    let (y1, y2) = (edge.from.row, edge.to.row);

    exit_stub(matrix, edge);
    let (left, right) = (x1.min(x2), x1.max(x2));
    horizontal(matrix, y1 + 1, left..=right - 1, edge);
    matrix.mark_left(y1 + 2..=y2 - 1, x2, 0, edge.source, edge.target);
}

fn route_long_forward(matrix: &mut Matrix, edge: &EdgeEnds<'_>) {
    let (x1, x2) = (edge.from.col, edge.to.col);
    let (y1, y2) = (edge.from.row, edge.to.row);
    let rightwards = x2 > x1;
    // free column next to the target: its left neighbour gap, or the gap right of it
    let lane = if rightwards { x2 - 1 } else { x2 + 2 };
    matrix.ensure_columns(lane + 1);

    exit_stub(matrix, edge);
    let below_source = if rightwards { x1..=lane - 1 } else { lane..=x1 - 1 };
    horizontal(matrix, y1 + 1, below_source, edge);
    vertical(matrix, lane, y1 + 2..=y2 - 2, edge);
    let above_target = if rightwards { lane..=x2 - 1 } else { x2..=lane - 1 };
    horizontal(matrix, y2 - 2, above_target, edge);
    entry_stub(matrix, edge);
}

fn route_backward(matrix: &mut Matrix, edge: &EdgeEnds<'_>) {
    let (x1, x2) = (edge.from.col, edge.to.col);
    let (y1, y2) = (edge.from.row, edge.to.row);
    let lane = x1 + 2;
    matrix.ensure_columns(lane + 1);

    exit_stub(matrix, edge);
    horizontal(matrix, y1 + 1, x1..=x1 + 1, edge);
    vertical(matrix, lane, y2 - 1..=y1 + 1, edge);
    let above_target = if x2 > lane { lane..=x2 - 1 } else { x2..=lane - 1 };
    horizontal(matrix, y2 - 2, above_target, edge);
    entry_stub(matrix, edge);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> NodeId {
        NodeId::from(s)
    }

    fn route(matrix: &mut Matrix, from: GridPos, to: GridPos, source: &NodeId, target: &NodeId) -> EdgeRoute {
        let kind = EdgeRoute::classify(from, to, 4).unwrap();
        route_edge(
            matrix,
            kind,
            &EdgeEnds {
                source,
                target,
                from,
                to,
            },
        );
        kind
    }

    fn left_offsets(matrix: &Matrix, row: usize, col: usize) -> Vec<usize> {
        matrix
            .cell(row, col)
            .map(|cell| cell.left.marks().iter().map(|m| m.offset).collect())
            .unwrap_or_default()
    }

    fn bottom_offsets(matrix: &Matrix, row: usize, col: usize) -> Vec<usize> {
        matrix
            .cell(row, col)
            .map(|cell| cell.bottom.marks().iter().map(|m| m.offset).collect())
            .unwrap_or_default()
    }

    #[test]
    fn classification_covers_the_five_cases() {
        let at = GridPos::new;
        assert_eq!(EdgeRoute::classify(at(0, 2), at(0, 6), 4), Some(EdgeRoute::DirectVertical));
        assert_eq!(
            EdgeRoute::classify(at(0, 2), at(0, 10), 4),
            Some(EdgeRoute::VerticalAcrossLevels)
        );
        assert_eq!(EdgeRoute::classify(at(0, 2), at(3, 6), 4), Some(EdgeRoute::NextLevel));
        assert_eq!(EdgeRoute::classify(at(3, 2), at(0, 10), 4), Some(EdgeRoute::LongForward));
        assert_eq!(EdgeRoute::classify(at(0, 18), at(0, 2), 4), Some(EdgeRoute::Backward));
        assert_eq!(EdgeRoute::classify(at(0, 6), at(0, 2), 4), Some(EdgeRoute::Backward));
        assert_eq!(EdgeRoute::classify(at(0, 2), at(3, 2), 4), Some(EdgeRoute::Backward));
        assert_eq!(EdgeRoute::classify(at(3, 2), at(0, 2), 4), Some(EdgeRoute::Backward));
        assert_eq!(EdgeRoute::classify(at(0, 2), at(0, 2), 4), None);
    }

    #[test]
    fn direct_vertical_marks_the_gap_between_levels() {
        let mut matrix = Matrix::with_size(8, 1);
        route(&mut matrix, GridPos::new(0, 2), GridPos::new(0, 6), &id("a"), &id("b"));
        for row in 3..=5 {
            assert_eq!(left_offsets(&matrix, row, 0), vec![0], "row {row}");
        }
        assert!(left_offsets(&matrix, 2, 0).is_empty());
        assert!(left_offsets(&matrix, 6, 0).is_empty());
    }

    #[test]
    fn vertical_across_levels_detours_right_and_grows_the_matrix() {
        let mut matrix = Matrix::with_size(12, 1);
        route(&mut matrix, GridPos::new(0, 2), GridPos::new(0, 10), &id("a"), &id("c"));
        assert_eq!(matrix.columns(), 3);
        assert_eq!(left_offsets(&matrix, 3, 0), vec![0]);
        assert_eq!(bottom_offsets(&matrix, 3, 0), vec![0]);
        assert_eq!(bottom_offsets(&matrix, 3, 1), vec![0]);
        for row in 4..=8 {
            assert_eq!(left_offsets(&matrix, row, 2), vec![0], "lane row {row}");
        }
        assert_eq!(bottom_offsets(&matrix, 8, 0), vec![0]);
        assert_eq!(bottom_offsets(&matrix, 8, 1), vec![0]);
        assert_eq!(left_offsets(&matrix, 9, 0), vec![0]);
        // the intervening level's column stays clear
        assert!(left_offsets(&matrix, 6, 0).is_empty());
    }

    #[test]
    fn next_level_turns_once_below_the_source() {
        let mut matrix = Matrix::with_size(8, 7);
        route(&mut matrix, GridPos::new(0, 2), GridPos::new(6, 6), &id("a"), &id("b"));
        assert_eq!(left_offsets(&matrix, 3, 0), vec![0]);
        for col in 0..6 {
            assert_eq!(bottom_offsets(&matrix, 3, col), vec![0], "col {col}");
        }
        assert!(bottom_offsets(&matrix, 3, 6).is_empty());
        assert_eq!(left_offsets(&matrix, 4, 6), vec![0]);
        assert_eq!(left_offsets(&matrix, 5, 6), vec![0]);
    }

    #[test]
    fn next_level_towards_the_left() {
        let mut matrix = Matrix::with_size(8, 4);
        route(&mut matrix, GridPos::new(3, 2), GridPos::new(0, 6), &id("a"), &id("b"));
        assert_eq!(left_offsets(&matrix, 3, 3), vec![0]);
        for col in 0..3 {
            assert_eq!(bottom_offsets(&matrix, 3, col), vec![0]);
        }
        assert_eq!(left_offsets(&matrix, 5, 0), vec![0]);
    }

    #[test]
    fn long_forward_uses_the_gap_left_of_a_target_on_the_right() {
        let mut matrix = Matrix::with_size(12, 4);
        route(&mut matrix, GridPos::new(0, 2), GridPos::new(3, 10), &id("a"), &id("c"));
        assert_eq!(bottom_offsets(&matrix, 3, 0), vec![0]);
        assert_eq!(bottom_offsets(&matrix, 3, 1), vec![0]);
        assert!(bottom_offsets(&matrix, 3, 2).is_empty());
        for row in 4..=8 {
            assert_eq!(left_offsets(&matrix, row, 2), vec![0]);
        }
        assert_eq!(bottom_offsets(&matrix, 8, 2), vec![0]);
        assert_eq!(left_offsets(&matrix, 9, 3), vec![0]);
    }

    #[test]
    fn long_forward_uses_the_gap_right_of_a_target_on_the_left() {
        let mut matrix = Matrix::with_size(12, 4);
        route(&mut matrix, GridPos::new(3, 2), GridPos::new(0, 10), &id("a"), &id("c"));
        assert_eq!(bottom_offsets(&matrix, 3, 2), vec![0]);
        assert!(bottom_offsets(&matrix, 3, 3).is_empty());
        for row in 4..=8 {
            assert_eq!(left_offsets(&matrix, row, 2), vec![0]);
        }
        assert_eq!(bottom_offsets(&matrix, 8, 0), vec![0]);
        assert_eq!(bottom_offsets(&matrix, 8, 1), vec![0]);
        assert_eq!(left_offsets(&matrix, 9, 0), vec![0]);
    }

    #[test]
    fn backward_edge_climbs_a_lane_two_columns_right() {
        let mut matrix = Matrix::with_size(12, 1);
        route(&mut matrix, GridPos::new(0, 10), GridPos::new(0, 2), &id("e"), &id("a"));
        assert_eq!(matrix.columns(), 3);
        assert_eq!(left_offsets(&matrix, 11, 0), vec![0]);
        assert_eq!(bottom_offsets(&matrix, 11, 0), vec![0]);
        assert_eq!(bottom_offsets(&matrix, 11, 1), vec![0]);
        for row in 1..=11 {
            assert_eq!(left_offsets(&matrix, row, 2), vec![0], "lane row {row}");
        }
        assert_eq!(bottom_offsets(&matrix, 0, 0), vec![0]);
        assert_eq!(bottom_offsets(&matrix, 0, 1), vec![0]);
        assert_eq!(left_offsets(&matrix, 1, 0), vec![0]);
    }

    #[test]
    fn backward_edge_to_a_target_right_of_the_lane() {
        let mut matrix = Matrix::with_size(8, 7);
        route(&mut matrix, GridPos::new(0, 6), GridPos::new(6, 2), &id("b"), &id("a"));
        for col in 2..6 {
            assert_eq!(bottom_offsets(&matrix, 0, col), vec![0], "col {col}");
        }
        assert!(bottom_offsets(&matrix, 0, 1).is_empty());
        assert_eq!(left_offsets(&matrix, 1, 6), vec![0]);
    }

    #[test]
    fn detour_lanes_of_different_sources_are_separated() {
        let mut matrix = Matrix::with_size(12, 1);
        route(&mut matrix, GridPos::new(0, 2), GridPos::new(0, 10), &id("a"), &id("c"));
        route(&mut matrix, GridPos::new(0, 10), GridPos::new(0, 2), &id("c"), &id("a"));
        let lane: Vec<usize> = left_offsets(&matrix, 6, 2);
        assert_eq!(lane, vec![0, 1]);
    }

    #[test]
    fn one_source_fanning_out_shares_its_turn() {
        let mut matrix = Matrix::with_size(12, 7);
        route(&mut matrix, GridPos::new(0, 2), GridPos::new(3, 10), &id("a"), &id("x"));
        route(&mut matrix, GridPos::new(0, 2), GridPos::new(6, 10), &id("a"), &id("y"));
        assert_eq!(bottom_offsets(&matrix, 3, 0), vec![0, 0]);
    }

    #[test]
    fn same_row_edge_loops_over_its_own_row() {
        let mut matrix = Matrix::with_size(8, 4);
        let kind = route(&mut matrix, GridPos::new(0, 6), GridPos::new(3, 6), &id("a"), &id("b"));
        assert_eq!(kind, EdgeRoute::Backward);
        assert_eq!(left_offsets(&matrix, 7, 0), vec![0]);
        assert_eq!(bottom_offsets(&matrix, 7, 0), vec![0]);
        assert_eq!(bottom_offsets(&matrix, 7, 1), vec![0]);
        for row in 5..=7 {
            assert_eq!(left_offsets(&matrix, row, 2), vec![0], "lane row {row}");
        }
        assert_eq!(bottom_offsets(&matrix, 4, 2), vec![0]);
        assert_eq!(left_offsets(&matrix, 5, 3), vec![0]);
    }

    #[test]
    fn next_level_turns_of_different_sources_are_separated() {
        let mut matrix = Matrix::with_size(12, 7);
        route(&mut matrix, GridPos::new(0, 6), GridPos::new(6, 10), &id("a"), &id("d"));
        route(&mut matrix, GridPos::new(3, 6), GridPos::new(0, 10), &id("b"), &id("c"));
        for col in 0..3 {
            assert_eq!(bottom_offsets(&matrix, 7, col), vec![0, 1], "col {col}");
        }
        assert_eq!(bottom_offsets(&matrix, 7, 3), vec![0]);
    }
}
