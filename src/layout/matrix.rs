use std::collections::HashSet;
use std::ops::RangeInclusive;

use serde::Serialize;

use crate::ir::NodeId;

use super::index::GraphIndex;
use super::positions::NodePositions;

/// One edge crossing a cell border, displaced `offset` padding units from the border line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BorderMark {
    pub offset: usize,
    pub source: NodeId,
    pub target: NodeId,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Border {
    marks: Vec<BorderMark>,
}

impl Border {
    pub fn mark(&mut self, offset: usize, source: &NodeId, target: &NodeId) {
        self.marks.push(BorderMark {
            offset,
            source: source.clone(),
            target: target.clone(),
        });
    }

    pub fn marks(&self) -> &[BorderMark] {
        &self.marks
    }

    pub fn marks_mut(&mut self) -> &mut [BorderMark] {
        &mut self.marks
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    pub fn carries(&self, source: &NodeId, target: &NodeId) -> bool {
        self.marks
            .iter()
            .any(|mark| &mark.source == source && &mark.target == target)
    }

    /// First mark of every distinct offset, in recording order.
    pub fn distinct_offsets(&self) -> Vec<&BorderMark> {
        let mut seen = HashSet::new();
        self.marks
            .iter()
            .filter(|mark| seen.insert(mark.offset))
            .collect()
    }

    fn has_target(&self, target: &NodeId) -> bool {
        self.marks.iter().any(|mark| &mark.target == target)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MatrixCell {
    pub node: Option<NodeId>,
    pub label: String,
    /// Edges running along the bottom edge of the cell.
    pub bottom: Border,
    /// Edges running along the left edge of the cell.
    pub left: Border,
}

impl MatrixCell {
    pub fn hosts_node(&self) -> bool {
        self.node.is_some()
    }

    /// Whether the cell's vertical exit has been split into a forward and a backward lane
    /// whose turn also runs along this cell's bottom border.
    pub fn has_split_exit(&self) -> bool {
        let left = self.left.marks();
        if left.len() < 2 {
            return false;
        }
        let offsets: HashSet<usize> = left.iter().map(|mark| mark.offset).collect();
        if offsets.len() < 2 {
            return false;
        }
        left.iter().any(|mark| self.bottom.has_target(&mark.target))
    }
}

/// Routing grid: `cells[row][col]`. Rows are fixed when nodes are placed; columns are appended
/// on the right whenever a detour lane needs room.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Matrix {
    cells: Vec<Vec<MatrixCell>>,
}

impl Matrix {
    pub fn with_size(rows: usize, columns: usize) -> Self {
        Self {
            cells: vec![vec![MatrixCell::default(); columns]; rows],
        }
    }

    /// Allocates a grid just large enough for the given matrix positions, plus one row below the
    /// deepest node for its outgoing edges, and writes each node's id and label into its cell.
    pub fn from_positions(graph: &GraphIndex<'_>, positions: &NodePositions) -> Self {
        let (Some(max_col), Some(max_row)) = (positions.max_col(), positions.max_row()) else {
            return Self::default();
        };
        let mut matrix = Self::with_size(max_row + 2, max_col + 1);
        for (id, pos) in positions.iter() {
            let Some(node) = graph.get(id) else {
                continue;
            };
            if let Some(cell) = matrix.cell_mut(pos.row, pos.col) {
                cell.node = Some(node.id.clone());
                cell.label = node.label.clone();
            }
        }
        matrix
    }

    pub fn rows(&self) -> usize {
        self.cells.len()
    }

    pub fn columns(&self) -> usize {
        self.cells.first().map_or(0, Vec::len)
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&MatrixCell> {
        self.cells.get(row).and_then(|cells| cells.get(col))
    }

    pub fn cell_mut(&mut self, row: usize, col: usize) -> Option<&mut MatrixCell> {
        self.cells.get_mut(row).and_then(|cells| cells.get_mut(col))
    }

    pub fn row_cells(&self, row: usize) -> &[MatrixCell] {
        self.cells.get(row).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn append_column(&mut self) {
        for row in &mut self.cells {
            row.push(MatrixCell::default());
        }
    }

    /// Grows the grid to at least `columns` columns.
    pub fn ensure_columns(&mut self, columns: usize) {
        while self.columns() < columns && !self.cells.is_empty() {
            self.append_column();
        }
    }

    pub fn mark_bottom(
        &mut self,
        row: usize,
        cols: RangeInclusive<usize>,
        offset: usize,
        source: &NodeId,
        target: &NodeId,
    ) {
        self.ensure_columns(cols.end() + 1);
        for col in cols {
            if let Some(cell) = self.cell_mut(row, col) {
                cell.bottom.mark(offset, source, target);
            }
        }
    }

    pub fn mark_left(
        &mut self,
        rows: RangeInclusive<usize>,
        col: usize,
        offset: usize,
        source: &NodeId,
        target: &NodeId,
    ) {
        self.ensure_columns(col + 1);
        for row in rows {
            if let Some(cell) = self.cell_mut(row, col) {
                cell.left.mark(offset, source, target);
            }
        }
    }

    /// Offset for a horizontal segment along the bottom borders of `cols` in `row`.
    pub fn horizontal_offset(
        &self,
        row: usize,
        cols: RangeInclusive<usize>,
        source: &NodeId,
    ) -> usize {
        lane_offset(
            cols.filter_map(|col| self.cell(row, col)).map(|cell| &cell.bottom),
            source,
        )
    }

    /// Offset for a vertical segment along the left borders of `rows` in `col`.
    pub fn vertical_offset(
        &self,
        col: usize,
        rows: RangeInclusive<usize>,
        source: &NodeId,
    ) -> usize {
        lane_offset(
            rows.filter_map(|row| self.cell(row, col)).map(|cell| &cell.left),
            source,
        )
    }
}

/// A segment keeps the offset its source already uses on the span when no other source sits on
/// that offset; otherwise it moves one unit past every offset other sources recorded there.
fn lane_offset<'b>(borders: impl Iterator<Item = &'b Border>, source: &NodeId) -> usize {
    let mut own: Option<usize> = None;
    let mut foreign = HashSet::new();
    for border in borders {
        for mark in border.marks() {
            if &mark.source == source {
                own.get_or_insert(mark.offset);
            } else {
                foreign.insert(mark.offset);
            }
        }
    }
    match own {
        Some(offset) if !foreign.contains(&offset) => offset,
        _ => foreign.iter().max().map_or(0, |max| max + 1),
    }
}
