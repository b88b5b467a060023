//! Turns the routed matrix into pixel geometry.
//!
//! Three walks over the matrix, all row-major: the first sizes every column and every
//! `(column, row)` cell from the labels it hosts, the second emits node rectangles, the third emits
//! one line per distinct offset on every cell border. Sizing runs to completion before anything is
//! positioned, so offsets never depend on cells that have not been visited yet.

use std::collections::HashMap;

use crate::config::LayoutConfig;
use crate::ir::NodeId;

use super::index::GraphIndex;
use super::matrix::{BorderMark, Matrix};
use super::text::LabelMeasurer;
use super::types::{BorderSide, LineSegment, NodeBox, TextRun};

/// Column widths and per-column row heights in pixels.
#[derive(Debug, Clone)]
pub struct Sizing {
    column_widths: HashMap<usize, f32>,
    row_heights: HashMap<(usize, usize), f32>,
    min_cell_width: f32,
    cell_height: f32,
}

impl Sizing {
    pub fn new(config: &LayoutConfig) -> Self {
        Self {
            column_widths: HashMap::new(),
            row_heights: HashMap::new(),
            min_cell_width: config.min_cell_width,
            cell_height: config.cell_height,
        }
    }

    pub fn record(&mut self, col: usize, row: usize, width: f32, height: f32) {
        let w = self.column_widths.entry(col).or_insert(width);
        *w = w.max(width);
        let h = self.row_heights.entry((col, row)).or_insert(height);
        *h = h.max(height);
    }

    pub fn column_width(&self, col: usize) -> f32 {
        self.column_widths
            .get(&col)
            .map_or(self.min_cell_width, |w| w.max(self.min_cell_width))
    }

    pub fn row_height(&self, col: usize, row: usize) -> f32 {
        self.row_heights
            .get(&(col, row))
            .map_or(self.cell_height, |h| h.max(self.cell_height))
    }

    /// Left edge of `col`, without canvas padding.
    pub fn x_offset(&self, col: usize) -> f32 {
        (0..col).map(|c| self.column_width(c)).sum()
    }

    /// Top edge of `row` within `col`, without canvas padding.
    pub fn y_offset(&self, row: usize, col: usize) -> f32 {
        (0..row).map(|r| self.row_height(col, r)).sum()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Geometry {
    pub nodes: Vec<NodeBox>,
    pub lines: Vec<LineSegment>,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Default)]
struct Extent {
    width: f32,
    height: f32,
}

impl Extent {
    fn include(&mut self, x: f32, y: f32) {
        self.width = self.width.max(x);
        self.height = self.height.max(y);
    }
}

struct Measured<'a> {
    id: &'a NodeId,
    col: usize,
    row: usize,
    lines: Vec<String>,
    width: f32,
    height: f32,
}

pub fn emit(
    matrix: &Matrix,
    graph: &GraphIndex<'_>,
    measurer: &mut LabelMeasurer<'_>,
    config: &LayoutConfig,
) -> Geometry {
    let padding = config.canvas_padding;
    let line_height = measurer.line_height();

    let mut sizing = Sizing::new(config);
    let mut measured = Vec::new();
    for row in 0..matrix.rows() {
        for (col, cell) in matrix.row_cells(row).iter().enumerate() {
            let Some(id) = cell.node.as_ref() else {
                continue;
            };
            let block = measurer.measure(&cell.label);
            let width = (block.width + 2.0 * config.label_padding_x).max(config.min_cell_width);
            let height = block.height + config.label_padding_y;
            sizing.record(col, row, width, height);
            measured.push(Measured {
                id,
                col,
                row,
                lines: block.lines,
                width,
                height,
            });
        }
    }

    let mut extent = Extent::default();
    let mut nodes = Vec::with_capacity(measured.len());
    for m in measured {
        let text = m
            .lines
            .into_iter()
            .enumerate()
            .map(|(i, text)| TextRun {
                x: config.label_padding_x,
                y: config.first_baseline + i as f32 * line_height,
                text,
            })
            .collect();
        let node = NodeBox {
            id: m.id.clone(),
            x: sizing.x_offset(m.col) + padding,
            y: sizing.y_offset(m.row, m.col) + padding,
            width: m.width,
            height: m.height,
            column: m.col,
            row: m.row,
            text,
            attributes: graph
                .get(m.id)
                .map(|node| node.attributes.clone())
                .unwrap_or_default(),
        };
        extent.include(node.right(), node.bottom());
        nodes.push(node);
    }

    let mut lines = Vec::new();
    for row in 0..matrix.rows() {
        for (col, cell) in matrix.row_cells(row).iter().enumerate() {
            let split = if cell.has_split_exit() {
                config.edge_padding
            } else {
                0.0
            };
            for mark in cell.bottom.distinct_offsets() {
                let extension = neighbour_extension(matrix, row, col, &mark.source);
                let y = sizing.y_offset(row + 1, col) + padding + mark.offset as f32 * config.edge_padding;
                let line = segment(
                    mark,
                    (row, col, BorderSide::Bottom),
                    (sizing.x_offset(col) + padding + split, y),
                    (
                        sizing.x_offset(col + 1) + padding + extension as f32 * config.edge_padding,
                        y,
                    ),
                    false,
                );
                extent.include(line.x1.max(line.x2), line.y1.max(line.y2));
                lines.push(line);
            }

            let arrow = matrix
                .cell(row + 1, col)
                .is_some_and(|below| below.hosts_node());
            for mark in cell.left.distinct_offsets() {
                let x = sizing.x_offset(col) + padding + mark.offset as f32 * config.edge_padding;
                let line = segment(
                    mark,
                    (row, col, BorderSide::Left),
                    (x, sizing.y_offset(row, col) + padding),
                    (x, sizing.y_offset(row + 1, col) + padding),
                    arrow,
                );
                extent.include(line.x1.max(line.x2), line.y1.max(line.y2));
                lines.push(line);
            }
        }
    }

    tracing::debug!(
        nodes = nodes.len(),
        lines = lines.len(),
        "emitted geometry"
    );

    Geometry {
        nodes,
        lines,
        width: extent.width + padding,
        height: extent.height + padding,
    }
}

fn segment(
    mark: &BorderMark,
    (row, column, side): (usize, usize, BorderSide),
    (x1, y1): (f32, f32),
    (x2, y2): (f32, f32),
    arrow: bool,
) -> LineSegment {
    LineSegment {
        x1,
        y1,
        x2,
        y2,
        arrow,
        column,
        row,
        side,
        source: mark.source.clone(),
        offset: mark.offset,
    }
}

/// Joins per-cell segments that continue each other on the same line into single segments.
/// The result is ordered vertical lines first (by x, then y), then horizontal lines (by y, then
/// x). A joined segment carries an arrow when its last piece does.
pub fn merge_collinear(lines: &[LineSegment]) -> Vec<LineSegment> {
    let mut sorted: Vec<&LineSegment> = lines.iter().collect();
    sorted.sort_by(|a, b| {
        let key = |l: &LineSegment| match l.side {
            BorderSide::Left => (0u8, l.x1, l.y1),
            BorderSide::Bottom => (1u8, l.y1, l.x1),
        };
        let (ka, kb) = (key(a), key(b));
        ka.0.cmp(&kb.0)
            .then(ka.1.total_cmp(&kb.1))
            .then(ka.2.total_cmp(&kb.2))
    });

    let mut merged: Vec<LineSegment> = Vec::new();
    for line in sorted {
        if let Some(last) = merged.last_mut() {
            let continues = match (last.side, line.side) {
                (BorderSide::Left, BorderSide::Left) => {
                    last.x1 == line.x1 && line.y1 <= last.y2 + f32::EPSILON
                }
                (BorderSide::Bottom, BorderSide::Bottom) => {
                    last.y1 == line.y1 && line.x1 <= last.x2 + f32::EPSILON
                }
                _ => false,
            };
            if continues {
                if line.y2 >= last.y2 && line.x2 >= last.x2 {
                    last.x2 = line.x2;
                    last.y2 = line.y2;
                    last.arrow = line.arrow;
                }
                continue;
            }
        }
        merged.push(line.clone());
    }
    merged
}

/// Offset of the vertical segment a horizontal line turns into: the same source's mark on the
/// left border of the right neighbour, else of the lower-right neighbour.
fn neighbour_extension(matrix: &Matrix, row: usize, col: usize, source: &NodeId) -> usize {
    let mut extension = 0;
    for (r, c) in [(row + 1, col + 1), (row, col + 1)] {
        let found = matrix
            .cell(r, c)
            .and_then(|cell| cell.left.marks().iter().rev().find(|mark| &mark.source == source));
        if let Some(mark) = found {
            extension = mark.offset;
        }
    }
    extension
}
