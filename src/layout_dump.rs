use crate::layout::routing::EdgeRoute;
use crate::layout::{BorderSide, Layout};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Flat, JSON-friendly view of a computed layout for debugging and regression diffs.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDump {
    pub width: f32,
    pub height: f32,
    pub columns: usize,
    pub rows: usize,
    pub nodes: Vec<NodeDump>,
    pub edges: Vec<EdgeDump>,
    pub lines: Vec<LineDump>,
    pub unplaced: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDump {
    pub id: String,
    pub column: usize,
    pub row: usize,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub label_lines: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct EdgeDump {
    pub from: String,
    pub to: String,
    pub route: EdgeRoute,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineDump {
    pub column: usize,
    pub row: usize,
    pub side: BorderSide,
    pub offset: usize,
    pub source: String,
    pub points: [[f32; 2]; 2],
    pub arrow: bool,
}

impl LayoutDump {
    pub fn from_layout(layout: &Layout) -> Self {
        let nodes = layout
            .nodes
            .iter()
            .map(|node| NodeDump {
                id: node.id.to_string(),
                column: node.column,
                row: node.row,
                x: node.x,
                y: node.y,
                width: node.width,
                height: node.height,
                label_lines: node.text.iter().map(|run| run.text.clone()).collect(),
            })
            .collect();

        let edges = layout
            .edges
            .iter()
            .map(|edge| EdgeDump {
                from: edge.source.to_string(),
                to: edge.target.to_string(),
                route: edge.route,
            })
            .collect();

        let lines = layout
            .lines
            .iter()
            .map(|line| LineDump {
                column: line.column,
                row: line.row,
                side: line.side,
                offset: line.offset,
                source: line.source.to_string(),
                points: [[line.x1, line.y1], [line.x2, line.y2]],
                arrow: line.arrow,
            })
            .collect();

        LayoutDump {
            width: layout.width,
            height: layout.height,
            columns: layout.columns,
            rows: layout.rows,
            nodes,
            edges,
            lines,
            unplaced: layout.unplaced.iter().map(ToString::to_string).collect(),
        }
    }
}

pub fn write_layout_dump(path: &Path, layout: &Layout) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_layout(layout);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}
