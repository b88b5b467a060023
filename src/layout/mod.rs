mod error;
pub mod geometry;
pub mod index;
pub mod matrix;
pub mod optimize;
pub mod positions;
pub mod routing;
pub mod text;
pub(crate) mod types;
pub use error::{LayoutError, Result};
pub use types::*;

use crate::config::LayoutConfig;
use crate::ir::{GraphNode, NodeId};
use crate::theme::Theme;

use index::GraphIndex;
use matrix::Matrix;
use optimize::Optimizations;
use positions::{NodePositions, preliminary_positions};
use routing::{RoutedEdge, route_edges};
use text::LabelMeasurer;

/// Everything decided before pixels are computed.
#[derive(Debug, Clone)]
pub struct GridLayout {
    /// Matrix positions of the placed nodes.
    pub positions: NodePositions,
    pub matrix: Matrix,
    pub edges: Vec<RoutedEdge>,
    pub unplaced: Vec<NodeId>,
}

/// State owned by a single layout call.
struct LayoutContext<'a> {
    graph: GraphIndex<'a>,
    config: &'a LayoutConfig,
    measurer: LabelMeasurer<'a>,
}

impl<'a> LayoutContext<'a> {
    fn new(nodes: &'a [GraphNode], theme: &'a Theme, config: &'a LayoutConfig) -> Result<Self> {
        validate_config(config)?;
        let graph = GraphIndex::build(nodes)?;
        Ok(Self {
            graph,
            config,
            measurer: LabelMeasurer::new(theme, config),
        })
    }
}

fn validate_config(config: &LayoutConfig) -> Result<()> {
    if config.vertical_padding < LayoutConfig::MIN_VERTICAL_PADDING {
        return Err(LayoutError::InvalidConfig(format!(
            "vertical padding must be at least {}, got {}",
            LayoutConfig::MIN_VERTICAL_PADDING,
            config.vertical_padding
        )));
    }
    if config.horizontal_padding < LayoutConfig::MIN_HORIZONTAL_PADDING {
        return Err(LayoutError::InvalidConfig(format!(
            "horizontal padding must be at least {}, got {}",
            LayoutConfig::MIN_HORIZONTAL_PADDING,
            config.horizontal_padding
        )));
    }
    for (name, value) in [
        ("minimum cell width", config.min_cell_width),
        ("cell height", config.cell_height),
        ("edge padding", config.edge_padding),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(LayoutError::InvalidConfig(format!(
                "{name} must be a non-negative number, got {value}"
            )));
        }
    }
    Ok(())
}

/// Lays out `nodes` on the grid and routes every edge, without computing geometry.
pub fn compute_grid(
    nodes: &[GraphNode],
    config: &LayoutConfig,
    optimizations: &Optimizations,
) -> Result<GridLayout> {
    validate_config(config)?;
    let graph = GraphIndex::build(nodes)?;
    Ok(grid(&graph, config, optimizations))
}

fn grid(graph: &GraphIndex<'_>, config: &LayoutConfig, optimizations: &Optimizations) -> GridLayout {
    let preliminary = preliminary_positions(graph);
    tracing::debug!(
        placed = preliminary.positions.len(),
        unplaced = preliminary.unplaced.len(),
        "preliminary positions"
    );

    let positions = optimizations.apply_node_passes(graph, preliminary.positions);
    let positions = positions.to_matrix(config.horizontal_padding, config.vertical_padding);

    let mut matrix = Matrix::from_positions(graph, &positions);
    tracing::debug!(rows = matrix.rows(), columns = matrix.columns(), "matrix allocated");

    let edges = route_edges(&mut matrix, graph, &positions, config.vertical_padding);
    let matrix = optimizations.apply_edge_passes(graph, matrix, &positions);
    tracing::debug!(
        edges = edges.len(),
        columns = matrix.columns(),
        "edges routed"
    );

    GridLayout {
        positions,
        matrix,
        edges,
        unplaced: preliminary.unplaced,
    }
}

pub fn compute_layout(
    nodes: &[GraphNode],
    theme: &Theme,
    config: &LayoutConfig,
    optimizations: &Optimizations,
) -> Result<Layout> {
    let mut ctx = LayoutContext::new(nodes, theme, config)?;
    let grid = grid(&ctx.graph, ctx.config, optimizations);
    let geometry = geometry::emit(&grid.matrix, &ctx.graph, &mut ctx.measurer, ctx.config);

    Ok(Layout {
        nodes: geometry.nodes,
        lines: geometry.lines,
        marker: ArrowMarker::default(),
        width: geometry.width,
        height: geometry.height,
        columns: grid.matrix.columns(),
        rows: grid.matrix.rows(),
        edges: grid.edges,
        unplaced: grid.unplaced,
    })
}
