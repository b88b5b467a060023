#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod parser;
pub mod render;
pub mod text_metrics;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig, OptimizationConfig, RenderConfig, load_config};
pub use ir::{GraphNode, NodeId};
pub use layout::optimize::Optimizations;
pub use layout::{Layout, LayoutError, compute_grid, compute_layout};
pub use layout_dump::{LayoutDump, write_layout_dump};
pub use parser::parse_graph;
pub use render::render_svg;
pub use theme::Theme;

/// Theme and layout settings for the one-call [`render_with_options`] pipeline.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub theme: Theme,
    pub layout: LayoutConfig,
}

impl RenderOptions {
    pub fn classic() -> Self {
        Self::default()
    }

    pub fn modern() -> Self {
        Self {
            theme: Theme::modern(),
            layout: LayoutConfig::default(),
        }
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn with_layout_config(mut self, layout: LayoutConfig) -> Self {
        self.layout = layout;
        self
    }
}

/// Parses a JSON graph, lays it out with the passes named in `options.layout.optimizations`
/// and returns the SVG document.
pub fn render_with_options(input: &str, options: RenderOptions) -> anyhow::Result<String> {
    let nodes = parse_graph(input)?;
    let optimizations = Optimizations::from_config(&options.layout.optimizations);
    let layout = compute_layout(&nodes, &options.theme, &options.layout, &optimizations)?;
    Ok(render_svg(&layout, &options.theme))
}
