use crate::theme::Theme;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Node passes selectable by name from config files and the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodePassKind {
    #[serde(alias = "moveChildrenUp")]
    AlignChildren,
}

/// Edge passes selectable by name from config files and the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EdgePassKind {
    SeparateOutgoingEdges,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OptimizationConfig {
    pub node: Vec<NodePassKind>,
    pub edge: Vec<EdgePassKind>,
}

impl OptimizationConfig {
    pub fn none() -> Self {
        Self {
            node: Vec::new(),
            edge: Vec::new(),
        }
    }
}

impl Default for OptimizationConfig {
    fn default() -> Self {
        Self {
            node: vec![NodePassKind::AlignChildren],
            edge: vec![EdgePassKind::SeparateOutgoingEdges],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    /// Width in pixels every cell is guaranteed to have.
    pub min_cell_width: f32,
    /// Minimum height in pixels of a grid row.
    pub cell_height: f32,
    /// Distance in pixels between edges that would otherwise coincide.
    pub edge_padding: f32,
    /// Matrix rows per level (one more than the free rows between two levels).
    pub vertical_padding: usize,
    /// Matrix columns per node slot (one more than the free columns between two nodes).
    pub horizontal_padding: usize,
    pub label_padding_x: f32,
    pub label_padding_y: f32,
    /// Baseline of the first label line, relative to the node's top edge.
    pub first_baseline: f32,
    pub label_line_height: f32,
    /// Measured label widths are rounded up to a multiple of this value.
    pub label_width_step: f32,
    pub canvas_padding: f32,
    pub fast_text_metrics: bool,
    pub optimizations: OptimizationConfig,
}

impl LayoutConfig {
    pub const MIN_VERTICAL_PADDING: usize = 4;
    pub const MIN_HORIZONTAL_PADDING: usize = 3;

    pub fn line_height(&self, theme: &Theme) -> f32 {
        theme.font_size * self.label_line_height
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            min_cell_width: 50.0,
            cell_height: 30.0,
            edge_padding: 10.0,
            vertical_padding: 4,
            horizontal_padding: 3,
            label_padding_x: 10.0,
            label_padding_y: 10.0,
            first_baseline: 20.0,
            label_line_height: 1.3,
            label_width_step: 10.0,
            canvas_padding: 5.0,
            fast_text_metrics: false,
            optimizations: OptimizationConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
    pub background: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            background: "#FFFFFF".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeOverrides {
    font_family: Option<String>,
    font_size: Option<f32>,
    text_color: Option<String>,
    node_fill: Option<String>,
    node_stroke: Option<String>,
    node_stroke_width: Option<f32>,
    line_color: Option<String>,
    line_width: Option<f32>,
    line_dasharray: Option<String>,
    background: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutOverrides {
    min_cell_width: Option<f32>,
    cell_height: Option<f32>,
    edge_padding: Option<f32>,
    vertical_padding: Option<usize>,
    horizontal_padding: Option<usize>,
    label_padding_x: Option<f32>,
    label_padding_y: Option<f32>,
    first_baseline: Option<f32>,
    label_line_height: Option<f32>,
    label_width_step: Option<f32>,
    canvas_padding: Option<f32>,
    fast_text_metrics: Option<bool>,
    optimizations: Option<OptimizationConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeOverrides>,
    layout: Option<LayoutOverrides>,
    render: Option<RenderConfig>,
}

/// Loads a JSON (or JSON5) config file on top of the defaults. Missing keys keep their defaults.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    parse_config(&contents).with_context(|| format!("invalid config file {}", path.display()))
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let parsed: ConfigFile = json5::from_str(contents)?;

    if let Some(theme_name) = parsed.theme.as_deref() {
        config.theme = Theme::by_name(theme_name)
            .ok_or_else(|| anyhow::anyhow!("unknown theme '{theme_name}'"))?;
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            config.theme.font_size = v;
        }
        if let Some(v) = vars.text_color {
            config.theme.text_color = v;
        }
        if let Some(v) = vars.node_fill {
            config.theme.node_fill = v;
        }
        if let Some(v) = vars.node_stroke {
            config.theme.node_stroke = v;
        }
        if let Some(v) = vars.node_stroke_width {
            config.theme.node_stroke_width = v;
        }
        if let Some(v) = vars.line_color {
            config.theme.line_color = v;
        }
        if let Some(v) = vars.line_width {
            config.theme.line_width = v;
        }
        if let Some(v) = vars.line_dasharray {
            config.theme.line_dasharray = v;
        }
        if let Some(v) = vars.background {
            config.theme.background = Some(v);
        }
    }

    if let Some(layout) = parsed.layout {
        if let Some(v) = layout.min_cell_width {
            config.layout.min_cell_width = v;
        }
        if let Some(v) = layout.cell_height {
            config.layout.cell_height = v;
        }
        if let Some(v) = layout.edge_padding {
            config.layout.edge_padding = v;
        }
        if let Some(v) = layout.vertical_padding {
            config.layout.vertical_padding = v;
        }
        if let Some(v) = layout.horizontal_padding {
            config.layout.horizontal_padding = v;
        }
        if let Some(v) = layout.label_padding_x {
            config.layout.label_padding_x = v;
        }
        if let Some(v) = layout.label_padding_y {
            config.layout.label_padding_y = v;
        }
        if let Some(v) = layout.first_baseline {
            config.layout.first_baseline = v;
        }
        if let Some(v) = layout.label_line_height {
            config.layout.label_line_height = v;
        }
        if let Some(v) = layout.label_width_step {
            config.layout.label_width_step = v;
        }
        if let Some(v) = layout.canvas_padding {
            config.layout.canvas_padding = v;
        }
        if let Some(v) = layout.fast_text_metrics {
            config.layout.fast_text_metrics = v;
        }
        if let Some(v) = layout.optimizations {
            config.layout.optimizations = v;
        }
    }

    if let Some(render) = parsed.render {
        config.render = render;
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_viewer_constants() {
        let config = LayoutConfig::default();
        assert_eq!(config.min_cell_width, 50.0);
        assert_eq!(config.cell_height, 30.0);
        assert_eq!(config.edge_padding, 10.0);
        assert_eq!(config.vertical_padding, LayoutConfig::MIN_VERTICAL_PADDING);
        assert_eq!(config.horizontal_padding, LayoutConfig::MIN_HORIZONTAL_PADDING);
    }

    #[test]
    fn partial_overrides_keep_defaults() {
        let config = parse_config(
            r#"{
                // json5 comments are accepted
                theme: "modern",
                themeVariables: { fontSize: 14 },
                layout: { edgePadding: 6, optimizations: { node: ["moveChildrenUp"], edge: [] } },
            }"#,
        )
        .unwrap();
        assert_eq!(config.theme.font_size, 14.0);
        assert_eq!(config.theme.node_fill, Theme::modern().node_fill);
        assert_eq!(config.layout.edge_padding, 6.0);
        assert_eq!(config.layout.cell_height, 30.0);
        assert_eq!(config.layout.optimizations.node, vec![NodePassKind::AlignChildren]);
        assert!(config.layout.optimizations.edge.is_empty());
    }

    #[test]
    fn unknown_theme_is_rejected() {
        assert!(parse_config(r#"{"theme":"neon"}"#).is_err());
    }

    #[test]
    fn plain_json_is_accepted() {
        let config = parse_config(r##"{"render":{"width":640,"height":480,"background":"#000"}}"##)
            .unwrap();
        assert_eq!(config.render.width, 640.0);
        assert_eq!(config.render.background, "#000");
    }

    #[test]
    fn label_geometry_can_be_overridden() {
        let config = parse_config(
            r#"{
                layout: { labelPaddingX: 4, labelPaddingY: 6, firstBaseline: 14, labelWidthStep: 1 },
            }"#,
        )
        .unwrap();
        assert_eq!(config.layout.label_padding_x, 4.0);
        assert_eq!(config.layout.label_padding_y, 6.0);
        assert_eq!(config.layout.first_baseline, 14.0);
        assert_eq!(config.layout.label_width_step, 1.0);
        assert_eq!(config.layout.label_line_height, LayoutConfig::default().label_line_height);
    }
}
