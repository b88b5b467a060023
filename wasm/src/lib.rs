use levelgraph_renderer::{OptimizationConfig, RenderOptions, render_with_options};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphRenderOptions {
    theme: Option<String>,
    font_family: Option<String>,
    font_size: Option<f32>,
    min_cell_width: Option<f32>,
    cell_height: Option<f32>,
    edge_padding: Option<f32>,
    fast_text: Option<bool>,
    no_optimize: Option<bool>,
}

fn build_render_options(options: GraphRenderOptions) -> RenderOptions {
    let mut render_options = if options.theme.as_deref() == Some("modern") {
        RenderOptions::modern()
    } else {
        RenderOptions::classic()
    };

    if let Some(font_family) = options.font_family {
        render_options.theme.font_family = font_family;
    }
    if let Some(font_size) = options.font_size {
        render_options.theme.font_size = font_size;
    }
    let layout = &mut render_options.layout;
    if let Some(v) = options.min_cell_width {
        layout.min_cell_width = v;
    }
    if let Some(v) = options.cell_height {
        layout.cell_height = v;
    }
    if let Some(v) = options.edge_padding {
        layout.edge_padding = v;
    }
    // no system fonts in the browser
    layout.fast_text_metrics = options.fast_text.unwrap_or(true);
    if options.no_optimize == Some(true) {
        layout.optimizations = OptimizationConfig::none();
    }

    render_options
}

#[wasm_bindgen]
pub fn render_graph_svg(graph_json: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let options = if let Some(raw_options) = options_json {
        serde_json::from_str::<GraphRenderOptions>(&raw_options)
            .map_err(|error| JsValue::from_str(&error.to_string()))?
    } else {
        GraphRenderOptions::default()
    };

    let render_options = build_render_options(options);
    render_with_options(graph_json, render_options)
        .map_err(|error| JsValue::from_str(&error.to_string()))
}
