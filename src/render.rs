use crate::config::RenderConfig;
use crate::layout::{ArrowMarker, Layout, LineSegment, NodeBox};
use crate::theme::Theme;
use anyhow::Result;
use std::fmt::Write as _;
use std::path::Path;

/// Serialises a computed layout to a standalone SVG document sized to the layout's canvas.
pub fn render_svg(layout: &Layout, theme: &Theme) -> String {
    let mut svg = String::new();
    let width = layout.width;
    let height = layout.height;
    let _ = write!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">"
    );
    if let Some(background) = &theme.background {
        let _ = write!(
            svg,
            "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
            escape_xml(background)
        );
    }
    svg.push_str(&marker_defs(&layout.marker, theme));
    for node in &layout.nodes {
        svg.push_str(&node_svg(node, theme));
    }
    for line in &layout.lines {
        svg.push_str(&line_svg(line, &layout.marker, theme));
    }
    svg.push_str("</svg>");
    svg
}

fn marker_defs(marker: &ArrowMarker, theme: &Theme) -> String {
    format!(
        "<defs><marker id=\"{}\" markerWidth=\"{}\" markerHeight=\"{}\" refX=\"{}\" refY=\"{}\" orient=\"{}\"><path d=\"{}\" fill=\"{}\"/></marker></defs>",
        marker.id,
        marker.width,
        marker.height,
        marker.ref_x,
        marker.ref_y,
        marker.orient,
        marker.path,
        escape_xml(&theme.line_color)
    )
}

/// A nested `<svg>` viewport per node, so text runs use node-relative coordinates.
fn node_svg(node: &NodeBox, theme: &Theme) -> String {
    let mut rect_attrs: Vec<(&str, String)> = vec![
        ("width", fmt_num(node.width)),
        ("height", fmt_num(node.height)),
        ("stroke", theme.node_stroke.clone()),
        ("stroke-width", fmt_num(theme.node_stroke_width)),
        ("fill", theme.node_fill.clone()),
    ];
    for (key, value) in &node.attributes {
        match rect_attrs.iter_mut().find(|(name, _)| *name == key.as_str()) {
            Some(existing) => existing.1 = value.clone(),
            None => rect_attrs.push((key.as_str(), value.clone())),
        }
    }

    let mut out = String::new();
    let _ = write!(
        out,
        "<svg x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" overflow=\"visible\">",
        fmt_num(node.x),
        fmt_num(node.y),
        fmt_num(node.width),
        fmt_num(node.height)
    );
    out.push_str("<rect");
    for (name, value) in &rect_attrs {
        let _ = write!(out, " {}=\"{}\"", escape_xml(name), escape_xml(value));
    }
    out.push_str("/>");
    for run in &node.text {
        let _ = write!(
            out,
            "<text x=\"{}px\" y=\"{}px\" font-size=\"{}\" font-family=\"{}\" fill=\"{}\">{}</text>",
            fmt_num(run.x),
            fmt_num(run.y),
            fmt_num(theme.font_size),
            escape_xml(&theme.font_family),
            escape_xml(&theme.text_color),
            escape_xml(&run.text)
        );
    }
    out.push_str("</svg>");
    out
}

fn line_svg(line: &LineSegment, marker: &ArrowMarker, theme: &Theme) -> String {
    let mut out = format!(
        "<line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"{}\" stroke-width=\"{}\"",
        fmt_num(line.x1),
        fmt_num(line.y1),
        fmt_num(line.x2),
        fmt_num(line.y2),
        escape_xml(&theme.line_color),
        fmt_num(theme.line_width)
    );
    if !theme.line_dasharray.is_empty() {
        let _ = write!(out, " stroke-dasharray=\"{}\"", escape_xml(&theme.line_dasharray));
    }
    if line.arrow {
        let _ = write!(out, " marker-end=\"url(#{})\"", marker.id);
    }
    out.push_str("/>");
    out
}

/// Up to two decimals, without trailing zeros.
fn fmt_num(value: f32) -> String {
    let formatted = format!("{value:.2}");
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(
    svg: &str,
    output: &Path,
    render_cfg: &RenderConfig,
    theme: &Theme,
) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = theme
        .font_family
        .split(',')
        .next()
        .map(|family| family.trim().trim_matches('"').to_string())
        .unwrap_or_else(|| "sans-serif".to_string());
    opt.fontdb_mut().load_system_fonts();
    if let Some(size) = usvg::Size::from_wh(render_cfg.width, render_cfg.height) {
        opt.default_size = size;
    }

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;
    if theme.background.is_none() {
        if let Some(color) = parse_hex_color(&render_cfg.background) {
            pixmap.fill(color);
        }
    }

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

#[cfg(not(feature = "png"))]
pub fn write_output_png(
    _svg: &str,
    _output: &Path,
    _render_cfg: &RenderConfig,
    _theme: &Theme,
) -> Result<()> {
    Err(anyhow::anyhow!(
        "PNG output requires the `png` feature"
    ))
}

#[cfg(feature = "png")]
fn parse_hex_color(value: &str) -> Option<resvg::tiny_skia::Color> {
    let hex = value.strip_prefix('#')?;
    let expanded: String = match hex.len() {
        3 => hex.chars().flat_map(|c| [c, c]).collect(),
        6 => hex.to_string(),
        _ => return None,
    };
    let channel = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).ok();
    Some(resvg::tiny_skia::Color::from_rgba8(
        channel(0)?,
        channel(2)?,
        channel(4)?,
        255,
    ))
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
