use crate::config::{Config, OptimizationConfig, load_config};
use crate::layout::compute_layout;
use crate::layout::optimize::Optimizations;
use crate::layout_dump::write_layout_dump;
use crate::parser::parse_graph;
use crate::render::{render_svg, write_output_png, write_output_svg};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

#[derive(Parser, Debug)]
#[command(
    name = "lgr",
    version,
    about = "Lay out a leveled directed graph on a grid and render it"
)]
pub struct Args {
    /// Input graph (.json) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file (svg/png). Defaults to stdout for SVG if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config file (JSON or JSON5) with theme, themeVariables, layout and render sections
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Minimum width of a grid cell in pixels
    #[arg(long = "minCellWidth")]
    pub min_cell_width: Option<f32>,

    /// Minimum height of a grid row in pixels
    #[arg(long = "cellHeight")]
    pub cell_height: Option<f32>,

    /// Distance in pixels between parallel edges
    #[arg(long = "edgePadding")]
    pub edge_padding: Option<f32>,

    /// Skip the node and edge optimization passes
    #[arg(long = "noOptimize")]
    pub no_optimize: bool,

    /// Write the computed layout as JSON to this path
    #[arg(long = "dumpLayout")]
    pub dump_layout: Option<PathBuf>,

    /// Raster width used for PNG output
    #[arg(short = 'w', long = "width")]
    pub width: Option<f32>,

    /// Raster height used for PNG output
    #[arg(short = 'H', long = "height")]
    pub height: Option<f32>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
}

pub fn run() -> Result<()> {
    init_tracing();
    run_with_args(Args::parse())
}

/// Installs a stderr `fmt` subscriber filtered by `RUST_LOG`. A subscriber installed earlier
/// (by tests or an embedding application) wins.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::from_default_env())
        .try_init();
}

pub fn run_with_args(args: Args) -> Result<()> {
    let config = resolve_config(&args)?;
    let input = read_input(args.input.as_deref())?;
    let nodes = parse_graph(&input)?;

    let optimizations = Optimizations::from_config(&config.layout.optimizations);
    let layout = compute_layout(&nodes, &config.theme, &config.layout, &optimizations)?;
    if let Some(path) = args.dump_layout.as_deref() {
        write_layout_dump(path, &layout)
            .with_context(|| format!("failed to write layout dump {}", path.display()))?;
    }

    let svg = render_svg(&layout, &config.theme);
    match args.output_format {
        OutputFormat::Svg => {
            write_output_svg(&svg, args.output.as_deref())?;
        }
        OutputFormat::Png => {
            let output = ensure_output(&args.output, "png")?;
            write_output_png(&svg, &output, &config.render, &config.theme)?;
        }
    }
    Ok(())
}

/// Config file first, then command-line overrides on top.
fn resolve_config(args: &Args) -> Result<Config> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(v) = args.min_cell_width {
        config.layout.min_cell_width = v;
    }
    if let Some(v) = args.cell_height {
        config.layout.cell_height = v;
    }
    if let Some(v) = args.edge_padding {
        config.layout.edge_padding = v;
    }
    if args.no_optimize {
        config.layout.optimizations = OptimizationConfig::none();
    }
    if let Some(v) = args.width {
        config.render.width = v;
    }
    if let Some(v) = args.height {
        config.render.height = v;
    }
    Ok(config)
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path != Path::new("-") {
            return std::fs::read_to_string(path)
                .with_context(|| format!("failed to read input {}", path.display()));
        }
    }
    let mut buf = String::new();
    io::stdin()
        .read_to_string(&mut buf)
        .context("failed to read graph from stdin")?;
    Ok(buf)
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!("Output path required for {} output", ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("lgr").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn flags_override_config_defaults() {
        let args = parse(&[
            "--minCellWidth",
            "80",
            "--cellHeight",
            "40",
            "--edgePadding",
            "6",
            "--noOptimize",
        ]);
        let config = resolve_config(&args).unwrap();
        assert_eq!(config.layout.min_cell_width, 80.0);
        assert_eq!(config.layout.cell_height, 40.0);
        assert_eq!(config.layout.edge_padding, 6.0);
        assert!(config.layout.optimizations.node.is_empty());
        assert!(config.layout.optimizations.edge.is_empty());
    }

    #[test]
    fn defaults_keep_standard_passes() {
        let args = parse(&[]);
        assert_eq!(args.output_format, OutputFormat::Svg);
        let config = resolve_config(&args).unwrap();
        assert_eq!(config.layout.optimizations, OptimizationConfig::default());
    }

    #[test]
    fn png_needs_an_output_path() {
        let args = parse(&["-e", "png"]);
        assert_eq!(args.output_format, OutputFormat::Png);
        assert!(ensure_output(&args.output, "png").is_err());
    }

    #[test]
    fn renders_a_file_to_svg_and_dumps_the_layout() {
        let dir = std::env::temp_dir().join(format!("lgr-cli-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let input = dir.join("graph.json");
        let output = dir.join("graph.svg");
        let dump = dir.join("layout.json");
        std::fs::write(
            &input,
            r#"[{"id":1,"label":"start","level":0,"children":[2]},{"id":2,"label":"end","level":1}]"#,
        )
        .unwrap();
        let args = parse(&[
            "-i",
            input.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
            "--dumpLayout",
            dump.to_str().unwrap(),
        ]);
        run_with_args(args).unwrap();
        let svg = std::fs::read_to_string(&output).unwrap();
        assert!(svg.contains("start"));
        let dumped: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&dump).unwrap()).unwrap();
        assert_eq!(dumped["nodes"].as_array().map(Vec::len), Some(2));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
