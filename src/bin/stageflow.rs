use std::{path::PathBuf, time::Duration};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "stageflow", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the diagram in virtual time and write a snapshot as SVG or PNG.
    Snapshot(SnapshotArgs),
    /// Print the edge set, routed paths and step list for a viewport width as JSON.
    Plan(PlanArgs),
}

#[derive(Parser, Debug)]
struct SnapshotArgs {
    /// Viewport width in CSS pixels.
    #[arg(long, default_value_t = 1200.0)]
    width: f64,

    /// Zoom factor in [0.5, 2.0]; ignored on narrow layouts.
    #[arg(long)]
    zoom: Option<f64>,

    /// Virtual time to run the animation for, in milliseconds.
    #[arg(long, default_value_t = 0)]
    at_ms: u64,

    /// Output path; `.png` writes a raster, anything else SVG.
    #[arg(long)]
    out: PathBuf,

    /// Diagram manifest JSON. Defaults to the built-in NLP pipeline.
    #[arg(long)]
    manifest: Option<PathBuf>,

    /// Engine config JSON. Missing fields take their defaults.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct PlanArgs {
    /// Viewport width in CSS pixels.
    #[arg(long, default_value_t = 1200.0)]
    width: f64,

    /// Diagram manifest JSON. Defaults to the built-in NLP pipeline.
    #[arg(long)]
    manifest: Option<PathBuf>,

    /// Engine config JSON. Missing fields take their defaults.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(serde::Serialize)]
struct Plan<'a> {
    mode: stageflow::LayoutMode,
    width: f64,
    edges: Vec<&'a stageflow::EdgeSpec>,
    paths: &'a [stageflow::DrawablePath],
    steps: &'a [stageflow::StepSpec],
}

fn main() -> anyhow::Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Snapshot(args) => cmd_snapshot(args),
        Command::Plan(args) => cmd_plan(args),
    }
}

fn load_inputs(
    manifest: Option<&PathBuf>,
    config: Option<&PathBuf>,
) -> anyhow::Result<(stageflow::DiagramManifest, stageflow::EngineConfig)> {
    let manifest = match manifest {
        Some(path) => stageflow::DiagramManifest::from_path(path)
            .with_context(|| format!("load manifest '{}'", path.display()))?,
        None => stageflow::nlp_pipeline(),
    };
    let config = match config {
        Some(path) => stageflow::EngineConfig::from_path(path)
            .with_context(|| format!("load config '{}'", path.display()))?,
        None => stageflow::EngineConfig::default(),
    };
    Ok((manifest, config))
}

fn cmd_snapshot(args: SnapshotArgs) -> anyhow::Result<()> {
    let (manifest, config) = load_inputs(args.manifest.as_ref(), args.config.as_ref())?;
    let settle = Duration::from_millis(config.timing.zoom_settle_ms);
    let mut diagram = stageflow::PipelineDiagram::simulated(manifest, config, args.width)?;
    diagram.initialize();

    if let Some(zoom) = args.zoom {
        let target = stageflow::ZoomLevel::from_scale(zoom);
        while diagram.zoom_level() != target {
            let stepped = if diagram.zoom_level() < target {
                diagram.zoom_in()
            } else {
                diagram.zoom_out()
            };
            if stepped.is_none() {
                tracing::warn!(zoom, "zoom unavailable on narrow layouts; ignoring --zoom");
                break;
            }
        }
        diagram.advance(settle);
    }

    diagram.advance(Duration::from_millis(args.at_ms));

    if let Some(parent) = args.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    stageflow::write_snapshot(diagram.host(), &args.out)?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_plan(args: PlanArgs) -> anyhow::Result<()> {
    let (manifest, config) = load_inputs(args.manifest.as_ref(), args.config.as_ref())?;
    let mut diagram = stageflow::PipelineDiagram::simulated(manifest, config, args.width)?;
    diagram.resize_to_container()?;
    let status = diagram.draw_all()?;
    tracing::debug!(?status, "plan drawn");

    let mode = diagram.mode();
    let plan = Plan {
        mode,
        width: args.width,
        edges: diagram.manifest().edges_for(mode).collect(),
        paths: diagram.paths(),
        steps: diagram.manifest().steps.for_mode(mode),
    };
    let out = serde_json::to_string_pretty(&plan).context("serialize plan")?;
    println!("{out}");
    Ok(())
}
