use std::{
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "loopmorph", version, about = "Seamless optical-flow morph loops from still images")]
struct Cli {
    /// More log output (repeat for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build one looping video per manifest group.
    Build(BuildArgs),
    /// Render a single interpolated frame between two images as a PNG.
    Morph(MorphArgs),
    /// Print optical-flow statistics for an image pair.
    Flow(FlowArgs),
}

#[derive(Args, Debug)]
struct ConfigArgs {
    /// JSON configuration file; unset fields keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output square side in pixels.
    #[arg(long)]
    size: Option<u32>,
}

#[derive(Args, Debug)]
struct BuildArgs {
    /// Manifest JSON mapping group names to image paths.
    #[arg(long)]
    manifest: PathBuf,

    /// Directory that relative image paths are resolved against.
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Directory receiving `<group>.mp4` files.
    #[arg(long, default_value = "media")]
    out_dir: PathBuf,

    /// Group to build (repeatable). Builds every group when omitted.
    #[arg(long = "group")]
    groups: Vec<String>,

    /// Frames per second.
    #[arg(long)]
    fps: Option<u32>,

    /// Seconds each still is held.
    #[arg(long)]
    hold: Option<f64>,

    /// Seconds each morph lasts.
    #[arg(long)]
    transition: Option<f64>,

    #[command(flatten)]
    cfg: ConfigArgs,
}

#[derive(Args, Debug)]
struct MorphArgs {
    /// Start image.
    #[arg(long)]
    a: PathBuf,

    /// End image.
    #[arg(long)]
    b: PathBuf,

    /// Blend time strictly between 0 and 1.
    #[arg(long, default_value_t = 0.5)]
    t: f32,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    cfg: ConfigArgs,
}

#[derive(Args, Debug)]
struct FlowArgs {
    /// Source image.
    #[arg(long)]
    a: PathBuf,

    /// Target image.
    #[arg(long)]
    b: PathBuf,

    #[command(flatten)]
    cfg: ConfigArgs,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);
    match cli.cmd {
        Command::Build(args) => cmd_build(args),
        Command::Morph(args) => cmd_morph(args).map(|()| ExitCode::SUCCESS),
        Command::Flow(args) => cmd_flow(args).map(|()| ExitCode::SUCCESS),
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => tracing::Level::ERROR,
        (false, 0) => tracing::Level::INFO,
        (false, 1) => tracing::Level::DEBUG,
        (false, _) => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .init();
}

fn load_config(args: &ConfigArgs) -> anyhow::Result<loopmorph::MorphConfig> {
    let mut cfg = match &args.config {
        Some(path) => loopmorph::MorphConfig::from_path(path)?,
        None => loopmorph::MorphConfig::default(),
    };
    if let Some(size) = args.size {
        cfg.width = size;
        cfg.height = size;
    }
    Ok(cfg)
}

fn cmd_build(args: BuildArgs) -> anyhow::Result<ExitCode> {
    let mut cfg = load_config(&args.cfg)?;
    if let Some(fps) = args.fps {
        cfg.fps = fps;
    }
    if let Some(hold) = args.hold {
        cfg.hold_secs = hold;
    }
    if let Some(transition) = args.transition {
        cfg.transition_secs = transition;
    }
    cfg.validate()?;

    let manifest = loopmorph::Manifest::from_path(&args.manifest)?;
    let plan = manifest.plan(&args.groups, &args.root, &args.out_dir);
    if !plan.missing.is_empty() {
        let available: Vec<&str> = manifest.group_names().collect();
        tracing::warn!(missing = ?plan.missing, ?available, "requested groups have no images");
    }
    tracing::info!(
        groups = plan.jobs.len(),
        missing = plan.missing.len(),
        "starting batch"
    );

    let sinks = loopmorph::EncoderSelector::detect(&cfg.encoder);
    let report = loopmorph::BatchRunner::new(&cfg).run(&plan, &sinks);

    println!("{report}");
    Ok(if report.has_failures() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn load_pair(
    a: &Path,
    b: &Path,
    size: u32,
) -> anyhow::Result<(image::RgbImage, image::RgbImage)> {
    Ok((
        loopmorph::load_prepared(a, size)?,
        loopmorph::load_prepared(b, size)?,
    ))
}

fn cmd_morph(args: MorphArgs) -> anyhow::Result<()> {
    let cfg = load_config(&args.cfg)?;
    cfg.validate()?;
    let (a, b) = load_pair(&args.a, &args.b, cfg.width)?;

    let sequencer = loopmorph::LoopSequencer::new(&cfg);
    let flows = match sequencer.pair_flows(&a, &b) {
        Ok(flows) => Some(flows),
        Err(err) => {
            tracing::warn!(error = %err, "flow unavailable; writing a cross-dissolve");
            None
        }
    };
    let frame = loopmorph::interpolate(&a, &b, flows.as_ref(), args.t)?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    frame
        .save_with_format(&args.out, image::ImageFormat::Png)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_flow(args: FlowArgs) -> anyhow::Result<()> {
    let cfg = load_config(&args.cfg)?;
    cfg.validate()?;
    let (a, b) = load_pair(&args.a, &args.b, cfg.width)?;
    let (ga, gb) = (
        loopmorph::GrayFrame::from_rgb(&a),
        loopmorph::GrayFrame::from_rgb(&b),
    );

    let estimator = loopmorph::FlowEstimator::from_config(&cfg.flow);
    let forward = estimator.estimate(&ga, &gb)?;
    let backward = estimator.estimate(&gb, &ga)?;
    let mask = loopmorph::consistency_mask(&forward.field, &backward.field, &cfg.mask)?;

    for (label, est) in [("forward", &forward), ("backward", &backward)] {
        let s = est.field.stats();
        println!(
            "{label}: algorithm={} mean=({:.3}, {:.3}) mean_mag={:.3} max_mag={:.3}",
            est.algorithm, s.mean_dx, s.mean_dy, s.mean_magnitude, s.max_magnitude
        );
    }
    println!("confident: {:.1}%", mask.confident_ratio() * 100.0);
    Ok(())
}
