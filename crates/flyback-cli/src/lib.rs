//! Flyback CLI - batch renderer for booster telemetry replays.

use std::fs::File;
use std::io::BufWriter;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use flyback_core::{InversionPolicy, InversionPreset, SignConvention};
use flyback_replay::{
    render_svg, Frame, FrameRecord, Overlay, PlaybackConfig, RunSummary, Session, TelemetryStore,
};
use serde::Serialize;
use tracing::info;

/// Public function that can be called from the main binary
pub fn run_cli_main(args: &[&str]) -> Result<()> {
    let args = Args::parse_from(args);
    main_inner(args)
}

#[derive(Parser, Debug)]
#[command(name = "flyback-cli")]
#[command(about = "Render a booster telemetry replay to SVG frames, CSV or JSON")]
#[command(version)]
pub struct Args {
    /// Telemetry CSV to replay
    #[arg(required_unless_present = "dump_config")]
    input: Option<PathBuf>,

    /// Output directory
    #[arg(short, long, default_value = "output")]
    output_dir: PathBuf,

    /// Output file format
    #[arg(short, long, value_enum, default_value = "svg")]
    format: OutputFormat,

    /// JSON playback config; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the effective config as JSON and exit
    #[arg(long)]
    dump_config: bool,

    // ── Display ───────────────────────────────────────────────
    #[arg(long)]
    width: Option<u32>,

    #[arg(long)]
    height: Option<u32>,

    /// Ticks per second
    #[arg(long)]
    fps: Option<u32>,

    /// Pace output at the configured tick rate instead of rendering flat out
    #[arg(long)]
    realtime: bool,

    #[arg(long)]
    line_thickness: Option<u32>,

    #[arg(long)]
    icon_scale: Option<f64>,

    /// Image embedded as the vehicle icon in SVG output
    #[arg(long)]
    icon_href: Option<String>,

    // ── Orientation ───────────────────────────────────────────
    /// Inversion rule to start from
    #[arg(long, value_enum)]
    preset: Option<PresetArg>,

    /// Inverted strictly after this time (s)
    #[arg(long)]
    inversion_threshold: Option<f64>,

    /// Degrees added to the icon angle while inverted
    #[arg(long, allow_hyphen_values = true)]
    inversion_offset: Option<f64>,

    /// Icon asset is drawn nose-down
    #[arg(long)]
    mirrored: bool,

    /// Flip starts at the first sample at or after this time (s)
    #[arg(long)]
    separation_time: Option<f64>,

    /// Degrees per tick while flipping
    #[arg(long)]
    rotation_step: Option<f64>,

    // ── Output selection ──────────────────────────────────────
    #[arg(long)]
    seed: Option<u64>,

    /// Keep every Nth frame
    #[arg(long, default_value_t = 1)]
    every: usize,

    /// Stop after this many ticks
    #[arg(long)]
    max_frames: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Svg,
    Csv,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PresetArg {
    Separation,
    BoostbackFlip,
    BoostbackQuarterTurn,
}

impl From<PresetArg> for InversionPreset {
    fn from(arg: PresetArg) -> Self {
        match arg {
            PresetArg::Separation => Self::Separation,
            PresetArg::BoostbackFlip => Self::BoostbackFlip,
            PresetArg::BoostbackQuarterTurn => Self::BoostbackQuarterTurn,
        }
    }
}

fn main_inner(args: Args) -> Result<()> {
    let config = build_config(&args)?;

    if args.dump_config {
        println!("{}", config.to_json_pretty()?);
        return Ok(());
    }

    let Some(input) = args.input.as_deref() else {
        bail!("no telemetry input given");
    };

    println!("Flyback Booster Replay");
    println!("======================\n");

    let store = TelemetryStore::from_path(input)
        .with_context(|| format!("loading telemetry from {}", input.display()))?;
    print_replay_stats(&store);

    let store = Arc::new(store);
    let mut session = Session::new(store, config)?;
    if args.realtime {
        session = session.paced();
    }

    let summary = write_output(&args, &mut session)?;
    println!(
        "\nReplay complete: {} ticks, last sample {}{}",
        summary.frames,
        summary.last_index,
        if summary.stopped_early { " (stopped early)" } else { "" }
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn build_config(args: &Args) -> Result<PlaybackConfig> {
    let mut config = match &args.config {
        Some(path) => PlaybackConfig::from_json_file(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => PlaybackConfig::default(),
    };

    if let Some(v) = args.width {
        config.width = v;
    }
    if let Some(v) = args.height {
        config.height = v;
    }
    if let Some(v) = args.fps {
        config.fps = v;
    }
    if let Some(v) = args.line_thickness {
        config.line_thickness = v;
    }
    if let Some(v) = args.icon_scale {
        config.icon.scale = v;
    }
    if let Some(href) = &args.icon_href {
        config.icon.href = Some(href.clone());
    }
    if let Some(v) = args.seed {
        config.seed = Some(v);
    }
    if let Some(v) = args.separation_time {
        config.separation_time = v;
    }
    if let Some(v) = args.rotation_step {
        config.rotation_step = v;
    }

    // Preset first, then individual overrides on top of it
    if let Some(preset) = args.preset {
        config.inversion = InversionPolicy::from_preset(preset.into());
    }
    if let Some(v) = args.inversion_threshold {
        config.inversion.threshold_time = v;
    }
    if let Some(v) = args.inversion_offset {
        config.inversion.offset_degrees = v;
    }
    if args.mirrored {
        config.inversion.sign_convention = SignConvention::Mirrored;
    }

    if args.every == 0 {
        bail!("--every must be at least 1");
    }
    if args.max_frames == Some(0) {
        bail!("--max-frames must be at least 1");
    }

    config.validate()?;
    Ok(config)
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct JsonDump<'a> {
    config: &'a PlaybackConfig,
    overlay: &'a Overlay,
    frames: Vec<Frame>,
}

/// Decides which ticks reach the output and when to stop.
#[derive(Debug, Clone, Copy)]
struct FrameFilter {
    every: usize,
    max_ticks: usize,
    ticks: usize,
}

impl FrameFilter {
    fn new(every: usize, max_ticks: Option<usize>) -> Self {
        Self {
            every: every.max(1),
            max_ticks: max_ticks.unwrap_or(usize::MAX),
            ticks: 0,
        }
    }

    /// Returns whether the current tick is kept, and whether to continue.
    fn admit(&mut self) -> (bool, ControlFlow<()>) {
        let keep = self.ticks % self.every == 0;
        self.ticks += 1;
        let flow = if self.ticks >= self.max_ticks {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        };
        (keep, flow)
    }
}

fn write_output(args: &Args, session: &mut Session) -> Result<RunSummary> {
    std::fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("creating {}", args.output_dir.display()))?;

    let config = session.config().clone();
    let mut filter = FrameFilter::new(args.every, args.max_frames);
    let mut written = 0usize;

    let summary = match args.format {
        OutputFormat::Svg => {
            let dir = args.output_dir.as_path();
            session.run(|overlay, frame| -> Result<ControlFlow<()>> {
                let (keep, flow) = filter.admit();
                if keep {
                    let path = dir.join(svg_file_name(frame.index));
                    std::fs::write(&path, render_svg(overlay, frame, &config))
                        .with_context(|| format!("writing {}", path.display()))?;
                    written += 1;
                }
                Ok(flow)
            })?
        }
        OutputFormat::Csv => {
            let path = args.output_dir.join("frames.csv");
            let mut wtr = csv::Writer::from_path(&path)
                .with_context(|| format!("creating {}", path.display()))?;
            let summary = session.run(|_, frame| -> Result<ControlFlow<()>> {
                let (keep, flow) = filter.admit();
                if keep {
                    wtr.serialize(FrameRecord::from(frame))?;
                    written += 1;
                }
                Ok(flow)
            })?;
            wtr.flush()?;
            summary
        }
        OutputFormat::Json => {
            let overlay = session.overlay().clone();
            let mut frames = Vec::new();
            let summary = session.run(|_, frame| -> Result<ControlFlow<()>> {
                let (keep, flow) = filter.admit();
                if keep {
                    frames.push(frame.clone());
                }
                Ok(flow)
            })?;
            written = frames.len();

            let path = args.output_dir.join("frames.json");
            let file = BufWriter::new(
                File::create(&path).with_context(|| format!("creating {}", path.display()))?,
            );
            let dump = JsonDump {
                config: &config,
                overlay: &overlay,
                frames,
            };
            serde_json::to_writer(file, &dump)?;
            summary
        }
    };

    info!(written, format = ?args.format, "output written");
    println!("{} frame(s) written to {}", written, output_target(args).display());
    Ok(summary)
}

fn svg_file_name(index: usize) -> String {
    format!("frame_{index:05}.svg")
}

fn output_target(args: &Args) -> PathBuf {
    let dir: &Path = &args.output_dir;
    match args.format {
        OutputFormat::Svg => dir.to_path_buf(),
        OutputFormat::Csv => dir.join("frames.csv"),
        OutputFormat::Json => dir.join("frames.json"),
    }
}

fn print_replay_stats(store: &TelemetryStore) {
    println!("Telemetry:");
    println!("  Samples:       {}", store.len());
    println!("  Duration:      {:.2} s", store.duration());
    println!("  Apogee:        {:.2} km", store.max_altitude());
    println!("  Max Downrange: {:.2} km", store.max_downrange());
    println!("  Max Speed:     {:.2} m/s", store.max_speed());
    println!("-----------------------------");
}
