#![deny(unsafe_code)]
//! CLI binary for the molecular particle engine.
//!
//! Subcommands:
//! - `render <variant>`: simulate N frames under a scripted pointer, write PNG
//! - `replay <seed.json>`: re-run a recorded render
//! - `list`: print available variants
//! - `schema <variant>`: print a variant's override keys

mod error;
mod script;

use clap::{Args, Parser, Subcommand};
use error::CliError;
use molecular_core::engine::{
    FrameClock, ManualStepper, RasterSource, Simulation, StaticRaster, TickSource,
};
use molecular_core::{Rgb8, Seed, Viewport};
use molecular_engines::pixel::PixelCanvas;
use molecular_engines::snapshot::{load_raster, write_png};
use molecular_engines::source::{FitToViewport, Swatch, TextRaster};
use molecular_engines::{SourceKind, VariantKind, DEFAULT_TEXT};
use script::{PointerScript, ScriptedPointer};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use tracing::debug;

#[derive(Parser)]
#[command(name = "molecular", about = "Pointer-reactive particle fields from images and text")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Log at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

/// Inputs that are not part of the recorded seed.
#[derive(Args)]
struct SourceArgs {
    /// PNG to sample (image and rain variants). A built-in swatch is used otherwise.
    #[arg(long)]
    image: Option<PathBuf>,

    /// Word to rasterize for text variants.
    #[arg(long)]
    text: Option<String>,

    /// Integer pixel scale of the built-in font.
    #[arg(long, default_value_t = 2)]
    text_scale: usize,

    /// Color of the rasterized text (name, #hex or rgb(r, g, b)).
    #[arg(long, default_value = "purple")]
    text_color: String,

    /// Pointer movement during the run.
    #[arg(long, value_enum, default_value_t = PointerScript::Circle)]
    pointer: PointerScript,

    /// Pace frames in real time at this rate instead of running flat out.
    #[arg(long)]
    fps: Option<u32>,

    /// Output file path.
    #[arg(short, long, default_value = "output.png")]
    output: PathBuf,
}

#[derive(Subcommand)]
enum Command {
    /// Run a variant for N frames and write a PNG of the last one.
    Render {
        /// Variant name (e.g. "text-bubbles").
        variant: String,

        /// Viewport width in pixels.
        #[arg(short = 'W', long, default_value_t = 1024)]
        width: usize,

        /// Viewport height in pixels.
        #[arg(short = 'H', long, default_value_t = 576)]
        height: usize,

        /// Number of frames to simulate.
        #[arg(short, long, default_value_t = 120)]
        frames: usize,

        /// PRNG seed for deterministic output.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Variant overrides as a JSON object (see `schema`).
        #[arg(long, default_value = "{}")]
        params: String,

        /// Also write the run's seed record as JSON.
        #[arg(long)]
        record: Option<PathBuf>,

        #[command(flatten)]
        source: SourceArgs,
    },
    /// Re-run a seed record written by `render --record`.
    Replay {
        /// Seed record path.
        seed_file: PathBuf,

        #[command(flatten)]
        source: SourceArgs,
    },
    /// List available variants.
    List,
    /// Print the override keys a variant accepts.
    Schema {
        variant: String,
    },
}

/// Runs exactly `frames` ticks, optionally paced by a wall clock.
struct Paced {
    stepper: ManualStepper,
    clock: Option<FrameClock>,
}

impl TickSource for Paced {
    fn next_tick(&mut self) -> bool {
        if !self.stepper.next_tick() {
            return false;
        }
        if let Some(clock) = &mut self.clock {
            clock.next_tick();
        }
        true
    }
}

fn build_source(kind: VariantKind, args: &SourceArgs) -> Result<Box<dyn RasterSource>, CliError> {
    let source: Box<dyn RasterSource> = match kind.source_kind() {
        SourceKind::Text => {
            let text = args.text.as_deref().unwrap_or(DEFAULT_TEXT);
            let color = Rgb8::parse(&args.text_color)?;
            let raster = TextRaster {
                scale: args.text_scale,
                ..TextRaster::new(text, color)
            };
            // Surface bad text before the simulation wraps it.
            raster
                .render()
                .map_err(|e| CliError::Input(format!("unusable --text: {e}")))?;
            Box::new(raster)
        }
        SourceKind::Image | SourceKind::None => {
            let rain = kind.preset()?.force.field_drift.is_some();
            match (&args.image, rain) {
                (Some(path), true) => Box::new(FitToViewport(load_raster(path)?)),
                (Some(path), false) => Box::new(StaticRaster(load_raster(path)?)),
                (None, true) => Box::new(Swatch::default()),
                (None, false) => Box::new(Swatch {
                    size: Some((120, 80)),
                }),
            }
        }
    };
    Ok(source)
}

/// Simulates the run described by `seed` and writes the final frame.
fn render(seed: &Seed, args: &SourceArgs) -> Result<serde_json::Value, CliError> {
    seed.validate()?;
    let kind = VariantKind::from_name(&seed.variant)?;
    let config = kind.config(&seed.params)?;
    let viewport = Viewport::from_pixels(seed.width, seed.height)?;
    let source = build_source(kind, args)?;

    let mut sim = Simulation::new(config, source, viewport, seed.seed)?;
    let mut canvas = PixelCanvas::new(seed.width, seed.height)?;
    let mut events = ScriptedPointer::new(args.pointer, viewport, seed.frames);
    let mut ticks = Paced {
        stepper: ManualStepper::new(seed.frames),
        clock: args.fps.map(FrameClock::from_fps),
    };
    debug!(
        variant = %seed.variant,
        particles = sim.particles().len(),
        "simulation ready"
    );

    let ran = sim.run(&mut ticks, &mut events, &mut canvas);
    write_png(&canvas, &args.output)?;
    debug!(frame = sim.frame(), output = %args.output.display(), "wrote final frame");

    Ok(serde_json::json!({
        "variant": seed.variant,
        "width": seed.width,
        "height": seed.height,
        "frames": ran,
        "seed": seed.seed,
        "particles": sim.particles().len(),
        "output": args.output.display().to_string(),
    }))
}

fn write_record(seed: &Seed, path: &Path) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(seed)?;
    fs::write(path, json)?;
    Ok(())
}

fn report(json: bool, info: &serde_json::Value) -> Result<(), CliError> {
    if json {
        println!("{}", serde_json::to_string_pretty(info)?);
    } else {
        eprintln!(
            "rendered {} ({}x{}, {} frames, seed {}, {} particles) -> {}",
            info["variant"].as_str().unwrap_or_default(),
            info["width"],
            info["height"],
            info["frames"],
            info["seed"],
            info["particles"],
            info["output"].as_str().unwrap_or_default(),
        );
    }
    Ok(())
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::List => {
            let variants = VariantKind::list_variants();
            if cli.json {
                let info = serde_json::json!({ "variants": variants });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("Variants:");
                for name in variants {
                    println!("  {name}");
                }
            }
        }
        Command::Schema { variant } => {
            let schema = VariantKind::from_name(&variant)?.param_schema()?;
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }
        Command::Render {
            variant,
            width,
            height,
            frames,
            seed,
            params,
            record,
            source,
        } => {
            let params: serde_json::Value = serde_json::from_str(&params)
                .map_err(|e| CliError::Input(format!("invalid --params JSON: {e}")))?;
            if !params.is_object() {
                return Err(CliError::Input("--params must be a JSON object".into()));
            }
            let mut run_seed = Seed::new(&variant, width, height, seed);
            run_seed.params = params;
            run_seed.frames = frames;

            let info = render(&run_seed, &source)?;
            if let Some(path) = record {
                write_record(&run_seed, &path)?;
            }
            report(cli.json, &info)?;
        }
        Command::Replay { seed_file, source } => {
            let text = fs::read_to_string(&seed_file)?;
            let run_seed: Seed = serde_json::from_str(&text)
                .map_err(|e| CliError::Input(format!("invalid seed record: {e}")))?;
            let info = render(&run_seed, &source)?;
            report(cli.json, &info)?;
        }
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        if json_mode {
            let j = serde_json::json!({"error": e.to_string(), "exit_code": e.exit_code()});
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}
