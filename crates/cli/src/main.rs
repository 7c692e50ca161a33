//! Matrix multiplication trace CLI.
//!
//! This binary provides a single entry point for generating and replaying traces. It performs:
//! 1. **Run:** Generate one model's trace and print every step, or export it as JSON.
//! 2. **Play:** Replay a trace in real time through the playback controller.
//! 3. **Compare:** Generate all three models, verify they agree, and print the cycle report.
//!
//! Operands and playback settings come from built-in defaults, optionally overridden by a
//! JSON config file (`--config`) and then by individual flags.

use std::error::Error;
use std::io::{self, Write};
use std::path::PathBuf;
use std::{process, thread};

use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use matviz_core::sim::{Driver, Highlights, Operand, SystemClock};
use matviz_core::stats::{ModelComparison, RunStats};
use matviz_core::{Config, Frame, FrameObserver, Model, PlaybackController, Preset, Run, Trace};

#[derive(Parser, Debug)]
#[command(
    name = "matviz",
    author,
    version,
    about = "Cycle-accurate matrix multiplication traces",
    long_about = "Generate and replay cycle-by-cycle traces of C = A * B on a sequential CPU, a parallel GPU, and a systolic-array TPU.\n\nExamples:\n  matviz run --model systolic --size 4\n  matviz run --model cpu --size 2 --json\n  matviz play --model gpu --speed 4\n  matviz compare --size 8 --preset-a random"
)]
struct Cli {
    /// JSON configuration file; flags override its values.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Operand overrides shared by every subcommand.
#[derive(Args, Debug, Default)]
struct MatrixArgs {
    /// Matrix dimension N.
    #[arg(short = 'n', long)]
    size: Option<usize>,

    /// Pattern for A (identity, ones, random, checkerboard).
    #[arg(long)]
    preset_a: Option<Preset>,

    /// Pattern for B (identity, ones, random, checkerboard).
    #[arg(long)]
    preset_b: Option<Preset>,

    /// Seed for random operands.
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a trace and print every step.
    Run {
        /// Execution model (sequential/cpu, parallel/gpu, systolic/tpu).
        #[arg(short, long)]
        model: Option<Model>,

        #[command(flatten)]
        matrix: MatrixArgs,

        /// Print the whole trace as JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Replay a trace in real time.
    Play {
        /// Execution model (sequential/cpu, parallel/gpu, systolic/tpu).
        #[arg(short, long)]
        model: Option<Model>,

        #[command(flatten)]
        matrix: MatrixArgs,

        /// Speed multiplier; one step every `1000ms / speed`.
        #[arg(short, long)]
        speed: Option<f64>,
    },

    /// Run all three models on the same operands and compare cycle counts.
    Compare {
        #[command(flatten)]
        matrix: MatrixArgs,

        /// Report sections to print (summary, cycles, result); all if omitted.
        #[arg(long, value_delimiter = ',')]
        sections: Vec<String>,
    },
}

type CliResult = Result<(), Box<dyn Error>>;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = dispatch(cli) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn dispatch(cli: Cli) -> CliResult {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    match cli.command {
        Commands::Run {
            model,
            matrix,
            json,
        } => {
            apply_overrides(&mut config, model, &matrix);
            cmd_run(&config, json)
        }
        Commands::Play {
            model,
            matrix,
            speed,
        } => {
            apply_overrides(&mut config, model, &matrix);
            if let Some(speed) = speed {
                config.playback.speed = speed;
            }
            cmd_play(&config)
        }
        Commands::Compare { matrix, sections } => {
            apply_overrides(&mut config, None, &matrix);
            cmd_compare(&config, &sections)
        }
    }
}

fn apply_overrides(config: &mut Config, model: Option<Model>, args: &MatrixArgs) {
    if let Some(model) = model {
        config.model = model;
    }
    if let Some(size) = args.size {
        config.matrix.size = size;
    }
    if let Some(preset) = args.preset_a {
        config.matrix.preset_a = preset;
    }
    if let Some(preset) = args.preset_b {
        config.matrix.preset_b = preset;
    }
    if let Some(seed) = args.seed {
        config.matrix.seed = seed;
    }
}

/// Generates the configured run and prints it.
fn cmd_run(config: &Config, json: bool) -> CliResult {
    let (a, b) = config.matrix.operands();
    let run = Run::generate(config.model, &a, &b)?;
    info!(model = %config.model, n = config.matrix.size, "generated");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if json {
        serde_json::to_writer_pretty(&mut out, &run)?;
        writeln!(out)?;
        return Ok(());
    }

    writeln!(out, "A =\n{a}\n\nB =\n{b}\n")?;
    for index in 0..run.len() {
        if let Some(snapshot) = run.snapshot_at(index) {
            writeln!(
                out,
                "[step {index:>4}] cycle {:>4}: {}",
                snapshot.cycle(),
                snapshot.description()
            )?;
            writeln!(out, "{}\n", snapshot.output())?;
        }
    }

    let stats = RunStats::from_run(&run);
    writeln!(
        out,
        "{} ({}): {} cycles, {} steps, {:.2} MACs/cycle",
        stats.model,
        stats.model.hardware(),
        stats.total_cycles,
        stats.steps,
        stats.macs_per_cycle()
    )?;
    out.flush()?;
    Ok(())
}

/// Replays the configured run in real time.
fn cmd_play(config: &Config) -> CliResult {
    let (a, b) = config.matrix.operands();
    let run = Run::generate(config.model, &a, &b)?;
    let mut controller = PlaybackController::new(run, &config.playback)?;
    controller.subscribe(Box::new(TerminalView));

    let mut driver = Driver::new(SystemClock);
    let _ = controller.start();
    while controller.is_running() {
        thread::sleep(driver.until_next_tick(&controller));
        let _ = driver.poll(&mut controller);
    }

    println!("C = A * B =\n{}", controller.run().result());
    Ok(())
}

/// Prints the cross-model comparison report.
fn cmd_compare(config: &Config, sections: &[String]) -> CliResult {
    let (a, b) = config.matrix.operands();
    let comparison = ModelComparison::new(&a, &b)?;
    comparison.print_sections(sections);
    if !comparison.agree() {
        return Err("models disagree on the product".into());
    }
    Ok(())
}

/// Renders each frame to stdout, marking highlighted output cells with `*`.
#[derive(Debug)]
struct TerminalView;

impl FrameObserver for TerminalView {
    fn on_frame(&mut self, frame: &Frame<'_>) {
        let Some(snapshot) = frame.snapshot else {
            println!("[{}] not started ({} cycles)", frame.state, frame.total_cycles);
            return;
        };
        println!(
            "[{}] cycle {}/{}: {}",
            frame.state,
            snapshot.cycle(),
            frame.total_cycles,
            snapshot.description()
        );

        let output = snapshot.output();
        let highlights: Highlights<'_> = snapshot.highlights();
        for (i, row) in output.rows().enumerate() {
            let cells: Vec<String> = row
                .iter()
                .enumerate()
                .map(|(j, v)| {
                    let mark = if highlights.is_highlighted(Operand::C, i, j) {
                        '*'
                    } else {
                        ' '
                    };
                    format!("{v:>6}{mark}")
                })
                .collect();
            println!("{}", cells.join(""));
        }
        println!();
    }
}
