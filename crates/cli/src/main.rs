//! Cap-pro-rata allocation simulator CLI.
//!
//! This binary drives the allocator cycle by cycle. It supports:
//! 1. **Config run:** Load a JSON configuration and run it to completion.
//! 2. **Demo run:** Run one of the bundled reference scenarios.
//! 3. **Reporting:** Console tables on stdout, plus optional JSON Lines and text journal files.
//!
//! Diagnostics go through `tracing` to stderr (`RUST_LOG`, default `warn`),
//! so stdout only carries the console report.

use std::fs::File;
use std::io::{self, BufRead, BufWriter};
use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{process, thread};

use caprata_core::Allocator;
use caprata_core::common::{AllocError, ConfigError, ReportError, SimError};
use caprata_core::config::{Config, WeightingMode};
use caprata_core::model::Queue;
use caprata_core::presets;
use caprata_core::report::{ConsoleReporter, CycleObserver, JsonLinesReporter, TextLogReporter};
use caprata_core::stats::{CycleStats, SUMMARY_SECTIONS};
use clap::{Args, Parser, Subcommand, ValueEnum};
use thiserror::Error;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "caprata",
    author,
    version,
    about = "Cap-pro-rata two-level resource allocation simulator",
    long_about = "Split a fixed resource pool between weighted queues every cycle, then between each queue's processes.\n\nExamples:\n  caprata demo tiered\n  caprata demo dynamic --weighting demand --json run.jsonl\n  caprata show dynamic > dynamic.json\n  caprata run --config configs/tiered.json --log run.log --quiet"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the configuration stored in a JSON file.
    Run {
        /// Configuration document.
        #[arg(short, long)]
        config: PathBuf,

        #[command(flatten)]
        opts: RunOptions,
    },

    /// Run a bundled reference scenario.
    Demo {
        /// Scenario to run.
        #[arg(value_enum, default_value_t = Preset::Tiered)]
        preset: Preset,

        #[command(flatten)]
        opts: RunOptions,
    },

    /// Print a bundled scenario as a JSON configuration document.
    Show {
        /// Scenario to print.
        #[arg(value_enum, default_value_t = Preset::Tiered)]
        preset: Preset,
    },
}

#[derive(Args, Debug)]
struct RunOptions {
    /// Override the weighting mode.
    #[arg(long, value_enum)]
    weighting: Option<Weighting>,

    /// Override the non-convergence safeguard.
    #[arg(long)]
    max_cycles: Option<u64>,

    /// Write one JSON record per line to this file.
    #[arg(long)]
    json: Option<PathBuf>,

    /// Write the text journal to this file.
    #[arg(long)]
    log: Option<PathBuf>,

    /// Pause between cycles, in milliseconds.
    #[arg(long, default_value_t = 0)]
    delay_ms: u64,

    /// Wait for enter between cycles.
    #[arg(long)]
    interactive: bool,

    /// Suppress the console report.
    #[arg(short, long)]
    quiet: bool,

    /// Summary sections to print (summary, queues, processes); all when empty.
    #[arg(long, value_delimiter = ',')]
    stats: Vec<String>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Preset {
    /// Three service tiers, round-robin and FIFO.
    Tiered,
    /// Three capped bands with equal-share dispatch.
    Dynamic,
}

impl Preset {
    fn config(self) -> Config {
        match self {
            Self::Tiered => presets::tiered(),
            Self::Dynamic => presets::dynamic(),
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Weighting {
    /// Share by weight plus aging.
    Static,
    /// Share by weight plus aging, times outstanding demand.
    Demand,
}

impl From<Weighting> for WeightingMode {
    fn from(w: Weighting) -> Self {
        match w {
            Weighting::Static => Self::Static,
            Weighting::Demand => Self::DemandWeighted,
        }
    }
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Alloc(#[from] AllocError),

    #[error(transparent)]
    Sim(#[from] SimError),

    #[error("cannot create {path}: {source}")]
    Output { path: PathBuf, source: io::Error },

    #[error("unknown summary section `{0}`")]
    Section(String),

    #[error("cannot serialize configuration: {0}")]
    Json(#[from] serde_json::Error),
}

/// Pauses between cycles; registered after the reporters so output comes first.
#[derive(Debug)]
struct Pacer {
    delay: Duration,
    interactive: bool,
}

impl CycleObserver for Pacer {
    fn on_cycle(&mut self, stats: &CycleStats, _queues: &[Queue]) -> Result<(), ReportError> {
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
        if self.interactive {
            eprint!("cycle {} done, press enter to continue", stats.cycle);
            let mut line = String::new();
            let _ = io::stdin().lock().read_line(&mut line)?;
        }
        Ok(())
    }
}

fn main() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .try_init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Run { config, opts } => Config::from_file(&config)
            .map_err(CliError::from)
            .and_then(|c| cmd_run(c, &opts)),
        Commands::Demo { preset, opts } => cmd_run(preset.config(), &opts),
        Commands::Show { preset } => serde_json::to_string_pretty(&preset.config())
            .map(|json| println!("{json}"))
            .map_err(CliError::from),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

/// Applies the overrides, wires the reporters and runs to completion.
fn cmd_run(mut config: Config, opts: &RunOptions) -> Result<(), CliError> {
    if let Some(w) = opts.weighting {
        config = config.with_weighting(w.into());
    }
    if let Some(max) = opts.max_cycles {
        config.general.max_cycles = max;
    }
    if let Some(bad) = opts
        .stats
        .iter()
        .find(|s| !SUMMARY_SECTIONS.contains(&s.as_str()))
    {
        return Err(CliError::Section(bad.clone()));
    }

    let mut alloc = Allocator::new(config)?;
    info!(
        queues = alloc.queues().len(),
        weighting = ?alloc.config().weighting,
        "allocator ready"
    );

    let mut observers: Vec<Box<dyn CycleObserver>> = Vec::new();
    if !opts.quiet {
        observers.push(Box::new(
            ConsoleReporter::stdout().with_sections(opts.stats.clone()),
        ));
    }
    if let Some(path) = &opts.json {
        observers.push(Box::new(JsonLinesReporter::new(create(path)?)));
    }
    if let Some(path) = &opts.log {
        observers.push(Box::new(TextLogReporter::new(create(path)?)));
    }
    if opts.delay_ms > 0 || opts.interactive {
        observers.push(Box::new(Pacer {
            delay: Duration::from_millis(opts.delay_ms),
            interactive: opts.interactive,
        }));
    }

    let summary = alloc.run_with(&mut observers)?;
    debug!(
        cycles = summary.cycles,
        allocated = summary.total_allocated,
        "run finished"
    );
    Ok(())
}

fn create(path: &Path) -> Result<BufWriter<File>, CliError> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|source| CliError::Output {
            path: path.to_path_buf(),
            source,
        })
}
