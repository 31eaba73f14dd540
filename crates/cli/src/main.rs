//! Cache simulator CLI.
//!
//! This binary replays a trace through the configured cache. It performs:
//! 1. **Configuration:** Built-in defaults, optionally a JSON file, then flag overrides.
//! 2. **Simulation:** Loads the trace and ticks processor, cache, and memory to completion.
//! 3. **Report:** Prints the aggregate data and tag storage footprint.

use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use csim_core::config::{CacheKind, Config};
use csim_core::sim::{Simulator, load_trace};
use csim_core::stats::StorageFootprint;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum KindArg {
    Blocking,
    NonBlocking,
}

impl From<KindArg> for CacheKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Blocking => Self::Blocking,
            KindArg::NonBlocking => Self::NonBlocking,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "csim",
    version,
    about = "Trace-driven non-blocking cache simulator",
    long_about = "Replay a memory access trace through a set-associative cache.\n\nExamples:\n  csim traces/simple.txt\n  csim --kind blocking --ways 2 traces/simple.txt\n  csim --config sweep.json -vv traces/simple.txt"
)]
struct Cli {
    /// Trace file to replay.
    #[arg(default_value = "traces/simple.txt")]
    trace: PathBuf,

    /// JSON configuration file; flags below override it.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Cache variant.
    #[arg(long, value_enum)]
    kind: Option<KindArg>,

    /// Total cache size in bytes.
    #[arg(long)]
    size: Option<usize>,

    /// Associativity.
    #[arg(long)]
    ways: Option<usize>,

    /// Number of MSHRs (non-blocking only).
    #[arg(long)]
    mshrs: Option<usize>,

    /// Seed for random eviction.
    #[arg(long)]
    seed: Option<u64>,

    /// Do not check load data against the shadow memory.
    #[arg(long)]
    no_verify: bool,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = build_config(&cli).unwrap_or_else(|e| {
        eprintln!("[!] {e}");
        process::exit(1);
    });

    let records = load_trace(&cli.trace).unwrap_or_else(|e| {
        eprintln!("[!] Could not load file: {e}");
        process::exit(1);
    });

    info!(trace = %cli.trace.display(), records = records.len(), "trace loaded");

    let mut sim = Simulator::new(&config, records).unwrap_or_else(|e| {
        eprintln!("[!] {e}");
        process::exit(1);
    });

    println!("Running simulation");
    match sim.run() {
        Ok(summary) => {
            println!("Simulation done");
            println!(
                "  {} requests in {} ticks",
                summary.requests, summary.ticks
            );
        }
        Err(e) => {
            eprintln!("[!] Simulation failed after {} ticks: {e}", sim.ticks());
            process::exit(1);
        }
    }

    println!("{}", StorageFootprint::snapshot());
}

/// Installs the fmt subscriber; `RUST_LOG` wins over `-v`.
fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_config(cli: &Cli) -> Result<Config, csim_core::common::ConfigError> {
    let mut config = match &cli.config {
        Some(path) => Config::from_json_file(path)?,
        None => Config::default(),
    };
    if let Some(kind) = cli.kind {
        config.cache.kind = kind.into();
    }
    if let Some(size) = cli.size {
        config.cache.size_bytes = size;
    }
    if let Some(ways) = cli.ways {
        config.cache.ways = ways;
    }
    if let Some(mshrs) = cli.mshrs {
        config.cache.mshrs = mshrs;
    }
    if let Some(seed) = cli.seed {
        config.cache.seed = seed;
    }
    if cli.no_verify {
        config.general.verify = false;
    }
    config.validate()?;
    Ok(config)
}
