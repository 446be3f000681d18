//! # Main — CLI Entry Point
//!
//! Loads search parameters, runs the parallel prime search, and prints the
//! report. Parameters come from a configuration file (`config.txt` by
//! default, two-line text or `.toml`), and any of them can be overridden
//! on the command line or through `PRIMESCAN_*` environment variables
//! (a `.env` file is honoured).
//!
//! ## Options
//!
//! - `--strategy`: `dynamic` (shared claim counter) or `static` (fixed subranges).
//! - `--compare`: run both strategies on the same input and compare throughput.
//! - `--format json`: emit the report as a JSON document.
//! - `--no-list`: print only the summary lines.
//! - `--progress-secs`: log live progress at this interval.
//!
//! Logging goes to stderr; `LOG_FORMAT=json` switches to JSON lines and
//! `RUST_LOG` sets the filter.

mod cli;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use primescan::StrategyKind;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(
    name = "primescan",
    version,
    about = "Search [2, N] for primes with a pool of worker threads"
)]
struct Cli {
    /// Configuration file: line 1 = threads, line 2 = max range (or a .toml file)
    #[arg(long, env = "PRIMESCAN_CONFIG", default_value = "config.txt")]
    config: PathBuf,

    /// Number of worker threads (overrides the configuration file)
    #[arg(long, env = "PRIMESCAN_THREADS", allow_negative_numbers = true)]
    threads: Option<i64>,

    /// Upper bound of the search range, inclusive (overrides the configuration file)
    #[arg(long, env = "PRIMESCAN_MAX_RANGE")]
    max_range: Option<u64>,

    /// Work distribution strategy
    #[arg(long, env = "PRIMESCAN_STRATEGY", value_enum)]
    strategy: Option<StrategyKind>,

    /// Primes printed per output line
    #[arg(long)]
    per_line: Option<usize>,

    /// Print only the summary, not the prime list
    #[arg(long)]
    no_list: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Run both strategies on the same input and compare them
    #[arg(long)]
    compare: bool,

    /// Log search progress every N seconds
    #[arg(long)]
    progress_secs: Option<u64>,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    // LOG_FORMAT=json for log collectors, human-readable otherwise
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    if log_format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    }

    let cli = Cli::parse();
    cli::run(&cli)
}
