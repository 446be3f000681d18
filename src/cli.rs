//! # CLI Execution Functions
//!
//! Kept out of `main.rs` so the entry point stays a thin parser. Resolves the
//! configuration (file plus overrides), runs a single search or a strategy
//! comparison, and writes the result to stdout.

use anyhow::{bail, Context, Result};
use primescan::config::{self, RawConfig, SearchConfig};
use primescan::{SearchOptions, SearchReport, StrategyKind};
use std::io::{self, BufWriter, Write};
use std::time::Duration;
use tracing::{info, warn};

use super::{Cli, OutputFormat};

// ── Configuration ───────────────────────────────────────────────

/// Merge the configuration file with command-line overrides, then validate
/// the merged values once.
///
/// The file is not needed when both `--threads` and `--max-range` are given:
/// it is skipped if absent and only consulted for `strategy`/`per_line` when
/// it parses.
/// Also returns whether a file contributed any values.
fn resolve_config(cli: &Cli) -> Result<(SearchConfig, bool)> {
    let flags = RawConfig {
        threads: cli.threads,
        max_range: cli.max_range,
        strategy: cli.strategy,
        per_line: cli.per_line,
    };

    let file = if flags.threads.is_some() && flags.max_range.is_some() {
        if cli.config.exists() {
            match config::read_raw(&cli.config) {
                Ok(raw) => Some(raw),
                Err(e) => {
                    warn!(
                        path = %cli.config.display(),
                        error = %e,
                        "ignoring unreadable configuration file"
                    );
                    None
                }
            }
        } else {
            None
        }
    } else {
        Some(config::read_raw(&cli.config).with_context(|| {
            format!("could not load configuration from {}", cli.config.display())
        })?)
    };

    let loaded = file.is_some();
    let config = flags
        .or(file.unwrap_or_default())
        .validate()
        .context("invalid configuration")?;
    Ok((config, loaded))
}

fn print_configuration(
    out: &mut impl Write,
    cli: &Cli,
    config: &SearchConfig,
    loaded: bool,
) -> io::Result<()> {
    if loaded {
        writeln!(out, "Configuration loaded from {}:", cli.config.display())?;
    } else {
        writeln!(out, "Configuration:")?;
    }
    writeln!(out, "Number of threads: {}", config.threads)?;
    writeln!(out, "Maximum range: {}", config.max_range)?;
    writeln!(out, "Strategy: {}", config.strategy)?;
    writeln!(out, "==================================")
}

// ── Execution ───────────────────────────────────────────────────

pub fn run(cli: &Cli) -> Result<()> {
    let (config, loaded) = resolve_config(cli)?;
    info!(
        threads = config.threads,
        max_range = config.max_range,
        strategy = %config.strategy,
        cores = rayon::current_num_threads(),
        "primescan starting"
    );
    if config.threads > rayon::current_num_threads() * 8 {
        warn!(
            threads = config.threads,
            "thread count far exceeds available cores"
        );
    }

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    if cli.format == OutputFormat::Text {
        print_configuration(&mut out, cli, &config, loaded)?;
        out.flush()?;
    }

    if cli.compare {
        run_compare(cli, &config, &mut out)?;
    } else {
        let report = search(cli, &config, config.strategy)?;
        match cli.format {
            OutputFormat::Text => report.write_text(&mut out, config.per_line, !cli.no_list)?,
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut out, &report)?;
                writeln!(out)?;
            }
        }
    }
    out.flush()?;
    Ok(())
}

fn search(cli: &Cli, config: &SearchConfig, strategy: StrategyKind) -> Result<SearchReport> {
    let mut options = SearchOptions::new(config.max_range, config.threads, strategy);
    if let Some(secs) = cli.progress_secs.filter(|&s| s > 0) {
        options = options.report_every(Duration::from_secs(secs));
    }
    primescan::run_with(&options).with_context(|| format!("{} search failed", strategy))
}

/// Run every strategy on the same input, check they agree, and print one
/// throughput line per strategy.
fn run_compare(cli: &Cli, config: &SearchConfig, out: &mut impl Write) -> Result<()> {
    let reports = StrategyKind::ALL
        .iter()
        .map(|&strategy| search(cli, config, strategy))
        .collect::<Result<Vec<_>>>()?;

    if let Some((first, rest)) = reports.split_first() {
        for other in rest {
            if other.primes != first.primes {
                bail!(
                    "{} and {} strategies disagree ({} vs {} primes)",
                    first.strategy,
                    other.strategy,
                    first.primes.len(),
                    other.primes.len()
                );
            }
        }
    }

    match cli.format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, &reports)?;
            writeln!(out)?;
        }
        OutputFormat::Text => {
            for r in &reports {
                writeln!(out, "{}", comparison_line(r))?;
            }
            if let Some(first) = reports.first() {
                writeln!(out, "{}", first.summary())?;
                if !cli.no_list {
                    writeln!(out)?;
                    writeln!(out, "Prime numbers found:")?;
                    primescan::report::write_primes(out, &first.primes, config.per_line)?;
                }
            }
        }
    }
    Ok(())
}

fn comparison_line(r: &SearchReport) -> String {
    format!(
        "{:<8} {:>8} ms  {:>14.0} candidates/s  {:>3} workers  imbalance {:.2}",
        r.strategy.to_string(),
        r.elapsed_ms(),
        r.throughput(),
        r.workers_launched,
        r.imbalance()
    )
}
