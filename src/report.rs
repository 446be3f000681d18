//! # Report — Search Results and Their Text Form
//!
//! [`SearchReport`] is produced once per search after every worker has
//! joined and the primes are sorted. It carries the metadata the console
//! output needs (count, elapsed time, thread count, range) plus per-worker
//! statistics used to judge how evenly a strategy spread the work.
//!
//! The text layout matches the classic console output:
//!
//! ```text
//! Found 25 primes in 3 ms using 4 threads
//! Searched up to: 100
//!
//! Prime numbers found:
//! 2, 3, 5, 7, 11, 13, 17, 19, 23, 29
//! ...
//! ```

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::io::{self, Write};
use std::time::Duration;

use crate::strategy::StrategyKind;
use crate::worker::WorkerStats;

/// Default number of primes per output line.
pub const DEFAULT_PER_LINE: usize = 10;

#[derive(Debug, Clone, Serialize)]
pub struct SearchReport {
    pub strategy: StrategyKind,
    pub max_range: u64,
    /// Threads requested by the caller.
    pub thread_count: usize,
    /// Workers actually launched (fewer than requested for small static ranges).
    pub workers_launched: usize,
    pub started_at: DateTime<Utc>,
    #[serde(rename = "elapsed_ms", serialize_with = "serialize_millis")]
    pub elapsed: Duration,
    pub prime_count: usize,
    pub workers: Vec<WorkerStats>,
    pub primes: Vec<u64>,
}

impl SearchReport {
    pub fn elapsed_ms(&self) -> u128 {
        self.elapsed.as_millis()
    }

    /// Candidates in `[2, max_range]`.
    pub fn candidates(&self) -> u64 {
        self.max_range.saturating_sub(1)
    }

    /// Candidates tested per second of wall-clock time.
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.candidates() as f64 / secs
        } else {
            0.0
        }
    }

    /// Ratio of the slowest worker's time to the mean worker time.
    /// 1.0 means perfectly even; static partitions typically sit well above.
    pub fn imbalance(&self) -> f64 {
        if self.workers.is_empty() {
            return 1.0;
        }
        let times: Vec<f64> = self
            .workers
            .iter()
            .map(|w| w.elapsed.as_secs_f64())
            .collect();
        let mean = times.iter().sum::<f64>() / times.len() as f64;
        let slowest = times.iter().cloned().fold(0.0, f64::max);
        if mean > 0.0 {
            slowest / mean
        } else {
            1.0
        }
    }

    /// The two summary lines printed before the prime list.
    pub fn summary(&self) -> String {
        format!(
            "Found {} primes in {} ms using {} threads\nSearched up to: {}",
            self.primes.len(),
            self.elapsed_ms(),
            self.thread_count,
            self.max_range
        )
    }

    pub fn write_text<W: Write>(&self, out: &mut W, per_line: usize, list: bool) -> io::Result<()> {
        writeln!(out, "{}", self.summary())?;
        if list {
            writeln!(out)?;
            writeln!(out, "Prime numbers found:")?;
            write_primes(out, &self.primes, per_line)?;
        }
        Ok(())
    }
}

/// Write `primes` comma-separated, `per_line` to a line.
///
/// A newline follows every full group, and one more newline closes the list,
/// so a list whose length is a multiple of `per_line` ends with a blank line.
/// `per_line == 0` is treated as 1.
pub fn write_primes<W: Write>(out: &mut W, primes: &[u64], per_line: usize) -> io::Result<()> {
    let per_line = per_line.max(1);
    for (i, p) in primes.iter().enumerate() {
        write!(out, "{}", p)?;
        if (i + 1) % per_line == 0 {
            writeln!(out)?;
        } else if i + 1 != primes.len() {
            write!(out, ", ")?;
        }
    }
    writeln!(out)
}

pub fn format_primes(primes: &[u64], per_line: usize) -> String {
    let mut buf = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = write_primes(&mut buf, primes, per_line);
    String::from_utf8_lossy(&buf).into_owned()
}

pub(crate) fn serialize_millis<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}
