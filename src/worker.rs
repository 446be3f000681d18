//! # Worker — Candidate Test Loop
//!
//! One worker drains its [`Candidates`] cursor, tests each value with the
//! oracle, and submits primes to the shared collector. The loop is the same
//! for both strategies; only the cursor differs (a shared claim counter or a
//! private inclusive subrange).
//!
//! The oracle call happens before the collector lock is taken, so a worker
//! blocks only for the duration of one `Vec::push` per prime found, plus the
//! claim counter's read-modify-write under the dynamic strategy.

use serde::Serialize;
use std::time::{Duration, Instant};

use crate::collector::PrimeCollector;
use crate::oracle::is_prime;
use crate::progress::{Progress, FLUSH_EVERY};
use crate::strategy::{Candidates, Subrange};

/// What one worker did during a search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkerStats {
    pub worker: usize,
    /// Assigned subrange under the static strategy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subrange: Option<Subrange>,
    pub tested: u64,
    pub found: u64,
    #[serde(rename = "elapsed_ms", serialize_with = "crate::report::serialize_millis")]
    pub elapsed: Duration,
}

/// Run one worker to exhaustion of `candidates`.
pub fn run(
    worker: usize,
    subrange: Option<Subrange>,
    candidates: Candidates<'_>,
    collector: &PrimeCollector,
    progress: Option<&Progress>,
) -> WorkerStats {
    let begun = Instant::now();
    let mut tested: u64 = 0;
    let mut found: u64 = 0;
    let mut unflushed: (u64, u64) = (0, 0);

    for n in candidates {
        tested += 1;
        unflushed.0 += 1;
        if is_prime(n) {
            collector.submit(n);
            found += 1;
            unflushed.1 += 1;
        }
        if unflushed.0 >= FLUSH_EVERY {
            if let Some(p) = progress {
                p.record(unflushed.0, unflushed.1);
            }
            unflushed = (0, 0);
        }
    }
    if let Some(p) = progress {
        p.record(unflushed.0, unflushed.1);
    }

    let stats = WorkerStats {
        worker,
        subrange,
        tested,
        found,
        elapsed: begun.elapsed(),
    };
    tracing::debug!(
        worker,
        tested,
        found,
        elapsed_ms = stats.elapsed.as_millis() as u64,
        "worker retired"
    );
    stats
}
