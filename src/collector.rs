//! # Collector — Shared Prime Aggregation
//!
//! Thread-safe sink for primes discovered by workers. The mutex guards only
//! the `Vec::push`; the primality test that precedes a submission always runs
//! outside the lock, so contention is proportional to the number of primes
//! found rather than the number of candidates tested.
//!
//! Order during accumulation is whatever order workers happen to finish in.
//! [`PrimeCollector::into_sorted`] performs the single ascending sort after
//! all workers have joined.

use std::sync::{Mutex, PoisonError};

#[derive(Debug, Default)]
pub struct PrimeCollector {
    primes: Mutex<Vec<u64>>,
}

impl PrimeCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-size the buffer, e.g. from a prime-counting estimate.
    pub fn with_capacity(capacity: usize) -> Self {
        PrimeCollector {
            primes: Mutex::new(Vec::with_capacity(capacity)),
        }
    }

    /// Record one prime. Safe to call from any number of workers.
    ///
    /// A push cannot leave the vector half-updated, so a lock poisoned by a
    /// panicking worker is still usable; the panic itself is propagated by
    /// the orchestrator.
    pub fn submit(&self, p: u64) {
        self.primes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(p);
    }

    pub fn len(&self) -> usize {
        self.primes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Consume the collector and return its primes in ascending order.
    pub fn into_sorted(self) -> Vec<u64> {
        let mut primes = self
            .primes
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        primes.sort_unstable();
        primes
    }
}

/// Upper bound on π(n) for pre-sizing, from Rosser–Schoenfeld:
/// π(n) < 1.25506 · n / ln n for n > 1. Capped so huge ranges do not
/// reserve memory up front.
pub fn capacity_hint(max_range: u64) -> usize {
    const CAP: usize = 1 << 24;
    if max_range < 17 {
        return 8;
    }
    let n = max_range as f64;
    let bound = (1.25506 * n / n.ln()).ceil();
    (bound as usize).min(CAP)
}
