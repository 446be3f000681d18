//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::collections::HashSet;

/// Range bounds exercised by the correctness grid.
pub const RANGES: [u64; 6] = [2, 3, 10, 97, 100, 10_007];

/// Thread counts exercised by the correctness grid.
pub const THREADS: [usize; 4] = [1, 2, 5, 17];

/// Primes up to `max_range` by plain trial division, independent of the
/// crate's own oracle.
pub fn reference_primes(max_range: u64) -> Vec<u64> {
    (2..=max_range)
        .filter(|&n| (2..n).take_while(|d| d * d <= n).all(|d| n % d != 0))
        .collect()
}

/// Panics unless `primes` is strictly ascending (which also rules out duplicates).
pub fn assert_strictly_ascending(primes: &[u64]) {
    for w in primes.windows(2) {
        assert!(w[0] < w[1], "not strictly ascending at {} -> {}", w[0], w[1]);
    }
}

/// Panics if any value appears more than once.
pub fn assert_no_duplicates(primes: &[u64]) {
    let mut seen = HashSet::with_capacity(primes.len());
    for &p in primes {
        assert!(seen.insert(p), "duplicate prime {}", p);
    }
}
