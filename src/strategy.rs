//! # Strategy — Distributing Candidates Across Workers
//!
//! Two interchangeable ways of deciding which integers in `[2, max_range]`
//! each worker examines. Both guarantee that every candidate is tested by
//! exactly one worker; they differ in when that decision is made.
//!
//! ## Dynamic Claim
//!
//! A single shared counter hands out one candidate per claim. Workers that
//! draw cheap candidates simply come back sooner, so load balances itself
//! at the cost of one atomic read-modify-write per candidate.
//!
//! ## Static Partition
//!
//! The `max_range - 1` candidates are cut into contiguous subranges before
//! any worker starts: `base = count / T`, the first `count % T` workers get
//! `base + 1` candidates and the rest get `base`. No synchronization happens
//! during the scan, but trial division costs O(√n) so the workers holding
//! the upper subranges finish last. That imbalance is inherent to the
//! strategy and is left as is.
//!
//! ## Unified Cursor
//!
//! [`Distribution`] wraps either strategy and hands each worker a
//! [`Candidates`] iterator. The worker loop is therefore identical for both
//! strategies: pull the next candidate until the iterator is exhausted.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::sync::atomic::{AtomicU64, Ordering};

/// Smallest candidate of every search range.
pub const FIRST_CANDIDATE: u64 = 2;

/// Which distribution strategy a search uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// Workers claim one candidate at a time from a shared counter.
    #[default]
    Dynamic,
    /// Each worker scans a fixed contiguous subrange.
    Static,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 2] = [StrategyKind::Dynamic, StrategyKind::Static];
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StrategyKind::Dynamic => write!(f, "dynamic"),
            StrategyKind::Static => write!(f, "static"),
        }
    }
}

// ── Dynamic Claim ───────────────────────────────────────────────

/// Shared claim counter for the dynamic strategy.
///
/// Internally counts claims issued rather than the next candidate so that a
/// range ending at `u64::MAX` never overflows. The counter stops advancing
/// once the range is exhausted: failed claims leave it untouched, so after a
/// search [`position`](Self::position) is exactly `max_range + 1` no matter
/// how many workers retired.
#[derive(Debug)]
pub struct ClaimCounter {
    issued: AtomicU64,
    total: u64,
}

impl ClaimCounter {
    pub fn new(max_range: u64) -> Self {
        ClaimCounter {
            issued: AtomicU64::new(0),
            total: max_range.saturating_sub(FIRST_CANDIDATE - 1),
        }
    }

    /// Claim the next candidate, or `None` once the range is exhausted.
    ///
    /// Relaxed ordering is enough: uniqueness comes from the atomicity of the
    /// read-modify-write, and results are published by the worker join.
    pub fn claim(&self) -> Option<u64> {
        self.issued
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |issued| {
                (issued < self.total).then_some(issued + 1)
            })
            .ok()
            .map(|issued| FIRST_CANDIDATE + issued)
    }

    /// Number of successful claims so far.
    pub fn claims_issued(&self) -> u64 {
        self.issued.load(Ordering::Relaxed)
    }

    /// The candidate the next claim would return (saturates at `u64::MAX`).
    pub fn position(&self) -> u64 {
        FIRST_CANDIDATE.saturating_add(self.claims_issued())
    }

    pub fn is_exhausted(&self) -> bool {
        self.claims_issued() >= self.total
    }
}

// ── Static Partition ────────────────────────────────────────────

/// Inclusive, non-empty slice of the search range owned by one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subrange {
    pub start: u64,
    pub end: u64,
}

impl Subrange {
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    pub fn contains(&self, n: u64) -> bool {
        (self.start..=self.end).contains(&n)
    }

    pub fn iter(&self) -> RangeInclusive<u64> {
        self.start..=self.end
    }
}

/// Split `[2, max_range]` into at most `threads` contiguous subranges.
///
/// Subranges are returned in increasing order of `start`, which is also the
/// worker index they belong to. When `threads` exceeds the candidate count
/// the surplus workers would get nothing and are left out, so the result may
/// be shorter than `threads`. Empty for `max_range < 2` or `threads == 0`.
pub fn partition(max_range: u64, threads: usize) -> Vec<Subrange> {
    if max_range < FIRST_CANDIDATE || threads == 0 {
        return Vec::new();
    }

    let count = max_range - (FIRST_CANDIDATE - 1);
    let threads = threads as u64;
    let base = count / threads;
    let remainder = count % threads;

    let mut subranges = Vec::with_capacity(threads.min(count) as usize);
    let mut offset: u64 = 0;
    for i in 0..threads {
        let len = if i < remainder { base + 1 } else { base };
        if len == 0 {
            break;
        }
        // offset + len <= count, so neither bound can overflow.
        let start = FIRST_CANDIDATE + offset;
        let end = start + (len - 1);
        subranges.push(Subrange { start, end });
        offset += len;
    }
    subranges
}

// ── Unified Distribution ────────────────────────────────────────

/// A strategy instance bound to one search.
///
/// Created fresh per search; its state is only reachable through
/// [`candidates`](Self::candidates), never touched directly by workers.
#[derive(Debug)]
pub enum Distribution {
    Dynamic { counter: ClaimCounter, workers: usize },
    Static { subranges: Vec<Subrange> },
}

impl Distribution {
    pub fn new(kind: StrategyKind, max_range: u64, threads: usize) -> Self {
        match kind {
            StrategyKind::Dynamic => Distribution::Dynamic {
                counter: ClaimCounter::new(max_range),
                workers: threads,
            },
            StrategyKind::Static => Distribution::Static {
                subranges: partition(max_range, threads),
            },
        }
    }

    pub fn kind(&self) -> StrategyKind {
        match self {
            Distribution::Dynamic { .. } => StrategyKind::Dynamic,
            Distribution::Static { .. } => StrategyKind::Static,
        }
    }

    /// Number of workers this distribution actually needs.
    pub fn worker_count(&self) -> usize {
        match self {
            Distribution::Dynamic { workers, .. } => *workers,
            Distribution::Static { subranges } => subranges.len(),
        }
    }

    /// The subrange assigned to `worker`, for static distributions.
    pub fn subrange(&self, worker: usize) -> Option<Subrange> {
        match self {
            Distribution::Dynamic { .. } => None,
            Distribution::Static { subranges } => subranges.get(worker).copied(),
        }
    }

    /// Candidate cursor for `worker`, or `None` if no such worker exists.
    pub fn candidates(&self, worker: usize) -> Option<Candidates<'_>> {
        match self {
            Distribution::Dynamic { counter, workers } => {
                (worker < *workers).then_some(Candidates::Claims(counter))
            }
            Distribution::Static { subranges } => subranges
                .get(worker)
                .map(|subrange| Candidates::Span(subrange.iter())),
        }
    }
}

/// Per-worker source of candidates.
#[derive(Debug)]
pub enum Candidates<'a> {
    Claims(&'a ClaimCounter),
    Span(RangeInclusive<u64>),
}

impl Iterator for Candidates<'_> {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        match self {
            Candidates::Claims(counter) => counter.claim(),
            Candidates::Span(range) => range.next(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    /// Check that `subranges` tile `[2, max_range]` in order without gaps or overlap.
    fn assert_tiles(max_range: u64, subranges: &[Subrange]) {
        let mut expected_start = FIRST_CANDIDATE;
        for s in subranges {
            assert_eq!(s.start, expected_start, "gap or overlap at {:?}", s);
            assert!(s.start <= s.end);
            expected_start = s.end + 1;
        }
        assert_eq!(expected_start, max_range + 1, "range not fully covered");
    }

    // ── Partition Arithmetic ────────────────────────────────────────

    #[test]
    fn partition_even_split() {
        // 2..=9 is 8 candidates over 4 workers.
        let parts = partition(9, 4);
        assert_eq!(
            parts,
            vec![
                Subrange { start: 2, end: 3 },
                Subrange { start: 4, end: 5 },
                Subrange { start: 6, end: 7 },
                Subrange { start: 8, end: 9 },
            ]
        );
    }

    /// 99 candidates over 4 workers: base 24, remainder 3, so the first three
    /// workers get 25 and the last gets 24.
    #[test]
    fn partition_remainder_goes_to_first_workers() {
        let parts = partition(100, 4);
        let lens: Vec<u64> = parts.iter().map(Subrange::len).collect();
        assert_eq!(lens, vec![25, 25, 25, 24]);
        assert_tiles(100, &parts);
    }

    #[test]
    fn partition_more_threads_than_candidates() {
        let parts = partition(4, 17);
        assert_eq!(parts.len(), 3);
        assert!(parts.iter().all(|s| s.len() == 1));
        assert_tiles(4, &parts);
    }

    #[test]
    fn partition_single_candidate() {
        assert_eq!(partition(2, 5), vec![Subrange { start: 2, end: 2 }]);
    }

    #[test]
    fn partition_rejects_degenerate_input() {
        assert!(partition(1, 4).is_empty());
        assert!(partition(0, 4).is_empty());
        assert!(partition(100, 0).is_empty());
    }

    #[test]
    fn partition_is_deterministic() {
        assert_eq!(partition(10_007, 17), partition(10_007, 17));
    }

    #[test]
    fn partition_tiles_grid() {
        for max_range in [2u64, 3, 4, 10, 97, 100, 10_007] {
            for threads in [1usize, 2, 5, 17, 64] {
                let parts = partition(max_range, threads);
                assert!(parts.len() <= threads);
                assert_tiles(max_range, &parts);
                let longest = parts.iter().map(Subrange::len).max().unwrap_or(0);
                let shortest = parts.iter().map(Subrange::len).min().unwrap_or(0);
                assert!(longest - shortest <= 1);
            }
        }
    }

    #[test]
    fn partition_reaches_u64_max() {
        let parts = partition(u64::MAX, 3);
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].start, 2);
        assert_eq!(parts[2].end, u64::MAX);
        assert_eq!(parts[0].end + 1, parts[1].start);
        assert_eq!(parts[1].end + 1, parts[2].start);
    }

    // ── Claim Counter ───────────────────────────────────────────────

    #[test]
    fn claims_are_sequential_then_exhausted() {
        let counter = ClaimCounter::new(5);
        let claimed: Vec<u64> = std::iter::from_fn(|| counter.claim()).collect();
        assert_eq!(claimed, vec![2, 3, 4, 5]);
        assert!(counter.is_exhausted());
        assert_eq!(counter.claim(), None);
        assert_eq!(counter.position(), 6);
    }

    /// Failed claims must not advance the counter.
    #[test]
    fn failed_claims_leave_position_at_max_plus_one() {
        let counter = ClaimCounter::new(10);
        while counter.claim().is_some() {}
        for _ in 0..100 {
            assert_eq!(counter.claim(), None);
        }
        assert_eq!(counter.position(), 11);
        assert_eq!(counter.claims_issued(), 9);
    }

    #[test]
    fn counter_for_empty_range_is_exhausted() {
        let counter = ClaimCounter::new(1);
        assert!(counter.is_exhausted());
        assert_eq!(counter.claim(), None);
        assert_eq!(counter.position(), 2);
    }

    /// 16 threads race on one counter: every candidate is claimed exactly once.
    #[test]
    fn concurrent_claims_are_unique_and_complete() {
        let max_range = 20_000;
        let counter = Arc::new(ClaimCounter::new(max_range));
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let counter = Arc::clone(&counter);
                thread::spawn(move || std::iter::from_fn(|| counter.claim()).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for h in handles {
            for n in h.join().unwrap() {
                assert!(seen.insert(n), "{} claimed twice", n);
            }
        }
        assert_eq!(seen.len() as u64, max_range - 1);
        assert!((2..=max_range).all(|n| seen.contains(&n)));
        assert_eq!(counter.position(), max_range + 1);
    }

    // ── Distribution ────────────────────────────────────────────────

    #[test]
    fn dynamic_distribution_shares_one_counter() {
        let dist = Distribution::new(StrategyKind::Dynamic, 10, 3);
        assert_eq!(dist.kind(), StrategyKind::Dynamic);
        assert_eq!(dist.worker_count(), 3);
        let mut a = dist.candidates(0).unwrap();
        let mut b = dist.candidates(2).unwrap();
        assert_eq!(a.next(), Some(2));
        assert_eq!(b.next(), Some(3));
        assert_eq!(a.next(), Some(4));
        assert!(dist.candidates(3).is_none());
        assert!(dist.subrange(0).is_none());
    }

    #[test]
    fn static_distribution_hands_out_subranges() {
        let dist = Distribution::new(StrategyKind::Static, 10, 4);
        assert_eq!(dist.kind(), StrategyKind::Static);
        assert_eq!(dist.worker_count(), 4);
        let first: Vec<u64> = dist.candidates(0).unwrap().collect();
        let last: Vec<u64> = dist.candidates(3).unwrap().collect();
        assert_eq!(first, vec![2, 3, 4]);
        assert_eq!(last, vec![9, 10]);
        assert_eq!(dist.subrange(1), Some(Subrange { start: 5, end: 6 }));
        assert!(dist.candidates(4).is_none());
    }

    #[test]
    fn static_distribution_trims_surplus_workers() {
        let dist = Distribution::new(StrategyKind::Static, 3, 8);
        assert_eq!(dist.worker_count(), 2);
    }

    #[test]
    fn strategy_kind_display_and_serde() {
        assert_eq!(StrategyKind::Dynamic.to_string(), "dynamic");
        assert_eq!(StrategyKind::Static.to_string(), "static");
        assert_eq!(serde_json::to_string(&StrategyKind::Static).unwrap(), "\"static\"");
        let parsed: StrategyKind = serde_json::from_str("\"dynamic\"").unwrap();
        assert_eq!(parsed, StrategyKind::Dynamic);
    }
}
