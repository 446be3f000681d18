//! # Search — Orchestrating One Parallel Scan
//!
//! Validates parameters, builds a fresh [`Distribution`] and
//! [`PrimeCollector`], runs one worker per pool thread, and turns the joined
//! result into a [`SearchReport`].
//!
//! ## Worker Pool
//!
//! Each search gets a dedicated rayon pool sized to exactly the number of
//! workers launched (the requested thread count for the dynamic strategy,
//! the number of non-empty subranges for the static one). Workers are scoped
//! jobs that run to completion without yielding. The scope returns only once
//! every worker has finished, and a panic in any worker is re-raised from the
//! scope: one failed worker aborts the whole search rather than silently
//! dropping its share of the range.
//!
//! ## Timing
//!
//! The clock starts before the pool threads are spawned and stops after the
//! scope has joined all workers. The final sort is not included.

use chrono::Utc;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tracing::{info, info_span};

use crate::collector::{capacity_hint, PrimeCollector};
use crate::progress::Progress;
use crate::report::SearchReport;
use crate::strategy::{Candidates, Distribution, StrategyKind, Subrange, FIRST_CANDIDATE};
use crate::worker::{self, WorkerStats};

/// Errors raised by the orchestrator.
#[derive(Debug)]
pub enum SearchError {
    /// `max_range` below the first candidate.
    InvalidRange { max_range: u64 },
    /// Zero worker threads requested.
    InvalidThreadCount { thread_count: usize },
    /// More workers than a rayon pool can hold.
    TooManyThreads { thread_count: usize, limit: usize },
    /// The worker pool could not be created (e.g. thread limit reached).
    ThreadPool(rayon::ThreadPoolBuildError),
}

impl std::fmt::Display for SearchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchError::InvalidRange { max_range } => {
                write!(f, "maximum range must be at least 2 (got {})", max_range)
            }
            SearchError::InvalidThreadCount { thread_count } => {
                write!(f, "number of threads must be at least 1 (got {})", thread_count)
            }
            SearchError::TooManyThreads {
                thread_count,
                limit,
            } => write!(
                f,
                "number of threads must be at most {} (got {})",
                limit, thread_count
            ),
            SearchError::ThreadPool(e) => write!(f, "could not start worker threads: {}", e),
        }
    }
}

impl std::error::Error for SearchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SearchError::ThreadPool(e) => Some(e),
            _ => None,
        }
    }
}

/// Full set of knobs for one search.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub max_range: u64,
    pub thread_count: usize,
    pub strategy: StrategyKind,
    /// Shared live counters; the caller keeps a handle to read them.
    pub progress: Option<Arc<Progress>>,
    /// Log progress at this interval while the search runs.
    pub report_every: Option<Duration>,
}

impl SearchOptions {
    pub fn new(max_range: u64, thread_count: usize, strategy: StrategyKind) -> Self {
        SearchOptions {
            max_range,
            thread_count,
            strategy,
            progress: None,
            report_every: None,
        }
    }

    pub fn with_progress(mut self, progress: Arc<Progress>) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn report_every(mut self, interval: Duration) -> Self {
        self.report_every = Some(interval);
        self
    }

    pub fn validate(&self) -> Result<(), SearchError> {
        if self.max_range < FIRST_CANDIDATE {
            return Err(SearchError::InvalidRange {
                max_range: self.max_range,
            });
        }
        if self.thread_count < 1 {
            return Err(SearchError::InvalidThreadCount {
                thread_count: self.thread_count,
            });
        }
        let limit = rayon::max_num_threads();
        if self.thread_count > limit {
            return Err(SearchError::TooManyThreads {
                thread_count: self.thread_count,
                limit,
            });
        }
        Ok(())
    }
}

/// Search `[2, max_range]` with `thread_count` workers using `strategy`.
pub fn run(
    max_range: u64,
    thread_count: usize,
    strategy: StrategyKind,
) -> Result<SearchReport, SearchError> {
    run_with(&SearchOptions::new(max_range, thread_count, strategy))
}

pub fn run_with(options: &SearchOptions) -> Result<SearchReport, SearchError> {
    run_workers(options, worker::run)
}

/// [`run_with`] with the per-worker body supplied by the caller.
fn run_workers<F>(options: &SearchOptions, work: F) -> Result<SearchReport, SearchError>
where
    F: Fn(usize, Option<Subrange>, Candidates<'_>, &PrimeCollector, Option<&Progress>) -> WorkerStats
        + Sync,
{
    options.validate()?;

    let span = info_span!(
        "search",
        strategy = %options.strategy,
        threads = options.thread_count,
        max_range = options.max_range
    );
    let _enter = span.enter();

    let distribution = Distribution::new(options.strategy, options.max_range, options.thread_count);
    let collector = PrimeCollector::with_capacity(capacity_hint(options.max_range));
    let workers_launched = distribution.worker_count();

    let progress = options
        .progress
        .clone()
        .or_else(|| options.report_every.map(|_| Progress::new()));
    let reporter = match (&progress, options.report_every) {
        (Some(p), Some(interval)) => Some(p.start_reporter(interval)),
        _ => None,
    };

    let started_at = Utc::now();
    let begun = Instant::now();
    let stats = scan(&distribution, &collector, progress.as_deref(), workers_launched, &work);
    let elapsed = begun.elapsed();

    if let Some(reporter) = reporter {
        reporter.stop();
    }
    let mut workers = stats?;
    workers.sort_by_key(|w| w.worker);

    let primes = collector.into_sorted();
    info!(
        primes = primes.len(),
        workers = workers_launched,
        elapsed_ms = elapsed.as_millis() as u64,
        "search complete"
    );

    Ok(SearchReport {
        strategy: options.strategy,
        max_range: options.max_range,
        thread_count: options.thread_count,
        workers_launched,
        started_at,
        elapsed,
        prime_count: primes.len(),
        workers,
        primes,
    })
}

/// Spawn one scoped worker per pool thread and wait for all of them.
fn scan<F>(
    distribution: &Distribution,
    collector: &PrimeCollector,
    progress: Option<&Progress>,
    workers: usize,
    work: &F,
) -> Result<Vec<WorkerStats>, SearchError>
where
    F: Fn(usize, Option<Subrange>, Candidates<'_>, &PrimeCollector, Option<&Progress>) -> WorkerStats
        + Sync,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("worker-{}", i))
        .build()
        .map_err(SearchError::ThreadPool)?;

    let stats = Mutex::new(Vec::with_capacity(workers));
    pool.scope(|scope| {
        for id in 0..workers {
            let Some(candidates) = distribution.candidates(id) else {
                continue;
            };
            let subrange = distribution.subrange(id);
            let stats = &stats;
            scope.spawn(move |_| {
                let s = work(id, subrange, candidates, collector, progress);
                stats.lock().unwrap_or_else(PoisonError::into_inner).push(s);
            });
        }
    });
    Ok(stats.into_inner().unwrap_or_else(PoisonError::into_inner))
}
