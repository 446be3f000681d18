//! # Progress — Live Search Counters
//!
//! Counters shared between workers and an optional background reporter.
//! Workers keep local tallies and flush them here every [`FLUSH_EVERY`]
//! candidates, so the per-candidate path never touches these atomics. The
//! numbers are informational: the final result never depends on them.
//!
//! ## Background Reporter
//!
//! [`Progress::start_reporter`] spawns a thread that logs tested count, found
//! count, rate and elapsed time at a fixed interval. The thread parks between
//! reports, so [`Reporter::stop`] wakes it and returns immediately instead of
//! waiting out the interval.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Candidates a worker tests between flushes of its local counters.
pub const FLUSH_EVERY: u64 = 4096;

#[derive(Debug)]
pub struct Progress {
    pub tested: AtomicU64,
    pub found: AtomicU64,
    start: Instant,
    shutdown: AtomicBool,
}

impl Progress {
    pub fn new() -> Arc<Self> {
        Arc::new(Progress {
            tested: AtomicU64::new(0),
            found: AtomicU64::new(0),
            start: Instant::now(),
            shutdown: AtomicBool::new(false),
        })
    }

    /// Add a worker's local tallies.
    pub fn record(&self, tested: u64, found: u64) {
        if tested > 0 {
            self.tested.fetch_add(tested, Ordering::Relaxed);
        }
        if found > 0 {
            self.found.fetch_add(found, Ordering::Relaxed);
        }
    }

    /// Candidates tested per second since this `Progress` was created.
    pub fn rate(&self) -> f64 {
        let secs = self.start.elapsed().as_secs_f64();
        if secs > 0.0 {
            self.tested.load(Ordering::Relaxed) as f64 / secs
        } else {
            0.0
        }
    }

    /// Spawn the background reporter. If the thread cannot be started the
    /// search still runs; the failure is logged and no progress is reported.
    pub fn start_reporter(self: &Arc<Self>, interval: Duration) -> Reporter {
        let progress = Arc::clone(self);
        let spawned = thread::Builder::new()
            .name("progress".into())
            .spawn(move || loop {
                thread::park_timeout(interval);
                if progress.shutdown.load(Ordering::Relaxed) {
                    break;
                }
                progress.print_status();
            });
        let handle = match spawned {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!(error = %e, "could not start progress reporter");
                None
            }
        };
        Reporter {
            progress: Arc::clone(self),
            handle,
        }
    }

    pub fn print_status(&self) {
        let elapsed = self.start.elapsed();
        let tested = self.tested.load(Ordering::Relaxed);
        let found = self.found.load(Ordering::Relaxed);
        let rate = self.rate();
        let h = elapsed.as_secs() / 3600;
        let m = (elapsed.as_secs() % 3600) / 60;
        let s = elapsed.as_secs() % 60;
        info!(
            tested,
            found,
            rate = format_args!("{:.0}", rate),
            elapsed = format_args!("{:02}:{:02}:{:02}", h, m, s),
            "search progress"
        );
    }

    pub fn stop(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }
}

/// Handle to a running background reporter.
#[derive(Debug)]
pub struct Reporter {
    progress: Arc<Progress>,
    handle: Option<thread::JoinHandle<()>>,
}

impl Reporter {
    /// Whether a background thread was started for this reporter.
    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Signal the reporter thread and wait for it to exit.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.progress.stop();
        if let Some(handle) = self.handle.take() {
            handle.thread().unpark();
            let _ = handle.join();
        }
    }
}

impl Drop for Reporter {
    fn drop(&mut self) {
        self.shutdown();
    }
}
