pub mod collector;
pub mod config;
pub mod oracle;
pub mod progress;
pub mod report;
pub mod search;
pub mod strategy;
pub mod worker;

pub use oracle::{is_prime, sequential_primes};
pub use report::SearchReport;
pub use search::{run, run_with, SearchError, SearchOptions};
pub use strategy::StrategyKind;
