//! # Config — Loading Search Parameters
//!
//! Produces a validated [`SearchConfig`] from a file. Two formats:
//!
//! - **Text** (any extension other than `.toml`): line 1 holds the thread
//!   count, line 2 the maximum range. Line numbers include blank lines, which
//!   are otherwise skipped; anything after line 2 is ignored.
//!
//!   ```text
//!   8
//!   1000000
//!   ```
//!
//! - **TOML**: `threads` and `max_range` are required, `strategy` and
//!   `per_line` are optional.
//!
//!   ```toml
//!   threads = 8
//!   max_range = 1000000
//!   strategy = "static"
//!   per_line = 12
//!   ```
//!
//! The search engine never reads files; it only sees the validated values.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::report::DEFAULT_PER_LINE;
use crate::strategy::{StrategyKind, FIRST_CANDIDATE};

/// Validated search parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    pub threads: usize,
    pub max_range: u64,
    pub strategy: StrategyKind,
    pub per_line: usize,
}

/// Largest accepted thread count (the range of a C `int`).
pub const MAX_THREADS: i64 = i32::MAX as i64;

/// Values read from a file before validation. Any field may be missing so
/// command-line overrides can fill it in before [`RawConfig::validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfig {
    /// Signed so negatives get a proper message.
    pub threads: Option<i64>,
    pub max_range: Option<u64>,
    pub strategy: Option<StrategyKind>,
    pub per_line: Option<usize>,
}

impl RawConfig {
    /// Fill every field still missing here from `fallback`.
    pub fn or(self, fallback: RawConfig) -> RawConfig {
        RawConfig {
            threads: self.threads.or(fallback.threads),
            max_range: self.max_range.or(fallback.max_range),
            strategy: self.strategy.or(fallback.strategy),
            per_line: self.per_line.or(fallback.per_line),
        }
    }

    /// Check presence, then ranges. A missing max range is reported before a
    /// missing thread count.
    pub fn validate(self) -> Result<SearchConfig, ConfigError> {
        let max_range = self.max_range.ok_or(ConfigError::MissingMaxRange)?;
        let threads = self.threads.ok_or(ConfigError::MissingThreads)?;
        from_values(
            threads,
            max_range,
            self.strategy.unwrap_or_default(),
            self.per_line.unwrap_or(DEFAULT_PER_LINE),
        )
    }
}

#[derive(Debug)]
pub enum ConfigError {
    /// The file could not be opened or read.
    Unreadable { path: PathBuf, source: std::io::Error },
    /// TOML syntax or type error.
    Toml { path: PathBuf, source: toml::de::Error },
    MissingThreads,
    MissingMaxRange,
    /// Thread count line is not a single integer.
    InvalidThreads { line: String },
    /// Maximum range is not a plain non-negative integer.
    InvalidMaxRange { value: String },
    ThreadsTooFew { threads: i64 },
    MaxRangeTooSmall { max_range: u64 },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Unreadable { path, source } => {
                write!(f, "could not open {}: {}", path.display(), source)
            }
            ConfigError::Toml { path, source } => {
                write!(f, "invalid TOML in {}: {}", path.display(), source)
            }
            ConfigError::MissingThreads => write!(f, "number of threads not found (line 1)"),
            ConfigError::MissingMaxRange => write!(f, "maximum range not found (line 2)"),
            ConfigError::InvalidThreads { line } => {
                write!(f, "invalid input for threads value (line 1): {:?}", line)
            }
            ConfigError::InvalidMaxRange { value } => {
                write!(f, "invalid maximum range number: {}", value)
            }
            ConfigError::ThreadsTooFew { threads } => {
                write!(f, "number of threads must be at least 1 (got {})", threads)
            }
            ConfigError::MaxRangeTooSmall { max_range } => {
                write!(f, "maximum range must be at least 2 (got {})", max_range)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Unreadable { source, .. } => Some(source),
            ConfigError::Toml { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Load and validate a configuration file, choosing the format by extension.
pub fn load(path: &Path) -> Result<SearchConfig, ConfigError> {
    read_raw(path)?.validate()
}

/// Read a configuration file without validating ranges or presence.
/// Syntax errors (unparsable numbers, bad TOML) are still reported.
pub fn read_raw(path: &Path) -> Result<RawConfig, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;
    if path.extension().is_some_and(|ext| ext == "toml") {
        toml::from_str(&text).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })
    } else {
        parse_text_raw(&text)
    }
}

/// Parse and validate the two-line text format.
pub fn parse_text(text: &str) -> Result<SearchConfig, ConfigError> {
    parse_text_raw(text)?.validate()
}

/// Parse and validate the TOML format.
pub fn parse_toml(text: &str) -> Result<SearchConfig, ConfigError> {
    let raw: RawConfig = toml::from_str(text).map_err(|source| ConfigError::Toml {
        path: PathBuf::new(),
        source,
    })?;
    raw.validate()
}

fn parse_text_raw(text: &str) -> Result<RawConfig, ConfigError> {
    let mut raw = RawConfig::default();

    for (idx, line) in text.lines().enumerate() {
        if line.is_empty() {
            continue;
        }
        match idx + 1 {
            1 => {
                let mut tokens = line.split_whitespace();
                let parsed = match (tokens.next(), tokens.next()) {
                    (Some(tok), None) => tok.parse::<i64>().ok(),
                    _ => None,
                };
                raw.threads = Some(parsed.ok_or_else(|| ConfigError::InvalidThreads {
                    line: line.to_string(),
                })?);
            }
            2 => {
                if let Some(tok) = line.split_whitespace().next() {
                    raw.max_range =
                        Some(tok.parse::<u64>().map_err(|_| ConfigError::InvalidMaxRange {
                            value: tok.to_string(),
                        })?);
                }
            }
            _ => break,
        }
    }
    Ok(raw)
}

/// Validate raw values, e.g. command-line overrides merged over a file.
pub fn from_values(
    threads: i64,
    max_range: u64,
    strategy: StrategyKind,
    per_line: usize,
) -> Result<SearchConfig, ConfigError> {
    if max_range < FIRST_CANDIDATE {
        return Err(ConfigError::MaxRangeTooSmall { max_range });
    }
    if threads < 1 {
        return Err(ConfigError::ThreadsTooFew { threads });
    }
    let invalid = || ConfigError::InvalidThreads {
        line: threads.to_string(),
    };
    if threads > MAX_THREADS {
        return Err(invalid());
    }
    Ok(SearchConfig {
        threads: usize::try_from(threads).map_err(|_| invalid())?,
        max_range,
        strategy,
        per_line: per_line.max(1),
    })
}
