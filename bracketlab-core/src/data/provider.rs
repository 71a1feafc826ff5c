//! Standings source trait and structured error types.
//!
//! The StandingsSource trait abstracts over where a season's standings page
//! comes from (the live site, or a fixture in tests) so the loader can be
//! exercised without a network.

use crate::domain::UnknownRoundCode;
use std::path::PathBuf;
use thiserror::Error;

/// Structured error types for data operations.
///
/// Every variant is fatal to the load call that raised it.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("cache unreadable at {}: {reason}", .path.display())]
    CacheUnreadable { path: PathBuf, reason: String },

    #[error("failed to write cache at {}: {source}", .path.display())]
    CacheWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    UnknownRoundCode(#[from] UnknownRoundCode),

    #[error("malformed source table for {year}: {reason}")]
    MalformedTable { year: i32, reason: String },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("invalid years: {0}")]
    InvalidYears(String),
}

impl DataError {
    pub(crate) fn malformed(year: i32, reason: impl Into<String>) -> Self {
        DataError::MalformedTable {
            year,
            reason: reason.into(),
        }
    }
}

/// Trait for standings sources.
///
/// Implementations return the raw HTML of one season's standings page.
/// The cache sits above this trait; sources don't know about it.
pub trait StandingsSource {
    /// Human-readable name of this source.
    fn name(&self) -> &str;

    /// Fetch the standings page for a season (season-ending year).
    fn fetch_year(&self, year: i32) -> Result<String, DataError>;
}

impl<S: StandingsSource + ?Sized> StandingsSource for &S {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn fetch_year(&self, year: i32) -> Result<String, DataError> {
        (**self).fetch_year(year)
    }
}

/// Progress callback for multi-year loads.
pub trait LoadProgress {
    /// Called before a season is fetched.
    fn on_start(&self, year: i32, index: usize, total: usize);

    /// Called after a season is parsed, with the number of records kept.
    fn on_complete(&self, year: i32, records: usize);

    /// Called when the table came from the cache instead of the network.
    fn on_cache_hit(&self, records: usize);
}

/// Progress reporter that prints to stdout.
pub struct StdoutProgress;

impl LoadProgress for StdoutProgress {
    fn on_start(&self, year: i32, index: usize, total: usize) {
        println!("[{}/{}] Fetching {year}...", index + 1, total);
    }

    fn on_complete(&self, year: i32, records: usize) {
        println!("  OK: {year} ({records} teams)");
    }

    fn on_cache_hit(&self, records: usize) {
        println!("Loaded {records} records from cache");
    }
}

/// Progress reporter that stays silent.
pub struct NoProgress;

impl LoadProgress for NoProgress {
    fn on_start(&self, _year: i32, _index: usize, _total: usize) {}
    fn on_complete(&self, _year: i32, _records: usize) {}
    fn on_cache_hit(&self, _records: usize) {}
}
