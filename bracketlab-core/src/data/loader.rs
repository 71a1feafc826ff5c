//! Tournament table loading: cache first, otherwise fetch every season.
//!
//! Resolution policy:
//! 1. If the cache file exists and `force_download` is false → load it
//!    (an unreadable cache is an error, never a silent re-download)
//! 2. Otherwise fetch → parse → normalize each season in the given order;
//!    the first failing season aborts the whole call
//! 3. Sort by Year, write the cache once, return the table

use super::cache::TableCache;
use super::normalize::parse_standings_page;
use super::provider::{DataError, LoadProgress, NoProgress, StandingsSource};
use super::torvik::TorvikSource;
use crate::config::LoaderConfig;
use crate::domain::TournamentTable;
use tracing::{debug, info, warn};

/// Seasons loaded when none are requested.
pub const DEFAULT_YEARS: [i32; 4] = [2017, 2018, 2019, 2021];

/// Loads the tournament table from a cache or a standings source.
pub struct TournamentLoader<S> {
    source: S,
    cache: TableCache,
}

impl TournamentLoader<TorvikSource> {
    /// Live-site loader using the config's endpoint, timeout and cache path.
    pub fn from_config(config: &LoaderConfig) -> Result<Self, DataError> {
        Ok(Self::new(
            TorvikSource::from_config(config)?,
            TableCache::new(config.cache_path.clone()),
        ))
    }
}

impl<S: StandingsSource> TournamentLoader<S> {
    pub fn new(source: S, cache: TableCache) -> Self {
        Self { source, cache }
    }

    pub fn cache(&self) -> &TableCache {
        &self.cache
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Return the table covering `years`.
    pub fn load(&self, years: &[i32], force_download: bool) -> Result<TournamentTable, DataError> {
        self.load_with_progress(years, force_download, &NoProgress)
    }

    pub fn load_with_progress(
        &self,
        years: &[i32],
        force_download: bool,
        progress: &dyn LoadProgress,
    ) -> Result<TournamentTable, DataError> {
        validate_years(years)?;

        if !force_download && self.cache.exists() {
            let table = self.cache.load()?;
            debug!(path = %self.cache.path().display(), "using cached table");

            let cached = table.years();
            let missing: Vec<i32> = years
                .iter()
                .copied()
                .filter(|y| !cached.contains(y))
                .collect();
            if !missing.is_empty() {
                warn!(
                    ?missing,
                    "cached table lacks requested seasons; pass force_download to refresh"
                );
            }

            progress.on_cache_hit(table.len());
            return Ok(table);
        }

        let table = self.download(years, progress)?;
        self.cache.write(&table)?;
        info!(
            path = %self.cache.path().display(),
            rows = table.len(),
            "cached tournament table"
        );
        Ok(table)
    }

    /// Fetch and normalize every season without touching the cache.
    pub fn download(
        &self,
        years: &[i32],
        progress: &dyn LoadProgress,
    ) -> Result<TournamentTable, DataError> {
        let total = years.len();
        let mut table = TournamentTable::new();

        for (i, &year) in years.iter().enumerate() {
            progress.on_start(year, i, total);
            info!(year, source = self.source.name(), "fetching standings");

            let html = self.source.fetch_year(year)?;
            let records = parse_standings_page(year, &html)?;

            progress.on_complete(year, records.len());
            table.extend(records);
        }

        table.sort_by_year();
        Ok(table)
    }
}

/// Years must be distinct.
fn validate_years(years: &[i32]) -> Result<(), DataError> {
    for (i, year) in years.iter().enumerate() {
        if years[..i].contains(year) {
            return Err(DataError::InvalidYears(format!("{year} requested twice")));
        }
    }
    Ok(())
}

/// Load the tournament table for `years` with the default configuration:
/// the live site, and `ncaa_tournament_teams.csv` in the working directory.
pub fn load_tournament_data(
    years: &[i32],
    force_download: bool,
) -> Result<TournamentTable, DataError> {
    TournamentLoader::from_config(&LoaderConfig::default())?.load(years, force_download)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Unreachable;

    impl StandingsSource for Unreachable {
        fn name(&self) -> &str {
            "unreachable"
        }

        fn fetch_year(&self, _year: i32) -> Result<String, DataError> {
            panic!("network must not be touched");
        }
    }

    #[test]
    fn duplicate_years_rejected() {
        let err = validate_years(&[2019, 2021, 2019]).unwrap_err();
        assert!(matches!(err, DataError::InvalidYears(_)));
        assert!(validate_years(&[2017, 2018]).is_ok());
        assert!(validate_years(&[]).is_ok());
    }

    #[test]
    fn corrupt_cache_is_not_bypassed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.csv");
        std::fs::write(&path, "not,a,tournament\n1,2,3\n").unwrap();

        let loader = TournamentLoader::new(Unreachable, TableCache::new(&path));
        let err = loader.load(&[2021], false).unwrap_err();
        assert!(matches!(err, DataError::CacheUnreadable { .. }), "{err}");
    }

    #[test]
    fn empty_year_list_writes_empty_cache() {
        let dir = tempfile::tempdir().unwrap();
        let cache = TableCache::new(dir.path().join("cache.csv"));
        let loader = TournamentLoader::new(Unreachable, cache);

        let table = loader.load(&[], false).unwrap();
        assert!(table.is_empty());
        assert!(loader.cache().exists());
    }
}
