//! Flat-file CSV cache for the combined tournament table.
//!
//! Layout: a single `ncaa_tournament_teams.csv` with a header row and the
//! columns in [`CACHE_COLUMNS`], Year first.
//!
//! Features:
//! - Atomic writes (write to .tmp, rename into place)
//! - Schema check on load: missing columns, bad values, and rows whose
//!   derived fields disagree with their inputs all fail as "cache unreadable"

use super::provider::DataError;
use crate::domain::{FinalRound, GamesWon, TournamentRecord, TournamentTable};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_CACHE_FILE: &str = "ncaa_tournament_teams.csv";

pub const CACHE_COLUMNS: [&str; 9] = [
    "Year",
    "Team",
    "Seed",
    "Final Round",
    "Conference",
    "Offensive Efficiency",
    "Defensive Efficiency",
    "Total Efficiency",
    "Games Won",
];

/// Relative tolerance when checking a stored total efficiency.
const TOTAL_EFFICIENCY_TOLERANCE: f64 = 1e-9;

/// One CSV line. Field order matches [`CACHE_COLUMNS`].
#[derive(Debug, Serialize, Deserialize)]
struct CacheRow {
    #[serde(rename = "Year")]
    year: i32,
    #[serde(rename = "Team")]
    team: String,
    #[serde(rename = "Seed")]
    seed: u8,
    #[serde(rename = "Final Round")]
    final_round: FinalRound,
    #[serde(rename = "Conference")]
    conference: String,
    #[serde(rename = "Offensive Efficiency")]
    offensive_efficiency: f64,
    #[serde(rename = "Defensive Efficiency")]
    defensive_efficiency: f64,
    #[serde(rename = "Total Efficiency")]
    total_efficiency: f64,
    #[serde(rename = "Games Won")]
    games_won: GamesWon,
}

impl From<&TournamentRecord> for CacheRow {
    fn from(r: &TournamentRecord) -> Self {
        Self {
            year: r.year(),
            team: r.team().to_string(),
            seed: r.seed(),
            final_round: r.final_round(),
            conference: r.conference().to_string(),
            offensive_efficiency: r.offensive_efficiency(),
            defensive_efficiency: r.defensive_efficiency(),
            total_efficiency: r.total_efficiency(),
            games_won: r.games_won(),
        }
    }
}

impl CacheRow {
    /// Rebuild the record, checking the stored derived fields.
    fn into_record(self) -> Result<TournamentRecord, String> {
        let record = TournamentRecord::new(
            self.year,
            self.team,
            self.seed,
            self.final_round,
            self.conference,
            self.offensive_efficiency,
            self.defensive_efficiency,
        );

        if record.games_won() != self.games_won {
            return Err(format!(
                "{} {}: games won {} does not match final round {}",
                record.year(),
                record.team(),
                self.games_won,
                record.final_round()
            ));
        }

        let expected = record.total_efficiency();
        let stored = self.total_efficiency;
        let close = expected == stored
            || (expected - stored).abs()
                <= TOTAL_EFFICIENCY_TOLERANCE * expected.abs().max(1.0);
        if !close {
            return Err(format!(
                "{} {}: total efficiency {stored} does not equal {expected}",
                record.year(),
                record.team()
            ));
        }

        Ok(record)
    }
}

/// Cache status for the CLI.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatus {
    pub path: PathBuf,
    pub cached: bool,
    pub rows: Option<usize>,
    pub years: Vec<i32>,
}

/// The CSV cache.
#[derive(Debug, Clone)]
pub struct TableCache {
    path: PathBuf,
}

impl Default for TableCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_FILE)
    }
}

impl TableCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn unreadable(&self, reason: impl Into<String>) -> DataError {
        DataError::CacheUnreadable {
            path: self.path.clone(),
            reason: reason.into(),
        }
    }

    fn write_error(&self, source: impl Into<io::Error>) -> DataError {
        DataError::CacheWrite {
            path: self.path.clone(),
            source: source.into(),
        }
    }

    /// Load the whole table. Any read, schema or value problem is
    /// `CacheUnreadable`; there is no fallback.
    pub fn load(&self) -> Result<TournamentTable, DataError> {
        let mut reader =
            csv::Reader::from_path(&self.path).map_err(|e| self.unreadable(e.to_string()))?;

        let headers = reader
            .headers()
            .map_err(|e| self.unreadable(e.to_string()))?
            .clone();
        for column in CACHE_COLUMNS {
            if !headers.iter().any(|h| h == column) {
                return Err(self.unreadable(format!("missing column '{column}'")));
            }
        }

        let mut records = Vec::new();
        for (i, row) in reader.deserialize::<CacheRow>().enumerate() {
            let row = row.map_err(|e| self.unreadable(format!("row {}: {e}", i + 1)))?;
            records.push(row.into_record().map_err(|e| self.unreadable(e))?);
        }

        let table = TournamentTable::from_records(records);
        if let Some((year, team)) = table.first_duplicate() {
            return Err(self.unreadable(format!("duplicate row for {year} {team}")));
        }

        debug!(path = %self.path.display(), rows = table.len(), "loaded cache");
        Ok(table)
    }

    /// Overwrite the cache with `table`, rows ordered by Year.
    ///
    /// Writes are atomic: write to .tmp then rename.
    pub fn write(&self, table: &TournamentTable) -> Result<(), DataError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.write_error(e))?;
        }

        let mut rows: Vec<&TournamentRecord> = table.iter().collect();
        rows.sort_by_key(|r| r.year());

        let tmp_path = self.tmp_path();
        let result = self.write_rows(&tmp_path, &rows);
        if let Err(e) = result {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }

        fs::rename(&tmp_path, &self.path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            self.write_error(e)
        })?;

        debug!(path = %self.path.display(), rows = rows.len(), "wrote cache");
        Ok(())
    }

    fn write_rows(&self, tmp_path: &Path, rows: &[&TournamentRecord]) -> Result<(), DataError> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(tmp_path)
            .map_err(|e| self.write_error(e))?;

        writer
            .write_record(CACHE_COLUMNS)
            .map_err(|e| self.write_error(e))?;
        for record in rows {
            writer
                .serialize(CacheRow::from(*record))
                .map_err(|e| self.write_error(e))?;
        }
        writer.flush().map_err(|e| self.write_error(e))
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }

    /// Remove the cache file. Returns whether a file was removed.
    pub fn clear(&self) -> Result<bool, DataError> {
        if !self.exists() {
            return Ok(false);
        }
        fs::remove_file(&self.path).map_err(|e| self.write_error(e))?;
        Ok(true)
    }

    /// Report whether a cache exists and what it holds.
    pub fn status(&self) -> Result<CacheStatus, DataError> {
        if !self.exists() {
            return Ok(CacheStatus {
                path: self.path.clone(),
                cached: false,
                rows: None,
                years: Vec::new(),
            });
        }
        let table = self.load()?;
        Ok(CacheStatus {
            path: self.path.clone(),
            cached: true,
            rows: Some(table.len()),
            years: table.years(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> TournamentTable {
        TournamentTable::from_records(vec![
            TournamentRecord::new(2021, "Gonzaga", 1, FinalRound::Finals, "WCC", 125.4, 94.0),
            TournamentRecord::new(2017, "North Carolina", 1, FinalRound::Champions, "ACC", 120.8, 92.3),
            TournamentRecord::new(2024, "Houston", 1, FinalRound::InProgressAlive, "B12", 118.9, 87.1),
        ])
    }

    #[test]
    fn write_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let cache = TableCache::new(dir.path().join(DEFAULT_CACHE_FILE));

        cache.write(&sample_table()).unwrap();
        let loaded = cache.load().unwrap();

        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded.years(), [2017, 2021, 2024]);
        assert_eq!(loaded.records()[0].team(), "North Carolina");
        assert_eq!(loaded.records()[2].games_won(), GamesWon::Unknown);
        assert!(!dir.path().join("ncaa_tournament_teams.csv.tmp").exists());
    }

    #[test]
    fn header_and_column_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CACHE_FILE);
        TableCache::new(&path).write(&sample_table()).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Year,Team,Seed,Final Round,Conference,Offensive Efficiency,\
             Defensive Efficiency,Total Efficiency,Games Won"
        );
        let first = lines.next().unwrap();
        assert!(first.starts_with("2017,North Carolina,1,CHAMPS,ACC,120.8,92.3,"), "{first}");
        assert!(first.ends_with(",6"), "{first}");
        assert!(text.lines().last().unwrap().ends_with(",TBD"));
    }

    #[test]
    fn empty_table_still_has_header() {
        let dir = tempfile::tempdir().unwrap();
        let cache = TableCache::new(dir.path().join("empty.csv"));
        cache.write(&TournamentTable::new()).unwrap();
        assert!(cache.load().unwrap().is_empty());
    }

    #[test]
    fn missing_column_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CACHE_FILE);
        fs::write(&path, "Year,Team,Seed\n2021,Gonzaga,1\n").unwrap();

        let err = TableCache::new(&path).load().unwrap_err();
        match err {
            DataError::CacheUnreadable { reason, .. } => assert!(reason.contains("Final Round")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn bad_value_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CACHE_FILE);
        fs::write(
            &path,
            "Year,Team,Seed,Final Round,Conference,Offensive Efficiency,Defensive Efficiency,Total Efficiency,Games Won\n\
             2021,Gonzaga,1,Round of 12,WCC,120,90,1.3333333333333333,6\n",
        )
        .unwrap();
        assert!(matches!(
            TableCache::new(&path).load(),
            Err(DataError::CacheUnreadable { .. })
        ));
    }

    #[test]
    fn inconsistent_derived_fields_are_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CACHE_FILE);
        let header = CACHE_COLUMNS.join(",");

        fs::write(&path, format!("{header}\n2021,Gonzaga,1,CHAMPS,WCC,120,90,2.0,6\n")).unwrap();
        assert!(matches!(
            TableCache::new(&path).load(),
            Err(DataError::CacheUnreadable { .. })
        ));

        fs::write(&path, format!("{header}\n2021,Gonzaga,1,CHAMPS,WCC,120,90,1.3333333333333333,4\n"))
            .unwrap();
        assert!(matches!(
            TableCache::new(&path).load(),
            Err(DataError::CacheUnreadable { .. })
        ));
    }

    #[test]
    fn duplicate_year_team_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CACHE_FILE);
        let header = CACHE_COLUMNS.join(",");
        let row = "2021,Gonzaga,1,CHAMPS,WCC,120,90,1.3333333333333333,6";
        fs::write(&path, format!("{header}\n{row}\n{row}\n")).unwrap();

        match TableCache::new(&path).load().unwrap_err() {
            DataError::CacheUnreadable { reason, .. } => {
                assert!(reason.contains("2021 Gonzaga"), "{reason}")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn write_failure_keeps_io_source() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, "").unwrap();
        let cache = TableCache::new(blocker.join(DEFAULT_CACHE_FILE));

        let err = cache.write(&sample_table()).unwrap_err();
        assert!(matches!(err, DataError::CacheWrite { .. }), "{err}");
        let source = std::error::Error::source(&err).expect("io source");
        assert!(source.downcast_ref::<io::Error>().is_some());
    }

    #[test]
    fn status_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let cache = TableCache::new(dir.path().join(DEFAULT_CACHE_FILE));

        let status = cache.status().unwrap();
        assert!(!status.cached);
        assert!(!cache.clear().unwrap());

        cache.write(&sample_table()).unwrap();
        let status = cache.status().unwrap();
        assert!(status.cached);
        assert_eq!(status.rows, Some(3));
        assert_eq!(status.years, [2017, 2021, 2024]);

        assert!(cache.clear().unwrap());
        assert!(!cache.exists());
    }
}
