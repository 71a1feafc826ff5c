//! Standings table → tournament records.
//!
//! Pipeline per season:
//! 1. Locate the Rk / Team / Conf / AdjOE / AdjDE columns
//! 2. Drop in-page repeated header rows (`Rk` cell equal to "Rk")
//! 3. Extract seed, final round and team name from the composite Team cell
//! 4. Coerce efficiencies to numbers
//! 5. Drop every row with an absent field
//! 6. Map final round to games won (unknown codes fail the season)
//! 7. Reject a season that lists the same team twice

use super::html::{extract_first_table, HtmlTable, TableError};
use super::provider::DataError;
use crate::domain::{CandidateRow, TournamentRecord};
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;
use tracing::debug;

pub const RANK_COLUMN: &str = "Rk";
pub const TEAM_COLUMN: &str = "Team";
pub const CONFERENCE_COLUMN: &str = "Conf";
pub const OFFENSE_COLUMN: &str = "AdjOE";
pub const DEFENSE_COLUMN: &str = "AdjDE";

fn seed_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([0-9]+) seed").expect("valid seed regex"))
}

fn round_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r", (.*)").expect("valid round regex"))
}

fn name_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(.*) [1-9]").expect("valid name regex"))
}

/// Seed: the digits directly before " seed".
pub fn extract_seed(team_cell: &str) -> Option<u8> {
    seed_pattern()
        .captures(team_cell)
        .and_then(|c| c[1].parse().ok())
}

/// Final round: everything after the first ", ".
pub fn extract_final_round(team_cell: &str) -> Option<String> {
    round_pattern()
        .captures(team_cell)
        .map(|c| c[1].to_string())
}

/// Team name: everything before the last space followed by a digit 1-9.
pub fn extract_team_name(team_cell: &str) -> Option<String> {
    name_pattern()
        .captures(team_cell)
        .map(|c| c[1].to_string())
        .filter(|name| !name.is_empty())
}

/// Numeric coercion for an efficiency cell.
///
/// The value is the first token of the cell; a rank annotation rendered
/// below it is ignored. Anything unparsable, or NaN, is absent.
pub fn coerce_efficiency(cell: &str) -> Option<f64> {
    let token = cell.split_whitespace().next()?;
    token.parse::<f64>().ok().filter(|v| !v.is_nan())
}

struct Columns {
    rank: usize,
    team: usize,
    conference: usize,
    offense: usize,
    defense: usize,
}

impl Columns {
    fn locate(year: i32, table: &HtmlTable) -> Result<Self, DataError> {
        let find = |name: &str| {
            table
                .column_index(name)
                .ok_or_else(|| DataError::malformed(year, format!("missing column '{name}'")))
        };
        Ok(Self {
            rank: find(RANK_COLUMN)?,
            team: find(TEAM_COLUMN)?,
            conference: find(CONFERENCE_COLUMN)?,
            offense: find(OFFENSE_COLUMN)?,
            defense: find(DEFENSE_COLUMN)?,
        })
    }
}

/// Build a candidate from one body row. Missing cells count as absent.
fn candidate_from_row(cols: &Columns, row: &[String]) -> CandidateRow {
    let cell = |i: usize| row.get(i).map(String::as_str);
    let team_cell = cell(cols.team).unwrap_or_default();

    CandidateRow {
        team: extract_team_name(team_cell),
        seed: extract_seed(team_cell),
        final_round: extract_final_round(team_cell),
        conference: cell(cols.conference)
            .filter(|c| !c.is_empty())
            .map(str::to_string),
        offensive_efficiency: cell(cols.offense).and_then(coerce_efficiency),
        defensive_efficiency: cell(cols.defense).and_then(coerce_efficiency),
    }
}

/// Candidates for every body row that isn't a repeated header.
pub fn candidates(year: i32, table: &HtmlTable) -> Result<Vec<CandidateRow>, DataError> {
    let cols = Columns::locate(year, table)?;
    Ok(table
        .rows()
        .iter()
        .filter(|row| row.get(cols.rank).map(String::as_str) != Some(RANK_COLUMN))
        .map(|row| candidate_from_row(&cols, row))
        .collect())
}

/// Normalize a parsed standings table into one season's records.
pub fn normalize_year(year: i32, table: &HtmlTable) -> Result<Vec<TournamentRecord>, DataError> {
    let candidates = candidates(year, table)?;
    let total = candidates.len();

    let complete: Vec<_> = candidates
        .into_iter()
        .filter_map(CandidateRow::complete)
        .collect();
    debug!(
        year,
        kept = complete.len(),
        dropped = total - complete.len(),
        "filtered incomplete rows"
    );

    let records = complete
        .into_iter()
        .map(|row| row.into_record(year))
        .collect::<Result<Vec<_>, _>>()?;

    let mut seen = HashSet::new();
    if let Some(dup) = records.iter().find(|r| !seen.insert(r.team())) {
        return Err(DataError::malformed(
            year,
            format!("team '{}' listed twice", dup.team()),
        ));
    }
    Ok(records)
}

/// Parse a raw standings page into one season's records.
pub fn parse_standings_page(year: i32, html: &str) -> Result<Vec<TournamentRecord>, DataError> {
    let table = extract_first_table(html)
        .map_err(|e: TableError| DataError::malformed(year, e.to_string()))?;
    normalize_year(year, &table)
}
