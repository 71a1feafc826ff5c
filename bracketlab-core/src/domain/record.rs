//! Tournament records and the multi-year table.

use super::round::{FinalRound, GamesWon, UnknownRoundCode};
use serde::Serialize;
use std::collections::HashSet;

/// One team's tournament line for one season.
///
/// Total efficiency and games won are derived in the constructor and have
/// no setters, so they always agree with the fields they come from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TournamentRecord {
    year: i32,
    team: String,
    seed: u8,
    final_round: FinalRound,
    conference: String,
    offensive_efficiency: f64,
    defensive_efficiency: f64,
    total_efficiency: f64,
    games_won: GamesWon,
}

impl TournamentRecord {
    pub fn new(
        year: i32,
        team: impl Into<String>,
        seed: u8,
        final_round: FinalRound,
        conference: impl Into<String>,
        offensive_efficiency: f64,
        defensive_efficiency: f64,
    ) -> Self {
        Self {
            year,
            team: team.into(),
            seed,
            final_round,
            conference: conference.into(),
            offensive_efficiency,
            defensive_efficiency,
            total_efficiency: offensive_efficiency / defensive_efficiency,
            games_won: final_round.games_won(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn team(&self) -> &str {
        &self.team
    }

    pub fn seed(&self) -> u8 {
        self.seed
    }

    pub fn final_round(&self) -> FinalRound {
        self.final_round
    }

    pub fn conference(&self) -> &str {
        &self.conference
    }

    pub fn offensive_efficiency(&self) -> f64 {
        self.offensive_efficiency
    }

    pub fn defensive_efficiency(&self) -> f64 {
        self.defensive_efficiency
    }

    /// Offensive efficiency divided by defensive efficiency.
    pub fn total_efficiency(&self) -> f64 {
        self.total_efficiency
    }

    pub fn games_won(&self) -> GamesWon {
        self.games_won
    }
}

/// A table row after field extraction, before the completeness filter.
///
/// Every field is `None` when its extraction or numeric coercion failed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidateRow {
    pub team: Option<String>,
    pub seed: Option<u8>,
    pub final_round: Option<String>,
    pub conference: Option<String>,
    pub offensive_efficiency: Option<f64>,
    pub defensive_efficiency: Option<f64>,
}

/// A candidate row with every field present. The final round is still raw
/// text; mapping it can fail.
#[derive(Debug, Clone, PartialEq)]
pub struct CompleteRow {
    pub team: String,
    pub seed: u8,
    pub final_round: String,
    pub conference: String,
    pub offensive_efficiency: f64,
    pub defensive_efficiency: f64,
}

impl CandidateRow {
    /// Total efficiency, absent when either input is absent or the ratio is NaN.
    pub fn total_efficiency(&self) -> Option<f64> {
        let total = self.offensive_efficiency? / self.defensive_efficiency?;
        (!total.is_nan()).then_some(total)
    }

    /// Returns the row only if no field is absent.
    pub fn complete(self) -> Option<CompleteRow> {
        self.total_efficiency()?;
        Some(CompleteRow {
            team: self.team?,
            seed: self.seed?,
            final_round: self.final_round?,
            conference: self.conference?,
            offensive_efficiency: self.offensive_efficiency?,
            defensive_efficiency: self.defensive_efficiency?,
        })
    }
}

impl CompleteRow {
    pub fn into_record(self, year: i32) -> Result<TournamentRecord, UnknownRoundCode> {
        let final_round = FinalRound::from_code(&self.final_round)?;
        Ok(TournamentRecord::new(
            year,
            self.team,
            self.seed,
            final_round,
            self.conference,
            self.offensive_efficiency,
            self.defensive_efficiency,
        ))
    }
}

/// Ordered collection of tournament records across seasons.
///
/// Each (Year, Team) pair appears at most once; the loader and the cache
/// reject tables that break this with [`TournamentTable::first_duplicate`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TournamentTable {
    records: Vec<TournamentRecord>,
}

impl TournamentTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<TournamentRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[TournamentRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TournamentRecord> {
        self.records.iter()
    }

    pub fn into_records(self) -> Vec<TournamentRecord> {
        self.records
    }

    /// Distinct seasons in the order they first appear.
    pub fn years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = Vec::new();
        for record in &self.records {
            if !years.contains(&record.year) {
                years.push(record.year);
            }
        }
        years
    }

    pub fn for_year(&self, year: i32) -> impl Iterator<Item = &TournamentRecord> {
        self.records.iter().filter(move |r| r.year == year)
    }

    /// The champion of a season, if that season's results are final.
    pub fn champion(&self, year: i32) -> Option<&TournamentRecord> {
        self.for_year(year)
            .find(|r| r.final_round == FinalRound::Champions)
    }

    pub fn extend(&mut self, records: impl IntoIterator<Item = TournamentRecord>) {
        self.records.extend(records);
    }

    /// First (Year, Team) pair that occurs more than once.
    pub fn first_duplicate(&self) -> Option<(i32, &str)> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .map(|r| (r.year, r.team.as_str()))
            .find(|key| !seen.insert(*key))
    }

    /// Stable sort by season; row order within a season is preserved.
    pub fn sort_by_year(&mut self) {
        self.records.sort_by_key(|r| r.year);
    }
}

impl<'a> IntoIterator for &'a TournamentTable {
    type Item = &'a TournamentRecord;
    type IntoIter = std::slice::Iter<'a, TournamentRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
