//! BracketLab Core: NCAA tournament team data.
//!
//! This crate fetches per-season T-Rank standings, keeps the teams that
//! played in the tournament, and caches the combined table as CSV:
//! - Domain types (final rounds, games won, tournament records)
//! - First-table HTML extraction with two-level headers
//! - Row normalization (composite team cell, efficiency coercion)
//! - Flat-file cache with schema checks on load
//! - The loader entry point, [`load_tournament_data`]

pub mod config;
pub mod data;
pub mod domain;

pub use config::{ConfigError, LoaderConfig};
pub use data::{load_tournament_data, DataError, TournamentLoader};
pub use domain::{FinalRound, GamesWon, TournamentRecord, TournamentTable};
