//! Domain types for tournament data

pub mod record;
pub mod round;

pub use record::{CandidateRow, CompleteRow, TournamentRecord, TournamentTable};
pub use round::{FinalRound, GamesWon, InvalidGamesWon, UnknownRoundCode};
