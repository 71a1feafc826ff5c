//! Final round codes and the round-to-wins mapping.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A final-round value with no entry in the round-to-wins mapping.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown round code: {0:?}")]
pub struct UnknownRoundCode(pub String);

/// The last round a team reached in a tournament.
///
/// The set is closed: the source publishes these eight codes for finished
/// tournaments, and two check/cross markers while a tournament is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FinalRound {
    /// Lost in the First Four.
    R68,
    R64,
    R32,
    SweetSixteen,
    EliteEight,
    FinalFour,
    /// Lost the championship game.
    Finals,
    Champions,
    /// Tournament in progress, team still alive (`✅`).
    InProgressAlive,
    /// Tournament in progress, team out but round not posted yet (`❌`).
    InProgressEliminated,
}

/// Games won in the tournament, or `Unknown` while it is still running.
///
/// Serialized as a number, or as the string `"TBD"` when unknown. Both a
/// number and its string form are accepted when reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GamesWon {
    Known(u8),
    Unknown,
}

impl FinalRound {
    pub const ALL: [FinalRound; 10] = [
        FinalRound::R68,
        FinalRound::R64,
        FinalRound::R32,
        FinalRound::SweetSixteen,
        FinalRound::EliteEight,
        FinalRound::FinalFour,
        FinalRound::Finals,
        FinalRound::Champions,
        FinalRound::InProgressAlive,
        FinalRound::InProgressEliminated,
    ];

    /// Parse a round code exactly as the source prints it.
    pub fn from_code(code: &str) -> Result<Self, UnknownRoundCode> {
        Self::ALL
            .into_iter()
            .find(|round| round.code() == code)
            .ok_or_else(|| UnknownRoundCode(code.to_string()))
    }

    pub fn code(&self) -> &'static str {
        match self {
            FinalRound::R68 => "R68",
            FinalRound::R64 => "R64",
            FinalRound::R32 => "R32",
            FinalRound::SweetSixteen => "Sweet Sixteen",
            FinalRound::EliteEight => "Elite Eight",
            FinalRound::FinalFour => "Final Four",
            FinalRound::Finals => "Finals",
            FinalRound::Champions => "CHAMPS",
            FinalRound::InProgressAlive => "\u{2705}",
            FinalRound::InProgressEliminated => "\u{274C}",
        }
    }

    /// The round-to-wins mapping.
    pub fn games_won(&self) -> GamesWon {
        match self {
            FinalRound::R68 | FinalRound::R64 => GamesWon::Known(0),
            FinalRound::R32 => GamesWon::Known(1),
            FinalRound::SweetSixteen => GamesWon::Known(2),
            FinalRound::EliteEight => GamesWon::Known(3),
            FinalRound::FinalFour => GamesWon::Known(4),
            FinalRound::Finals => GamesWon::Known(5),
            FinalRound::Champions => GamesWon::Known(6),
            FinalRound::InProgressAlive | FinalRound::InProgressEliminated => GamesWon::Unknown,
        }
    }

    pub fn is_in_progress(&self) -> bool {
        matches!(
            self,
            FinalRound::InProgressAlive | FinalRound::InProgressEliminated
        )
    }
}

impl fmt::Display for FinalRound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for FinalRound {
    type Err = UnknownRoundCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s)
    }
}

impl TryFrom<String> for FinalRound {
    type Error = UnknownRoundCode;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_code(&value)
    }
}

impl From<FinalRound> for String {
    fn from(round: FinalRound) -> Self {
        round.code().to_string()
    }
}

impl GamesWon {
    /// Cache marker for an undetermined result.
    pub const UNKNOWN_MARKER: &'static str = "TBD";

    pub fn known(&self) -> Option<u8> {
        match self {
            GamesWon::Known(n) => Some(*n),
            GamesWon::Unknown => None,
        }
    }
}

impl fmt::Display for GamesWon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GamesWon::Known(n) => write!(f, "{n}"),
            GamesWon::Unknown => f.write_str(Self::UNKNOWN_MARKER),
        }
    }
}

/// A games-won cell that is neither 0..=6 nor the unknown marker.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid games won value: {0:?}")]
pub struct InvalidGamesWon(pub String);

impl FromStr for GamesWon {
    type Err = InvalidGamesWon;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == Self::UNKNOWN_MARKER {
            return Ok(GamesWon::Unknown);
        }
        match s.parse::<u8>() {
            Ok(n) if n <= 6 => Ok(GamesWon::Known(n)),
            _ => Err(InvalidGamesWon(s.to_string())),
        }
    }
}

impl Serialize for GamesWon {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            GamesWon::Known(n) => serializer.serialize_u8(*n),
            GamesWon::Unknown => serializer.serialize_str(Self::UNKNOWN_MARKER),
        }
    }
}

struct GamesWonVisitor;

impl<'de> Visitor<'de> for GamesWonVisitor {
    type Value = GamesWon;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a number of games won (0-6) or \"{}\"", GamesWon::UNKNOWN_MARKER)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<GamesWon, E> {
        match u8::try_from(v) {
            Ok(n) if n <= 6 => Ok(GamesWon::Known(n)),
            _ => Err(E::custom(InvalidGamesWon(v.to_string()))),
        }
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<GamesWon, E> {
        match u64::try_from(v) {
            Ok(n) => self.visit_u64(n),
            Err(_) => Err(E::custom(InvalidGamesWon(v.to_string()))),
        }
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<GamesWon, E> {
        v.parse().map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for GamesWon {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(GamesWonVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finished_rounds_map_to_wins() {
        let expected = [
            ("R68", 0),
            ("R64", 0),
            ("R32", 1),
            ("Sweet Sixteen", 2),
            ("Elite Eight", 3),
            ("Final Four", 4),
            ("Finals", 5),
            ("CHAMPS", 6),
        ];
        for (code, wins) in expected {
            let round = FinalRound::from_code(code).unwrap();
            assert_eq!(round.games_won(), GamesWon::Known(wins), "{code}");
        }
    }

    #[test]
    fn in_progress_markers_are_unknown() {
        for code in ["\u{2705}", "\u{274C}"] {
            let round = FinalRound::from_code(code).unwrap();
            assert!(round.is_in_progress());
            assert_eq!(round.games_won(), GamesWon::Unknown);
        }
    }

    #[test]
    fn unknown_code_is_rejected() {
        let err = FinalRound::from_code("Round of 12").unwrap_err();
        assert_eq!(err, UnknownRoundCode("Round of 12".into()));
        // Codes are matched exactly.
        assert!(FinalRound::from_code("champs").is_err());
        assert!(FinalRound::from_code(" R64").is_err());
    }

    #[test]
    fn code_roundtrips_through_display() {
        for round in FinalRound::ALL {
            assert_eq!(round.to_string().parse::<FinalRound>().unwrap(), round);
        }
    }

    #[test]
    fn games_won_json_is_numeric() {
        assert_eq!(serde_json::to_string(&GamesWon::Known(6)).unwrap(), "6");
        assert_eq!(serde_json::to_string(&GamesWon::Unknown).unwrap(), "\"TBD\"");
        assert_eq!(serde_json::from_str::<GamesWon>("3").unwrap(), GamesWon::Known(3));
        assert_eq!(serde_json::from_str::<GamesWon>("\"TBD\"").unwrap(), GamesWon::Unknown);
        assert_eq!(serde_json::from_str::<GamesWon>("\"4\"").unwrap(), GamesWon::Known(4));
        assert!(serde_json::from_str::<GamesWon>("7").is_err());
        assert!(serde_json::from_str::<GamesWon>("-1").is_err());
    }

    #[test]
    fn games_won_cache_values() {
        assert_eq!("TBD".parse::<GamesWon>().unwrap(), GamesWon::Unknown);
        assert_eq!("6".parse::<GamesWon>().unwrap(), GamesWon::Known(6));
        assert!("7".parse::<GamesWon>().is_err());
        assert!("-1".parse::<GamesWon>().is_err());
        assert_eq!(GamesWon::Unknown.to_string(), "TBD");
        assert_eq!(GamesWon::Known(3).known(), Some(3));
    }
}
