//! Hockey position and goalie decision types.

use crate::error::NhlError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// NHL roster positions, as reported by the boxscore `position` code.
///
/// # Examples
///
/// ```rust
/// use nhl_fpts::{PlayerKind, Position};
///
/// let pos: Position = "L".parse().unwrap();
/// assert_eq!(pos, Position::LeftWing);
/// assert_eq!(pos.to_string(), "LW");
/// assert_eq!(pos.kind(), PlayerKind::Skater);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Position {
    Center,
    LeftWing,
    RightWing,
    Defense,
    Goalie,
}

impl Position {
    /// Single-letter code used by the NHL API.
    pub fn code(&self) -> &'static str {
        match self {
            Position::Center => "C",
            Position::LeftWing => "L",
            Position::RightWing => "R",
            Position::Defense => "D",
            Position::Goalie => "G",
        }
    }

    /// Fantasy-style label stored in per-game rows.
    pub fn display_name(&self) -> &'static str {
        match self {
            Position::Center => "C",
            Position::LeftWing => "LW",
            Position::RightWing => "RW",
            Position::Defense => "D",
            Position::Goalie => "G",
        }
    }

    pub fn kind(&self) -> PlayerKind {
        match self {
            Position::Goalie => PlayerKind::Goalie,
            _ => PlayerKind::Skater,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for Position {
    type Err = NhlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "C" => Ok(Position::Center),
            "L" | "LW" => Ok(Position::LeftWing),
            "R" | "RW" => Ok(Position::RightWing),
            "D" => Ok(Position::Defense),
            "G" => Ok(Position::Goalie),
            _ => Err(NhlError::InvalidPosition {
                position: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for Position {
    type Error = NhlError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Position> for String {
    fn from(position: Position) -> Self {
        position.code().to_string()
    }
}

/// Which scoring formula and output table a player routes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerKind {
    Skater,
    Goalie,
}

/// Goalie decision for a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Decision {
    Win,
    Loss,
    OvertimeLoss,
    /// Anything the API sends that we don't score.
    Other,
}

impl Decision {
    pub fn code(&self) -> &'static str {
        match self {
            Decision::Win => "W",
            Decision::Loss => "L",
            Decision::OvertimeLoss => "O",
            Decision::Other => "?",
        }
    }

    pub fn from_code(code: &str) -> Self {
        match code.trim().to_uppercase().as_str() {
            "W" => Decision::Win,
            "L" => Decision::Loss,
            "O" | "OT" | "OTL" => Decision::OvertimeLoss,
            _ => Decision::Other,
        }
    }
}

impl From<String> for Decision {
    fn from(value: String) -> Self {
        Decision::from_code(&value)
    }
}

impl From<Decision> for String {
    fn from(decision: Decision) -> Self {
        decision.code().to_string()
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
