//! Season identifiers.

use crate::error::{NhlError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// NHL season id, e.g. `20252026`.
///
/// The id spans two calendar years; the second year must follow the first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct SeasonId(u32);

impl SeasonId {
    pub fn new(id: u32) -> Result<Self> {
        let start = id / 10_000;
        let end = id % 10_000;
        if !(1917..=9998).contains(&start) || end != start + 1 {
            return Err(NhlError::InvalidSeason {
                value: id.to_string(),
            });
        }
        Ok(Self(id))
    }

    /// Season beginning in `year`, e.g. `2025` -> `20252026`.
    pub fn starting_in(year: u16) -> Result<Self> {
        let year = u32::from(year);
        Self::new(year * 10_000 + year + 1)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }

    pub fn start_year(&self) -> u16 {
        (self.0 / 10_000) as u16
    }

    /// The season before this one.
    pub fn previous(&self) -> Result<Self> {
        Self::starting_in(self.start_year().saturating_sub(1))
    }
}

impl Default for SeasonId {
    fn default() -> Self {
        Self(20252026)
    }
}

impl fmt::Display for SeasonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SeasonId {
    type Err = NhlError;

    fn from_str(s: &str) -> Result<Self> {
        let raw: u32 = s.trim().parse().map_err(|_| NhlError::InvalidSeason {
            value: s.to_string(),
        })?;
        Self::new(raw)
    }
}

impl TryFrom<u32> for SeasonId {
    type Error = NhlError;

    fn try_from(value: u32) -> Result<Self> {
        Self::new(value)
    }
}

impl From<SeasonId> for u32 {
    fn from(season: SeasonId) -> Self {
        season.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_season_parse_valid() {
        let season: SeasonId = "20242025".parse().unwrap();
        assert_eq!(season.as_u32(), 20242025);
        assert_eq!(season.start_year(), 2024);
        assert_eq!(season.to_string(), "20242025");
    }

    #[test]
    fn test_season_rejects_non_consecutive_years() {
        assert!("20252027".parse::<SeasonId>().is_err());
        assert!("2025".parse::<SeasonId>().is_err());
        assert!("abcd".parse::<SeasonId>().is_err());
    }

    #[test]
    fn test_season_previous_and_default() {
        let season = SeasonId::default();
        assert_eq!(season.as_u32(), 20252026);
        assert_eq!(season.previous().unwrap().as_u32(), 20242025);
        assert_eq!(SeasonId::starting_in(2023).unwrap().as_u32(), 20232024);
    }

    #[test]
    fn test_season_serde_validates() {
        let season: SeasonId = serde_json::from_str("20252026").unwrap();
        assert_eq!(season, SeasonId::default());
        assert!(serde_json::from_str::<SeasonId>("20252030").is_err());
    }
}
