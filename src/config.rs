//! Runtime configuration: season, timezone, HTTP limits, file locations and
//! the fantasy scoring weight tables.
//!
//! Everything is read from the process environment (after loading an optional
//! `.env` file). [`Config::from_lookup`] takes the lookup as a function so the
//! parsing can be exercised without touching global state.

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::cli::types::SeasonId;
use crate::error::{NhlError, Result};

pub const SEASON_ENV_VAR: &str = "NHL_SEASON_ID";
pub const TIMEZONE_ENV_VAR: &str = "NHL_FANTASY_TIMEZONE";
pub const CONCURRENCY_ENV_VAR: &str = "NHL_CONCURRENCY_LIMIT";
pub const TIMEOUT_ENV_VAR: &str = "NHL_API_TIMEOUT_SECS";
pub const BASE_URL_ENV_VAR: &str = "NHL_API_BASE_URL";
pub const DATA_DIR_ENV_VAR: &str = "NHL_DATA_DIR";
pub const DATABASE_ENV_VAR: &str = "NHL_DATABASE_FILE";
pub const SCORING_ENV_VAR: &str = "NHL_SCORING_FILE";
pub const SCHEDULE_MAX_AGE_ENV_VAR: &str = "NHL_SCHEDULE_MAX_AGE_HOURS";

pub const DEFAULT_BASE_URL: &str = "https://api-web.nhle.com/v1";
pub const DEFAULT_TIMEZONE: &str = "US/Eastern";
pub const DEFAULT_CONCURRENCY: usize = 50;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_SCHEDULE_MAX_AGE_HOURS: i64 = 24;

/// Per-stat weights for skaters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkaterWeights {
    pub goals: f64,
    pub assists: f64,
    #[serde(rename = "ppPoints")]
    pub pp_points: f64,
    #[serde(rename = "shPoints")]
    pub sh_points: f64,
    pub shots: f64,
    #[serde(rename = "blockedShots")]
    pub blocked_shots: f64,
    pub hits: f64,
}

impl Default for SkaterWeights {
    fn default() -> Self {
        Self {
            goals: 2.0,
            assists: 1.0,
            pp_points: 0.5,
            sh_points: 0.5,
            shots: 0.1,
            blocked_shots: 0.5,
            hits: 0.1,
        }
    }
}

/// Per-stat weights for goalies. `goals_against` is normally negative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoalieWeights {
    pub wins: f64,
    #[serde(rename = "goalsAgainst")]
    pub goals_against: f64,
    pub saves: f64,
    pub shutouts: f64,
    #[serde(rename = "otLosses")]
    pub ot_losses: f64,
}

impl Default for GoalieWeights {
    fn default() -> Self {
        Self {
            wins: 4.0,
            goals_against: -2.0,
            saves: 0.2,
            shutouts: 3.0,
            ot_losses: 1.0,
        }
    }
}

/// Both weight tables, as loaded from `NHL_SCORING_FILE`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringRules {
    pub skater: SkaterWeights,
    pub goalie: GoalieWeights,
}

impl ScoringRules {
    pub fn from_json(raw: &str) -> Result<Self> {
        let rules: ScoringRules = serde_json::from_str(raw)?;
        rules.validate()?;
        Ok(rules)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| NhlError::Config {
            message: format!("cannot read scoring file {}: {e}", path.display()),
        })?;
        Self::from_json(&raw)
    }

    fn validate(&self) -> Result<()> {
        let s = &self.skater;
        let g = &self.goalie;
        let weights = [
            ("skater.goals", s.goals),
            ("skater.assists", s.assists),
            ("skater.ppPoints", s.pp_points),
            ("skater.shPoints", s.sh_points),
            ("skater.shots", s.shots),
            ("skater.blockedShots", s.blocked_shots),
            ("skater.hits", s.hits),
            ("goalie.wins", g.wins),
            ("goalie.goalsAgainst", g.goals_against),
            ("goalie.saves", g.saves),
            ("goalie.shutouts", g.shutouts),
            ("goalie.otLosses", g.ot_losses),
        ];
        match weights.iter().find(|(_, w)| !w.is_finite()) {
            Some((name, w)) => Err(NhlError::Config {
                message: format!("scoring weight {name} must be finite, got {w}"),
            }),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub season: SeasonId,
    pub timezone: Tz,
    pub concurrency_limit: usize,
    pub api_timeout: Duration,
    pub api_base_url: String,
    pub data_dir: PathBuf,
    pub database_file: PathBuf,
    pub scoring: ScoringRules,
    pub schedule_max_age: chrono::Duration,
}

impl Config {
    /// Load `.env` (if present) and read the process environment.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let season = match get(SEASON_ENV_VAR) {
            Some(raw) => raw.parse::<SeasonId>()?,
            None => SeasonId::default(),
        };

        let tz_name = get(TIMEZONE_ENV_VAR).unwrap_or_else(|| DEFAULT_TIMEZONE.to_string());
        let timezone = Tz::from_str(&tz_name).map_err(|_| NhlError::Config {
            message: format!(
                "Invalid {TIMEZONE_ENV_VAR}: {tz_name} (expected IANA tz like America/New_York)"
            ),
        })?;

        let concurrency_limit = parse_number(&get, CONCURRENCY_ENV_VAR, DEFAULT_CONCURRENCY)?;
        if concurrency_limit == 0 {
            return Err(NhlError::Config {
                message: format!("{CONCURRENCY_ENV_VAR} must be at least 1"),
            });
        }

        let timeout_secs = parse_number(&get, TIMEOUT_ENV_VAR, DEFAULT_TIMEOUT_SECS)?;
        let max_age_hours =
            parse_number(&get, SCHEDULE_MAX_AGE_ENV_VAR, DEFAULT_SCHEDULE_MAX_AGE_HOURS)?;
        let schedule_max_age = chrono::Duration::try_hours(max_age_hours)
            .filter(|age| *age >= chrono::Duration::zero())
            .ok_or_else(|| NhlError::Config {
                message: format!(
                    "{SCHEDULE_MAX_AGE_ENV_VAR} out of range: {max_age_hours} (expected hours >= 0)"
                ),
            })?;

        let api_base_url = get(BASE_URL_ENV_VAR)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let data_dir = get(DATA_DIR_ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);
        let database_file = get(DATABASE_ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("nhl_stats.db"));

        let scoring = match get(SCORING_ENV_VAR) {
            Some(path) => ScoringRules::load(Path::new(&path))?,
            None => ScoringRules::default(),
        };

        Ok(Self {
            season,
            timezone,
            concurrency_limit,
            api_timeout: Duration::from_secs(timeout_secs),
            api_base_url,
            data_dir,
            database_file,
            scoring,
            schedule_max_age,
        })
    }

    /// Same configuration pointed at another season.
    pub fn with_season(mut self, season: SeasonId) -> Self {
        self.season = season;
        self
    }

    /// `<data_dir>/schedule_<season>.json`
    pub fn schedule_cache_path(&self) -> PathBuf {
        self.data_dir.join(format!("schedule_{}.json", self.season))
    }

    /// `<data_dir>/game_stats_<season>.json`
    pub fn game_cache_path(&self) -> PathBuf {
        self.data_dir.join(format!("game_stats_{}.json", self.season))
    }
}

fn default_data_dir() -> PathBuf {
    let base = dirs::cache_dir().unwrap_or_else(|| {
        let mut home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.push(".cache");
        home
    });
    base.join("nhl-fpts")
}

fn parse_number<T, G>(get: &G, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw.parse::<T>().map_err(|_| NhlError::Config {
            message: format!("Invalid {key}: {raw} (expected a number)"),
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_environment_empty() {
        let config = Config::from_lookup(|_| None).unwrap();

        assert_eq!(config.season, SeasonId::default());
        assert_eq!(config.timezone, chrono_tz::US::Eastern);
        assert_eq!(config.concurrency_limit, 50);
        assert_eq!(config.api_timeout, Duration::from_secs(10));
        assert_eq!(config.api_base_url, DEFAULT_BASE_URL);
        assert_eq!(config.scoring, ScoringRules::default());
        assert_eq!(config.schedule_max_age, chrono::Duration::hours(24));
        assert!(config.database_file.ends_with("nhl_stats.db"));
    }

    #[test]
    fn test_overrides_are_applied() {
        let config = Config::from_lookup(lookup_from(&[
            (SEASON_ENV_VAR, "20242025"),
            (TIMEZONE_ENV_VAR, "America/Vancouver"),
            (CONCURRENCY_ENV_VAR, "8"),
            (TIMEOUT_ENV_VAR, "3"),
            (BASE_URL_ENV_VAR, "http://localhost:9999/"),
            (DATA_DIR_ENV_VAR, "/tmp/nhl"),
        ]))
        .unwrap();

        assert_eq!(config.season.as_u32(), 20242025);
        assert_eq!(config.timezone, chrono_tz::America::Vancouver);
        assert_eq!(config.concurrency_limit, 8);
        assert_eq!(config.api_timeout, Duration::from_secs(3));
        assert_eq!(config.api_base_url, "http://localhost:9999");
        assert_eq!(config.database_file, PathBuf::from("/tmp/nhl/nhl_stats.db"));
        assert_eq!(
            config.game_cache_path(),
            PathBuf::from("/tmp/nhl/game_stats_20242025.json")
        );
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(Config::from_lookup(lookup_from(&[(TIMEZONE_ENV_VAR, "Mars/Olympus")])).is_err());
        assert!(Config::from_lookup(lookup_from(&[(CONCURRENCY_ENV_VAR, "0")])).is_err());
        assert!(Config::from_lookup(lookup_from(&[(TIMEOUT_ENV_VAR, "soon")])).is_err());
        assert!(Config::from_lookup(lookup_from(&[(SEASON_ENV_VAR, "2025")])).is_err());
    }

    #[test]
    fn test_schedule_max_age_out_of_range_is_config_error() {
        for raw in ["9223372036854775807", "-1"] {
            match Config::from_lookup(lookup_from(&[(SCHEDULE_MAX_AGE_ENV_VAR, raw)])) {
                Err(NhlError::Config { message }) => {
                    assert!(message.contains(SCHEDULE_MAX_AGE_ENV_VAR))
                }
                other => panic!("expected config error for {raw}, got {other:?}"),
            }
        }

        let config =
            Config::from_lookup(lookup_from(&[(SCHEDULE_MAX_AGE_ENV_VAR, "6")])).unwrap();
        assert_eq!(config.schedule_max_age, chrono::Duration::hours(6));
    }

    #[test]
    fn test_scoring_file_partial_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scoring.json");
        std::fs::write(
            &path,
            r#"{ "skater": { "goals": 3.0 }, "goalie": { "goalsAgainst": -1.5 } }"#,
        )
        .unwrap();

        let config = Config::from_lookup(lookup_from(&[(
            SCORING_ENV_VAR,
            path.to_str().unwrap(),
        )]))
        .unwrap();

        assert_eq!(config.scoring.skater.goals, 3.0);
        assert_eq!(config.scoring.skater.assists, 1.0);
        assert_eq!(config.scoring.goalie.goals_against, -1.5);
        assert_eq!(config.scoring.goalie.wins, 4.0);
    }

    #[test]
    fn test_missing_scoring_file_is_config_error() {
        let result = Config::from_lookup(lookup_from(&[(SCORING_ENV_VAR, "/no/such/file.json")]));
        match result {
            Err(NhlError::Config { message }) => assert!(message.contains("/no/such/file.json")),
            other => panic!("Expected Config error, got {:?}", other.map(|_| ())),
        }
    }
}
