//! Serde models for the NHL web API payloads we consume: club schedules,
//! game boxscores and player game logs.
//!
//! Only the fields the pipeline uses are modelled; everything else in the
//! upstream JSON is ignored. Numeric stats default to zero when absent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cli::types::{GameId, PlayerId};


/// Regular-season `gameType` in schedule payloads.
pub const REGULAR_SEASON_GAME_TYPE: u8 = 2;

pub const UNKNOWN_NAME: &str = "N/A";
pub const DEFAULT_TOI: &str = "00:00";

fn default_name() -> String {
    UNKNOWN_NAME.to_string()
}

fn default_toi() -> String {
    DEFAULT_TOI.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LocalizedName {
    #[serde(default = "default_name")]
    pub default: String,
}

impl Default for LocalizedName {
    fn default() -> Self {
        Self {
            default: default_name(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TeamRef {
    pub abbrev: String,
}

/// Completion state of a game, from the upstream `gameState` code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Scheduled,
    Live,
    Final,
}

impl GameStatus {
    /// `FUT`/`PRE` are scheduled, `LIVE`/`CRIT` in progress, and
    /// `OFF`/`FINAL` (or no state at all) finished.
    pub fn from_game_state(state: Option<&str>) -> Self {
        match state.map(|s| s.trim().to_uppercase()).as_deref() {
            Some("FUT") | Some("PRE") => GameStatus::Scheduled,
            Some("LIVE") | Some("CRIT") => GameStatus::Live,
            _ => GameStatus::Final,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GameStatus::Scheduled => "scheduled",
            GameStatus::Live => "live",
            GameStatus::Final => "final",
        }
    }

    /// Inverse of [`GameStatus::as_str`].
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "scheduled" => Some(GameStatus::Scheduled),
            "live" => Some(GameStatus::Live),
            "final" => Some(GameStatus::Final),
            _ => None,
        }
    }

    pub fn is_final(&self) -> bool {
        matches!(self, GameStatus::Final)
    }
}

// --- Club schedule -------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleGame {
    pub id: GameId,
    #[serde(rename = "gameType")]
    pub game_type: u8,
    #[serde(rename = "startTimeUTC")]
    pub start_time_utc: DateTime<Utc>,
    #[serde(rename = "gameState", default)]
    pub game_state: Option<String>,
    #[serde(rename = "homeTeam")]
    pub home_team: TeamRef,
    #[serde(rename = "awayTeam")]
    pub away_team: TeamRef,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClubScheduleResponse {
    #[serde(default)]
    pub games: Vec<ScheduleGame>,
}

// --- Boxscore ------------------------------------------------------------

/// Skater (forward or defense) line from a boxscore.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SkaterBoxscore {
    #[serde(rename = "playerId")]
    pub player_id: PlayerId,
    #[serde(default)]
    pub name: LocalizedName,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub goals: u32,
    #[serde(default)]
    pub assists: u32,
    #[serde(default)]
    pub sog: u32,
    #[serde(rename = "blockedShots", default)]
    pub blocked_shots: u32,
    #[serde(default)]
    pub hits: u32,
    #[serde(rename = "sweaterNumber", default)]
    pub sweater_number: Option<u32>,
}

/// Goalie line from a boxscore.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GoalieBoxscore {
    #[serde(rename = "playerId")]
    pub player_id: PlayerId,
    #[serde(default)]
    pub name: LocalizedName,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub saves: u32,
    #[serde(rename = "savePctg", default)]
    pub save_pctg: Option<f64>,
    #[serde(rename = "goalsAgainst", default)]
    pub goals_against: u32,
    #[serde(default)]
    pub decision: Option<String>,
    #[serde(rename = "sweaterNumber", default)]
    pub sweater_number: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct TeamPlayerStats {
    #[serde(default)]
    pub forwards: Vec<SkaterBoxscore>,
    #[serde(default)]
    pub defense: Vec<SkaterBoxscore>,
    #[serde(default)]
    pub goalies: Vec<GoalieBoxscore>,
}

impl TeamPlayerStats {
    pub fn skaters(&self) -> impl Iterator<Item = &SkaterBoxscore> {
        self.forwards.iter().chain(self.defense.iter())
    }

    pub fn player_ids(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.skaters()
            .map(|s| s.player_id)
            .chain(self.goalies.iter().map(|g| g.player_id))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct PlayerByGameStats {
    #[serde(rename = "awayTeam", default)]
    pub away_team: TeamPlayerStats,
    #[serde(rename = "homeTeam", default)]
    pub home_team: TeamPlayerStats,
}

/// One game's boxscore: both sides' abbreviations and per-player lines.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Boxscore {
    pub id: GameId,
    #[serde(rename = "gameDate", default)]
    pub game_date: Option<String>,
    #[serde(rename = "gameState", default)]
    pub game_state: Option<String>,
    #[serde(rename = "awayTeam")]
    pub away_team: TeamRef,
    #[serde(rename = "homeTeam")]
    pub home_team: TeamRef,
    #[serde(rename = "playerByGameStats", default)]
    pub player_by_game_stats: PlayerByGameStats,
}

impl Boxscore {
    pub fn status(&self) -> GameStatus {
        GameStatus::from_game_state(self.game_state.as_deref())
    }

    pub fn home_abbrev(&self) -> &str {
        &self.home_team.abbrev
    }

    pub fn away_abbrev(&self) -> &str {
        &self.away_team.abbrev
    }

    /// Every player listed on either side, skaters first.
    pub fn player_ids(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.player_by_game_stats
            .away_team
            .player_ids()
            .chain(self.player_by_game_stats.home_team.player_ids())
    }

    pub fn sides(&self) -> [&TeamPlayerStats; 2] {
        [
            &self.player_by_game_stats.away_team,
            &self.player_by_game_stats.home_team,
        ]
    }
}

// --- Player game log ------------------------------------------------------

/// One game from a player's season log.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GameLogEntry {
    #[serde(rename = "gameId")]
    pub game_id: GameId,
    #[serde(rename = "teamAbbrev")]
    pub team_abbrev: String,
    #[serde(rename = "gameDate")]
    pub game_date: String,
    #[serde(rename = "powerPlayPoints", default)]
    pub power_play_points: u32,
    #[serde(rename = "shorthandedPoints", default)]
    pub shorthanded_points: u32,
    #[serde(default = "default_toi")]
    pub toi: String,
    #[serde(default)]
    pub shifts: u32,
    #[serde(default)]
    pub pim: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlayerGameLogResponse {
    #[serde(rename = "gameLog", default)]
    pub game_log: Vec<GameLogEntry>,
}
