//! The per-(game, player) reconciliation unit.
//!
//! A record is seeded from the player's season log (power-play points, time
//! on ice, shifts, penalty minutes) and completed with the boxscore line for
//! the same game. Until both halves are present the record is incomplete and
//! never reaches the database.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::cli::types::{Decision, GameId, PlayerId, PlayerKind, Position};
use crate::error::Result;
use crate::nhl::types::{Boxscore, GameLogEntry, GoalieBoxscore, SkaterBoxscore, UNKNOWN_NAME};

/// Boxscore half of a record, already routed by player kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BoxscoreLine {
    Skater {
        position: Position,
        goals: u32,
        assists: u32,
        shots: u32,
        blocked_shots: u32,
        hits: u32,
    },
    Goalie {
        saves: u32,
        save_pct: Option<f64>,
        goals_against: u32,
        decision: Option<Decision>,
    },
}

impl BoxscoreLine {
    pub fn from_skater(line: &SkaterBoxscore) -> Result<Self> {
        Ok(BoxscoreLine::Skater {
            position: line.position.parse()?,
            goals: line.goals,
            assists: line.assists,
            shots: line.sog,
            blocked_shots: line.blocked_shots,
            hits: line.hits,
        })
    }

    pub fn from_goalie(line: &GoalieBoxscore) -> Self {
        BoxscoreLine::Goalie {
            saves: line.saves,
            save_pct: line.save_pctg,
            goals_against: line.goals_against,
            decision: line.decision.as_deref().map(Decision::from_code),
        }
    }

    pub fn kind(&self) -> PlayerKind {
        match self {
            BoxscoreLine::Skater { .. } => PlayerKind::Skater,
            BoxscoreLine::Goalie { .. } => PlayerKind::Goalie,
        }
    }
}

/// One player's stats for one game, merged from both feeds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerGameRecord {
    pub game_id: GameId,
    pub player_id: PlayerId,
    pub team_abbrev: String,
    pub game_date: String,
    pub power_play_points: u32,
    pub shorthanded_points: u32,
    pub toi: String,
    pub shifts: u32,
    pub pim: u32,
    pub player_name: String,
    pub sweater_number: Option<u32>,
    pub line: Option<BoxscoreLine>,
}

impl PlayerGameRecord {
    pub fn from_log(player_id: PlayerId, entry: &GameLogEntry) -> Self {
        Self {
            game_id: entry.game_id,
            player_id,
            team_abbrev: entry.team_abbrev.clone(),
            game_date: entry.game_date.clone(),
            power_play_points: entry.power_play_points,
            shorthanded_points: entry.shorthanded_points,
            toi: entry.toi.clone(),
            shifts: entry.shifts,
            pim: entry.pim,
            player_name: UNKNOWN_NAME.to_string(),
            sweater_number: None,
            line: None,
        }
    }

    pub fn merge_skater(&mut self, line: &SkaterBoxscore) -> Result<()> {
        self.line = Some(BoxscoreLine::from_skater(line)?);
        self.player_name = line.name.default.clone();
        self.sweater_number = line.sweater_number;
        Ok(())
    }

    pub fn merge_goalie(&mut self, line: &GoalieBoxscore) {
        self.line = Some(BoxscoreLine::from_goalie(line));
        self.player_name = line.name.default.clone();
        self.sweater_number = line.sweater_number;
    }

    pub fn is_complete(&self) -> bool {
        self.line.is_some()
    }

    pub fn kind(&self) -> Option<PlayerKind> {
        self.line.as_ref().map(BoxscoreLine::kind)
    }
}

/// A game's boxscore plus its complete player records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub boxscore: Boxscore,
    pub players: BTreeMap<PlayerId, PlayerGameRecord>,
}

impl GameSnapshot {
    pub fn new(boxscore: Boxscore) -> Self {
        Self {
            boxscore,
            players: BTreeMap::new(),
        }
    }

    pub fn game_id(&self) -> GameId {
        self.boxscore.id
    }
}
