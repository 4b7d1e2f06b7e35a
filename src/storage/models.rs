//! Data models for the storage layer

use serde::{Deserialize, Serialize};

use crate::cli::types::{GameId, PlayerId, SeasonId};
use crate::nhl::compute::{from_centipoints, to_centipoints};
use crate::nhl::types::GameStatus;

/// One skater's line for one game (`skater_game_stats`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkaterGameRow {
    pub game_id: GameId,
    pub player_id: PlayerId,
    pub season: SeasonId,
    pub game_date: String,
    pub game_status: GameStatus,
    pub team_abbrev: String,
    pub team_name: Option<String>,
    pub opponent_abbrev: String,
    pub opponent_name: Option<String>,
    pub player_name: String,
    pub jersey_number: Option<u32>,
    pub position: String,
    pub goals: u32,
    pub assists: u32,
    pub pp_points: u32,
    pub sh_points: u32,
    pub shots: u32,
    pub shooting_pct: Option<f64>,
    pub blocked_shots: u32,
    pub hits: u32,
    pub pim: u32,
    pub toi_seconds: u32,
    pub shifts: u32,
    pub total_fpts: f64,
}

/// One goalie's line for one game (`goalie_game_stats`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalieGameRow {
    pub game_id: GameId,
    pub player_id: PlayerId,
    pub season: SeasonId,
    pub game_date: String,
    pub game_status: GameStatus,
    pub team_abbrev: String,
    pub team_name: Option<String>,
    pub opponent_abbrev: String,
    pub opponent_name: Option<String>,
    pub player_name: String,
    pub jersey_number: Option<u32>,
    pub saves: u32,
    pub save_pct: Option<f64>,
    pub goals_against: u32,
    pub decision: Option<String>,
    pub wins: u32,
    pub shutouts: u32,
    pub ot_losses: u32,
    pub toi_seconds: u32,
    pub total_fpts: f64,
}

/// A per-game row routed to the skater or goalie table.
#[derive(Debug, Clone, PartialEq)]
pub enum GameRow {
    Skater(SkaterGameRow),
    Goalie(GoalieGameRow),
}

impl GameRow {
    pub fn game_id(&self) -> GameId {
        match self {
            GameRow::Skater(r) => r.game_id,
            GameRow::Goalie(r) => r.game_id,
        }
    }

    pub fn player_id(&self) -> PlayerId {
        match self {
            GameRow::Skater(r) => r.player_id,
            GameRow::Goalie(r) => r.player_id,
        }
    }

    pub fn season(&self) -> SeasonId {
        match self {
            GameRow::Skater(r) => r.season,
            GameRow::Goalie(r) => r.season,
        }
    }

    pub fn game_status(&self) -> GameStatus {
        match self {
            GameRow::Skater(r) => r.game_status,
            GameRow::Goalie(r) => r.game_status,
        }
    }

    pub fn total_fpts(&self) -> f64 {
        match self {
            GameRow::Skater(r) => r.total_fpts,
            GameRow::Goalie(r) => r.total_fpts,
        }
    }
}

/// Everything one `process_games` run writes, committed as one transaction.
#[derive(Debug, Clone, Default)]
pub struct IngestBatch {
    pub rows: Vec<GameRow>,
    /// Rows whose game is listed here are also added to season aggregates.
    pub aggregate_games: std::collections::BTreeSet<GameId>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteSummary {
    pub skater_rows: usize,
    pub goalie_rows: usize,
    pub aggregated_players: usize,
}

/// Running season totals for one player (`player_season_stats`).
///
/// Fantasy points are summed in hundredths so that the order in which games
/// are folded in never changes the result. Identity fields follow the
/// player's latest game by `(game_date, game_id)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSeasonRow {
    pub season: SeasonId,
    pub player_id: PlayerId,
    pub player_name: String,
    pub team_abbrev: String,
    pub position: String,
    pub jersey_number: Option<u32>,
    pub is_goalie: bool,
    pub last_game_date: String,
    pub last_game_id: GameId,
    pub games_played: u32,
    pub total_fpts_centi: i64,
    pub goals: u32,
    pub assists: u32,
    pub pp_points: u32,
    pub sh_points: u32,
    pub shots: u32,
    pub blocked_shots: u32,
    pub hits: u32,
    pub wins: u32,
    pub shutouts: u32,
    pub ot_losses: u32,
    pub saves: u32,
    pub goals_against: u32,
}

impl PlayerSeasonRow {
    pub fn total_fpts(&self) -> f64 {
        from_centipoints(self.total_fpts_centi)
    }

    pub fn avg_fpts(&self) -> f64 {
        if self.games_played == 0 {
            return 0.0;
        }
        self.total_fpts_centi as f64 / 100.0 / f64::from(self.games_played)
    }

    /// A single game's contribution.
    pub fn from_game(row: &GameRow) -> Self {
        match row {
            GameRow::Skater(r) => Self {
                season: r.season,
                player_id: r.player_id,
                player_name: r.player_name.clone(),
                team_abbrev: r.team_abbrev.clone(),
                position: r.position.clone(),
                jersey_number: r.jersey_number,
                is_goalie: false,
                last_game_date: r.game_date.clone(),
                last_game_id: r.game_id,
                games_played: 1,
                total_fpts_centi: to_centipoints(r.total_fpts),
                goals: r.goals,
                assists: r.assists,
                pp_points: r.pp_points,
                sh_points: r.sh_points,
                shots: r.shots,
                blocked_shots: r.blocked_shots,
                hits: r.hits,
                wins: 0,
                shutouts: 0,
                ot_losses: 0,
                saves: 0,
                goals_against: 0,
            },
            GameRow::Goalie(r) => Self {
                season: r.season,
                player_id: r.player_id,
                player_name: r.player_name.clone(),
                team_abbrev: r.team_abbrev.clone(),
                position: "G".to_string(),
                jersey_number: r.jersey_number,
                is_goalie: true,
                last_game_date: r.game_date.clone(),
                last_game_id: r.game_id,
                games_played: 1,
                total_fpts_centi: to_centipoints(r.total_fpts),
                goals: 0,
                assists: 0,
                pp_points: 0,
                sh_points: 0,
                shots: 0,
                blocked_shots: 0,
                hits: 0,
                wins: r.wins,
                shutouts: r.shutouts,
                ot_losses: r.ot_losses,
                saves: r.saves,
                goals_against: r.goals_against,
            },
        }
    }

    fn recency(&self) -> (&str, GameId) {
        (self.last_game_date.as_str(), self.last_game_id)
    }

    /// Combine two partial totals for the same player. Commutative and
    /// associative, so any fold order yields the same row.
    pub fn merge(mut self, other: Self) -> Self {
        if other.recency() > self.recency() {
            self.player_name = other.player_name;
            self.team_abbrev = other.team_abbrev;
            self.position = other.position;
            self.jersey_number = other.jersey_number;
            self.is_goalie = other.is_goalie;
            self.last_game_date = other.last_game_date;
            self.last_game_id = other.last_game_id;
        }
        self.games_played += other.games_played;
        self.total_fpts_centi += other.total_fpts_centi;
        self.goals += other.goals;
        self.assists += other.assists;
        self.pp_points += other.pp_points;
        self.sh_points += other.sh_points;
        self.shots += other.shots;
        self.blocked_shots += other.blocked_shots;
        self.hits += other.hits;
        self.wins += other.wins;
        self.shutouts += other.shutouts;
        self.ot_losses += other.ot_losses;
        self.saves += other.saves;
        self.goals_against += other.goals_against;
        self
    }

    pub fn absorb(self, row: &GameRow) -> Self {
        self.merge(Self::from_game(row))
    }
}
