//! Database schema and connection management

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;

/// SQLite store for per-game rows, season aggregates and team schedules
pub struct StatsDatabase {
    pub(crate) conn: Connection,
}

impl StatsDatabase {
    /// Open (or create) the database file and ensure tables exist
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("opening database {}", path.display()))?;
        let mut db = Self { conn };
        db.initialize_schema()?;
        Ok(db)
    }

    pub fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let mut db = Self { conn };
        db.initialize_schema()?;
        Ok(db)
    }

    pub(crate) fn initialize_schema(&mut self) -> Result<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS skater_game_stats (
                game_id INTEGER NOT NULL,
                player_id INTEGER NOT NULL,
                season INTEGER NOT NULL,
                game_date TEXT NOT NULL,
                game_status TEXT NOT NULL DEFAULT 'final',
                team_abbrev TEXT NOT NULL,
                team_name TEXT,
                opponent_abbrev TEXT NOT NULL,
                opponent_name TEXT,
                player_name TEXT NOT NULL,
                jersey_number INTEGER,
                position TEXT NOT NULL,
                goals INTEGER NOT NULL DEFAULT 0,
                assists INTEGER NOT NULL DEFAULT 0,
                pp_points INTEGER NOT NULL DEFAULT 0,
                sh_points INTEGER NOT NULL DEFAULT 0,
                shots INTEGER NOT NULL DEFAULT 0,
                shooting_pct REAL,
                blocked_shots INTEGER NOT NULL DEFAULT 0,
                hits INTEGER NOT NULL DEFAULT 0,
                pim INTEGER NOT NULL DEFAULT 0,
                toi_seconds INTEGER NOT NULL DEFAULT 0,
                shifts INTEGER NOT NULL DEFAULT 0,
                total_fpts REAL NOT NULL DEFAULT 0,
                PRIMARY KEY (game_id, player_id)
            );

            CREATE INDEX IF NOT EXISTS idx_skater_player_date
                ON skater_game_stats(player_id, game_date);
            CREATE INDEX IF NOT EXISTS idx_skater_season
                ON skater_game_stats(season);

            CREATE TABLE IF NOT EXISTS goalie_game_stats (
                game_id INTEGER NOT NULL,
                player_id INTEGER NOT NULL,
                season INTEGER NOT NULL,
                game_date TEXT NOT NULL,
                game_status TEXT NOT NULL DEFAULT 'final',
                team_abbrev TEXT NOT NULL,
                team_name TEXT,
                opponent_abbrev TEXT NOT NULL,
                opponent_name TEXT,
                player_name TEXT NOT NULL,
                jersey_number INTEGER,
                saves INTEGER NOT NULL DEFAULT 0,
                save_pct REAL,
                goals_against INTEGER NOT NULL DEFAULT 0,
                decision TEXT,
                wins INTEGER NOT NULL DEFAULT 0,
                shutouts INTEGER NOT NULL DEFAULT 0,
                ot_losses INTEGER NOT NULL DEFAULT 0,
                toi_seconds INTEGER NOT NULL DEFAULT 0,
                total_fpts REAL NOT NULL DEFAULT 0,
                PRIMARY KEY (game_id, player_id)
            );

            CREATE INDEX IF NOT EXISTS idx_goalie_player_date
                ON goalie_game_stats(player_id, game_date);
            CREATE INDEX IF NOT EXISTS idx_goalie_season
                ON goalie_game_stats(season);

            CREATE TABLE IF NOT EXISTS player_season_stats (
                season INTEGER NOT NULL,
                player_id INTEGER NOT NULL,
                player_name TEXT NOT NULL,
                team_abbrev TEXT NOT NULL,
                position TEXT NOT NULL,
                jersey_number INTEGER,
                is_goalie INTEGER NOT NULL DEFAULT 0,
                last_game_date TEXT NOT NULL,
                last_game_id INTEGER NOT NULL,
                games_played INTEGER NOT NULL DEFAULT 0,
                total_fpts_centi INTEGER NOT NULL DEFAULT 0,
                total_fpts REAL NOT NULL DEFAULT 0,
                goals INTEGER NOT NULL DEFAULT 0,
                assists INTEGER NOT NULL DEFAULT 0,
                pp_points INTEGER NOT NULL DEFAULT 0,
                sh_points INTEGER NOT NULL DEFAULT 0,
                shots INTEGER NOT NULL DEFAULT 0,
                blocked_shots INTEGER NOT NULL DEFAULT 0,
                hits INTEGER NOT NULL DEFAULT 0,
                wins INTEGER NOT NULL DEFAULT 0,
                shutouts INTEGER NOT NULL DEFAULT 0,
                ot_losses INTEGER NOT NULL DEFAULT 0,
                saves INTEGER NOT NULL DEFAULT 0,
                goals_against INTEGER NOT NULL DEFAULT 0,
                PRIMARY KEY (season, player_id)
            );

            CREATE TABLE IF NOT EXISTS team_schedule (
                team TEXT NOT NULL,
                week TEXT NOT NULL,
                monday_date TEXT NOT NULL,
                sunday_date TEXT NOT NULL,
                game_count INTEGER NOT NULL DEFAULT 0,
                opponents TEXT NOT NULL,
                PRIMARY KEY (team, week)
            );",
        )?;

        Ok(())
    }
}
