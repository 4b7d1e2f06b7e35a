//! Row-level reads and idempotent writes

use super::{aggregate, models::*, schema::StatsDatabase};
use crate::cli::types::{GameId, PlayerId, SeasonId};
use crate::nhl::{schedule::TeamWeek, types::GameStatus};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{params, types::Type, Connection, OptionalExtension, Row};

const SKATER_COLUMNS: &str = "game_id, player_id, season, game_date, game_status,
    team_abbrev, team_name, opponent_abbrev, opponent_name, player_name, jersey_number,
    position, goals, assists, pp_points, sh_points, shots, shooting_pct, blocked_shots,
    hits, pim, toi_seconds, shifts, total_fpts";

const GOALIE_COLUMNS: &str = "game_id, player_id, season, game_date, game_status,
    team_abbrev, team_name, opponent_abbrev, opponent_name, player_name, jersey_number,
    saves, save_pct, goals_against, decision, wins, shutouts, ot_losses, toi_seconds,
    total_fpts";

fn conversion_error<E>(idx: usize, ty: Type, e: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, ty, Box::new(e))
}

pub(crate) fn season_at(row: &Row, idx: usize) -> rusqlite::Result<SeasonId> {
    let raw: u32 = row.get(idx)?;
    SeasonId::new(raw).map_err(|e| conversion_error(idx, Type::Integer, e))
}

fn status_at(row: &Row, idx: usize) -> rusqlite::Result<GameStatus> {
    let raw: String = row.get(idx)?;
    GameStatus::from_label(&raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("unknown game status {raw}").into(),
        )
    })
}

fn id_at(row: &Row, idx: usize) -> rusqlite::Result<u64> {
    let raw: i64 = row.get(idx)?;
    u64::try_from(raw).map_err(|e| conversion_error(idx, Type::Integer, e))
}

fn row_to_skater(row: &Row) -> rusqlite::Result<SkaterGameRow> {
    Ok(SkaterGameRow {
        game_id: GameId::new(id_at(row, 0)?),
        player_id: PlayerId::new(id_at(row, 1)?),
        season: season_at(row, 2)?,
        game_date: row.get(3)?,
        game_status: status_at(row, 4)?,
        team_abbrev: row.get(5)?,
        team_name: row.get(6)?,
        opponent_abbrev: row.get(7)?,
        opponent_name: row.get(8)?,
        player_name: row.get(9)?,
        jersey_number: row.get(10)?,
        position: row.get(11)?,
        goals: row.get(12)?,
        assists: row.get(13)?,
        pp_points: row.get(14)?,
        sh_points: row.get(15)?,
        shots: row.get(16)?,
        shooting_pct: row.get(17)?,
        blocked_shots: row.get(18)?,
        hits: row.get(19)?,
        pim: row.get(20)?,
        toi_seconds: row.get(21)?,
        shifts: row.get(22)?,
        total_fpts: row.get(23)?,
    })
}

fn row_to_goalie(row: &Row) -> rusqlite::Result<GoalieGameRow> {
    Ok(GoalieGameRow {
        game_id: GameId::new(id_at(row, 0)?),
        player_id: PlayerId::new(id_at(row, 1)?),
        season: season_at(row, 2)?,
        game_date: row.get(3)?,
        game_status: status_at(row, 4)?,
        team_abbrev: row.get(5)?,
        team_name: row.get(6)?,
        opponent_abbrev: row.get(7)?,
        opponent_name: row.get(8)?,
        player_name: row.get(9)?,
        jersey_number: row.get(10)?,
        saves: row.get(11)?,
        save_pct: row.get(12)?,
        goals_against: row.get(13)?,
        decision: row.get(14)?,
        wins: row.get(15)?,
        shutouts: row.get(16)?,
        ot_losses: row.get(17)?,
        toi_seconds: row.get(18)?,
        total_fpts: row.get(19)?,
    })
}

pub(crate) fn upsert_skater(conn: &Connection, r: &SkaterGameRow) -> Result<()> {
    conn.execute(
        &format!(
            "INSERT OR REPLACE INTO skater_game_stats ({SKATER_COLUMNS})
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        ),
        params![
            r.game_id.as_i64(),
            r.player_id.as_i64(),
            r.season.as_u32(),
            r.game_date,
            r.game_status.as_str(),
            r.team_abbrev,
            r.team_name,
            r.opponent_abbrev,
            r.opponent_name,
            r.player_name,
            r.jersey_number,
            r.position,
            r.goals,
            r.assists,
            r.pp_points,
            r.sh_points,
            r.shots,
            r.shooting_pct,
            r.blocked_shots,
            r.hits,
            r.pim,
            r.toi_seconds,
            r.shifts,
            r.total_fpts,
        ],
    )?;
    Ok(())
}

pub(crate) fn upsert_goalie(conn: &Connection, r: &GoalieGameRow) -> Result<()> {
    conn.execute(
        &format!(
            "INSERT OR REPLACE INTO goalie_game_stats ({GOALIE_COLUMNS})
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        ),
        params![
            r.game_id.as_i64(),
            r.player_id.as_i64(),
            r.season.as_u32(),
            r.game_date,
            r.game_status.as_str(),
            r.team_abbrev,
            r.team_name,
            r.opponent_abbrev,
            r.opponent_name,
            r.player_name,
            r.jersey_number,
            r.saves,
            r.save_pct,
            r.goals_against,
            r.decision,
            r.wins,
            r.shutouts,
            r.ot_losses,
            r.toi_seconds,
            r.total_fpts,
        ],
    )?;
    Ok(())
}

/// Upsert every row into its table. Returns `(skaters, goalies)` written.
pub(crate) fn upsert_rows(conn: &Connection, rows: &[GameRow]) -> Result<(usize, usize)> {
    let mut skaters = 0;
    let mut goalies = 0;
    for row in rows {
        match row {
            GameRow::Skater(r) => {
                upsert_skater(conn, r).with_context(|| {
                    format!("upserting skater {} in game {}", r.player_id, r.game_id)
                })?;
                skaters += 1;
            }
            GameRow::Goalie(r) => {
                upsert_goalie(conn, r).with_context(|| {
                    format!("upserting goalie {} in game {}", r.player_id, r.game_id)
                })?;
                goalies += 1;
            }
        }
    }
    Ok((skaters, goalies))
}

pub(crate) fn load_season_rows(
    conn: &Connection,
    season: SeasonId,
    final_only: bool,
) -> Result<Vec<GameRow>> {
    let filter = if final_only {
        "WHERE season = ? AND game_status = 'final'"
    } else {
        "WHERE season = ?"
    };

    let mut rows = Vec::new();

    let mut stmt = conn.prepare(&format!(
        "SELECT {SKATER_COLUMNS} FROM skater_game_stats {filter} ORDER BY game_date, game_id"
    ))?;
    for row in stmt.query_map(params![season.as_u32()], row_to_skater)? {
        rows.push(GameRow::Skater(row?));
    }

    let mut stmt = conn.prepare(&format!(
        "SELECT {GOALIE_COLUMNS} FROM goalie_game_stats {filter} ORDER BY game_date, game_id"
    ))?;
    for row in stmt.query_map(params![season.as_u32()], row_to_goalie)? {
        rows.push(GameRow::Goalie(row?));
    }

    Ok(rows)
}

impl StatsDatabase {
    /// Upsert per-game rows in one transaction
    pub fn upsert_game_rows(&mut self, rows: &[GameRow]) -> Result<WriteSummary> {
        let tx = self.conn.transaction()?;
        let (skater_rows, goalie_rows) = upsert_rows(&tx, rows)?;
        tx.commit()?;
        Ok(WriteSummary {
            skater_rows,
            goalie_rows,
            aggregated_players: 0,
        })
    }

    /// Write one run's rows and its incremental aggregate delta atomically.
    ///
    /// Any failure rolls back the whole batch.
    pub fn write_ingest_batch(&mut self, batch: &IngestBatch) -> Result<WriteSummary> {
        let tx = self.conn.transaction()?;

        let (skater_rows, goalie_rows) = upsert_rows(&tx, &batch.rows)?;

        let contributing = batch
            .rows
            .iter()
            .filter(|r| batch.aggregate_games.contains(&r.game_id()))
            .filter(|r| r.game_status().is_final());
        let aggregated_players = aggregate::apply_incremental(&tx, contributing)?;

        tx.commit().context("committing ingest batch")?;

        Ok(WriteSummary {
            skater_rows,
            goalie_rows,
            aggregated_players,
        })
    }

    pub fn get_skater_row(
        &self,
        game_id: GameId,
        player_id: PlayerId,
    ) -> Result<Option<SkaterGameRow>> {
        let row = self
            .conn
            .query_row(
                &format!(
                    "SELECT {SKATER_COLUMNS} FROM skater_game_stats
                     WHERE game_id = ? AND player_id = ?"
                ),
                params![game_id.as_i64(), player_id.as_i64()],
                row_to_skater,
            )
            .optional()?;
        Ok(row)
    }

    pub fn get_goalie_row(
        &self,
        game_id: GameId,
        player_id: PlayerId,
    ) -> Result<Option<GoalieGameRow>> {
        let row = self
            .conn
            .query_row(
                &format!(
                    "SELECT {GOALIE_COLUMNS} FROM goalie_game_stats
                     WHERE game_id = ? AND player_id = ?"
                ),
                params![game_id.as_i64(), player_id.as_i64()],
                row_to_goalie,
            )
            .optional()?;
        Ok(row)
    }

    /// All per-game rows for a season, skaters first.
    pub fn game_rows_for_season(&self, season: SeasonId) -> Result<Vec<GameRow>> {
        load_season_rows(&self.conn, season, false)
    }

    /// `(skater rows, goalie rows)` stored for one game.
    pub fn count_rows_for_game(&self, game_id: GameId) -> Result<(usize, usize)> {
        let skaters: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM skater_game_stats WHERE game_id = ?",
            params![game_id.as_i64()],
            |row| row.get(0),
        )?;
        let goalies: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM goalie_game_stats WHERE game_id = ?",
            params![game_id.as_i64()],
            |row| row.get(0),
        )?;
        Ok((skaters as usize, goalies as usize))
    }

    /// Replace the weekly team schedule table wholesale.
    pub fn replace_team_schedule(&mut self, weeks: &[TeamWeek]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM team_schedule", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT OR REPLACE INTO team_schedule
                 (team, week, monday_date, sunday_date, game_count, opponents)
                 VALUES (?, ?, ?, ?, ?, ?)",
            )?;
            for w in weeks {
                stmt.execute(params![
                    w.team,
                    w.week,
                    w.monday_date.to_string(),
                    w.sunday_date.to_string(),
                    w.game_count,
                    w.opponents.join(", "),
                ])?;
            }
        }
        tx.commit()?;
        Ok(weeks.len())
    }

    pub fn get_team_schedule(&self, team: &str) -> Result<Vec<TeamWeek>> {
        let mut stmt = self.conn.prepare(
            "SELECT team, week, monday_date, sunday_date, game_count, opponents
             FROM team_schedule WHERE team = ? ORDER BY week",
        )?;
        let rows = stmt.query_map(params![team], |row| {
            let monday: String = row.get(2)?;
            let sunday: String = row.get(3)?;
            let opponents: String = row.get(5)?;
            Ok(TeamWeek {
                team: row.get(0)?,
                week: row.get(1)?,
                monday_date: parse_date(&monday, 2)?,
                sunday_date: parse_date(&sunday, 3)?,
                game_count: row.get(4)?,
                opponents: opponents
                    .split(", ")
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect(),
            })
        })?;

        let mut weeks = Vec::new();
        for row in rows {
            weeks.push(row?);
        }
        Ok(weeks)
    }
}

fn parse_date(raw: &str, idx: usize) -> rusqlite::Result<NaiveDate> {
    raw.parse::<NaiveDate>()
        .map_err(|e| conversion_error(idx, Type::Text, e))
}
