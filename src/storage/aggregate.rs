//! Season aggregates per player: incremental delta application and the full
//! rebuild used after bulk or out-of-order loads.
//!
//! Both paths fold game rows through [`PlayerSeasonRow::merge`], so a rebuild
//! reproduces exactly what any sequence of incremental updates produced.

use super::{
    models::{GameRow, PlayerSeasonRow},
    queries::{load_season_rows, season_at},
    schema::StatsDatabase,
};
use crate::cli::types::{GameId, PlayerId, SeasonId};
use anyhow::{Context, Result};
use rayon::prelude::*;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};

const SEASON_COLUMNS: &str = "season, player_id, player_name, team_abbrev, position,
    jersey_number, is_goalie, last_game_date, last_game_id, games_played,
    total_fpts_centi, goals, assists, pp_points, sh_points, shots, blocked_shots, hits,
    wins, shutouts, ot_losses, saves, goals_against";

fn row_to_season(row: &Row) -> rusqlite::Result<PlayerSeasonRow> {
    let player_id: i64 = row.get(1)?;
    let last_game_id: i64 = row.get(8)?;
    Ok(PlayerSeasonRow {
        season: season_at(row, 0)?,
        player_id: PlayerId::new(player_id as u64),
        player_name: row.get(2)?,
        team_abbrev: row.get(3)?,
        position: row.get(4)?,
        jersey_number: row.get(5)?,
        is_goalie: row.get(6)?,
        last_game_date: row.get(7)?,
        last_game_id: GameId::new(last_game_id as u64),
        games_played: row.get(9)?,
        total_fpts_centi: row.get(10)?,
        goals: row.get(11)?,
        assists: row.get(12)?,
        pp_points: row.get(13)?,
        sh_points: row.get(14)?,
        shots: row.get(15)?,
        blocked_shots: row.get(16)?,
        hits: row.get(17)?,
        wins: row.get(18)?,
        shutouts: row.get(19)?,
        ot_losses: row.get(20)?,
        saves: row.get(21)?,
        goals_against: row.get(22)?,
    })
}

fn read_season_row(
    conn: &Connection,
    season: SeasonId,
    player_id: PlayerId,
) -> Result<Option<PlayerSeasonRow>> {
    let row = conn
        .query_row(
            &format!(
                "SELECT {SEASON_COLUMNS} FROM player_season_stats
                 WHERE season = ? AND player_id = ?"
            ),
            params![season.as_u32(), player_id.as_i64()],
            row_to_season,
        )
        .optional()?;
    Ok(row)
}

fn write_season_row(conn: &Connection, r: &PlayerSeasonRow) -> Result<()> {
    conn.execute(
        &format!(
            "INSERT OR REPLACE INTO player_season_stats ({SEASON_COLUMNS}, total_fpts)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        ),
        params![
            r.season.as_u32(),
            r.player_id.as_i64(),
            r.player_name,
            r.team_abbrev,
            r.position,
            r.jersey_number,
            r.is_goalie,
            r.last_game_date,
            r.last_game_id.as_i64(),
            r.games_played,
            r.total_fpts_centi,
            r.goals,
            r.assists,
            r.pp_points,
            r.sh_points,
            r.shots,
            r.blocked_shots,
            r.hits,
            r.wins,
            r.shutouts,
            r.ot_losses,
            r.saves,
            r.goals_against,
            r.total_fpts(),
        ],
    )?;
    Ok(())
}

/// Add the given rows' contribution to the stored aggregates.
///
/// Rows are grouped first so each player is read and written once.
/// Returns the number of player aggregates touched.
pub(crate) fn apply_incremental<'a, I>(conn: &Connection, rows: I) -> Result<usize>
where
    I: IntoIterator<Item = &'a GameRow>,
{
    let mut deltas: BTreeMap<(SeasonId, PlayerId), PlayerSeasonRow> = BTreeMap::new();
    for row in rows {
        let key = (row.season(), row.player_id());
        let delta = match deltas.remove(&key) {
            Some(existing) => existing.absorb(row),
            None => PlayerSeasonRow::from_game(row),
        };
        deltas.insert(key, delta);
    }

    let touched = deltas.len();
    for ((season, player_id), delta) in deltas {
        let updated = match read_season_row(conn, season, player_id)? {
            Some(stored) => stored.merge(delta),
            None => delta,
        };
        write_season_row(conn, &updated)
            .with_context(|| format!("updating season aggregate for player {player_id}"))?;
    }
    debug!(players = touched, "season aggregates incremented");
    Ok(touched)
}

/// Sum rows per player in parallel.
pub fn fold_season_totals(rows: &[GameRow]) -> HashMap<PlayerId, PlayerSeasonRow> {
    rows.par_iter()
        .fold(HashMap::new, |mut acc: HashMap<PlayerId, PlayerSeasonRow>, row| {
            let merged = match acc.remove(&row.player_id()) {
                Some(existing) => existing.absorb(row),
                None => PlayerSeasonRow::from_game(row),
            };
            acc.insert(row.player_id(), merged);
            acc
        })
        .reduce(HashMap::new, |mut left, right| {
            for (player_id, totals) in right {
                let merged = match left.remove(&player_id) {
                    Some(existing) => existing.merge(totals),
                    None => totals,
                };
                left.insert(player_id, merged);
            }
            left
        })
}

impl StatsDatabase {
    /// Recompute every player's aggregate for `season` from the stored final
    /// game rows, replacing whatever was there.
    pub fn rebuild_season_aggregates(&mut self, season: SeasonId) -> Result<usize> {
        let rows = load_season_rows(&self.conn, season, true)?;
        let totals = fold_season_totals(&rows);

        let tx = self.conn.transaction()?;
        tx.execute(
            "DELETE FROM player_season_stats WHERE season = ?",
            params![season.as_u32()],
        )?;
        for row in totals.values() {
            write_season_row(&tx, row)?;
        }
        tx.commit().context("committing aggregate rebuild")?;

        info!(season = %season, players = totals.len(), games = rows.len(), "season aggregates rebuilt");
        Ok(totals.len())
    }

    pub fn get_player_season(
        &self,
        season: SeasonId,
        player_id: PlayerId,
    ) -> Result<Option<PlayerSeasonRow>> {
        read_season_row(&self.conn, season, player_id)
    }

    /// All aggregates for a season, best total first.
    pub fn player_seasons(&self, season: SeasonId) -> Result<Vec<PlayerSeasonRow>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {SEASON_COLUMNS} FROM player_season_stats
             WHERE season = ?
             ORDER BY total_fpts_centi DESC, player_id"
        ))?;
        let rows = stmt.query_map(params![season.as_u32()], row_to_season)?;

        let mut seasons = Vec::new();
        for row in rows {
            seasons.push(row?);
        }
        Ok(seasons)
    }
}
