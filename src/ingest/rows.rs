//! Merged records to persistent rows: scoring, opponent resolution and the
//! derived per-game fields.

use tracing::warn;

use super::record::{BoxscoreLine, GameSnapshot, PlayerGameRecord};
use crate::cli::types::SeasonId;
use crate::config::ScoringRules;
use crate::nhl::{
    compute::{
        goalie_points, shooting_pct, skater_points, toi_to_seconds, GoalieStatLine,
        SkaterStatLine,
    },
    teams::team_name,
    types::{Boxscore, GameStatus},
};
use crate::storage::{GameRow, GoalieGameRow, SkaterGameRow};

/// The side of `boxscore` that `team` did not play for.
///
/// `None` when `team` matches neither side.
pub fn resolve_opponent<'a>(boxscore: &'a Boxscore, team: &str) -> Option<&'a str> {
    let home = boxscore.home_abbrev();
    let away = boxscore.away_abbrev();
    if team.eq_ignore_ascii_case(home) {
        Some(away)
    } else if team.eq_ignore_ascii_case(away) {
        Some(home)
    } else {
        None
    }
}

/// Every persistable row for one game.
///
/// Incomplete records and records whose team is not on the boxscore are
/// skipped with a warning.
pub fn build_rows(
    snapshot: &GameSnapshot,
    season: SeasonId,
    scoring: &ScoringRules,
) -> Vec<GameRow> {
    let status = snapshot.boxscore.status();
    snapshot
        .players
        .values()
        .filter_map(|record| build_row(record, &snapshot.boxscore, season, status, scoring))
        .collect()
}

fn build_row(
    record: &PlayerGameRecord,
    boxscore: &Boxscore,
    season: SeasonId,
    status: GameStatus,
    scoring: &ScoringRules,
) -> Option<GameRow> {
    let Some(line) = &record.line else {
        warn!(
            game_id = %record.game_id,
            player_id = %record.player_id,
            "incomplete record, not persisting"
        );
        return None;
    };

    let Some(opponent) = resolve_opponent(boxscore, &record.team_abbrev) else {
        warn!(
            game_id = %record.game_id,
            player_id = %record.player_id,
            team = %record.team_abbrev,
            home = boxscore.home_abbrev(),
            away = boxscore.away_abbrev(),
            "player's team is on neither side of the boxscore, skipping"
        );
        return None;
    };

    let team_abbrev = record.team_abbrev.to_uppercase();
    let opponent_abbrev = opponent.to_uppercase();
    let team_full = team_name(&team_abbrev).map(str::to_string);
    let opponent_full = team_name(&opponent_abbrev).map(str::to_string);
    let toi_seconds = toi_to_seconds(&record.toi);

    let row = match *line {
        BoxscoreLine::Skater {
            position,
            goals,
            assists,
            shots,
            blocked_shots,
            hits,
        } => {
            let stats = SkaterStatLine {
                goals,
                assists,
                power_play_points: record.power_play_points,
                shorthanded_points: record.shorthanded_points,
                shots,
                blocked_shots,
                hits,
            };
            GameRow::Skater(SkaterGameRow {
                game_id: record.game_id,
                player_id: record.player_id,
                season,
                game_date: record.game_date.clone(),
                game_status: status,
                team_abbrev,
                team_name: team_full,
                opponent_abbrev,
                opponent_name: opponent_full,
                player_name: record.player_name.clone(),
                jersey_number: record.sweater_number,
                position: position.display_name().to_string(),
                goals,
                assists,
                pp_points: record.power_play_points,
                sh_points: record.shorthanded_points,
                shots,
                shooting_pct: shooting_pct(goals, shots),
                blocked_shots,
                hits,
                pim: record.pim,
                toi_seconds,
                shifts: record.shifts,
                total_fpts: skater_points(&stats, &scoring.skater),
            })
        }
        BoxscoreLine::Goalie {
            saves,
            save_pct,
            goals_against,
            decision,
        } => {
            let stats = GoalieStatLine {
                decision,
                goals_against,
                saves,
            };
            let flags = stats.flags();
            GameRow::Goalie(GoalieGameRow {
                game_id: record.game_id,
                player_id: record.player_id,
                season,
                game_date: record.game_date.clone(),
                game_status: status,
                team_abbrev,
                team_name: team_full,
                opponent_abbrev,
                opponent_name: opponent_full,
                player_name: record.player_name.clone(),
                jersey_number: record.sweater_number,
                saves,
                save_pct: save_pct.filter(|p| p.is_finite()),
                goals_against,
                decision: decision.map(|d| d.code().to_string()),
                wins: flags.win,
                shutouts: flags.shutout,
                ot_losses: flags.ot_loss,
                toi_seconds,
                total_fpts: goalie_points(&stats, &scoring.goalie),
            })
        }
    };
    Some(row)
}
