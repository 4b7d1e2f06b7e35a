//! Unit tests for storage functionality

use super::*;
use crate::cli::types::{GameId, PlayerId, SeasonId};
use crate::nhl::{schedule::TeamWeek, types::GameStatus};
use chrono::NaiveDate;

fn create_test_db() -> StatsDatabase {
    let conn = rusqlite::Connection::open_in_memory().unwrap();
    let mut db = StatsDatabase { conn };
    db.initialize_schema().unwrap();
    db
}

fn skater(game: u64, player: u64, date: &str, goals: u32, fpts: f64) -> SkaterGameRow {
    SkaterGameRow {
        game_id: GameId::new(game),
        player_id: PlayerId::new(player),
        season: SeasonId::default(),
        game_date: date.to_string(),
        game_status: GameStatus::Final,
        team_abbrev: "EDM".to_string(),
        team_name: Some("Edmonton Oilers".to_string()),
        opponent_abbrev: "CGY".to_string(),
        opponent_name: Some("Calgary Flames".to_string()),
        player_name: "C. McDavid".to_string(),
        jersey_number: Some(97),
        position: "C".to_string(),
        goals,
        assists: 1,
        pp_points: 0,
        sh_points: 0,
        shots: 4,
        shooting_pct: Some(25.0),
        blocked_shots: 0,
        hits: 1,
        pim: 0,
        toi_seconds: 1300,
        shifts: 22,
        total_fpts: fpts,
    }
}

fn goalie(game: u64, player: u64, date: &str, saves: u32, fpts: f64) -> GoalieGameRow {
    GoalieGameRow {
        game_id: GameId::new(game),
        player_id: PlayerId::new(player),
        season: SeasonId::default(),
        game_date: date.to_string(),
        game_status: GameStatus::Final,
        team_abbrev: "EDM".to_string(),
        team_name: Some("Edmonton Oilers".to_string()),
        opponent_abbrev: "CGY".to_string(),
        opponent_name: Some("Calgary Flames".to_string()),
        player_name: "S. Skinner".to_string(),
        jersey_number: Some(74),
        saves,
        save_pct: Some(0.92),
        goals_against: 2,
        decision: Some("W".to_string()),
        wins: 1,
        shutouts: 0,
        ot_losses: 0,
        toi_seconds: 3600,
        total_fpts: fpts,
    }
}

#[test]
fn test_database_creation() {
    let _db = create_test_db();
}

#[test]
fn test_upsert_is_idempotent() {
    let mut db = create_test_db();
    let rows = vec![
        GameRow::Skater(skater(1, 10, "2025-10-08", 1, 4.5)),
        GameRow::Goalie(goalie(1, 20, "2025-10-08", 30, 6.0)),
    ];

    db.upsert_game_rows(&rows).unwrap();
    let summary = db.upsert_game_rows(&rows).unwrap();

    assert_eq!(summary.skater_rows, 1);
    assert_eq!(summary.goalie_rows, 1);
    assert_eq!(db.count_rows_for_game(GameId::new(1)).unwrap(), (1, 1));

    let stored = db
        .get_skater_row(GameId::new(1), PlayerId::new(10))
        .unwrap()
        .unwrap();
    assert_eq!(stored, skater(1, 10, "2025-10-08", 1, 4.5));

    let stored_goalie = db
        .get_goalie_row(GameId::new(1), PlayerId::new(20))
        .unwrap()
        .unwrap();
    assert_eq!(stored_goalie.saves, 30);
    assert_eq!(stored_goalie.decision.as_deref(), Some("W"));
}

#[test]
fn test_upsert_replaces_content() {
    let mut db = create_test_db();

    db.upsert_game_rows(&[GameRow::Skater(skater(1, 10, "2025-10-08", 1, 4.5))])
        .unwrap();
    db.upsert_game_rows(&[GameRow::Skater(skater(1, 10, "2025-10-08", 3, 8.5))])
        .unwrap();

    let stored = db
        .get_skater_row(GameId::new(1), PlayerId::new(10))
        .unwrap()
        .unwrap();
    assert_eq!(stored.goals, 3);
    assert_eq!(stored.total_fpts, 8.5);
}

#[test]
fn test_missing_row_is_none() {
    let db = create_test_db();
    assert!(db
        .get_skater_row(GameId::new(99), PlayerId::new(1))
        .unwrap()
        .is_none());
}

#[test]
fn test_write_batch_aggregates_only_listed_games() {
    let mut db = create_test_db();
    let mut batch = IngestBatch::default();
    batch.rows.push(GameRow::Skater(skater(1, 10, "2025-10-08", 1, 4.5)));
    batch.rows.push(GameRow::Skater(skater(2, 10, "2025-10-10", 2, 6.25)));
    batch.aggregate_games.insert(GameId::new(2));

    let summary = db.write_ingest_batch(&batch).unwrap();
    assert_eq!(summary.skater_rows, 2);
    assert_eq!(summary.aggregated_players, 1);

    let season = db
        .get_player_season(SeasonId::default(), PlayerId::new(10))
        .unwrap()
        .unwrap();
    assert_eq!(season.games_played, 1);
    assert_eq!(season.goals, 2);
    assert_eq!(season.total_fpts(), 6.25);
}

#[test]
fn test_write_batch_skips_non_final_games_in_aggregate() {
    let mut db = create_test_db();
    let mut live = skater(3, 10, "2025-10-12", 1, 3.0);
    live.game_status = GameStatus::Live;

    let mut batch = IngestBatch::default();
    batch.rows.push(GameRow::Skater(live));
    batch.aggregate_games.insert(GameId::new(3));

    let summary = db.write_ingest_batch(&batch).unwrap();

    assert_eq!(summary.skater_rows, 1);
    assert_eq!(summary.aggregated_players, 0);
    assert!(db
        .get_player_season(SeasonId::default(), PlayerId::new(10))
        .unwrap()
        .is_none());
}

#[test]
fn test_incremental_matches_rebuild() {
    let mut db = create_test_db();
    let games = [
        GameRow::Skater(skater(3, 10, "2025-10-12", 0, 0.3)),
        GameRow::Skater(skater(1, 10, "2025-10-08", 1, 4.1)),
        GameRow::Goalie(goalie(1, 20, "2025-10-08", 30, 6.0)),
        GameRow::Skater(skater(2, 10, "2025-10-10", 2, 7.7)),
        GameRow::Goalie(goalie(3, 20, "2025-10-12", 25, 1.35)),
    ];

    // One batch per game, deliberately out of date order.
    for row in &games {
        let mut batch = IngestBatch::default();
        batch.rows.push(row.clone());
        batch.aggregate_games.insert(row.game_id());
        db.write_ingest_batch(&batch).unwrap();
    }
    let incremental = db.player_seasons(SeasonId::default()).unwrap();

    db.rebuild_season_aggregates(SeasonId::default()).unwrap();
    let rebuilt = db.player_seasons(SeasonId::default()).unwrap();

    assert_eq!(incremental, rebuilt);

    let skater_totals = rebuilt
        .iter()
        .find(|r| r.player_id == PlayerId::new(10))
        .unwrap();
    assert_eq!(skater_totals.games_played, 3);
    assert_eq!(skater_totals.total_fpts_centi, 1210);
    assert_eq!(skater_totals.last_game_date, "2025-10-12");
    assert_eq!(skater_totals.last_game_id, GameId::new(3));

    let goalie_totals = rebuilt
        .iter()
        .find(|r| r.player_id == PlayerId::new(20))
        .unwrap();
    assert!(goalie_totals.is_goalie);
    assert_eq!(goalie_totals.saves, 55);
    assert_eq!(goalie_totals.wins, 2);
    assert_eq!(goalie_totals.total_fpts(), 7.35);
}

#[test]
fn test_rebuild_replaces_drifted_aggregate() {
    let mut db = create_test_db();
    let row = GameRow::Skater(skater(1, 10, "2025-10-08", 1, 4.0));
    let mut batch = IngestBatch::default();
    batch.rows.push(row.clone());
    batch.aggregate_games.insert(GameId::new(1));

    // Applying the same game twice double counts; the rebuild fixes it.
    db.write_ingest_batch(&batch).unwrap();
    db.write_ingest_batch(&batch).unwrap();
    let drifted = db
        .get_player_season(SeasonId::default(), PlayerId::new(10))
        .unwrap()
        .unwrap();
    assert_eq!(drifted.games_played, 2);

    assert_eq!(db.rebuild_season_aggregates(SeasonId::default()).unwrap(), 1);
    let fixed = db
        .get_player_season(SeasonId::default(), PlayerId::new(10))
        .unwrap()
        .unwrap();
    assert_eq!(fixed.games_played, 1);
    assert_eq!(fixed.total_fpts(), 4.0);
}

#[test]
fn test_aggregates_are_per_season() {
    let mut db = create_test_db();
    let previous = SeasonId::default().previous().unwrap();
    let mut old = skater(1, 10, "2025-03-01", 1, 5.0);
    old.season = previous;

    db.upsert_game_rows(&[
        GameRow::Skater(old),
        GameRow::Skater(skater(2, 10, "2025-10-08", 1, 3.0)),
    ])
    .unwrap();

    db.rebuild_season_aggregates(SeasonId::default()).unwrap();

    let current = db.player_seasons(SeasonId::default()).unwrap();
    assert_eq!(current.len(), 1);
    assert_eq!(current[0].total_fpts(), 3.0);
    assert!(db.player_seasons(previous).unwrap().is_empty());
}

#[test]
fn test_failed_batch_rolls_back() {
    let mut db = create_test_db();
    db.conn
        .execute("DROP TABLE player_season_stats", [])
        .unwrap();

    let mut batch = IngestBatch::default();
    batch.rows.push(GameRow::Skater(skater(1, 10, "2025-10-08", 1, 4.0)));
    batch.aggregate_games.insert(GameId::new(1));

    assert!(db.write_ingest_batch(&batch).is_err());
    assert_eq!(db.count_rows_for_game(GameId::new(1)).unwrap(), (0, 0));
}

#[test]
fn test_team_schedule_replace_and_read() {
    let mut db = create_test_db();
    let week = |team: &str, opponents: &[&str]| TeamWeek {
        team: team.to_string(),
        week: "2025-W45".to_string(),
        monday_date: NaiveDate::from_ymd_opt(2025, 11, 3).unwrap(),
        sunday_date: NaiveDate::from_ymd_opt(2025, 11, 9).unwrap(),
        game_count: opponents.len() as u32,
        opponents: opponents.iter().map(|s| s.to_string()).collect(),
    };

    db.replace_team_schedule(&[week("TOR", &["vs DAL"]), week("DAL", &["@ TOR"])])
        .unwrap();
    db.replace_team_schedule(&[week("TOR", &["vs DAL", "@ VGK"])])
        .unwrap();

    let tor = db.get_team_schedule("TOR").unwrap();
    assert_eq!(tor.len(), 1);
    assert_eq!(tor[0].game_count, 2);
    assert_eq!(tor[0].opponents, vec!["vs DAL", "@ VGK"]);
    assert!(db.get_team_schedule("DAL").unwrap().is_empty());
}
