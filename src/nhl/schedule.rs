//! Season schedule: resolve once from the per-club endpoints, cache on disk,
//! and derive calendar views in the fantasy timezone.

use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};
use chrono_tz::Tz;
use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use tracing::{info, warn};

use crate::cli::types::{GameId, SeasonId};
use crate::core::cache::{read_json, write_json};
use crate::nhl::{http::NhlClient, teams, types::REGULAR_SEASON_GAME_TYPE};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameMeta {
    pub utc_start_time: DateTime<Utc>,
    pub home_abbrev: String,
    pub away_abbrev: String,
}

impl GameMeta {
    pub fn local_date(&self, tz: Tz) -> NaiveDate {
        self.utc_start_time.with_timezone(&tz).date_naive()
    }
}

pub type Schedule = BTreeMap<GameId, GameMeta>;

/// On-disk schedule document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleCache {
    pub fetched_at: DateTime<Utc>,
    pub season: SeasonId,
    pub games: Schedule,
}

impl ScheduleCache {
    pub fn is_fresh(&self, season: SeasonId, max_age: chrono::Duration, now: DateTime<Utc>) -> bool {
        self.season == season && now.signed_duration_since(self.fetched_at) <= max_age
    }
}

/// Return the season schedule, from cache when fresh enough.
///
/// A club whose request fails just contributes no games; the call itself
/// never fails. If every club fails, the cached schedule for this season is
/// returned even when stale, and the cache file is left untouched. Cache
/// read/write problems are logged and ignored.
pub async fn get_schedule(
    client: &NhlClient,
    cache_path: &Path,
    max_age: chrono::Duration,
    force_refresh: bool,
) -> Schedule {
    let season = client.season();

    let cached = match read_json::<ScheduleCache>(cache_path) {
        Ok(doc) => doc.filter(|doc| doc.season == season),
        Err(e) => {
            warn!("ignoring unreadable schedule cache: {e}");
            None
        }
    };
    if let Some(doc) = &cached {
        if !force_refresh && doc.is_fresh(season, max_age, Utc::now()) {
            info!(games = doc.games.len(), "schedule loaded from cache");
            return doc.games.clone();
        }
    }

    let Some(games) = fetch_schedule(client).await else {
        let games = cached.map(|doc| doc.games).unwrap_or_default();
        warn!(
            games = games.len(),
            "no club schedule could be fetched, using cached schedule"
        );
        return games;
    };

    let doc = ScheduleCache {
        fetched_at: Utc::now(),
        season,
        games,
    };
    if let Err(e) = write_json(cache_path, &doc) {
        warn!(path = %cache_path.display(), "failed to write schedule cache: {e}");
    }
    doc.games
}

/// One request per club, regular-season games only, de-duplicated by id.
/// `None` when no club request succeeded.
async fn fetch_schedule(client: &NhlClient) -> Option<Schedule> {
    let abbrevs: Vec<&str> = teams::abbreviations().collect();
    let results = join_all(abbrevs.iter().map(|team| client.fetch_team_schedule(team))).await;

    let mut schedule = Schedule::new();
    let mut failed = Vec::new();
    for (team, result) in abbrevs.iter().zip(results) {
        let Some(games) = result else {
            failed.push(*team);
            continue;
        };
        for game in games
            .into_iter()
            .filter(|g| g.game_type == REGULAR_SEASON_GAME_TYPE)
        {
            schedule.entry(game.id).or_insert_with(|| GameMeta {
                utc_start_time: game.start_time_utc,
                home_abbrev: game.home_team.abbrev,
                away_abbrev: game.away_team.abbrev,
            });
        }
    }

    if failed.len() == abbrevs.len() {
        return None;
    }
    if !failed.is_empty() {
        warn!(teams = ?failed, "schedule incomplete: some club schedules could not be fetched");
    }
    info!(games = schedule.len(), "schedule fetched");
    Some(schedule)
}

/// Games grouped by local calendar date, each day ordered by start time.
pub fn schedule_by_date(schedule: &Schedule, tz: Tz) -> BTreeMap<NaiveDate, Vec<GameId>> {
    let mut ordered: Vec<(&GameId, &GameMeta)> = schedule.iter().collect();
    ordered.sort_by_key(|(id, meta)| (meta.utc_start_time, **id));

    let mut by_date: BTreeMap<NaiveDate, Vec<GameId>> = BTreeMap::new();
    for (id, meta) in ordered {
        by_date.entry(meta.local_date(tz)).or_default().push(*id);
    }
    by_date
}

pub fn games_on(schedule: &Schedule, tz: Tz, date: NaiveDate) -> Vec<GameId> {
    schedule_by_date(schedule, tz)
        .remove(&date)
        .unwrap_or_default()
}

/// Ids of games whose local date is before `today`.
pub fn past_game_ids(schedule: &Schedule, tz: Tz, today: NaiveDate) -> Vec<GameId> {
    schedule_by_date(schedule, tz)
        .range(..today)
        .flat_map(|(_, ids)| ids.iter().copied())
        .collect()
}

/// One club's games in one ISO week (Monday to Sunday, local time).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamWeek {
    pub team: String,
    /// e.g. `2025-W45`
    pub week: String,
    pub monday_date: NaiveDate,
    pub sunday_date: NaiveDate,
    pub game_count: u32,
    /// `"vs DAL"` for home games, `"@ VGK"` for road games, in date order.
    pub opponents: Vec<String>,
}

pub fn weekly_team_schedule(schedule: &Schedule, tz: Tz) -> Vec<TeamWeek> {
    let mut ordered: Vec<(&GameId, &GameMeta)> = schedule.iter().collect();
    ordered.sort_by_key(|(id, meta)| (meta.utc_start_time, **id));

    let mut weeks: BTreeMap<(String, i32, u32), TeamWeek> = BTreeMap::new();
    let mut seen: HashSet<(String, GameId)> = HashSet::new();

    for (id, meta) in ordered {
        let date = meta.local_date(tz);
        let iso = date.iso_week();
        let sides = [
            (&meta.home_abbrev, format!("vs {}", meta.away_abbrev)),
            (&meta.away_abbrev, format!("@ {}", meta.home_abbrev)),
        ];
        for (team, opponent) in sides {
            if !seen.insert((team.clone(), *id)) {
                continue;
            }
            let entry = weeks
                .entry((team.clone(), iso.year(), iso.week()))
                .or_insert_with(|| {
                    let monday = NaiveDate::from_isoywd_opt(iso.year(), iso.week(), Weekday::Mon)
                        .unwrap_or(date);
                    TeamWeek {
                        team: team.clone(),
                        week: format!("{}-W{:02}", iso.year(), iso.week()),
                        monday_date: monday,
                        sunday_date: monday + chrono::Duration::days(6),
                        game_count: 0,
                        opponents: Vec::new(),
                    }
                });
            entry.game_count += 1;
            entry.opponents.push(opponent);
        }
    }

    weeks.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nhl::http::tests::test_client;
    use chrono::TimeZone;
    use chrono_tz::US::Eastern;
    use serde_json::json;
    use tempfile::tempdir;
    use wiremock::{
        matchers::{method, path, path_regex},
        Mock, MockServer, ResponseTemplate,
    };

    fn meta(start: &str, home: &str, away: &str) -> GameMeta {
        GameMeta {
            utc_start_time: start.parse().unwrap(),
            home_abbrev: home.to_string(),
            away_abbrev: away.to_string(),
        }
    }

    fn sample_schedule() -> Schedule {
        let mut s = Schedule::new();
        // Mon 2025-11-03 19:00 ET
        s.insert(GameId::new(1), meta("2025-11-04T00:00:00Z", "TOR", "DAL"));
        // Wed 2025-11-05 22:00 ET
        s.insert(GameId::new(2), meta("2025-11-06T03:00:00Z", "VGK", "TOR"));
        // Sun 2025-11-09 and Mon 2025-11-10
        s.insert(GameId::new(3), meta("2025-11-09T18:00:00Z", "DAL", "VGK"));
        s.insert(GameId::new(4), meta("2025-11-10T23:30:00Z", "TOR", "VGK"));
        s
    }

    #[test]
    fn test_schedule_by_date_uses_local_day() {
        let by_date = schedule_by_date(&sample_schedule(), Eastern);

        let nov3 = NaiveDate::from_ymd_opt(2025, 11, 3).unwrap();
        let nov5 = NaiveDate::from_ymd_opt(2025, 11, 5).unwrap();
        assert_eq!(by_date[&nov3], vec![GameId::new(1)]);
        assert_eq!(by_date[&nov5], vec![GameId::new(2)]);
        assert!(!by_date.contains_key(&NaiveDate::from_ymd_opt(2025, 11, 4).unwrap()));
    }

    #[test]
    fn test_past_game_ids_excludes_today() {
        let today = NaiveDate::from_ymd_opt(2025, 11, 9).unwrap();
        let past = past_game_ids(&sample_schedule(), Eastern, today);

        assert_eq!(past, vec![GameId::new(1), GameId::new(2)]);
        assert_eq!(games_on(&sample_schedule(), Eastern, today), vec![GameId::new(3)]);
    }

    #[test]
    fn test_weekly_team_schedule() {
        let weeks = weekly_team_schedule(&sample_schedule(), Eastern);

        let tor_w45 = weeks
            .iter()
            .find(|w| w.team == "TOR" && w.week == "2025-W45")
            .unwrap();
        assert_eq!(tor_w45.game_count, 2);
        assert_eq!(tor_w45.opponents, vec!["vs DAL", "@ VGK"]);
        assert_eq!(tor_w45.monday_date, NaiveDate::from_ymd_opt(2025, 11, 3).unwrap());
        assert_eq!(tor_w45.sunday_date, NaiveDate::from_ymd_opt(2025, 11, 9).unwrap());

        let tor_w46 = weeks
            .iter()
            .find(|w| w.team == "TOR" && w.week == "2025-W46")
            .unwrap();
        assert_eq!(tor_w46.opponents, vec!["vs VGK"]);

        let vgk_total: u32 = weeks
            .iter()
            .filter(|w| w.team == "VGK")
            .map(|w| w.game_count)
            .sum();
        assert_eq!(vgk_total, 3);
    }

    #[test]
    fn test_cache_freshness() {
        let fetched_at = Utc.with_ymd_and_hms(2025, 11, 1, 12, 0, 0).unwrap();
        let doc = ScheduleCache {
            fetched_at,
            season: SeasonId::default(),
            games: Schedule::new(),
        };
        let max_age = chrono::Duration::hours(24);

        assert!(doc.is_fresh(SeasonId::default(), max_age, fetched_at + chrono::Duration::hours(23)));
        assert!(!doc.is_fresh(SeasonId::default(), max_age, fetched_at + chrono::Duration::hours(25)));
        assert!(!doc.is_fresh(SeasonId::default().previous().unwrap(), max_age, fetched_at));
    }

    #[tokio::test]
    async fn test_get_schedule_dedups_filters_and_tolerates_failures() {
        let mock_server = MockServer::start().await;
        let game = |id: u64, game_type: u8, home: &str, away: &str| {
            json!({
                "id": id,
                "gameType": game_type,
                "startTimeUTC": "2025-10-10T23:00:00Z",
                "homeTeam": { "abbrev": home },
                "awayTeam": { "abbrev": away }
            })
        };

        Mock::given(method("GET"))
            .and(path("/club-schedule-season/TOR/20252026"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "games": [game(10, 2, "TOR", "MTL"), game(11, 1, "TOR", "OTT")]
            })))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/club-schedule-season/MTL/20252026"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "games": [game(10, 2, "TOR", "MTL"), game(12, 2, "MTL", "BOS")]
            })))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/club-schedule-season/BOS/20252026"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path_regex(r"^/club-schedule-season/[A-Z]{3}/20252026$"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "games": [] })))
            .mount(&mock_server)
            .await;

        let dir = tempdir().unwrap();
        let cache_path = dir.path().join("schedule.json");
        let client = test_client(&mock_server.uri());

        let schedule = get_schedule(&client, &cache_path, chrono::Duration::hours(24), false).await;

        let ids: Vec<u64> = schedule.keys().map(|id| id.as_u64()).collect();
        assert_eq!(ids, vec![10, 12]);
        assert_eq!(schedule[&GameId::new(10)].home_abbrev, "TOR");
        assert!(cache_path.exists());

        // Fresh cache is served without touching the network.
        mock_server.reset().await;
        let cached = get_schedule(&client, &cache_path, chrono::Duration::hours(24), false).await;
        assert_eq!(cached, schedule);
        assert!(mock_server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_total_outage_keeps_stale_cache() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path_regex(r"^/club-schedule-season/[A-Z]{3}/20252026$"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let dir = tempdir().unwrap();
        let cache_path = dir.path().join("schedule.json");
        let mut games = Schedule::new();
        games.insert(GameId::new(7), meta("2025-10-08T23:00:00Z", "TOR", "MTL"));
        let stale = ScheduleCache {
            fetched_at: Utc::now() - chrono::Duration::hours(30),
            season: SeasonId::default(),
            games: games.clone(),
        };
        write_json(&cache_path, &stale).unwrap();
        let before = std::fs::read_to_string(&cache_path).unwrap();

        let client = test_client(&mock_server.uri());
        let max_age = chrono::Duration::hours(24);

        assert_eq!(get_schedule(&client, &cache_path, max_age, false).await, games);
        assert_eq!(std::fs::read_to_string(&cache_path).unwrap(), before);
        assert_eq!(get_schedule(&client, &cache_path, max_age, true).await, games);

        // Still stale, so the next call goes back to the network once it recovers.
        mock_server.reset().await;
        Mock::given(method("GET"))
            .and(path_regex(r"^/club-schedule-season/[A-Z]{3}/20252026$"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "games": [] })))
            .mount(&mock_server)
            .await;

        assert!(get_schedule(&client, &cache_path, max_age, false)
            .await
            .is_empty());
        assert!(!mock_server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_total_outage_without_cache_is_empty() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path_regex(r"^/club-schedule-season/[A-Z]{3}/20252026$"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let dir = tempdir().unwrap();
        let cache_path = dir.path().join("schedule.json");
        let client = test_client(&mock_server.uri());

        let schedule = get_schedule(&client, &cache_path, chrono::Duration::hours(24), false).await;

        assert!(schedule.is_empty());
        assert!(!cache_path.exists());
    }
}
