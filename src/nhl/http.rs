//! NHL web API client.
//!
//! All three fetchers share one HTTP client and one request limiter, so the
//! concurrency cap holds across schedule, boxscore and game-log traffic. The
//! `fetch_*` methods never fail: once retries are exhausted, or the payload
//! does not decode, they log a warning and return `None`.

use reqwest::Client;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::cli::types::{GameId, PlayerId, SeasonId};
use crate::config::Config;
use crate::core::http::{build_client, get_json_with_retry, RetryPolicy};
use crate::error::Result;
use crate::nhl::types::{
    Boxscore, ClubScheduleResponse, GameLogEntry, PlayerGameLogResponse, ScheduleGame,
};


/// Regular-season game logs live under game type 2.
const GAME_LOG_TYPE: u8 = 2;

#[derive(Debug, Clone)]
pub struct NhlClient {
    http: Client,
    base_url: String,
    season: SeasonId,
    limiter: Arc<Semaphore>,
    retry: RetryPolicy,
}

impl NhlClient {
    pub fn new(config: &Config) -> Result<Self> {
        let http = build_client(config.api_timeout)?;
        Ok(Self {
            http,
            base_url: config.api_base_url.clone(),
            season: config.season,
            limiter: Arc::new(Semaphore::new(config.concurrency_limit)),
            retry: RetryPolicy::default(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_concurrency_limit(mut self, limit: usize) -> Self {
        self.limiter = Arc::new(Semaphore::new(limit.max(1)));
        self
    }

    pub fn season(&self) -> SeasonId {
        self.season
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn team_schedule_url(&self, team: &str) -> String {
        format!(
            "{}/club-schedule-season/{}/{}",
            self.base_url, team, self.season
        )
    }

    pub fn player_log_url(&self, player_id: PlayerId) -> String {
        format!(
            "{}/player/{}/game-log/{}/{}",
            self.base_url, player_id, self.season, GAME_LOG_TYPE
        )
    }

    pub fn boxscore_url(&self, game_id: GameId) -> String {
        format!("{}/gamecenter/{}/boxscore", self.base_url, game_id)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        get_json_with_retry(&self.http, &self.limiter, &self.retry, url).await
    }

    /// One club's season schedule (all game types).
    pub async fn fetch_team_schedule(&self, team: &str) -> Option<Vec<ScheduleGame>> {
        let url = self.team_schedule_url(team);
        match self.get_json::<ClubScheduleResponse>(&url).await {
            Ok(resp) => {
                debug!(team, games = resp.games.len(), "team schedule fetched");
                Some(resp.games)
            }
            Err(e) => {
                warn!(team, "failed to fetch team schedule: {e}");
                None
            }
        }
    }

    /// A player's whole regular-season log. One call covers every game.
    pub async fn fetch_player_log(
        &self,
        player_id: PlayerId,
    ) -> Option<(PlayerId, Vec<GameLogEntry>)> {
        let url = self.player_log_url(player_id);
        match self.get_json::<PlayerGameLogResponse>(&url).await {
            Ok(resp) => Some((player_id, resp.game_log)),
            Err(e) => {
                warn!(player_id = %player_id, "failed to fetch player game log: {e}");
                None
            }
        }
    }

    pub async fn fetch_game_boxscore(&self, game_id: GameId) -> Option<Boxscore> {
        let url = self.boxscore_url(game_id);
        match self.get_json::<Boxscore>(&url).await {
            Ok(boxscore) => Some(boxscore),
            Err(e) => {
                warn!(game_id = %game_id, "failed to fetch boxscore: {e}");
                None
            }
        }
    }
}
