//! Game ingestion pipeline.
//!
//! [`process_games`] runs five phases in order over a [`RunState`]:
//!
//! 1. partition: cache hits vs. games to fetch
//! 2. fetch: boxscores, then player logs, then merge
//! 3. cache update: write fetched games to the on-disk cache
//! 4. persist: upsert rows for every cache hit, fetched and partial game
//! 5. aggregate: optionally add fetched games to season totals
//!
//! Phases 4 and 5 commit as one transaction. Everything before that is best
//! effort per game; only a failed commit is returned as an error.
//!
//! A partial game (boxscore fetched, some player logs not) persists the rows
//! it has but is neither cached nor aggregated, so a later run fetches it
//! again and counts it once when complete.

pub mod game_cache;
pub mod merge;
pub mod record;
pub mod rows;
pub mod state;

use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

use crate::cli::types::{GameId, SeasonId};
use crate::config::{Config, ScoringRules};
use crate::error::{NhlError, Result};
use crate::nhl::http::NhlClient;
use crate::storage::{IngestBatch, StatsDatabase};

pub use game_cache::{GameCache, GameCacheEntry};
pub use record::{BoxscoreLine, GameSnapshot, PlayerGameRecord};
pub use state::{GameState, RunState};

/// Resources one ingestion run works against.
pub struct IngestContext<'a> {
    pub client: &'a NhlClient,
    pub db: &'a mut StatsDatabase,
    pub cache_path: PathBuf,
    pub scoring: ScoringRules,
}

impl<'a> IngestContext<'a> {
    pub fn new(config: &Config, client: &'a NhlClient, db: &'a mut StatsDatabase) -> Self {
        Self {
            client,
            db,
            cache_path: config.game_cache_path(),
            scoring: config.scoring,
        }
    }

    pub fn season(&self) -> SeasonId {
        self.client.season()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessOptions {
    /// Serve final games from the on-disk cache instead of re-fetching.
    pub use_cache: bool,
    /// Add freshly fetched games to season aggregates.
    pub incremental_update: bool,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            use_cache: true,
            incremental_update: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessSummary {
    pub requested: usize,
    pub cache_hits: usize,
    pub fetched: usize,
    /// Fetched games persisted without every player's log.
    pub partial: usize,
    /// Requested games without a usable boxscore this run.
    pub skipped: usize,
    pub persisted: usize,
    pub skater_rows: usize,
    pub goalie_rows: usize,
    pub aggregated_players: usize,
}

/// Ingest `game_ids`: fetch what is not cached, persist every requested game
/// that could be completed, and optionally fold fetched games into season
/// aggregates.
///
/// Fewer games than requested may be persisted. The only error returned is a
/// failed database commit, in which case the game cache is rolled back too.
pub async fn process_games(
    ctx: &mut IngestContext<'_>,
    game_ids: &[GameId],
    options: ProcessOptions,
) -> Result<ProcessSummary> {
    let mut run = RunState::new(game_ids);
    let mut cache = GameCache::load(&ctx.cache_path);
    info!(
        requested = run.requested(),
        use_cache = options.use_cache,
        incremental = options.incremental_update,
        "processing games"
    );

    let started = Instant::now();
    partition(&mut run, &cache, options.use_cache);
    let cache_hits = run.count(GameState::CacheHit);
    info!(
        cache_hits,
        to_fetch = run.count(GameState::FetchPending),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "partition done"
    );

    let started = Instant::now();
    fetch(&mut run, ctx.client).await;
    info!(
        fetched = run.count(GameState::Fetched),
        partial = run.count(GameState::Partial),
        still_pending = run.count(GameState::FetchPending),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "fetch done"
    );

    let started = Instant::now();
    let cache_written = update_cache(&run, &mut cache);
    info!(
        written = cache_written,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "cache update done"
    );

    let started = Instant::now();
    let partial = run.count(GameState::Partial);
    let batch = build_batch(&run, ctx.season(), &ctx.scoring, options.incremental_update);
    let written = match ctx.db.write_ingest_batch(&batch) {
        Ok(written) => written,
        Err(e) => {
            warn!("database commit failed, rolling back game cache: {e:#}");
            if cache_written {
                if let Err(restore_err) = cache.restore() {
                    warn!(
                        path = %cache.path().display(),
                        "failed to restore game cache: {restore_err}"
                    );
                }
            }
            return Err(NhlError::Storage(e));
        }
    };
    for game_id in persistable_ids(&run) {
        run.mark_persisted(game_id);
    }
    info!(
        skater_rows = written.skater_rows,
        goalie_rows = written.goalie_rows,
        aggregated_players = written.aggregated_players,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "persist done"
    );

    let summary = ProcessSummary {
        requested: run.requested(),
        cache_hits,
        fetched: run.fresh_ids().len(),
        partial,
        skipped: run.count(GameState::FetchPending),
        persisted: run.count(GameState::Persisted),
        skater_rows: written.skater_rows,
        goalie_rows: written.goalie_rows,
        aggregated_players: written.aggregated_players,
    };
    info!(?summary, "processing complete");
    Ok(summary)
}

fn partition(run: &mut RunState, cache: &GameCache, use_cache: bool) {
    for game_id in run.ids_in(GameState::Unknown) {
        match use_cache.then(|| cache.final_snapshot(game_id)).flatten() {
            Some(snapshot) => run.mark_cache_hit(snapshot),
            None => run.mark_pending(game_id),
        }
    }
}

async fn fetch(run: &mut RunState, client: &NhlClient) {
    let pending = run.ids_in(GameState::FetchPending);
    if pending.is_empty() {
        return;
    }

    let outcome = merge::fetch_and_merge(client, &pending).await;
    for game_id in &outcome.incomplete {
        warn!(game_id = %game_id, "game not completed this run");
    }
    for snapshot in outcome.complete.into_values() {
        run.mark_fetched(snapshot);
    }
    for snapshot in outcome.partial.into_values() {
        run.mark_partial(snapshot);
    }
}

/// Returns whether the cache file was rewritten.
fn update_cache(run: &RunState, cache: &mut GameCache) -> bool {
    let fresh = run.fresh_ids();
    if fresh.is_empty() {
        return false;
    }

    for &game_id in fresh {
        if let Some(snapshot) = run.snapshot(game_id) {
            if let Err(e) = cache.insert(snapshot) {
                warn!(game_id = %game_id, "failed to encode game for cache: {e}");
            }
        }
    }
    match cache.save() {
        Ok(()) => true,
        Err(e) => {
            warn!(path = %cache.path().display(), "failed to write game cache: {e}");
            false
        }
    }
}

fn build_batch(
    run: &RunState,
    season: SeasonId,
    scoring: &ScoringRules,
    incremental_update: bool,
) -> IngestBatch {
    let mut batch = IngestBatch::default();
    for snapshot in run.persistable() {
        batch.rows.extend(rows::build_rows(snapshot, season, scoring));
    }
    if incremental_update {
        batch.aggregate_games = run.fresh_ids().iter().copied().collect();
    }
    batch
}

fn persistable_ids(run: &RunState) -> Vec<GameId> {
    run.persistable().map(GameSnapshot::game_id).collect()
}
