//! Per-run game state, threaded through the pipeline phases.

use std::collections::BTreeMap;

use super::record::GameSnapshot;
use crate::cli::types::GameId;

/// Where one requested game stands within a `process_games` run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameState {
    Unknown,
    /// Served whole from the on-disk cache.
    CacheHit,
    /// Needs fetching, or fetching did not produce a complete game.
    FetchPending,
    Fetched,
    /// Boxscore fetched but some roster logs were not. Rows are persisted;
    /// caching and aggregation wait for a complete fetch.
    Partial,
    Persisted,
}

#[derive(Debug, Default)]
pub struct RunState {
    states: BTreeMap<GameId, GameState>,
    snapshots: BTreeMap<GameId, GameSnapshot>,
    /// Games whose rows count toward season aggregates this run.
    fresh: Vec<GameId>,
}

impl RunState {
    /// Start every requested id as `Unknown`; duplicates collapse.
    pub fn new(game_ids: &[GameId]) -> Self {
        Self {
            states: game_ids.iter().map(|&id| (id, GameState::Unknown)).collect(),
            ..Self::default()
        }
    }

    pub fn requested(&self) -> usize {
        self.states.len()
    }

    pub fn state(&self, game_id: GameId) -> Option<GameState> {
        self.states.get(&game_id).copied()
    }

    pub fn ids_in(&self, state: GameState) -> Vec<GameId> {
        self.states
            .iter()
            .filter(|(_, s)| **s == state)
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn count(&self, state: GameState) -> usize {
        self.states.values().filter(|s| **s == state).count()
    }

    pub fn mark_cache_hit(&mut self, snapshot: GameSnapshot) {
        let game_id = snapshot.game_id();
        if self.states.contains_key(&game_id) {
            self.states.insert(game_id, GameState::CacheHit);
            self.snapshots.insert(game_id, snapshot);
        }
    }

    pub fn mark_pending(&mut self, game_id: GameId) {
        if let Some(state) = self.states.get_mut(&game_id) {
            *state = GameState::FetchPending;
        }
    }

    /// Ids outside the requested set are ignored.
    pub fn mark_fetched(&mut self, snapshot: GameSnapshot) {
        let game_id = snapshot.game_id();
        if self.states.get(&game_id) == Some(&GameState::FetchPending) {
            self.states.insert(game_id, GameState::Fetched);
            self.snapshots.insert(game_id, snapshot);
            self.fresh.push(game_id);
        }
    }

    /// Like [`mark_fetched`](Self::mark_fetched), but the game stays out of
    /// the fresh set.
    pub fn mark_partial(&mut self, snapshot: GameSnapshot) {
        let game_id = snapshot.game_id();
        if self.states.get(&game_id) == Some(&GameState::FetchPending) {
            self.states.insert(game_id, GameState::Partial);
            self.snapshots.insert(game_id, snapshot);
        }
    }

    pub fn mark_persisted(&mut self, game_id: GameId) {
        if let Some(state) = self.states.get_mut(&game_id) {
            *state = GameState::Persisted;
        }
    }

    /// Games fetched during this run, in fetch order.
    pub fn fresh_ids(&self) -> &[GameId] {
        &self.fresh
    }

    pub fn snapshot(&self, game_id: GameId) -> Option<&GameSnapshot> {
        self.snapshots.get(&game_id)
    }

    /// Snapshots for every game ready to persist: cache hits, fetched and
    /// partial games.
    pub fn persistable(&self) -> impl Iterator<Item = &GameSnapshot> {
        self.states
            .iter()
            .filter(|(_, s)| {
                matches!(
                    s,
                    GameState::CacheHit | GameState::Fetched | GameState::Partial
                )
            })
            .filter_map(|(id, _)| self.snapshots.get(id))
    }
}
