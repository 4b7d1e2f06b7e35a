//! On-disk per-game cache.
//!
//! One JSON document per season, keyed by game id as a string. Entries are
//! kept as raw JSON values and decoded one at a time, so a single corrupt
//! entry only costs a re-fetch of that game.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::record::{GameSnapshot, PlayerGameRecord};
use crate::cli::types::{GameId, PlayerId};
use crate::core::cache::{remove_file, try_read_to_string, write_json, write_string};
use crate::error::Result;
use crate::nhl::types::{Boxscore, GameStatus};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameCacheEntry {
    pub cached_at: DateTime<Utc>,
    pub status: GameStatus,
    pub boxscore: Boxscore,
    pub players: BTreeMap<PlayerId, PlayerGameRecord>,
}

impl GameCacheEntry {
    pub fn from_snapshot(snapshot: &GameSnapshot, cached_at: DateTime<Utc>) -> Self {
        Self {
            cached_at,
            status: snapshot.boxscore.status(),
            boxscore: snapshot.boxscore.clone(),
            players: snapshot.players.clone(),
        }
    }

    pub fn into_snapshot(self) -> GameSnapshot {
        GameSnapshot {
            boxscore: self.boxscore,
            players: self.players,
        }
    }
}

#[derive(Debug)]
pub struct GameCache {
    path: PathBuf,
    entries: BTreeMap<String, serde_json::Value>,
    /// File content as found at load time, for [`GameCache::restore`].
    original: Option<String>,
}

impl GameCache {
    /// Read the whole cache file. A missing or unreadable file starts empty.
    pub fn load(path: &Path) -> Self {
        let original = try_read_to_string(path);
        let parsed = original
            .as_deref()
            .map(serde_json::from_str::<BTreeMap<String, serde_json::Value>>);
        let entries = match parsed {
            Some(Ok(entries)) => entries,
            Some(Err(e)) => {
                warn!(path = %path.display(), "game cache unreadable, starting empty: {e}");
                BTreeMap::new()
            }
            None => BTreeMap::new(),
        };

        Self {
            path: path.to_path_buf(),
            entries,
            original,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, game_id: GameId) -> Option<GameCacheEntry> {
        let raw = self.entries.get(&game_id.to_string())?;
        match serde_json::from_value(raw.clone()) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(game_id = %game_id, "corrupt game cache entry: {e}");
                None
            }
        }
    }

    /// The cached game, only if it was cached as final.
    pub fn final_snapshot(&self, game_id: GameId) -> Option<GameSnapshot> {
        let entry = self.entry(game_id)?;
        if !entry.status.is_final() {
            debug!(game_id = %game_id, status = entry.status.as_str(), "cached game not final");
            return None;
        }
        Some(entry.into_snapshot())
    }

    pub fn insert(&mut self, snapshot: &GameSnapshot) -> Result<()> {
        let entry = GameCacheEntry::from_snapshot(snapshot, Utc::now());
        let value = serde_json::to_value(entry)?;
        self.entries.insert(snapshot.game_id().to_string(), value);
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        write_json(&self.path, &self.entries)
    }

    /// Put the file back the way [`GameCache::load`] found it.
    pub fn restore(&self) -> Result<()> {
        match &self.original {
            Some(raw) => write_string(&self.path, raw)?,
            None => remove_file(&self.path)?,
        }
        Ok(())
    }
}
