//! Three-phase fetch and merge.
//!
//! Boxscores come first because they decide which players' season logs are
//! needed at all. Logs are then fetched once per distinct player and the two
//! feeds are joined on `(game, player)`.

use futures_util::future::join_all;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, info, warn};

use super::record::{GameSnapshot, PlayerGameRecord};
use crate::cli::types::{GameId, PlayerId};
use crate::nhl::{
    http::NhlClient,
    types::{Boxscore, GameLogEntry},
};

/// Result of fetching one batch of games.
#[derive(Debug, Default)]
pub struct MergeOutcome {
    /// Games with a boxscore and every roster log fetched.
    pub complete: BTreeMap<GameId, GameSnapshot>,
    /// Games with a boxscore where some roster logs failed to fetch. Their
    /// snapshots hold only the players whose logs arrived.
    pub partial: BTreeMap<GameId, GameSnapshot>,
    /// Requested games without a usable boxscore.
    pub incomplete: BTreeSet<GameId>,
}

/// Fetch boxscores and player logs for `game_ids` and merge them.
pub async fn fetch_and_merge(client: &NhlClient, game_ids: &[GameId]) -> MergeOutcome {
    let targets: BTreeSet<GameId> = game_ids.iter().copied().collect();

    // Phase 1: boxscores
    let fetched = join_all(targets.iter().map(|&id| async move {
        (id, client.fetch_game_boxscore(id).await)
    }))
    .await;

    let mut boxscores = BTreeMap::new();
    for (requested, boxscore) in fetched {
        match boxscore {
            Some(b) if b.id == requested => {
                boxscores.insert(requested, b);
            }
            Some(b) => warn!(
                game_id = %requested,
                returned = %b.id,
                "boxscore id does not match request, skipping"
            ),
            None => {}
        }
    }

    // Phase 2: distinct players that appeared in a target game
    let players: BTreeSet<PlayerId> = boxscores
        .values()
        .flat_map(|b| b.player_ids())
        .collect();
    info!(
        games = boxscores.len(),
        players = players.len(),
        "boxscores fetched, fetching player logs"
    );

    let logs: HashMap<PlayerId, Vec<GameLogEntry>> = join_all(
        players
            .iter()
            .map(|&player_id| client.fetch_player_log(player_id)),
    )
    .await
    .into_iter()
    .flatten()
    .collect();

    let gaps: BTreeSet<GameId> = boxscores
        .iter()
        .filter_map(|(&game_id, boxscore)| {
            let missing = missing_logs(boxscore, &logs);
            (missing > 0).then(|| {
                warn!(
                    game_id = %game_id,
                    missing,
                    "player logs missing, persisting partial game"
                );
                game_id
            })
        })
        .collect();

    // Phase 3: merge
    let merged = merge_records(boxscores, &logs);
    let (partial, complete): (BTreeMap<_, _>, BTreeMap<_, _>) = merged
        .into_iter()
        .partition(|(game_id, _)| gaps.contains(game_id));
    let incomplete = targets
        .into_iter()
        .filter(|id| !complete.contains_key(id) && !partial.contains_key(id))
        .collect();

    MergeOutcome {
        complete,
        partial,
        incomplete,
    }
}

/// Roster players of `boxscore` whose log fetch failed.
pub fn missing_logs(boxscore: &Boxscore, logs: &HashMap<PlayerId, Vec<GameLogEntry>>) -> usize {
    boxscore
        .player_ids()
        .filter(|id| !logs.contains_key(id))
        .count()
}

/// Join boxscores with player logs.
///
/// Every boxscore yields a snapshot. A player with no log entry for that
/// game, whether the log lacks it or the fetch failed, is dropped, as is a
/// log entry with no boxscore line.
pub fn merge_records(
    boxscores: BTreeMap<GameId, Boxscore>,
    logs: &HashMap<PlayerId, Vec<GameLogEntry>>,
) -> BTreeMap<GameId, GameSnapshot> {
    let mut records: HashMap<(GameId, PlayerId), PlayerGameRecord> = HashMap::new();
    for (&player_id, entries) in logs {
        for entry in entries {
            if boxscores.contains_key(&entry.game_id) {
                records.insert(
                    (entry.game_id, player_id),
                    PlayerGameRecord::from_log(player_id, entry),
                );
            }
        }
    }

    let mut snapshots = BTreeMap::new();
    for (game_id, boxscore) in boxscores {
        let mut snapshot = GameSnapshot::new(boxscore);
        for side in snapshot.boxscore.sides() {
            for line in side.skaters() {
                let Some(mut record) = records.remove(&(game_id, line.player_id)) else {
                    debug!(game_id = %game_id, player_id = %line.player_id, "no log entry");
                    continue;
                };
                match record.merge_skater(line) {
                    Ok(()) => {
                        snapshot.players.insert(line.player_id, record);
                    }
                    Err(e) => warn!(
                        game_id = %game_id,
                        player_id = %line.player_id,
                        "skipping skater: {e}"
                    ),
                }
            }
            for line in &side.goalies {
                let Some(mut record) = records.remove(&(game_id, line.player_id)) else {
                    debug!(game_id = %game_id, player_id = %line.player_id, "no log entry");
                    continue;
                };
                record.merge_goalie(line);
                snapshot.players.insert(line.player_id, record);
            }
        }
        snapshots.insert(game_id, snapshot);
    }

    snapshots
}
