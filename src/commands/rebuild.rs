//! Rebuild command: recompute season aggregates from stored game rows.

use super::common::CommandContext;
use crate::Result;

pub fn handle_rebuild_aggregates(ctx: &mut CommandContext) -> Result<usize> {
    let season = ctx.season();
    let players = ctx.db.rebuild_season_aggregates(season)?;
    println!("✓ Season {} aggregates rebuilt for {} players", season, players);
    Ok(players)
}
