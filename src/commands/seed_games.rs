//! Bulk and daily ingestion commands built on the schedule.
//!
//! `seed-all` loads every past game without touching aggregates and finishes
//! with a full rebuild, since a bulk load is out of order by definition.
//! `update-daily` ingests one local day incrementally, serving anything
//! already cached as final from disk.

use chrono::{NaiveDate, Utc};
use tracing::info;

use super::{
    common::{local_today, local_yesterday, print_summary, CommandContext},
    rebuild::handle_rebuild_aggregates,
};
use crate::{
    ingest::{process_games, ProcessOptions, ProcessSummary},
    nhl::schedule::{games_on, past_game_ids},
    Result,
};

pub async fn handle_seed_all(
    ctx: &mut CommandContext,
    use_cache: bool,
) -> Result<ProcessSummary> {
    let tz = ctx.config.timezone;
    let schedule = ctx.schedule(false).await;
    let today = local_today(tz, Utc::now());
    let games = past_game_ids(&schedule, tz, today);

    println!(
        "Seeding season {}: {} games before {}",
        ctx.season(),
        games.len(),
        today
    );

    let options = ProcessOptions {
        use_cache,
        incremental_update: false,
    };
    let summary = process_games(&mut ctx.ingest(), &games, options).await?;
    print_summary(&summary);

    handle_rebuild_aggregates(ctx)?;
    Ok(summary)
}

pub async fn handle_update_daily(
    ctx: &mut CommandContext,
    date: Option<NaiveDate>,
) -> Result<ProcessSummary> {
    let tz = ctx.config.timezone;
    let date = date.unwrap_or_else(|| local_yesterday(tz, Utc::now()));
    let schedule = ctx.schedule(false).await;
    let games = games_on(&schedule, tz, date);

    if games.is_empty() {
        println!("No games on {}", date);
        return Ok(ProcessSummary::default());
    }
    info!(%date, games = games.len(), "daily update");
    println!("Updating {} games from {}...", games.len(), date);

    let options = ProcessOptions {
        use_cache: true,
        incremental_update: true,
    };
    let summary = process_games(&mut ctx.ingest(), &games, options).await?;
    print_summary(&summary);

    Ok(summary)
}
