//! Schedule command: resolve the season schedule and optionally rebuild the
//! weekly per-team table.

use chrono::Utc;

use super::common::{local_today, CommandContext};
use crate::{
    nhl::schedule::{games_on, schedule_by_date, weekly_team_schedule},
    Result,
};

pub async fn handle_schedule(
    ctx: &mut CommandContext,
    refresh: bool,
    weekly: bool,
) -> Result<()> {
    let tz = ctx.config.timezone;
    let schedule = ctx.schedule(refresh).await;
    let by_date = schedule_by_date(&schedule, tz);

    println!(
        "Season {}: {} regular-season games",
        ctx.season(),
        schedule.len()
    );
    if let (Some(first), Some(last)) = (by_date.keys().next(), by_date.keys().next_back()) {
        println!("  {} to {} ({} game days)", first, last, by_date.len());
    }

    let today = local_today(tz, Utc::now());
    println!("  {} games today ({})", games_on(&schedule, tz, today).len(), today);

    if weekly {
        let weeks = weekly_team_schedule(&schedule, tz);
        let written = ctx.db.replace_team_schedule(&weeks)?;
        println!("✓ Team schedule rebuilt: {} team-weeks", written);
    }

    Ok(())
}
