//! Process command: ingest an explicit list of games.

use super::common::{print_summary, CommandContext};
use crate::{
    cli::types::GameId,
    ingest::{process_games, ProcessOptions},
    Result,
};

pub async fn handle_process(
    ctx: &mut CommandContext,
    games: &[GameId],
    use_cache: bool,
    incremental_update: bool,
) -> Result<()> {
    println!("Processing {} games for season {}...", games.len(), ctx.season());

    let options = ProcessOptions {
        use_cache,
        incremental_update,
    };
    let summary = process_games(&mut ctx.ingest(), games, options).await?;
    print_summary(&summary);

    Ok(())
}
