//! Entry point: parse CLI and dispatch to command handlers.

use clap::Parser;
use nhl_fpts::{
    cli::{Commands, Nhl},
    commands::{
        process::handle_process,
        rebuild::handle_rebuild_aggregates,
        schedule::handle_schedule,
        seed_games::{handle_seed_all, handle_update_daily},
        CommandContext,
    },
    Result,
};
use tracing_subscriber::EnvFilter;

/// Run the CLI.
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("nhl_fpts=info")),
        )
        .init();

    let app = Nhl::parse();
    let mut ctx = CommandContext::from_env(app.season)?;

    match app.command {
        Commands::Schedule { refresh, weekly } => {
            handle_schedule(&mut ctx, refresh, weekly).await?
        }

        Commands::Process {
            games,
            no_cache,
            incremental,
        } => handle_process(&mut ctx, &games, !no_cache, incremental).await?,

        Commands::SeedAll { use_cache } => {
            handle_seed_all(&mut ctx, use_cache).await?;
        }

        Commands::UpdateDaily { date } => {
            handle_update_daily(&mut ctx, date).await?;
        }

        Commands::RebuildAggregates => {
            handle_rebuild_aggregates(&mut ctx)?;
        }
    }

    Ok(())
}
