//! CLI argument definitions and parsing.

pub mod types;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use types::{GameId, SeasonId};

#[derive(Debug, Parser)]
#[clap(name = "nhl-fpts", about = "NHL fantasy points ingestion")]
pub struct Nhl {
    /// Season id, e.g. 20252026 (or set `NHL_SEASON_ID`).
    #[clap(long, global = true)]
    pub season: Option<SeasonId>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Resolve the season schedule from cache or the per-club endpoints.
    Schedule {
        /// Ignore the cached schedule and fetch every club again.
        #[clap(long)]
        refresh: bool,

        /// Rebuild the weekly per-team schedule table.
        #[clap(long)]
        weekly: bool,
    },

    /// Ingest specific games.
    Process {
        /// Game id (repeatable): `--game 2025020001 --game 2025020002`.
        #[clap(long = "game", short = 'g', required = true)]
        games: Vec<GameId>,

        /// Fetch every game even if it is cached as final.
        #[clap(long)]
        no_cache: bool,

        /// Add fetched games to season aggregates.
        #[clap(long)]
        incremental: bool,
    },

    /// Ingest every game played so far this season, then rebuild aggregates.
    SeedAll {
        /// Serve games already cached as final from disk.
        #[clap(long)]
        use_cache: bool,
    },

    /// Ingest one day's games (yesterday in the fantasy timezone by default).
    UpdateDaily {
        /// Local date to ingest, `YYYY-MM-DD`.
        #[clap(long)]
        date: Option<NaiveDate>,
    },

    /// Recompute season aggregates from stored game rows.
    RebuildAggregates,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_process_with_repeated_games() {
        let app = Nhl::parse_from([
            "nhl-fpts",
            "process",
            "--game",
            "2025020001",
            "-g",
            "2025020002",
            "--incremental",
        ]);

        match app.command {
            Commands::Process {
                games,
                no_cache,
                incremental,
            } => {
                assert_eq!(games, vec![GameId::new(2025020001), GameId::new(2025020002)]);
                assert!(!no_cache);
                assert!(incremental);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_global_season_after_subcommand() {
        let app = Nhl::parse_from(["nhl-fpts", "rebuild-aggregates", "--season", "20242025"]);
        assert_eq!(app.season, Some(SeasonId::new(20242025).unwrap()));
    }

    #[test]
    fn test_update_daily_date() {
        let app = Nhl::parse_from(["nhl-fpts", "update-daily", "--date", "2025-11-02"]);
        match app.command {
            Commands::UpdateDaily { date } => {
                assert_eq!(date, NaiveDate::from_ymd_opt(2025, 11, 2));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_invalid_season_rejected() {
        assert!(Nhl::try_parse_from(["nhl-fpts", "--season", "20252027", "schedule"]).is_err());
    }
}
