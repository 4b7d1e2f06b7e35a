//! NHL fantasy points ingestion library
//!
//! Pulls game data from the public NHL web API, scores every player's line
//! under configurable fantasy weights, and keeps a local SQLite store of
//! per-game rows and per-season aggregates.
//!
//! ## Features
//!
//! - **Schedule Resolution**: season schedule from the per-club endpoints, cached on disk
//! - **Two-feed Merge**: boxscores joined with player game logs per `(game, player)`
//! - **Fantasy Scoring**: weighted skater and goalie formulas
//! - **Idempotent Storage**: upserted game rows, incremental and rebuilt season totals
//! - **Game Cache**: completed games are served from disk on later runs
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use nhl_fpts::{
//!     commands::CommandContext,
//!     ingest::{process_games, ProcessOptions},
//!     GameId,
//! };
//!
//! # async fn example() -> nhl_fpts::Result<()> {
//! let mut ctx = CommandContext::from_env(None)?;
//! let options = ProcessOptions {
//!     use_cache: true,
//!     incremental_update: true,
//! };
//! let summary = process_games(&mut ctx.ingest(), &[GameId::new(2025020001)], options).await?;
//! println!("{} games persisted", summary.persisted);
//! # Ok(())
//! # }
//! ```
//!
//! ## Environment Configuration
//!
//! Everything is read from `NHL_*` variables (or a `.env` file):
//! ```bash
//! export NHL_SEASON_ID=20252026
//! export NHL_FANTASY_TIMEZONE=America/New_York
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod core;
pub mod error;
pub mod ingest;
pub mod nhl;
pub mod storage;

// Re-export commonly used types
pub use cli::types::{Decision, GameId, PlayerId, PlayerKind, Position, SeasonId};
pub use config::{Config, GoalieWeights, ScoringRules, SkaterWeights};
pub use error::{NhlError, Result};
