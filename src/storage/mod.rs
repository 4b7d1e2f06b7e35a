//! Storage layer
//!
//! SQLite persistence for the pipeline's output:
//! - `models`: row types and the season-aggregate arithmetic
//! - `schema`: connection and table management
//! - `queries`: idempotent per-game upserts, batch writes, team schedule
//! - `aggregate`: incremental and full-rebuild season aggregates

pub mod aggregate;
pub mod models;
pub mod queries;
pub mod schema;

#[cfg(test)]
mod tests;

pub use models::*;
pub use schema::StatsDatabase;
