//! Command implementations for the nhl-fpts CLI

pub mod common;
pub mod process;
pub mod rebuild;
pub mod schedule;
pub mod seed_games;


pub use common::CommandContext;
