//! Type-safe wrappers and enums for NHL data.

pub mod ids;
pub mod position;
pub mod time;

pub use ids::{GameId, PlayerId};
pub use position::{Decision, PlayerKind, Position};
pub use time::SeasonId;
