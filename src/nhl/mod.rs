//! NHL web API: payload models, client, schedule resolution, scoring and the
//! static club table.

pub mod compute;
pub mod http;
pub mod schedule;
pub mod teams;
pub mod types;

pub use http::NhlClient;
pub use schedule::{get_schedule, GameMeta, Schedule, TeamWeek};
pub use types::{Boxscore, GameLogEntry, GameStatus};
