//! Fantasy scoring: weighted-linear formulas for skaters and goalies, plus the
//! small derived stats stored next to them (time on ice, shooting %).

use crate::cli::types::Decision;
use crate::config::{GoalieWeights, SkaterWeights};

#[cfg(test)]
mod tests;

/// Skater counting stats that feed the formula.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SkaterStatLine {
    pub goals: u32,
    pub assists: u32,
    pub power_play_points: u32,
    pub shorthanded_points: u32,
    pub shots: u32,
    pub blocked_shots: u32,
    pub hits: u32,
}

/// Goalie stats that feed the formula.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GoalieStatLine {
    pub decision: Option<Decision>,
    pub goals_against: u32,
    pub saves: u32,
}

/// 0/1 flags derived from a goalie's line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GoalieFlags {
    pub win: u32,
    pub ot_loss: u32,
    pub shutout: u32,
}

impl GoalieStatLine {
    /// A goalie with no saves did not play and cannot earn a shutout.
    pub fn flags(&self) -> GoalieFlags {
        GoalieFlags {
            win: u32::from(self.decision == Some(Decision::Win)),
            ot_loss: u32::from(self.decision == Some(Decision::OvertimeLoss)),
            shutout: u32::from(self.goals_against == 0 && self.saves > 0),
        }
    }
}

pub fn skater_points(stats: &SkaterStatLine, w: &SkaterWeights) -> f64 {
    let total = f64::from(stats.goals) * w.goals
        + f64::from(stats.assists) * w.assists
        + f64::from(stats.power_play_points) * w.pp_points
        + f64::from(stats.shorthanded_points) * w.sh_points
        + f64::from(stats.shots) * w.shots
        + f64::from(stats.blocked_shots) * w.blocked_shots
        + f64::from(stats.hits) * w.hits;
    round2(total)
}

pub fn goalie_points(stats: &GoalieStatLine, w: &GoalieWeights) -> f64 {
    let flags = stats.flags();
    let total = f64::from(flags.win) * w.wins
        + f64::from(stats.goals_against) * w.goals_against
        + f64::from(stats.saves) * w.saves
        + f64::from(flags.shutout) * w.shutouts
        + f64::from(flags.ot_loss) * w.ot_losses;
    round2(total)
}

/// Round to two decimals. Non-finite input collapses to zero.
pub fn round2(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let rounded = (value * 100.0).round() / 100.0;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Fantasy points as integer hundredths, for exact accumulation.
pub fn to_centipoints(fpts: f64) -> i64 {
    if !fpts.is_finite() {
        return 0;
    }
    (fpts * 100.0).round() as i64
}

pub fn from_centipoints(centi: i64) -> f64 {
    centi as f64 / 100.0
}

/// `"MM:SS"` to seconds; anything malformed is zero.
pub fn toi_to_seconds(toi: &str) -> u32 {
    let Some((minutes, seconds)) = toi.trim().split_once(':') else {
        return 0;
    };
    match (minutes.parse::<u32>(), seconds.parse::<u32>()) {
        (Ok(m), Ok(s)) if s < 60 => m.saturating_mul(60).saturating_add(s),
        _ => 0,
    }
}

/// Goals per shot as a percentage, two decimals; `None` without shots.
pub fn shooting_pct(goals: u32, shots: u32) -> Option<f64> {
    if shots == 0 {
        return None;
    }
    Some(round2(f64::from(goals) / f64::from(shots) * 100.0))
}
