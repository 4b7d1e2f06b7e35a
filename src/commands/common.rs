//! Shared resources and output helpers for command handlers.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::{
    cli::types::SeasonId,
    config::Config,
    ingest::{IngestContext, ProcessSummary},
    nhl::{get_schedule, http::NhlClient, Schedule},
    storage::StatsDatabase,
    Result,
};

/// Context containing common resources needed by most commands
pub struct CommandContext {
    pub config: Config,
    pub client: NhlClient,
    pub db: StatsDatabase,
}

impl CommandContext {
    /// Load configuration from the environment, applying a season override.
    pub fn from_env(season: Option<SeasonId>) -> Result<Self> {
        let mut config = Config::from_env()?;
        if let Some(season) = season {
            config = config.with_season(season);
        }
        Self::from_config(config)
    }

    pub fn from_config(config: Config) -> Result<Self> {
        let client = NhlClient::new(&config)?;
        let db = StatsDatabase::open(&config.database_file)?;
        Ok(Self { config, client, db })
    }

    pub fn season(&self) -> SeasonId {
        self.config.season
    }

    pub fn ingest(&mut self) -> IngestContext<'_> {
        IngestContext::new(&self.config, &self.client, &mut self.db)
    }

    pub async fn schedule(&self, force_refresh: bool) -> Schedule {
        get_schedule(
            &self.client,
            &self.config.schedule_cache_path(),
            self.config.schedule_max_age,
            force_refresh,
        )
        .await
    }
}

/// Today's date in the fantasy timezone.
pub fn local_today(tz: Tz, now: DateTime<Utc>) -> NaiveDate {
    now.with_timezone(&tz).date_naive()
}

/// The day before `now`'s local date.
pub fn local_yesterday(tz: Tz, now: DateTime<Utc>) -> NaiveDate {
    local_today(tz, now) - Duration::days(1)
}

pub fn print_summary(summary: &ProcessSummary) {
    println!(
        "✓ {} of {} games persisted ({} from cache, {} fetched, {} partial, {} skipped)",
        summary.persisted,
        summary.requested,
        summary.cache_hits,
        summary.fetched,
        summary.partial,
        summary.skipped
    );
    println!(
        "  rows: {} skater, {} goalie; season aggregates updated for {} players",
        summary.skater_rows, summary.goalie_rows, summary.aggregated_players
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_local_dates_follow_timezone() {
        // 03:30 UTC on Nov 2 is still Nov 1 in New York.
        let now = Utc.with_ymd_and_hms(2025, 11, 2, 3, 30, 0).unwrap();
        let tz: Tz = "America/New_York".parse().unwrap();

        assert_eq!(local_today(tz, now), NaiveDate::from_ymd_opt(2025, 11, 1).unwrap());
        assert_eq!(
            local_yesterday(tz, now),
            NaiveDate::from_ymd_opt(2025, 10, 31).unwrap()
        );
        assert_eq!(
            local_today(chrono_tz::UTC, now),
            NaiveDate::from_ymd_opt(2025, 11, 2).unwrap()
        );
    }
}
