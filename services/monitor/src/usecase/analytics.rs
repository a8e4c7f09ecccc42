use chrono::{DateTime, Duration, NaiveTime, Utc};
use serde::Serialize;

use airlytics_domain::city::CityLookup;

use crate::domain::analytics::{
    CityAnalytics, Overview, build_city_analytics, build_daily_summaries, build_overview,
};
use crate::domain::repository::{Clock, CityRepository, ReadingRepository, SummaryRepository};
use crate::domain::types::{
    PATTERN_WINDOW_DAYS, RECENT_SUMMARY_LIMIT, REFRESH_WINDOW_DAYS, TREND_WINDOW_HOURS,
};
use crate::error::MonitorError;

// ── CityAnalytics ─────────────────────────────────────────────────────────────

pub struct CityAnalyticsUseCase<Ci, R, Su, C>
where
    Ci: CityRepository,
    R: ReadingRepository,
    Su: SummaryRepository,
    C: Clock,
{
    pub cities: Ci,
    pub readings: R,
    pub summaries: Su,
    pub clock: C,
}

impl<Ci, R, Su, C> CityAnalyticsUseCase<Ci, R, Su, C>
where
    Ci: CityRepository,
    R: ReadingRepository,
    Su: SummaryRepository,
    C: Clock,
{
    pub async fn execute(&self, lookup: &CityLookup) -> Result<CityAnalytics, MonitorError> {
        let city = self
            .cities
            .find(lookup)
            .await?
            .ok_or(MonitorError::CityNotFound)?;

        let now = self.clock.now();
        let recent = self
            .readings
            .find_since(city.id, now - Duration::hours(TREND_WINDOW_HOURS))
            .await?;
        let extended = self
            .readings
            .find_since(city.id, now - Duration::days(PATTERN_WINDOW_DAYS))
            .await?;
        let summaries = self
            .summaries
            .find_recent(city.id, RECENT_SUMMARY_LIMIT)
            .await?;

        Ok(build_city_analytics(city, &recent, &extended, &summaries))
    }
}

// ── Overview ──────────────────────────────────────────────────────────────────

pub struct OverviewInput {
    /// `Some(vec![])` is an explicit filter that matches nothing.
    pub city_ids: Option<Vec<i32>>,
}

pub struct OverviewUseCase<Ci, Su>
where
    Ci: CityRepository,
    Su: SummaryRepository,
{
    pub cities: Ci,
    pub summaries: Su,
    /// Cities taken when no id filter is given.
    pub default_limit: u64,
}

impl<Ci, Su> OverviewUseCase<Ci, Su>
where
    Ci: CityRepository,
    Su: SummaryRepository,
{
    pub async fn execute(&self, input: OverviewInput) -> Result<Overview, MonitorError> {
        if input.city_ids.as_ref().is_some_and(Vec::is_empty) {
            return Ok(Overview::empty());
        }

        let cities = self
            .cities
            .find_by_ids(input.city_ids.as_deref(), Some(self.default_limit))
            .await?;
        if cities.is_empty() {
            return Ok(Overview::empty());
        }

        let ids: Vec<i32> = cities.iter().map(|c| c.id).collect();
        let summaries = self.summaries.find_for_cities(&ids).await?;
        Ok(build_overview(&cities, &summaries))
    }
}

// ── RefreshSummaries ──────────────────────────────────────────────────────────

pub struct RefreshSummariesInput {
    /// Every city when unset.
    pub city_ids: Option<Vec<i32>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RefreshSummariesOutput {
    pub cities: usize,
    pub summaries: u64,
}

/// Rebuild daily summaries from the recent reading window.
///
/// The window starts at UTC midnight so its oldest day is rebuilt from all of that day's
/// readings.
pub struct RefreshSummariesUseCase<Ci, R, Su, C>
where
    Ci: CityRepository,
    R: ReadingRepository,
    Su: SummaryRepository,
    C: Clock,
{
    pub cities: Ci,
    pub readings: R,
    pub summaries: Su,
    pub clock: C,
}

impl<Ci, R, Su, C> RefreshSummariesUseCase<Ci, R, Su, C>
where
    Ci: CityRepository,
    R: ReadingRepository,
    Su: SummaryRepository,
    C: Clock,
{
    pub async fn execute(
        &self,
        input: RefreshSummariesInput,
    ) -> Result<RefreshSummariesOutput, MonitorError> {
        let cities = self
            .cities
            .find_by_ids(input.city_ids.as_deref(), None)
            .await?;
        let since = window_start(self.clock.now());

        let mut written = 0;
        for city in &cities {
            let readings = self.readings.find_since(city.id, since).await?;
            let Some(first_day) = readings.iter().map(|r| r.recorded_at.date_naive()).min()
            else {
                continue;
            };
            let previous = self
                .summaries
                .find_latest_before(city.id, first_day)
                .await?;
            let summaries = build_daily_summaries(city.id, &readings, previous.as_ref());
            written += self.summaries.upsert_many(&summaries).await?;
        }

        tracing::info!(cities = cities.len(), summaries = written, "daily summaries refreshed");
        Ok(RefreshSummariesOutput {
            cities: cities.len(),
            summaries: written,
        })
    }
}

/// Midnight UTC of the first day in the refresh window.
fn window_start(now: DateTime<Utc>) -> DateTime<Utc> {
    (now - Duration::days(REFRESH_WINDOW_DAYS))
        .date_naive()
        .and_time(NaiveTime::MIN)
        .and_utc()
}
