use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use airlytics_domain::aqi::classify;
use airlytics_domain::city::CityLookup;
use airlytics_domain::pagination::PageRequest;
use airlytics_domain::pollutant::PollutantLevels;
use airlytics_domain::user::UserRole;

use crate::domain::repository::{CityRepository, Clock, ReadingRepository};
use crate::domain::types::{GUEST_READING_LIMIT, MAX_AQI, NewReading, Reading, ReadingQuery};
use crate::error::MonitorError;

fn validate(aqi: i32, levels: &PollutantLevels) -> Result<(), MonitorError> {
    if !(0..=MAX_AQI).contains(&aqi) {
        return Err(MonitorError::InvalidReading(format!(
            "aqi must be between 0 and {MAX_AQI}"
        )));
    }
    for (pollutant, value) in levels.entries() {
        if !value.is_finite() || value < 0.0 {
            return Err(MonitorError::InvalidReading(format!(
                "{} must be a non-negative number",
                pollutant.as_str()
            )));
        }
    }
    Ok(())
}

// ── CreateReading ────────────────────────────────────────────────────────────

pub struct CreateReadingInput {
    pub city_id: i32,
    pub recorded_at: Option<DateTime<Utc>>,
    pub aqi: i32,
    pub levels: PollutantLevels,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub wind_speed: Option<f64>,
    pub data_source: Option<String>,
}

pub struct CreateReadingUseCase<Ci, R, C>
where
    Ci: CityRepository,
    R: ReadingRepository,
    C: Clock,
{
    pub cities: Ci,
    pub readings: R,
    pub clock: C,
}

impl<Ci, R, C> CreateReadingUseCase<Ci, R, C>
where
    Ci: CityRepository,
    R: ReadingRepository,
    C: Clock,
{
    pub async fn execute(
        &self,
        author: Uuid,
        input: CreateReadingInput,
    ) -> Result<Reading, MonitorError> {
        validate(input.aqi, &input.levels)?;

        let city = self
            .cities
            .find(&CityLookup::Id(input.city_id))
            .await?
            .ok_or(MonitorError::CityNotFound)?;

        let now = self.clock.now();
        let reading = NewReading {
            city_id: city.id,
            user_id: Some(author),
            recorded_at: input.recorded_at.unwrap_or(now),
            aqi: input.aqi,
            levels: input.levels,
            dominant_pollutant: input.levels.dominant(),
            aqi_category: classify(input.aqi),
            temperature: input.temperature,
            humidity: input.humidity,
            wind_speed: input.wind_speed,
            data_source: input.data_source,
            created_at: now,
        };
        self.readings.create(&reading).await
    }
}

// ── GetReading ───────────────────────────────────────────────────────────────

pub struct GetReadingUseCase<R: ReadingRepository> {
    pub repo: R,
}

impl<R: ReadingRepository> GetReadingUseCase<R> {
    pub async fn execute(&self, id: i64) -> Result<Reading, MonitorError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(MonitorError::ReadingNotFound)
    }
}

// ── UpdateReading ────────────────────────────────────────────────────────────

/// Fields a client may change on a reading. Anything else in the body is rejected.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReadingPatch {
    pub recorded_at: Option<DateTime<Utc>>,
    pub aqi: Option<i32>,
    pub pm25: Option<f64>,
    pub pm10: Option<f64>,
    pub co: Option<f64>,
    pub no2: Option<f64>,
    pub so2: Option<f64>,
    pub o3: Option<f64>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub wind_speed: Option<f64>,
    pub data_source: Option<String>,
}

impl ReadingPatch {
    /// Copy the set fields onto `reading` and recompute the derived ones.
    pub fn apply(self, reading: &mut Reading) {
        fn set<T>(slot: &mut T, value: Option<T>) {
            if let Some(value) = value {
                *slot = value;
            }
        }

        set(&mut reading.recorded_at, self.recorded_at);
        set(&mut reading.aqi, self.aqi);
        set(&mut reading.levels.pm25, self.pm25);
        set(&mut reading.levels.pm10, self.pm10);
        set(&mut reading.levels.co, self.co);
        set(&mut reading.levels.no2, self.no2);
        set(&mut reading.levels.so2, self.so2);
        set(&mut reading.levels.o3, self.o3);
        if self.temperature.is_some() {
            reading.temperature = self.temperature;
        }
        if self.humidity.is_some() {
            reading.humidity = self.humidity;
        }
        if self.wind_speed.is_some() {
            reading.wind_speed = self.wind_speed;
        }
        if self.data_source.is_some() {
            reading.data_source = self.data_source;
        }

        reading.dominant_pollutant = reading.levels.dominant();
        reading.aqi_category = classify(reading.aqi);
    }
}

pub struct UpdateReadingUseCase<R: ReadingRepository, C: Clock> {
    pub repo: R,
    pub clock: C,
}

impl<R: ReadingRepository, C: Clock> UpdateReadingUseCase<R, C> {
    /// Only the author or an admin may edit a reading.
    pub async fn execute(
        &self,
        user_id: Uuid,
        role: UserRole,
        id: i64,
        patch: ReadingPatch,
    ) -> Result<Reading, MonitorError> {
        let mut reading = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(MonitorError::ReadingNotFound)?;
        if reading.user_id != Some(user_id) && !role.is_admin() {
            return Err(MonitorError::Forbidden);
        }

        patch.apply(&mut reading);
        validate(reading.aqi, &reading.levels)?;
        reading.updated_at = self.clock.now();
        self.repo.update(&reading).await
    }
}

// ── DeleteReading ────────────────────────────────────────────────────────────

pub struct DeleteReadingUseCase<R: ReadingRepository> {
    pub repo: R,
}

impl<R: ReadingRepository> DeleteReadingUseCase<R> {
    pub async fn execute(&self, role: UserRole, id: i64) -> Result<(), MonitorError> {
        if !role.is_admin() {
            return Err(MonitorError::Forbidden);
        }
        if !self.repo.delete(id).await? {
            return Err(MonitorError::ReadingNotFound);
        }
        Ok(())
    }
}

// ── ListReadings ─────────────────────────────────────────────────────────────

pub struct ListReadingsInput {
    pub city_id: Option<i32>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub page: PageRequest,
    pub guest: bool,
}

#[derive(Debug, Serialize)]
pub struct ReadingPage {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub readings: Vec<Reading>,
}

pub struct ListReadingsUseCase<R: ReadingRepository> {
    pub repo: R,
}

impl<R: ReadingRepository> ListReadingsUseCase<R> {
    pub async fn execute(&self, input: ListReadingsInput) -> Result<ReadingPage, MonitorError> {
        let page = if input.guest {
            input.page.capped(GUEST_READING_LIMIT)
        } else {
            input.page.clamped()
        };
        let result = self
            .repo
            .page(&ReadingQuery {
                city_id: input.city_id,
                start: input.start,
                end: input.end,
                page,
            })
            .await?;
        Ok(ReadingPage {
            page: page.page,
            limit: page.limit,
            total: result.total,
            readings: result.items,
        })
    }
}
