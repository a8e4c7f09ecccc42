use airlytics_domain::city::CityLookup;

use crate::domain::repository::{CityRepository, ReadingRepository};
use crate::domain::types::{
    CITY_LIST_DEFAULT_LIMIT, CITY_LIST_MAX_LIMIT, City, CityFilter, Reading,
};
use crate::error::MonitorError;

// ── ListCities ───────────────────────────────────────────────────────────────

pub struct ListCitiesInput {
    pub search: Option<String>,
    pub is_indian: Option<bool>,
    pub limit: Option<u64>,
}

pub struct ListCitiesUseCase<R: CityRepository> {
    pub repo: R,
}

impl<R: CityRepository> ListCitiesUseCase<R> {
    pub async fn execute(&self, input: ListCitiesInput) -> Result<Vec<City>, MonitorError> {
        let filter = CityFilter {
            search: input
                .search
                .map(|s| s.trim().to_owned())
                .filter(|s| !s.is_empty()),
            is_indian: input.is_indian,
            limit: input
                .limit
                .unwrap_or(CITY_LIST_DEFAULT_LIMIT)
                .clamp(1, CITY_LIST_MAX_LIMIT),
        };
        self.repo.list(&filter).await
    }
}

// ── CountCities ──────────────────────────────────────────────────────────────

pub struct CountCitiesUseCase<R: CityRepository> {
    pub repo: R,
}

impl<R: CityRepository> CountCitiesUseCase<R> {
    pub async fn execute(&self) -> Result<u64, MonitorError> {
        self.repo.count().await
    }
}

// ── GetCity ──────────────────────────────────────────────────────────────────

pub struct GetCityUseCase<R: CityRepository> {
    pub repo: R,
}

impl<R: CityRepository> GetCityUseCase<R> {
    pub async fn execute(&self, lookup: &CityLookup) -> Result<City, MonitorError> {
        self.repo
            .find(lookup)
            .await?
            .ok_or(MonitorError::CityNotFound)
    }
}

// ── LatestReading ────────────────────────────────────────────────────────────

pub struct LatestReadingUseCase<C: CityRepository, R: ReadingRepository> {
    pub cities: C,
    pub readings: R,
}

impl<C: CityRepository, R: ReadingRepository> LatestReadingUseCase<C, R> {
    pub async fn execute(&self, lookup: &CityLookup) -> Result<Reading, MonitorError> {
        let city = self
            .cities
            .find(lookup)
            .await?
            .ok_or(MonitorError::CityNotFound)?;
        self.readings
            .latest_for_city(city.id)
            .await?
            .ok_or(MonitorError::ReadingNotFound)
    }
}
