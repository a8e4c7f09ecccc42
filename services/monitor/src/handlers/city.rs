use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};

use airlytics_auth_types::identity::Viewer;
use airlytics_domain::city::CityLookup;

use crate::domain::types::{City, Reading};
use crate::error::MonitorError;
use crate::state::AppState;
use crate::usecase::city::{
    CountCitiesUseCase, GetCityUseCase, LatestReadingUseCase, ListCitiesInput, ListCitiesUseCase,
};

pub(crate) fn city_lookup(raw: &str) -> CityLookup {
    raw.parse().unwrap_or_else(|never| match never {})
}

// ── GET /cities ──────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub struct CityListQuery {
    pub search: Option<String>,
    pub is_indian: Option<bool>,
    pub limit: Option<u64>,
}

#[derive(Serialize)]
pub struct CityListResponse {
    pub count: usize,
    pub cities: Vec<City>,
}

pub async fn list_cities(
    _viewer: Viewer,
    State(state): State<AppState>,
    Query(query): Query<CityListQuery>,
) -> Result<Json<CityListResponse>, MonitorError> {
    let usecase = ListCitiesUseCase {
        repo: state.city_repo(),
    };
    let cities = usecase
        .execute(ListCitiesInput {
            search: query.search,
            is_indian: query.is_indian,
            limit: query.limit,
        })
        .await?;
    Ok(Json(CityListResponse {
        count: cities.len(),
        cities,
    }))
}

// ── GET /cities/count ────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct CityCountResponse {
    pub count: u64,
}

pub async fn count_cities(
    State(state): State<AppState>,
) -> Result<Json<CityCountResponse>, MonitorError> {
    let usecase = CountCitiesUseCase {
        repo: state.city_repo(),
    };
    Ok(Json(CityCountResponse {
        count: usecase.execute().await?,
    }))
}

// ── GET /cities/{slug_or_id} ─────────────────────────────────────────────────

pub async fn get_city(
    _viewer: Viewer,
    State(state): State<AppState>,
    Path(slug_or_id): Path<String>,
) -> Result<Json<City>, MonitorError> {
    let usecase = GetCityUseCase {
        repo: state.city_repo(),
    };
    Ok(Json(usecase.execute(&city_lookup(&slug_or_id)).await?))
}

// ── GET /cities/{slug_or_id}/latest ──────────────────────────────────────────

pub async fn get_latest_reading(
    _viewer: Viewer,
    State(state): State<AppState>,
    Path(slug_or_id): Path<String>,
) -> Result<Json<Reading>, MonitorError> {
    let usecase = LatestReadingUseCase {
        cities: state.city_repo(),
        readings: state.reading_repo(),
    };
    Ok(Json(usecase.execute(&city_lookup(&slug_or_id)).await?))
}
