use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use airlytics_auth_types::identity::{Member, Viewer};
use airlytics_domain::pagination::{DEFAULT_LIMIT, PageRequest};
use airlytics_domain::pollutant::PollutantLevels;

use crate::domain::types::Reading;
use crate::error::MonitorError;
use crate::state::AppState;
use crate::usecase::reading::{
    CreateReadingInput, CreateReadingUseCase, DeleteReadingUseCase, GetReadingUseCase,
    ListReadingsInput, ListReadingsUseCase, ReadingPage, ReadingPatch, UpdateReadingUseCase,
};

// ── POST /readings ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateReadingRequest {
    pub city_id: i32,
    pub recorded_at: Option<DateTime<Utc>>,
    pub aqi: i32,
    pub pm25: f64,
    pub pm10: f64,
    pub co: f64,
    pub no2: f64,
    pub so2: f64,
    pub o3: f64,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub wind_speed: Option<f64>,
    pub data_source: Option<String>,
}

pub async fn create_reading(
    Member(info): Member,
    State(state): State<AppState>,
    Json(body): Json<CreateReadingRequest>,
) -> Result<(StatusCode, Json<Reading>), MonitorError> {
    let usecase = CreateReadingUseCase {
        cities: state.city_repo(),
        readings: state.reading_repo(),
        clock: state.clock(),
    };
    let reading = usecase
        .execute(
            info.user_id,
            CreateReadingInput {
                city_id: body.city_id,
                recorded_at: body.recorded_at,
                aqi: body.aqi,
                levels: PollutantLevels {
                    pm25: body.pm25,
                    pm10: body.pm10,
                    co: body.co,
                    no2: body.no2,
                    so2: body.so2,
                    o3: body.o3,
                },
                temperature: body.temperature,
                humidity: body.humidity,
                wind_speed: body.wind_speed,
                data_source: body.data_source,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(reading)))
}

// ── GET /readings/{id} ───────────────────────────────────────────────────────

pub async fn get_reading(
    _member: Member,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Reading>, MonitorError> {
    let usecase = GetReadingUseCase {
        repo: state.reading_repo(),
    };
    Ok(Json(usecase.execute(id).await?))
}

// ── PATCH /readings/{id} ─────────────────────────────────────────────────────

pub async fn update_reading(
    Member(info): Member,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<ReadingPatch>,
) -> Result<Json<Reading>, MonitorError> {
    let usecase = UpdateReadingUseCase {
        repo: state.reading_repo(),
        clock: state.clock(),
    };
    let reading = usecase.execute(info.user_id, info.role, id, patch).await?;
    Ok(Json(reading))
}

// ── DELETE /readings/{id} ────────────────────────────────────────────────────

pub async fn delete_reading(
    Member(info): Member,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, MonitorError> {
    let usecase = DeleteReadingUseCase {
        repo: state.reading_repo(),
    };
    usecase.execute(info.role, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── GET /readings ────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub struct ReadingListQuery {
    pub city_id: Option<i32>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

pub async fn list_readings(
    viewer: Viewer,
    State(state): State<AppState>,
    Query(query): Query<ReadingListQuery>,
) -> Result<Json<ReadingPage>, MonitorError> {
    let usecase = ListReadingsUseCase {
        repo: state.reading_repo(),
    };
    let page = usecase
        .execute(ListReadingsInput {
            city_id: query.city_id,
            start: query.start,
            end: query.end,
            page: PageRequest {
                limit: query.limit.unwrap_or(DEFAULT_LIMIT),
                page: query.page.unwrap_or(1),
            },
            guest: viewer.is_guest(),
        })
        .await?;
    Ok(Json(page))
}
