use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use airlytics_auth_types::identity::{Member, Viewer};

use crate::domain::analytics::{CityAnalytics, Overview};
use crate::error::MonitorError;
use crate::handlers::city::city_lookup;
use crate::state::AppState;
use crate::usecase::analytics::{
    CityAnalyticsUseCase, OverviewInput, OverviewUseCase, RefreshSummariesInput,
    RefreshSummariesOutput, RefreshSummariesUseCase,
};

/// `city_ids=1,2,3`. Unparseable entries are dropped; a present but empty list stays empty.
#[derive(Deserialize, Default)]
pub struct CityIdsQuery {
    pub city_ids: Option<String>,
}

impl CityIdsQuery {
    fn parse(&self) -> Option<Vec<i32>> {
        self.city_ids.as_deref().map(|raw| {
            raw.split(',')
                .filter_map(|part| part.trim().parse().ok())
                .collect()
        })
    }
}

// ── GET /analytics/cities/{slug_or_id} ───────────────────────────────────────

pub async fn get_city_analytics(
    _viewer: Viewer,
    State(state): State<AppState>,
    Path(slug_or_id): Path<String>,
) -> Result<Json<CityAnalytics>, MonitorError> {
    let usecase = CityAnalyticsUseCase {
        cities: state.city_repo(),
        readings: state.reading_repo(),
        summaries: state.summary_repo(),
        clock: state.clock(),
    };
    Ok(Json(usecase.execute(&city_lookup(&slug_or_id)).await?))
}

// ── GET /analytics/overview ──────────────────────────────────────────────────

pub async fn get_overview(
    _viewer: Viewer,
    State(state): State<AppState>,
    Query(query): Query<CityIdsQuery>,
) -> Result<Json<Overview>, MonitorError> {
    let usecase = OverviewUseCase {
        cities: state.city_repo(),
        summaries: state.summary_repo(),
        default_limit: state.overview_default_limit,
    };
    let overview = usecase
        .execute(OverviewInput {
            city_ids: query.parse(),
        })
        .await?;
    Ok(Json(overview))
}

// ── POST /analytics/refresh ──────────────────────────────────────────────────

pub async fn refresh_summaries(
    Member(info): Member,
    State(state): State<AppState>,
    Query(query): Query<CityIdsQuery>,
) -> Result<Json<RefreshSummariesOutput>, MonitorError> {
    if !info.role.is_admin() {
        return Err(MonitorError::Forbidden);
    }
    let usecase = RefreshSummariesUseCase {
        cities: state.city_repo(),
        readings: state.reading_repo(),
        summaries: state.summary_repo(),
        clock: state.clock(),
    };
    let out = usecase
        .execute(RefreshSummariesInput {
            city_ids: query.parse(),
        })
        .await?;
    Ok(Json(out))
}
