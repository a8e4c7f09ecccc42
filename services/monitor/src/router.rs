use std::net::SocketAddr;

use axum::{
    Router,
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, StatusCode},
    middleware::{Next, from_fn_with_state},
    response::Response,
    routing::{delete, get, patch, post},
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use airlytics_core::health::{healthz, readiness};
use airlytics_core::middleware::{propagate_request_id_layer, request_id_layer};

use crate::handlers::{
    analytics::{get_city_analytics, get_overview, refresh_summaries},
    city::{count_cities, get_city, get_latest_reading, list_cities},
    otp::{issue_otp, verify_otp},
    reading::{create_reading, delete_reading, get_reading, list_readings, update_reading},
    token::{create_token, revoke_token},
    user::{get_me, register_user},
};
use crate::error::MonitorError;
use crate::state::AppState;

async fn readyz(State(state): State<AppState>) -> StatusCode {
    readiness("database", state.db.ping().await)
}

/// First `x-forwarded-for` hop when it looks like an address.
fn forwarded_for(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get("x-forwarded-for")?.to_str().ok()?;
    let first = raw.split(',').next()?.trim();
    if first.is_empty() || first.len() > 64 {
        return None;
    }
    first
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'.' || b == b':' || b == b'-')
        .then(|| first.to_owned())
}

fn client_key(request: &Request) -> String {
    forwarded_for(request.headers())
        .or_else(|| {
            request
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
        })
        .unwrap_or_else(|| "unknown".to_owned())
}

async fn limit_auth_requests(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, MonitorError> {
    let client = client_key(&request);
    if !state.auth_limiter.allow(&client) {
        tracing::warn!(client = %client, path = %request.uri().path(), "auth rate limit exceeded");
        return Err(MonitorError::RateLimited);
    }
    Ok(next.run(request).await)
}

pub fn build_router(state: AppState) -> Router {
    let auth = Router::new()
        // OTP
        .route("/auth/otp", post(issue_otp))
        .route("/auth/otp/verify", post(verify_otp))
        // Token
        .route("/auth/token", post(create_token))
        .route("/auth/token", delete(revoke_token))
        // Users
        .route("/users", post(register_user))
        .route_layer(from_fn_with_state(state.clone(), limit_auth_requests));

    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .merge(auth)
        .route("/users/@me", get(get_me))
        // Cities
        .route("/cities", get(list_cities))
        .route("/cities/count", get(count_cities))
        .route("/cities/{slug_or_id}", get(get_city))
        .route("/cities/{slug_or_id}/latest", get(get_latest_reading))
        // Readings
        .route("/readings", get(list_readings))
        .route("/readings", post(create_reading))
        .route("/readings/{id}", get(get_reading))
        .route("/readings/{id}", patch(update_reading))
        .route("/readings/{id}", delete(delete_reading))
        // Analytics
        .route("/analytics/cities/{slug_or_id}", get(get_city_analytics))
        .route("/analytics/overview", get(get_overview))
        .route("/analytics/refresh", post(refresh_summaries))
        .layer(
            ServiceBuilder::new()
                .layer(request_id_layer())
                .layer(TraceLayer::new_for_http())
                .layer(propagate_request_id_layer()),
        )
        .with_state(state)
}
