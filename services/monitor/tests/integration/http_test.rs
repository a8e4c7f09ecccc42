use axum::http::{HeaderName, HeaderValue, StatusCode, header};
use axum_test::TestServer;
use sea_orm::DatabaseConnection;
use serde_json::{Value, json};
use uuid::Uuid;

use airlytics_auth_types::token::issue_access_token;
use airlytics_domain::user::UserRole;
use airlytics_monitor::config::{OtpSettings, OtpStoreKind, RateLimitSettings};
use airlytics_monitor::infra::mail::AppMailer;
use airlytics_monitor::infra::otp::{MemoryOtpStore, OtpBackend};
use airlytics_monitor::infra::rate_limit::AuthRateLimiter;
use airlytics_monitor::router::build_router;
use airlytics_monitor::state::AppState;
use airlytics_monitor::usecase::otp::DeliveryPolicy;

use crate::helpers::{TEST_HASH_COST, TEST_PASSWORD, TEST_SECRET};

/// Router over a disconnected database. Only routes that never reach storage are
/// exercised here.
fn server(policy: DeliveryPolicy) -> TestServer {
    limited_server(policy, 1_000)
}

/// Without a peer address every test request shares one rate-limit bucket.
fn limited_server(policy: DeliveryPolicy, burst: u32) -> TestServer {
    let state = AppState {
        db: DatabaseConnection::default(),
        jwt_secret: TEST_SECRET.to_owned(),
        cookie_domain: "localhost".to_owned(),
        otp_store: OtpBackend::Memory(MemoryOtpStore::new()),
        mailer: AppMailer::Disabled,
        otp: OtpSettings {
            store: OtpStoreKind::Memory,
            policy,
            expose_codes: false,
            hash_cost: TEST_HASH_COST,
            sweep_interval_secs: 60,
        },
        password_hash_cost: TEST_HASH_COST,
        auth_limiter: AuthRateLimiter::new(&RateLimitSettings {
            burst,
            per_minute: 0,
        }),
        overview_default_limit: 20,
    };
    TestServer::new(build_router(state)).unwrap()
}

fn guest() -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("user-type"),
        HeaderValue::from_static("guest"),
    )
}

fn bearer(role: UserRole) -> (HeaderName, HeaderValue) {
    let now = chrono::Utc::now().timestamp() as u64;
    let (token, _) = issue_access_token(Uuid::new_v4(), role, TEST_SECRET, now).unwrap();
    (
        header::AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
    )
}

#[tokio::test]
async fn should_answer_healthz_with_request_id() {
    let server = server(DeliveryPolicy::Fallback);

    let resp = server.get("/healthz").await;

    resp.assert_status_ok();
    assert!(resp.maybe_header("x-request-id").is_some());
}

#[tokio::test]
async fn should_report_unknown_code_on_verify() {
    let server = server(DeliveryPolicy::Fallback);

    let resp = server
        .post("/auth/otp/verify")
        .json(&json!({ "email": "alice@example.com", "otp": "123456" }))
        .await;

    resp.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(resp.json::<Value>()["kind"], "NOT_FOUND");
}

#[tokio::test]
async fn should_rate_limit_auth_routes_per_client() {
    let server = limited_server(DeliveryPolicy::Fallback, 2);
    let verify = json!({ "email": "alice@example.com", "otp": "123456" });

    for _ in 0..2 {
        let resp = server.post("/auth/otp/verify").json(&verify).await;
        resp.assert_status(StatusCode::BAD_REQUEST);
    }

    let resp = server.post("/auth/otp/verify").json(&verify).await;
    resp.assert_status(StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(resp.json::<Value>()["kind"], "RATE_LIMITED");

    // The bucket covers every sign-in route, not just the one that drained it.
    let resp = server
        .post("/auth/otp")
        .json(&json!({ "email": "alice@example.com", "password": TEST_PASSWORD }))
        .await;
    resp.assert_status(StatusCode::TOO_MANY_REQUESTS);

    let resp = server
        .post("/auth/otp/verify")
        .add_header(
            HeaderName::from_static("x-forwarded-for"),
            HeaderValue::from_static("203.0.113.9"),
        )
        .json(&verify)
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);

    // Data routes are not limited.
    let resp = server.get("/healthz").await;
    resp.assert_status_ok();
}

#[tokio::test]
async fn should_reject_weak_password_on_registration() {
    let server = server(DeliveryPolicy::Fallback);

    let resp = server
        .post("/users")
        .json(&json!({ "name": "Asha Rao", "email": "asha@example.com", "password": "short" }))
        .await;

    resp.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = resp.json();
    assert_eq!(body["kind"], "WEAK_PASSWORD");
    assert_eq!(body["message"], "Password must be at least 8 characters long");
}

#[tokio::test]
async fn should_reject_invalid_email() {
    let server = server(DeliveryPolicy::Fallback);

    let resp = server
        .post("/auth/otp")
        .json(&json!({ "email": "not-an-email", "password": TEST_PASSWORD }))
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(resp.json::<Value>()["kind"], "INVALID_EMAIL");

    let resp = server
        .post("/auth/token")
        .json(&json!({ "email": "not-an-email", "otp": "123456" }))
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(resp.json::<Value>()["kind"], "INVALID_EMAIL");
}

#[tokio::test]
async fn should_require_identity_on_data_routes() {
    let server = server(DeliveryPolicy::Fallback);

    for path in [
        "/cities",
        "/cities/delhi",
        "/readings",
        "/readings/1",
        "/analytics/overview",
        "/users/@me",
    ] {
        let resp = server.get(path).await;
        resp.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(resp.json::<Value>()["kind"], "UNAUTHORIZED", "{path}");
    }

    let resp = server
        .get("/cities")
        .add_header(header::AUTHORIZATION, HeaderValue::from_static("Bearer garbage"))
        .await;
    resp.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_serve_city_count_without_identity() {
    let server = server(DeliveryPolicy::Fallback);

    // Reaches the disconnected store instead of the identity check on `/cities/{slug_or_id}`.
    let resp = server.get("/cities/count").await;

    resp.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(resp.json::<Value>()["kind"], "INTERNAL");
}

#[tokio::test]
async fn should_keep_guests_away_from_writes() {
    let server = server(DeliveryPolicy::Fallback);
    let (name, value) = guest();

    let resp = server
        .post("/readings")
        .add_header(name.clone(), value.clone())
        .json(&json!({ "city_id": 1, "aqi": 80 }))
        .await;
    resp.assert_status(StatusCode::FORBIDDEN);
    assert_eq!(resp.json::<Value>()["kind"], "GUEST_RESTRICTION");

    let resp = server
        .get("/users/@me")
        .add_header(name, value)
        .await;
    resp.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn should_return_empty_overview_for_guest_with_empty_filter() {
    let server = server(DeliveryPolicy::Fallback);
    let (name, value) = guest();

    let resp = server
        .get("/analytics/overview")
        .add_query_param("city_ids", "")
        .add_header(name, value)
        .await;

    resp.assert_status_ok();
    let body: Value = resp.json();
    assert_eq!(body["cities"], json!([]));
    assert_eq!(body["unranked_cities"], json!([]));
    assert_eq!(body["rankings"]["most_improved"], json!([]));
    assert_eq!(body["three_day_aggregate_change"], json!([]));
}

#[tokio::test]
async fn should_restrict_admin_actions_to_admins() {
    let server = server(DeliveryPolicy::Fallback);
    let (name, value) = bearer(UserRole::Member);

    let resp = server
        .delete("/readings/1")
        .add_header(name.clone(), value.clone())
        .await;
    resp.assert_status(StatusCode::FORBIDDEN);
    assert_eq!(resp.json::<Value>()["kind"], "FORBIDDEN");

    let resp = server
        .post("/analytics/refresh")
        .add_header(name, value)
        .await;
    resp.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn should_reject_patch_with_unknown_fields() {
    let server = server(DeliveryPolicy::Fallback);
    let (name, value) = bearer(UserRole::Member);

    let resp = server
        .patch("/readings/1")
        .add_header(name, value)
        .json(&json!({ "aqi": 90, "user_id": Uuid::new_v4() }))
        .await;

    resp.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn should_clear_cookie_on_token_revoke() {
    let server = server(DeliveryPolicy::Fallback);

    let resp = server.delete("/auth/token").await;

    resp.assert_status(StatusCode::NO_CONTENT);
    let cookie = resp.header(header::SET_COOKIE);
    assert!(
        cookie
            .to_str()
            .unwrap()
            .starts_with("airlytics_access_token=")
    );
}
