use std::net::SocketAddr;
use std::time::Duration;

use sea_orm::Database;
use tracing::info;

use airlytics_core::tracing::init_tracing;
use airlytics_monitor::config::{MonitorConfig, OtpStoreKind};
use airlytics_monitor::infra::clock::SystemClock;
use airlytics_monitor::infra::db::DbOtpRepository;
use airlytics_monitor::infra::mail::AppMailer;
use airlytics_monitor::infra::otp::{MemoryOtpStore, OtpBackend, spawn_otp_sweeper};
use airlytics_monitor::infra::rate_limit::AuthRateLimiter;
use airlytics_monitor::router::build_router;
use airlytics_monitor::state::AppState;

#[tokio::main]
async fn main() {
    init_tracing();

    let config = MonitorConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let mailer = AppMailer::from_config(&config.mail).expect("invalid mail configuration");

    let otp_store = match config.otp.store {
        OtpStoreKind::Memory => OtpBackend::Memory(MemoryOtpStore::new()),
        OtpStoreKind::Database => OtpBackend::Database(DbOtpRepository { db: db.clone() }),
    };
    let _sweeper = spawn_otp_sweeper(
        otp_store.clone(),
        SystemClock,
        Duration::from_secs(config.otp.sweep_interval_secs),
    );

    info!(
        mail = mailer.transport_name(),
        otp_store = ?config.otp.store,
        otp_policy = ?config.otp.policy,
        "otp configured"
    );

    let state = AppState {
        db,
        jwt_secret: config.jwt_secret,
        cookie_domain: config.cookie_domain,
        otp_store,
        mailer,
        otp: config.otp,
        password_hash_cost: config.password_hash_cost,
        auth_limiter: AuthRateLimiter::new(&config.auth_rate_limit),
        overview_default_limit: config.overview_default_limit,
    };

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.monitor_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("monitor service listening on {addr}");
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("server error");
}
