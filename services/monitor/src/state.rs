use sea_orm::DatabaseConnection;

use airlytics_auth_types::identity::TokenSecret;

use crate::config::OtpSettings;
use crate::infra::clock::SystemClock;
use crate::infra::db::{
    DbCityRepository, DbReadingRepository, DbSummaryRepository, DbUserRepository,
};
use crate::infra::mail::AppMailer;
use crate::infra::otp::OtpBackend;
use crate::infra::rate_limit::AuthRateLimiter;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub jwt_secret: String,
    pub cookie_domain: String,
    /// Owned OTP table (memory) or database-backed store, chosen at startup.
    pub otp_store: OtpBackend,
    pub mailer: AppMailer,
    pub otp: OtpSettings,
    pub password_hash_cost: u32,
    /// Shared by every clone of the state; limits the sign-in routes per client.
    pub auth_limiter: AuthRateLimiter,
    pub overview_default_limit: u64,
}

impl AppState {
    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn city_repo(&self) -> DbCityRepository {
        DbCityRepository {
            db: self.db.clone(),
        }
    }

    pub fn reading_repo(&self) -> DbReadingRepository {
        DbReadingRepository {
            db: self.db.clone(),
        }
    }

    pub fn summary_repo(&self) -> DbSummaryRepository {
        DbSummaryRepository {
            db: self.db.clone(),
        }
    }

    pub fn otp_store(&self) -> OtpBackend {
        self.otp_store.clone()
    }

    pub fn mailer(&self) -> AppMailer {
        self.mailer.clone()
    }

    pub fn clock(&self) -> SystemClock {
        SystemClock
    }
}

impl TokenSecret for AppState {
    fn jwt_secret(&self) -> &str {
        &self.jwt_secret
    }
}
