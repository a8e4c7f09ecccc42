use airlytics_core::serde::to_rfc3339_ms;
use airlytics_domain::aqi::AqiCategory;
use airlytics_domain::pagination::PageRequest;
use airlytics_domain::pollutant::{Pollutant, PollutantLevels};
use airlytics_domain::user::UserRole;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

// ── Users ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    /// bcrypt hash of the account password. Never serialized.
    #[serde(skip)]
    pub password_hash: String,
    pub role: UserRole,
    #[serde(serialize_with = "to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
}

// ── Cities ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct City {
    pub id: i32,
    pub slug: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub region: Option<String>,
    pub country: String,
    pub is_indian: bool,
    pub population: Option<i64>,
    pub timezone: Option<String>,
}

impl City {
    /// Grouping key for regional averages: the region, or the country when unset.
    pub fn region_key(&self) -> &str {
        self.region
            .as_deref()
            .filter(|r| !r.trim().is_empty())
            .unwrap_or(&self.country)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CityFilter {
    /// Case-insensitive substring of the city name.
    pub search: Option<String>,
    pub is_indian: Option<bool>,
    pub limit: u64,
}

pub const CITY_LIST_DEFAULT_LIMIT: u64 = 200;
pub const CITY_LIST_MAX_LIMIT: u64 = 500;

// ── Readings ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reading {
    pub id: i64,
    pub city_id: i32,
    pub user_id: Option<Uuid>,
    #[serde(serialize_with = "to_rfc3339_ms")]
    pub recorded_at: DateTime<Utc>,
    pub aqi: i32,
    #[serde(flatten)]
    pub levels: PollutantLevels,
    pub dominant_pollutant: Pollutant,
    pub aqi_category: AqiCategory,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub wind_speed: Option<f64>,
    pub data_source: Option<String>,
    #[serde(serialize_with = "to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
}

/// A reading about to be inserted. Derived fields are already filled in.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReading {
    pub city_id: i32,
    pub user_id: Option<Uuid>,
    pub recorded_at: DateTime<Utc>,
    pub aqi: i32,
    pub levels: PollutantLevels,
    pub dominant_pollutant: Pollutant,
    pub aqi_category: AqiCategory,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub wind_speed: Option<f64>,
    pub data_source: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReadingQuery {
    pub city_id: Option<i32>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub page: PageRequest,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}

pub const MAX_AQI: i32 = 500;
/// Page size ceiling for guest viewers.
pub const GUEST_READING_LIMIT: u32 = 5;

// ── Daily summaries ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySummary {
    pub city_id: i32,
    pub date: NaiveDate,
    pub avg_aqi: f64,
    pub min_aqi: i32,
    pub max_aqi: i32,
    pub avg_levels: PollutantLevels,
    pub dominant_pollutant: Pollutant,
    /// `avg_aqi` minus the previous available day's `avg_aqi`. Negative means improving.
    pub trend_score: f64,
    pub reading_count: u32,
}

// ── Analytics windows ─────────────────────────────────────────────────────────

pub const TREND_WINDOW_HOURS: i64 = 72;
pub const PATTERN_WINDOW_DAYS: i64 = 30;
pub const RECENT_SUMMARY_LIMIT: u64 = 7;
pub const IMPROVEMENT_TRACKER_LEN: usize = 3;
pub const AGGREGATE_TREND_DAYS: usize = 3;
pub const MOST_IMPROVED_LIMIT: usize = 3;
pub const OVERVIEW_DEFAULT_LIMIT: u64 = 20;
/// Readings older than this are not rolled into daily summaries on refresh.
pub const REFRESH_WINDOW_DAYS: i64 = 30;

// ── OTP ───────────────────────────────────────────────────────────────────────

/// One-time password issued to an email address.
///
/// Only the bcrypt hash of the code is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpRecord {
    pub id: Uuid,
    /// Account whose password check led to this code, when issued through login.
    pub user_id: Option<Uuid>,
    pub email: String,
    pub code_hash: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub attempt_count: u32,
    pub consumed_at: Option<DateTime<Utc>>,
}

impl OtpRecord {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    pub fn is_locked(&self) -> bool {
        self.attempt_count >= MAX_OTP_ATTEMPTS
    }
}

/// Why a verification attempt failed. Exactly one reason per attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpFailure {
    NotFound,
    Expired,
    AttemptsExceeded,
    Mismatch,
}

impl OtpFailure {
    pub fn reason(self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::Expired => "EXPIRED",
            Self::AttemptsExceeded => "ATTEMPTS_EXCEEDED",
            Self::Mismatch => "MISMATCH",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::NotFound => "No OTP request found for this email.",
            Self::Expired => "This OTP has expired. Please request a new one.",
            Self::AttemptsExceeded => "Too many invalid attempts. Please request a new OTP.",
            Self::Mismatch => "Invalid OTP. Please try again.",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// Carries the account the code was issued for, if any.
    Verified { user_id: Option<Uuid> },
    Failed(OtpFailure),
}

/// Result of issuing a code.
///
/// `code` is only set when delivery fell back or code exposure is configured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuedOtp {
    #[serde(serialize_with = "to_rfc3339_ms")]
    pub expires_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub fallback: bool,
}

/// Digits in an OTP code.
pub const OTP_LEN: usize = 6;
/// OTP time-to-live in seconds (5 minutes).
pub const OTP_TTL_SECS: i64 = 300;
/// Failed attempts after which a code is locked.
pub const MAX_OTP_ATTEMPTS: u32 = 5;

