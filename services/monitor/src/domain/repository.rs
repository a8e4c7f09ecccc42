#![allow(async_fn_in_trait)]

use airlytics_domain::city::CityLookup;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::domain::types::{
    City, CityFilter, DailySummary, NewReading, OtpRecord, Page, Reading, ReadingQuery, User,
};
use crate::error::{MailError, MonitorError};

/// Repository for registered users.
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, MonitorError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, MonitorError>;

    /// Insert a user. Fails with `UserAlreadyExists` when the email is taken.
    async fn create(&self, user: &User) -> Result<(), MonitorError>;
}

/// Read access to city reference data.
pub trait CityRepository: Send + Sync {
    async fn find(&self, lookup: &CityLookup) -> Result<Option<City>, MonitorError>;

    /// Cities matching the filter, ordered by name.
    async fn list(&self, filter: &CityFilter) -> Result<Vec<City>, MonitorError>;

    /// Exactly the given cities when `ids` is set, otherwise cities by id up to `limit`.
    async fn find_by_ids(
        &self,
        ids: Option<&[i32]>,
        limit: Option<u64>,
    ) -> Result<Vec<City>, MonitorError>;

    async fn count(&self) -> Result<u64, MonitorError>;
}

/// Repository for pollution readings.
pub trait ReadingRepository: Send + Sync {
    /// Readings for a city recorded at or after `since`, oldest first.
    async fn find_since(
        &self,
        city_id: i32,
        since: DateTime<Utc>,
    ) -> Result<Vec<Reading>, MonitorError>;

    async fn latest_for_city(&self, city_id: i32) -> Result<Option<Reading>, MonitorError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Reading>, MonitorError>;

    /// Filtered page of readings, newest first.
    async fn page(&self, query: &ReadingQuery) -> Result<Page<Reading>, MonitorError>;

    async fn create(&self, reading: &NewReading) -> Result<Reading, MonitorError>;

    /// Persist every mutable field of `reading`.
    async fn update(&self, reading: &Reading) -> Result<Reading, MonitorError>;

    /// Returns `true` if deleted, `false` if not found.
    async fn delete(&self, id: i64) -> Result<bool, MonitorError>;
}

/// Repository for per-day city rollups.
pub trait SummaryRepository: Send + Sync {
    /// The `limit` most recent summaries for a city, newest first.
    async fn find_recent(&self, city_id: i32, limit: u64)
    -> Result<Vec<DailySummary>, MonitorError>;

    /// The newest summary for a city dated strictly before `before`.
    async fn find_latest_before(
        &self,
        city_id: i32,
        before: NaiveDate,
    ) -> Result<Option<DailySummary>, MonitorError>;

    /// Every summary for the given cities, newest first.
    async fn find_for_cities(&self, city_ids: &[i32]) -> Result<Vec<DailySummary>, MonitorError>;

    /// Insert or replace by `(city_id, date)`. Returns the number of rows written.
    async fn upsert_many(&self, summaries: &[DailySummary]) -> Result<u64, MonitorError>;
}

/// Store for OTP records. At most one usable record exists per email.
pub trait OtpRepository: Send + Sync {
    /// Make every unconsumed record for `email` unusable.
    async fn invalidate(&self, email: &str) -> Result<(), MonitorError>;

    /// Store `record` as the only usable record for its email, superseding any other.
    async fn replace_active(&self, record: &OtpRecord) -> Result<(), MonitorError>;

    /// The newest unconsumed record for `email`, expired or not.
    async fn find_current(&self, email: &str) -> Result<Option<OtpRecord>, MonitorError>;

    /// Increment the failed-attempt counter of `record` and return the new count.
    async fn record_failed_attempt(&self, record: &OtpRecord) -> Result<u32, MonitorError>;

    async fn consume(&self, record: &OtpRecord, at: DateTime<Utc>) -> Result<(), MonitorError>;

    async fn remove(&self, record: &OtpRecord) -> Result<(), MonitorError>;

    /// Drop every record that expired before `now`. Returns the number removed.
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, MonitorError>;
}

/// Outgoing email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// Port for delivering email.
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &MailMessage) -> Result<(), MailError>;
}

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
