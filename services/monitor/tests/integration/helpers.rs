use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use uuid::Uuid;

use airlytics_domain::aqi::classify;
use airlytics_domain::city::CityLookup;
use airlytics_domain::pollutant::{Pollutant, PollutantLevels};
use airlytics_domain::user::UserRole;
use airlytics_monitor::domain::repository::{
    CityRepository, Clock, MailMessage, Mailer, ReadingRepository, SummaryRepository,
    UserRepository,
};
use airlytics_monitor::domain::types::{
    City, CityFilter, DailySummary, NewReading, Page, Reading, ReadingQuery, User,
};
use airlytics_monitor::error::{MailError, MonitorError};

/// Lowest bcrypt cost; keeps hashing fast in tests.
pub const TEST_HASH_COST: u32 = 4;
pub const TEST_SECRET: &str = "monitor-integration-secret";
/// Password of every fixture user; satisfies the strength rules.
pub const TEST_PASSWORD: &str = "Blue-Kite42";

// ── Clock ─────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct TestClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl TestClock {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

impl Clock for TestClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap()
}

// ── Mailer ────────────────────────────────────────────────────────────────────

/// Records every message; fails each send when `failure` is set.
#[derive(Clone)]
pub struct TestMailer {
    pub sent: Arc<Mutex<Vec<MailMessage>>>,
    pub failure: Option<MailError>,
}

impl TestMailer {
    pub fn new() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            failure: None,
        }
    }

    pub fn failing(error: MailError) -> Self {
        Self {
            failure: Some(error),
            ..Self::new()
        }
    }

    pub fn sent_handle(&self) -> Arc<Mutex<Vec<MailMessage>>> {
        Arc::clone(&self.sent)
    }
}

impl Mailer for TestMailer {
    async fn send(&self, message: &MailMessage) -> Result<(), MailError> {
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

/// Pull the six-digit code out of an OTP email body.
pub fn code_from(message: &MailMessage) -> String {
    message
        .text
        .split_whitespace()
        .map(|word| word.trim_end_matches('.'))
        .find(|word| word.len() == 6 && word.bytes().all(|b| b.is_ascii_digit()))
        .map(str::to_owned)
        .unwrap_or_else(|| panic!("no code in message: {}", message.text))
}

/// A syntactically valid code that differs from `code`.
pub fn wrong_code(code: &str) -> String {
    if code == "000000" {
        "111111".to_owned()
    } else {
        "000000".to_owned()
    }
}

// ── Users ─────────────────────────────────────────────────────────────────────

pub struct MockUserRepo {
    pub users: Arc<Mutex<Vec<User>>>,
}

impl MockUserRepo {
    pub fn new(users: Vec<User>) -> Self {
        Self {
            users: Arc::new(Mutex::new(users)),
        }
    }

    pub fn empty() -> Self {
        Self::new(vec![])
    }

    pub fn users_handle(&self) -> Arc<Mutex<Vec<User>>> {
        Arc::clone(&self.users)
    }
}

impl UserRepository for MockUserRepo {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, MonitorError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, MonitorError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn create(&self, user: &User) -> Result<(), MonitorError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == user.email) {
            return Err(MonitorError::UserAlreadyExists);
        }
        users.push(user.clone());
        Ok(())
    }
}

/// A user whose password is [`TEST_PASSWORD`].
pub fn test_user(email: &str, role: UserRole) -> User {
    User {
        id: Uuid::new_v4(),
        name: "Test User".to_owned(),
        email: email.to_owned(),
        password_hash: bcrypt::hash(TEST_PASSWORD, TEST_HASH_COST).unwrap(),
        role,
        created_at: base_time(),
        updated_at: base_time(),
    }
}

// ── Cities ────────────────────────────────────────────────────────────────────

pub struct MockCityRepo {
    pub cities: Vec<City>,
}

impl MockCityRepo {
    pub fn new(cities: Vec<City>) -> Self {
        Self { cities }
    }

    fn by_id(&self) -> Vec<City> {
        let mut cities = self.cities.clone();
        cities.sort_by_key(|c| c.id);
        cities
    }
}

impl CityRepository for MockCityRepo {
    async fn find(&self, lookup: &CityLookup) -> Result<Option<City>, MonitorError> {
        Ok(self
            .cities
            .iter()
            .find(|c| match lookup {
                CityLookup::Id(id) => c.id == *id,
                CityLookup::SlugOrName(key) => c.slug == key.to_lowercase() || c.name == *key,
            })
            .cloned())
    }

    async fn list(&self, filter: &CityFilter) -> Result<Vec<City>, MonitorError> {
        let search = filter.search.as_deref().map(str::to_lowercase);
        let mut cities: Vec<City> = self
            .cities
            .iter()
            .filter(|c| {
                search
                    .as_deref()
                    .is_none_or(|s| c.name.to_lowercase().contains(s))
            })
            .filter(|c| filter.is_indian.is_none_or(|v| c.is_indian == v))
            .cloned()
            .collect();
        cities.sort_by(|a, b| a.name.cmp(&b.name));
        cities.truncate(filter.limit as usize);
        Ok(cities)
    }

    async fn find_by_ids(
        &self,
        ids: Option<&[i32]>,
        limit: Option<u64>,
    ) -> Result<Vec<City>, MonitorError> {
        let mut cities = self.by_id();
        match ids {
            Some(ids) => cities.retain(|c| ids.contains(&c.id)),
            None => {
                if let Some(limit) = limit {
                    cities.truncate(limit as usize);
                }
            }
        }
        Ok(cities)
    }

    async fn count(&self) -> Result<u64, MonitorError> {
        Ok(self.cities.len() as u64)
    }
}

pub fn test_city(id: i32, name: &str, region: Option<&str>) -> City {
    City {
        id,
        slug: name.to_lowercase().replace(' ', "-"),
        name: name.to_owned(),
        latitude: 28.6,
        longitude: 77.2,
        region: region.map(str::to_owned),
        country: "India".to_owned(),
        is_indian: true,
        population: None,
        timezone: Some("Asia/Kolkata".to_owned()),
    }
}

// ── Readings ──────────────────────────────────────────────────────────────────

pub struct MockReadingRepo {
    pub readings: Arc<Mutex<Vec<Reading>>>,
}

impl MockReadingRepo {
    pub fn new(readings: Vec<Reading>) -> Self {
        Self {
            readings: Arc::new(Mutex::new(readings)),
        }
    }

    pub fn empty() -> Self {
        Self::new(vec![])
    }

    pub fn readings_handle(&self) -> Arc<Mutex<Vec<Reading>>> {
        Arc::clone(&self.readings)
    }
}

impl ReadingRepository for MockReadingRepo {
    async fn find_since(
        &self,
        city_id: i32,
        since: DateTime<Utc>,
    ) -> Result<Vec<Reading>, MonitorError> {
        let mut found: Vec<Reading> = self
            .readings
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.city_id == city_id && r.recorded_at >= since)
            .cloned()
            .collect();
        found.sort_by_key(|r| r.recorded_at);
        Ok(found)
    }

    async fn latest_for_city(&self, city_id: i32) -> Result<Option<Reading>, MonitorError> {
        let readings = self.readings.lock().unwrap();
        Ok(readings
            .iter()
            .filter(|r| r.city_id == city_id)
            .max_by_key(|r| r.recorded_at)
            .cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Reading>, MonitorError> {
        let readings = self.readings.lock().unwrap();
        Ok(readings.iter().find(|r| r.id == id).cloned())
    }

    async fn page(&self, query: &ReadingQuery) -> Result<Page<Reading>, MonitorError> {
        let mut matched: Vec<Reading> = self
            .readings
            .lock()
            .unwrap()
            .iter()
            .filter(|r| query.city_id.is_none_or(|id| r.city_id == id))
            .filter(|r| query.start.is_none_or(|start| r.recorded_at >= start))
            .filter(|r| query.end.is_none_or(|end| r.recorded_at <= end))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
        let total = matched.len() as u64;
        let items = matched
            .into_iter()
            .skip(query.page.offset() as usize)
            .take(query.page.limit as usize)
            .collect();
        Ok(Page { items, total })
    }

    async fn create(&self, reading: &NewReading) -> Result<Reading, MonitorError> {
        let mut readings = self.readings.lock().unwrap();
        let created = Reading {
            id: readings.iter().map(|r| r.id).max().unwrap_or_default() + 1,
            city_id: reading.city_id,
            user_id: reading.user_id,
            recorded_at: reading.recorded_at,
            aqi: reading.aqi,
            levels: reading.levels,
            dominant_pollutant: reading.dominant_pollutant,
            aqi_category: reading.aqi_category,
            temperature: reading.temperature,
            humidity: reading.humidity,
            wind_speed: reading.wind_speed,
            data_source: reading.data_source.clone(),
            created_at: reading.created_at,
            updated_at: reading.created_at,
        };
        readings.push(created.clone());
        Ok(created)
    }

    async fn update(&self, reading: &Reading) -> Result<Reading, MonitorError> {
        let mut readings = self.readings.lock().unwrap();
        let slot = readings
            .iter_mut()
            .find(|r| r.id == reading.id)
            .ok_or(MonitorError::ReadingNotFound)?;
        *slot = reading.clone();
        Ok(reading.clone())
    }

    async fn delete(&self, id: i64) -> Result<bool, MonitorError> {
        let mut readings = self.readings.lock().unwrap();
        let before = readings.len();
        readings.retain(|r| r.id != id);
        Ok(readings.len() != before)
    }
}

pub fn test_reading(id: i64, city_id: i32, recorded_at: DateTime<Utc>, aqi: i32) -> Reading {
    let levels = PollutantLevels {
        pm25: f64::from(aqi) / 2.0,
        pm10: f64::from(aqi) / 3.0,
        co: 0.8,
        no2: 20.0,
        so2: 5.0,
        o3: 30.0,
    };
    Reading {
        id,
        city_id,
        user_id: None,
        recorded_at,
        aqi,
        levels,
        dominant_pollutant: levels.dominant(),
        aqi_category: classify(aqi),
        temperature: Some(24.0),
        humidity: Some(60.0),
        wind_speed: None,
        data_source: Some("test".to_owned()),
        created_at: recorded_at,
        updated_at: recorded_at,
    }
}

// ── Summaries ─────────────────────────────────────────────────────────────────

pub struct MockSummaryRepo {
    pub summaries: Arc<Mutex<Vec<DailySummary>>>,
}

impl MockSummaryRepo {
    pub fn new(summaries: Vec<DailySummary>) -> Self {
        Self {
            summaries: Arc::new(Mutex::new(summaries)),
        }
    }

    pub fn empty() -> Self {
        Self::new(vec![])
    }

    pub fn summaries_handle(&self) -> Arc<Mutex<Vec<DailySummary>>> {
        Arc::clone(&self.summaries)
    }
}

impl SummaryRepository for MockSummaryRepo {
    async fn find_recent(
        &self,
        city_id: i32,
        limit: u64,
    ) -> Result<Vec<DailySummary>, MonitorError> {
        let mut found: Vec<DailySummary> = self
            .summaries
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.city_id == city_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.date.cmp(&a.date));
        found.truncate(limit as usize);
        Ok(found)
    }

    async fn find_latest_before(
        &self,
        city_id: i32,
        before: NaiveDate,
    ) -> Result<Option<DailySummary>, MonitorError> {
        let summaries = self.summaries.lock().unwrap();
        Ok(summaries
            .iter()
            .filter(|s| s.city_id == city_id && s.date < before)
            .max_by_key(|s| s.date)
            .cloned())
    }

    async fn find_for_cities(&self, city_ids: &[i32]) -> Result<Vec<DailySummary>, MonitorError> {
        let mut found: Vec<DailySummary> = self
            .summaries
            .lock()
            .unwrap()
            .iter()
            .filter(|s| city_ids.contains(&s.city_id))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(found)
    }

    async fn upsert_many(&self, summaries: &[DailySummary]) -> Result<u64, MonitorError> {
        let mut stored = self.summaries.lock().unwrap();
        for summary in summaries {
            match stored
                .iter_mut()
                .find(|s| s.city_id == summary.city_id && s.date == summary.date)
            {
                Some(existing) => *existing = summary.clone(),
                None => stored.push(summary.clone()),
            }
        }
        Ok(summaries.len() as u64)
    }
}

pub fn test_summary(city_id: i32, date: NaiveDate, avg_aqi: f64, trend_score: f64) -> DailySummary {
    DailySummary {
        city_id,
        date,
        avg_aqi,
        min_aqi: avg_aqi as i32,
        max_aqi: avg_aqi as i32,
        avg_levels: PollutantLevels {
            pm25: avg_aqi / 2.0,
            ..PollutantLevels::default()
        },
        dominant_pollutant: Pollutant::Pm25,
        trend_score,
        reading_count: 1,
    }
}
