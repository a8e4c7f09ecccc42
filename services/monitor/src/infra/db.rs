use anyhow::Context as _;
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait,
    ActiveValue::{NotSet, Set},
    ColumnTrait, Condition, DatabaseConnection, DatabaseTransaction, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, SqlErr, TransactionTrait,
    sea_query::{Expr, Func, OnConflict},
};
use uuid::Uuid;

use airlytics_domain::aqi::{AqiCategory, classify};
use airlytics_domain::city::CityLookup;
use airlytics_domain::pollutant::{Pollutant, PollutantLevels};
use airlytics_domain::user::UserRole;
use airlytics_monitor_schema::{
    cities, city_daily_summaries, otp_tokens, pollution_readings, users,
};

use crate::domain::repository::{
    CityRepository, OtpRepository, ReadingRepository, SummaryRepository, UserRepository,
};
use crate::domain::types::{
    City, CityFilter, DailySummary, NewReading, OtpRecord, Page, Reading, ReadingQuery, User,
};
use crate::error::MonitorError;

// ── User repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl UserRepository for DbUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, MonitorError> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
            .context("find user by email")?;
        Ok(model.map(user_from_model))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, MonitorError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user by id")?;
        Ok(model.map(user_from_model))
    }

    async fn create(&self, user: &User) -> Result<(), MonitorError> {
        users::ActiveModel {
            id: Set(user.id),
            name: Set(user.name.clone()),
            email: Set(user.email.clone()),
            password_hash: Set(user.password_hash.clone()),
            role: Set(i16::from(user.role.as_u8())),
            created_at: Set(user.created_at),
            updated_at: Set(user.updated_at),
        }
        .insert(&self.db)
        .await
        .map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => MonitorError::UserAlreadyExists,
            _ => MonitorError::Internal(anyhow::Error::new(e).context("create user")),
        })?;
        Ok(())
    }
}

fn user_from_model(model: users::Model) -> User {
    User {
        id: model.id,
        name: model.name,
        email: model.email,
        password_hash: model.password_hash,
        role: u8::try_from(model.role)
            .ok()
            .and_then(UserRole::from_u8)
            .unwrap_or(UserRole::Member),
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

// ── City repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbCityRepository {
    pub db: DatabaseConnection,
}

impl CityRepository for DbCityRepository {
    async fn find(&self, lookup: &CityLookup) -> Result<Option<City>, MonitorError> {
        let query = match lookup {
            CityLookup::Id(id) => cities::Entity::find_by_id(*id),
            CityLookup::SlugOrName(key) => cities::Entity::find().filter(
                Condition::any()
                    .add(cities::Column::Slug.eq(key.to_lowercase()))
                    .add(cities::Column::Name.eq(key.as_str())),
            ),
        };
        let model = query
            .order_by_asc(cities::Column::Id)
            .one(&self.db)
            .await
            .context("find city")?;
        Ok(model.map(city_from_model))
    }

    async fn list(&self, filter: &CityFilter) -> Result<Vec<City>, MonitorError> {
        let mut query = cities::Entity::find();
        if let Some(search) = &filter.search {
            let pattern = format!("%{}%", escape_like(&search.to_lowercase()));
            let name = Expr::expr(Func::lower(Expr::col(cities::Column::Name)));
            query = query.filter(name.like(pattern));
        }
        if let Some(is_indian) = filter.is_indian {
            query = query.filter(cities::Column::IsIndian.eq(is_indian));
        }
        let models = query
            .order_by_asc(cities::Column::Name)
            .limit(filter.limit)
            .all(&self.db)
            .await
            .context("list cities")?;
        Ok(models.into_iter().map(city_from_model).collect())
    }

    async fn find_by_ids(
        &self,
        ids: Option<&[i32]>,
        limit: Option<u64>,
    ) -> Result<Vec<City>, MonitorError> {
        let mut query = cities::Entity::find().order_by_asc(cities::Column::Id);
        match ids {
            Some(ids) => query = query.filter(cities::Column::Id.is_in(ids.iter().copied())),
            None => {
                if let Some(limit) = limit {
                    query = query.limit(limit);
                }
            }
        }
        let models = query.all(&self.db).await.context("find cities by ids")?;
        Ok(models.into_iter().map(city_from_model).collect())
    }

    async fn count(&self) -> Result<u64, MonitorError> {
        let count = cities::Entity::find()
            .count(&self.db)
            .await
            .context("count cities")?;
        Ok(count)
    }
}

fn escape_like(raw: &str) -> String {
    raw.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

fn city_from_model(model: cities::Model) -> City {
    City {
        id: model.id,
        slug: model.slug,
        name: model.name,
        latitude: model.latitude,
        longitude: model.longitude,
        region: model.region,
        country: model.country,
        is_indian: model.is_indian,
        population: model.population,
        timezone: model.timezone,
    }
}

// ── Reading repository ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbReadingRepository {
    pub db: DatabaseConnection,
}

impl ReadingRepository for DbReadingRepository {
    async fn find_since(
        &self,
        city_id: i32,
        since: DateTime<Utc>,
    ) -> Result<Vec<Reading>, MonitorError> {
        let models = pollution_readings::Entity::find()
            .filter(pollution_readings::Column::CityId.eq(city_id))
            .filter(pollution_readings::Column::RecordedAt.gte(since))
            .order_by_asc(pollution_readings::Column::RecordedAt)
            .all(&self.db)
            .await
            .context("find readings since")?;
        Ok(models.into_iter().map(reading_from_model).collect())
    }

    async fn latest_for_city(&self, city_id: i32) -> Result<Option<Reading>, MonitorError> {
        let model = pollution_readings::Entity::find()
            .filter(pollution_readings::Column::CityId.eq(city_id))
            .order_by_desc(pollution_readings::Column::RecordedAt)
            .one(&self.db)
            .await
            .context("find latest reading")?;
        Ok(model.map(reading_from_model))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Reading>, MonitorError> {
        let model = pollution_readings::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find reading by id")?;
        Ok(model.map(reading_from_model))
    }

    async fn page(&self, query: &ReadingQuery) -> Result<Page<Reading>, MonitorError> {
        let mut select = pollution_readings::Entity::find();
        if let Some(city_id) = query.city_id {
            select = select.filter(pollution_readings::Column::CityId.eq(city_id));
        }
        if let Some(start) = query.start {
            select = select.filter(pollution_readings::Column::RecordedAt.gte(start));
        }
        if let Some(end) = query.end {
            select = select.filter(pollution_readings::Column::RecordedAt.lte(end));
        }

        let total = select
            .clone()
            .count(&self.db)
            .await
            .context("count readings")?;
        let models = select
            .order_by_desc(pollution_readings::Column::RecordedAt)
            .order_by_desc(pollution_readings::Column::Id)
            .offset(query.page.offset())
            .limit(u64::from(query.page.limit))
            .all(&self.db)
            .await
            .context("list readings")?;
        Ok(Page {
            items: models.into_iter().map(reading_from_model).collect(),
            total,
        })
    }

    async fn create(&self, reading: &NewReading) -> Result<Reading, MonitorError> {
        let model = pollution_readings::ActiveModel {
            id: NotSet,
            city_id: Set(reading.city_id),
            user_id: Set(reading.user_id),
            recorded_at: Set(reading.recorded_at),
            aqi: Set(reading.aqi),
            pm25: Set(reading.levels.pm25),
            pm10: Set(reading.levels.pm10),
            co: Set(reading.levels.co),
            no2: Set(reading.levels.no2),
            so2: Set(reading.levels.so2),
            o3: Set(reading.levels.o3),
            dominant_pollutant: Set(reading.dominant_pollutant.as_str().to_owned()),
            aqi_category: Set(reading.aqi_category.as_str().to_owned()),
            temperature: Set(reading.temperature),
            humidity: Set(reading.humidity),
            wind_speed: Set(reading.wind_speed),
            data_source: Set(reading.data_source.clone()),
            created_at: Set(reading.created_at),
            updated_at: Set(reading.created_at),
        }
        .insert(&self.db)
        .await
        .context("create reading")?;
        Ok(reading_from_model(model))
    }

    async fn update(&self, reading: &Reading) -> Result<Reading, MonitorError> {
        let model = pollution_readings::ActiveModel {
            id: Set(reading.id),
            city_id: Set(reading.city_id),
            user_id: Set(reading.user_id),
            recorded_at: Set(reading.recorded_at),
            aqi: Set(reading.aqi),
            pm25: Set(reading.levels.pm25),
            pm10: Set(reading.levels.pm10),
            co: Set(reading.levels.co),
            no2: Set(reading.levels.no2),
            so2: Set(reading.levels.so2),
            o3: Set(reading.levels.o3),
            dominant_pollutant: Set(reading.dominant_pollutant.as_str().to_owned()),
            aqi_category: Set(reading.aqi_category.as_str().to_owned()),
            temperature: Set(reading.temperature),
            humidity: Set(reading.humidity),
            wind_speed: Set(reading.wind_speed),
            data_source: Set(reading.data_source.clone()),
            created_at: NotSet,
            updated_at: Set(reading.updated_at),
        }
        .update(&self.db)
        .await
        .context("update reading")?;
        Ok(reading_from_model(model))
    }

    async fn delete(&self, id: i64) -> Result<bool, MonitorError> {
        let result = pollution_readings::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete reading")?;
        Ok(result.rows_affected > 0)
    }
}

fn reading_from_model(model: pollution_readings::Model) -> Reading {
    let levels = PollutantLevels {
        pm25: model.pm25,
        pm10: model.pm10,
        co: model.co,
        no2: model.no2,
        so2: model.so2,
        o3: model.o3,
    };
    Reading {
        id: model.id,
        city_id: model.city_id,
        user_id: model.user_id,
        recorded_at: model.recorded_at,
        aqi: model.aqi,
        levels,
        dominant_pollutant: Pollutant::parse(&model.dominant_pollutant)
            .unwrap_or_else(|| levels.dominant()),
        aqi_category: AqiCategory::parse(&model.aqi_category)
            .unwrap_or_else(|| classify(model.aqi)),
        temperature: model.temperature,
        humidity: model.humidity,
        wind_speed: model.wind_speed,
        data_source: model.data_source,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

// ── Daily summary repository ─────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbSummaryRepository {
    pub db: DatabaseConnection,
}

impl SummaryRepository for DbSummaryRepository {
    async fn find_recent(
        &self,
        city_id: i32,
        limit: u64,
    ) -> Result<Vec<DailySummary>, MonitorError> {
        let models = city_daily_summaries::Entity::find()
            .filter(city_daily_summaries::Column::CityId.eq(city_id))
            .order_by_desc(city_daily_summaries::Column::Date)
            .limit(limit)
            .all(&self.db)
            .await
            .context("find recent summaries")?;
        Ok(models.into_iter().map(summary_from_model).collect())
    }

    async fn find_latest_before(
        &self,
        city_id: i32,
        before: NaiveDate,
    ) -> Result<Option<DailySummary>, MonitorError> {
        let model = city_daily_summaries::Entity::find()
            .filter(city_daily_summaries::Column::CityId.eq(city_id))
            .filter(city_daily_summaries::Column::Date.lt(before))
            .order_by_desc(city_daily_summaries::Column::Date)
            .one(&self.db)
            .await
            .context("find summary before date")?;
        Ok(model.map(summary_from_model))
    }

    async fn find_for_cities(&self, city_ids: &[i32]) -> Result<Vec<DailySummary>, MonitorError> {
        if city_ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = city_daily_summaries::Entity::find()
            .filter(city_daily_summaries::Column::CityId.is_in(city_ids.iter().copied()))
            .order_by_desc(city_daily_summaries::Column::Date)
            .order_by_asc(city_daily_summaries::Column::CityId)
            .all(&self.db)
            .await
            .context("find summaries for cities")?;
        Ok(models.into_iter().map(summary_from_model).collect())
    }

    async fn upsert_many(&self, summaries: &[DailySummary]) -> Result<u64, MonitorError> {
        if summaries.is_empty() {
            return Ok(0);
        }
        let now = Utc::now();
        let rows = summaries.iter().map(|s| city_daily_summaries::ActiveModel {
            id: NotSet,
            city_id: Set(s.city_id),
            date: Set(s.date),
            avg_aqi: Set(s.avg_aqi),
            min_aqi: Set(s.min_aqi),
            max_aqi: Set(s.max_aqi),
            avg_pm25: Set(s.avg_levels.pm25),
            avg_pm10: Set(s.avg_levels.pm10),
            avg_co: Set(s.avg_levels.co),
            avg_no2: Set(s.avg_levels.no2),
            avg_so2: Set(s.avg_levels.so2),
            avg_o3: Set(s.avg_levels.o3),
            dominant_pollutant: Set(s.dominant_pollutant.as_str().to_owned()),
            trend_score: Set(s.trend_score),
            reading_count: Set(i32::try_from(s.reading_count).unwrap_or(i32::MAX)),
            updated_at: Set(now),
        });
        let written = city_daily_summaries::Entity::insert_many(rows)
            .on_conflict(
                OnConflict::columns([
                    city_daily_summaries::Column::CityId,
                    city_daily_summaries::Column::Date,
                ])
                .update_columns([
                    city_daily_summaries::Column::AvgAqi,
                    city_daily_summaries::Column::MinAqi,
                    city_daily_summaries::Column::MaxAqi,
                    city_daily_summaries::Column::AvgPm25,
                    city_daily_summaries::Column::AvgPm10,
                    city_daily_summaries::Column::AvgCo,
                    city_daily_summaries::Column::AvgNo2,
                    city_daily_summaries::Column::AvgSo2,
                    city_daily_summaries::Column::AvgO3,
                    city_daily_summaries::Column::DominantPollutant,
                    city_daily_summaries::Column::TrendScore,
                    city_daily_summaries::Column::ReadingCount,
                    city_daily_summaries::Column::UpdatedAt,
                ])
                .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .context("upsert daily summaries")?;
        Ok(written)
    }
}

fn summary_from_model(model: city_daily_summaries::Model) -> DailySummary {
    let avg_levels = PollutantLevels {
        pm25: model.avg_pm25,
        pm10: model.avg_pm10,
        co: model.avg_co,
        no2: model.avg_no2,
        so2: model.avg_so2,
        o3: model.avg_o3,
    };
    DailySummary {
        city_id: model.city_id,
        date: model.date,
        avg_aqi: model.avg_aqi,
        min_aqi: model.min_aqi,
        max_aqi: model.max_aqi,
        dominant_pollutant: Pollutant::parse(&model.dominant_pollutant)
            .unwrap_or_else(|| avg_levels.dominant()),
        avg_levels,
        trend_score: model.trend_score,
        reading_count: u32::try_from(model.reading_count).unwrap_or_default(),
    }
}

// ── OTP repository ───────────────────────────────────────────────────────────

/// Durable OTP store. Superseded and used rows are kept with `consumed_at` set.
#[derive(Clone)]
pub struct DbOtpRepository {
    pub db: DatabaseConnection,
}

impl OtpRepository for DbOtpRepository {
    async fn invalidate(&self, email: &str) -> Result<(), MonitorError> {
        supersede(&self.db, email, Utc::now())
            .await
            .context("invalidate otp")?;
        Ok(())
    }

    async fn replace_active(&self, record: &OtpRecord) -> Result<(), MonitorError> {
        self.db
            .transaction::<_, (), sea_orm::DbErr>(|txn| {
                let record = record.clone();
                Box::pin(async move {
                    supersede(txn, &record.email, record.issued_at).await?;
                    insert_otp(txn, &record).await?;
                    Ok(())
                })
            })
            .await
            .context("replace active otp")?;
        Ok(())
    }

    async fn find_current(&self, email: &str) -> Result<Option<OtpRecord>, MonitorError> {
        let model = otp_tokens::Entity::find()
            .filter(otp_tokens::Column::Email.eq(email))
            .filter(otp_tokens::Column::ConsumedAt.is_null())
            .order_by_desc(otp_tokens::Column::IssuedAt)
            .one(&self.db)
            .await
            .context("find current otp")?;
        Ok(model.map(otp_from_model))
    }

    async fn record_failed_attempt(&self, record: &OtpRecord) -> Result<u32, MonitorError> {
        otp_tokens::Entity::update_many()
            .col_expr(
                otp_tokens::Column::AttemptCount,
                Expr::col(otp_tokens::Column::AttemptCount).add(1),
            )
            .filter(otp_tokens::Column::Id.eq(record.id))
            .exec(&self.db)
            .await
            .context("increment otp attempts")?;
        let model = otp_tokens::Entity::find_by_id(record.id)
            .one(&self.db)
            .await
            .context("reload otp attempts")?;
        Ok(model
            .and_then(|m| u32::try_from(m.attempt_count).ok())
            .unwrap_or_default())
    }

    async fn consume(&self, record: &OtpRecord, at: DateTime<Utc>) -> Result<(), MonitorError> {
        otp_tokens::ActiveModel {
            id: Set(record.id),
            consumed_at: Set(Some(at)),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("consume otp")?;
        Ok(())
    }

    async fn remove(&self, record: &OtpRecord) -> Result<(), MonitorError> {
        otp_tokens::Entity::delete_by_id(record.id)
            .exec(&self.db)
            .await
            .context("remove otp")?;
        Ok(())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, MonitorError> {
        let result = otp_tokens::Entity::delete_many()
            .filter(otp_tokens::Column::ExpiresAt.lt(now))
            .exec(&self.db)
            .await
            .context("purge expired otps")?;
        Ok(result.rows_affected)
    }
}

async fn supersede<C>(conn: &C, email: &str, at: DateTime<Utc>) -> Result<(), sea_orm::DbErr>
where
    C: sea_orm::ConnectionTrait,
{
    otp_tokens::Entity::update_many()
        .col_expr(otp_tokens::Column::ConsumedAt, Expr::value(at))
        .filter(otp_tokens::Column::Email.eq(email))
        .filter(otp_tokens::Column::ConsumedAt.is_null())
        .exec(conn)
        .await?;
    Ok(())
}

async fn insert_otp(txn: &DatabaseTransaction, record: &OtpRecord) -> Result<(), sea_orm::DbErr> {
    otp_tokens::ActiveModel {
        id: Set(record.id),
        user_id: Set(record.user_id),
        email: Set(record.email.clone()),
        code_hash: Set(record.code_hash.clone()),
        issued_at: Set(record.issued_at),
        expires_at: Set(record.expires_at),
        consumed_at: Set(record.consumed_at),
        attempt_count: Set(i32::try_from(record.attempt_count).unwrap_or(i32::MAX)),
        created_at: Set(record.issued_at),
    }
    .insert(txn)
    .await?;
    Ok(())
}

fn otp_from_model(model: otp_tokens::Model) -> OtpRecord {
    OtpRecord {
        id: model.id,
        user_id: model.user_id,
        email: model.email,
        code_hash: model.code_hash,
        issued_at: model.issued_at,
        expires_at: model.expires_at,
        attempt_count: u32::try_from(model.attempt_count).unwrap_or_default(),
        consumed_at: model.consumed_at,
    }
}
