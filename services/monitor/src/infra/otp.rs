use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::domain::repository::{Clock, OtpRepository};
use crate::domain::types::OtpRecord;
use crate::error::MonitorError;
use crate::infra::db::DbOtpRepository;

// ── In-memory store ───────────────────────────────────────────────────────────

/// Process-local OTP table keyed by email. Each instance owns its own map.
///
/// Consumed, superseded and expired records are dropped rather than flagged.
#[derive(Clone, Default)]
pub struct MemoryOtpStore {
    records: Arc<DashMap<String, OtpRecord>>,
}

impl MemoryOtpStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Remove the entry for `record.email` only if it is still `record`.
    fn drop_record(&self, record: &OtpRecord) {
        self.records.remove_if(&record.email, |_, current| current.id == record.id);
    }
}

impl OtpRepository for MemoryOtpStore {
    async fn invalidate(&self, email: &str) -> Result<(), MonitorError> {
        self.records.remove(email);
        Ok(())
    }

    async fn replace_active(&self, record: &OtpRecord) -> Result<(), MonitorError> {
        self.records.insert(record.email.clone(), record.clone());
        Ok(())
    }

    async fn find_current(&self, email: &str) -> Result<Option<OtpRecord>, MonitorError> {
        Ok(self
            .records
            .get(email)
            .filter(|record| record.consumed_at.is_none())
            .map(|record| record.value().clone()))
    }

    async fn record_failed_attempt(&self, record: &OtpRecord) -> Result<u32, MonitorError> {
        let attempts = self
            .records
            .get_mut(&record.email)
            .filter(|current| current.id == record.id)
            .map(|mut current| {
                current.attempt_count += 1;
                current.attempt_count
            });
        Ok(attempts.unwrap_or_default())
    }

    async fn consume(&self, record: &OtpRecord, _at: DateTime<Utc>) -> Result<(), MonitorError> {
        self.drop_record(record);
        Ok(())
    }

    async fn remove(&self, record: &OtpRecord) -> Result<(), MonitorError> {
        self.drop_record(record);
        Ok(())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, MonitorError> {
        let mut removed = 0;
        self.records.retain(|_, record| {
            let keep = !record.is_expired(now);
            if !keep {
                removed += 1;
            }
            keep
        });
        Ok(removed)
    }
}

// ── Backend selection ─────────────────────────────────────────────────────────

/// The OTP store picked at startup.
#[derive(Clone)]
pub enum OtpBackend {
    Memory(MemoryOtpStore),
    Database(DbOtpRepository),
}

impl OtpRepository for OtpBackend {
    async fn invalidate(&self, email: &str) -> Result<(), MonitorError> {
        match self {
            Self::Memory(store) => store.invalidate(email).await,
            Self::Database(store) => store.invalidate(email).await,
        }
    }

    async fn replace_active(&self, record: &OtpRecord) -> Result<(), MonitorError> {
        match self {
            Self::Memory(store) => store.replace_active(record).await,
            Self::Database(store) => store.replace_active(record).await,
        }
    }

    async fn find_current(&self, email: &str) -> Result<Option<OtpRecord>, MonitorError> {
        match self {
            Self::Memory(store) => store.find_current(email).await,
            Self::Database(store) => store.find_current(email).await,
        }
    }

    async fn record_failed_attempt(&self, record: &OtpRecord) -> Result<u32, MonitorError> {
        match self {
            Self::Memory(store) => store.record_failed_attempt(record).await,
            Self::Database(store) => store.record_failed_attempt(record).await,
        }
    }

    async fn consume(&self, record: &OtpRecord, at: DateTime<Utc>) -> Result<(), MonitorError> {
        match self {
            Self::Memory(store) => store.consume(record, at).await,
            Self::Database(store) => store.consume(record, at).await,
        }
    }

    async fn remove(&self, record: &OtpRecord) -> Result<(), MonitorError> {
        match self {
            Self::Memory(store) => store.remove(record).await,
            Self::Database(store) => store.remove(record).await,
        }
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, MonitorError> {
        match self {
            Self::Memory(store) => store.purge_expired(now).await,
            Self::Database(store) => store.purge_expired(now).await,
        }
    }
}

// ── Sweeper ───────────────────────────────────────────────────────────────────

/// Purge expired records every `every`. Expiry is still checked on verify.
pub fn spawn_otp_sweeper<C>(store: OtpBackend, clock: C, every: Duration) -> JoinHandle<()>
where
    C: Clock + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match store.purge_expired(clock.now()).await {
                Ok(0) => {}
                Ok(removed) => tracing::debug!(removed, "purged expired otp records"),
                Err(e) => tracing::warn!(error = %e, "otp sweep failed"),
            }
        }
    })
}
