//! Per-client token buckets for the sign-in routes.

use std::sync::Arc;
use std::time::Instant;

use dashmap::DashMap;

use crate::config::RateLimitSettings;

/// Above this many tracked clients, buckets that have refilled completely are dropped.
const PRUNE_THRESHOLD: usize = 10_000;

#[derive(Debug, Clone, Copy)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

#[derive(Clone)]
pub struct AuthRateLimiter {
    buckets: Arc<DashMap<String, Bucket>>,
    capacity: f64,
    refill_per_sec: f64,
}

impl AuthRateLimiter {
    pub fn new(settings: &RateLimitSettings) -> Self {
        Self {
            buckets: Arc::new(DashMap::new()),
            capacity: f64::from(settings.burst.max(1)),
            refill_per_sec: f64::from(settings.per_minute) / 60.0,
        }
    }

    /// Take one token for `key`. `false` means the client is over its limit.
    pub fn allow(&self, key: &str) -> bool {
        self.allow_at(key, Instant::now())
    }

    pub fn allow_at(&self, key: &str, now: Instant) -> bool {
        if self.buckets.len() > PRUNE_THRESHOLD {
            self.prune(now);
        }

        let mut bucket = self.buckets.entry(key.to_owned()).or_insert(Bucket {
            tokens: self.capacity,
            last_refill: now,
        });
        bucket.tokens = self.refilled(&bucket, now);
        bucket.last_refill = now;
        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    fn refilled(&self, bucket: &Bucket, now: Instant) -> f64 {
        let elapsed = now.saturating_duration_since(bucket.last_refill).as_secs_f64();
        (bucket.tokens + elapsed * self.refill_per_sec).min(self.capacity)
    }

    fn prune(&self, now: Instant) {
        self.buckets
            .retain(|_, bucket| self.refilled(bucket, now) < self.capacity);
    }
}
