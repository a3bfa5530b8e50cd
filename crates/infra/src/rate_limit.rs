//! Windowed request rate limiting keyed by caller id.
//!
//! The in-memory limiter is process-local and resets on restart. The
//! Redis-backed limiter (cargo feature `redis`) shares its counters across
//! process instances.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("rate limit exceeded ({limit} requests per {window_secs}s)")]
pub struct RateLimitError {
    pub limit: u32,
    pub window_secs: i64,
}

/// Windowed, queryable/incrementable limiter keyed by caller id.
pub trait RateLimiter: Send + Sync {
    /// Record one request for `key`; errors when the window is full.
    fn check(&self, key: &str, now: DateTime<Utc>) -> Result<(), RateLimitError>;
}

/// Fixed window of 100 requests per 60 seconds (the platform default).
pub const DEFAULT_LIMIT: u32 = 100;
pub const DEFAULT_WINDOW_SECS: i64 = 60;

/// In-memory fixed-window limiter (per-process).
#[derive(Debug)]
pub struct FixedWindowRateLimiter {
    limit: u32,
    window: Duration,
    requests: Mutex<HashMap<String, Vec<DateTime<Utc>>>>,
}

impl FixedWindowRateLimiter {
    pub fn new(limit: u32, window_secs: i64) -> Self {
        Self {
            limit,
            window: Duration::seconds(window_secs),
            requests: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for FixedWindowRateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_LIMIT, DEFAULT_WINDOW_SECS)
    }
}

impl RateLimiter for FixedWindowRateLimiter {
    fn check(&self, key: &str, now: DateTime<Utc>) -> Result<(), RateLimitError> {
        let mut requests = match self.requests.lock() {
            Ok(r) => r,
            // A poisoned counter must not take the API down.
            Err(_) => return Ok(()),
        };

        let entry = requests.entry(key.to_string()).or_default();
        entry.retain(|t| now - *t < self.window);

        if entry.len() >= self.limit as usize {
            return Err(RateLimitError {
                limit: self.limit,
                window_secs: self.window.num_seconds(),
            });
        }

        entry.push(now);
        Ok(())
    }
}

/// Redis-backed fixed-window limiter (shared across instances).
///
/// Counter keys are bucketed per window (`detailops:rl:<key>:<bucket>`) with
/// an expiry of two windows. Redis outages fail open with a warning.
#[cfg(feature = "redis")]
pub struct RedisRateLimiter {
    client: redis::Client,
    limit: u32,
    window_secs: i64,
}

#[cfg(feature = "redis")]
impl RedisRateLimiter {
    pub fn new(client: redis::Client, limit: u32, window_secs: i64) -> Self {
        Self {
            client,
            limit,
            window_secs,
        }
    }

    fn try_check(&self, key: &str, now: DateTime<Utc>) -> redis::RedisResult<bool> {
        let bucket = now.timestamp() / self.window_secs;
        let counter = format!("detailops:rl:{key}:{bucket}");

        let mut conn = self.client.get_connection()?;
        let count: u32 = redis::cmd("INCR").arg(&counter).query(&mut conn)?;
        if count == 1 {
            let _: () = redis::cmd("EXPIRE")
                .arg(&counter)
                .arg(self.window_secs * 2)
                .query(&mut conn)?;
        }
        Ok(count <= self.limit)
    }
}

#[cfg(feature = "redis")]
impl RateLimiter for RedisRateLimiter {
    fn check(&self, key: &str, now: DateTime<Utc>) -> Result<(), RateLimitError> {
        match self.try_check(key, now) {
            Ok(true) => Ok(()),
            Ok(false) => Err(RateLimitError {
                limit: self.limit,
                window_secs: self.window_secs,
            }),
            Err(e) => {
                tracing::warn!(error = %e, "rate limiter unavailable, failing open");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_up_to_the_limit_then_rejects() {
        let limiter = FixedWindowRateLimiter::new(3, 60);
        let now = Utc::now();

        for _ in 0..3 {
            limiter.check("user-1", now).unwrap();
        }
        let err = limiter.check("user-1", now).unwrap_err();
        assert_eq!(err.limit, 3);
    }

    #[test]
    fn windows_slide_out_old_requests() {
        let limiter = FixedWindowRateLimiter::new(2, 60);
        let now = Utc::now();

        limiter.check("user-1", now).unwrap();
        limiter.check("user-1", now).unwrap();
        assert!(limiter.check("user-1", now).is_err());

        // 61 seconds later the window has drained.
        limiter
            .check("user-1", now + Duration::seconds(61))
            .unwrap();
    }

    #[test]
    fn keys_are_independent() {
        let limiter = FixedWindowRateLimiter::new(1, 60);
        let now = Utc::now();

        limiter.check("user-1", now).unwrap();
        limiter.check("user-2", now).unwrap();
        assert!(limiter.check("user-1", now).is_err());
    }
}
