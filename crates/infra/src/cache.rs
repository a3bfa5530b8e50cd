//! Bare TTL cache.
//!
//! No invalidation hook is tied to underlying mutations; readers may observe
//! entries up to `ttl` stale, which callers accept by construction.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::RwLock;

use chrono::{DateTime, Duration, Utc};

/// TTL-bounded key/value cache. Time is a parameter, so expiry is
/// deterministic under test.
#[derive(Debug)]
pub struct TtlCache<K, V> {
    ttl: Duration,
    inner: RwLock<HashMap<K, (DateTime<Utc>, V)>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Clone + Eq + Hash,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            inner: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_ttl_seconds(seconds: i64) -> Self {
        Self::new(Duration::seconds(seconds))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fetch a live entry; expired entries are evicted lazily.
    pub fn get(&self, key: &K, now: DateTime<Utc>) -> Option<V> {
        {
            let map = self.inner.read().ok()?;
            match map.get(key) {
                Some((stored_at, value)) if now - *stored_at < self.ttl => {
                    return Some(value.clone());
                }
                Some(_) => {}
                None => return None,
            }
        }

        if let Ok(mut map) = self.inner.write() {
            if let Some((stored_at, _)) = map.get(key) {
                if now - *stored_at >= self.ttl {
                    map.remove(key);
                }
            }
        }
        None
    }

    pub fn put(&self, key: K, value: V, now: DateTime<Utc>) {
        if let Ok(mut map) = self.inner.write() {
            map.insert(key, (now, value));
        }
    }

    pub fn clear(&self) {
        if let Ok(mut map) = self.inner.write() {
            map.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_live_until_the_ttl_and_not_past_it() {
        let cache: TtlCache<&'static str, u32> = TtlCache::with_ttl_seconds(60);
        let t0 = Utc::now();

        cache.put("report", 7, t0);
        assert_eq!(cache.get(&"report", t0 + Duration::seconds(59)), Some(7));
        assert_eq!(cache.get(&"report", t0 + Duration::seconds(60)), None);
        // And the expired entry is gone afterwards.
        assert_eq!(cache.get(&"report", t0), None);
    }

    #[test]
    fn put_overwrites_and_restarts_the_clock() {
        let cache: TtlCache<&'static str, u32> = TtlCache::with_ttl_seconds(60);
        let t0 = Utc::now();

        cache.put("report", 1, t0);
        cache.put("report", 2, t0 + Duration::seconds(50));
        assert_eq!(cache.get(&"report", t0 + Duration::seconds(100)), Some(2));
    }
}
