//! A time-boxed cache layered on top of the durable [`Store`].
//!
//! [`Cache`] wraps a store, a TTL, and a reference timestamp so that callers
//! don't need to thread those values through every load/save call.

use super::store::Store;
use crate::Result;
use chrono::{DateTime, Utc};
use core::time::Duration;
use serde::{Deserialize, Serialize};

const LOG_TARGET: &str = "     cache";

/// Default time-to-live of cached entries.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60 * 60);

/// On-disk representation of a cache entry.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Envelope<T> {
    pub timestamp: DateTime<Utc>,
    pub value: T,
}

/// A TTL-aware cache over a [`Store`].
///
/// Expired entries are ignored on read but stay on disk until they are overwritten or removed.
#[derive(Debug, Clone)]
pub struct Cache {
    store: Store,
    ttl: Duration,
    now: DateTime<Utc>,
    ignore: bool,
}

impl Cache {
    /// Create a new cache.
    #[must_use]
    pub const fn new(store: Store, ttl: Duration, now: DateTime<Utc>, ignore_cache: bool) -> Self {
        Self {
            store,
            ttl,
            now,
            ignore: ignore_cache,
        }
    }

    /// Returns a copy of this cache that judges freshness, and stamps new entries, at `now`.
    #[must_use]
    pub fn at(&self, now: DateTime<Utc>) -> Self {
        Self { now, ..self.clone() }
    }

    #[must_use]
    pub const fn store(&self) -> &Store {
        &self.store
    }

    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the timestamp used by this cache.
    #[must_use]
    pub const fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// Load a fresh value for `key`.
    ///
    /// Missing, unreadable, corrupt and expired entries all yield `None`.
    #[must_use]
    pub fn load<T>(&self, key: &str) -> Option<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        if self.ignore {
            return None;
        }

        let envelope: Envelope<T> = match self.store.get(key) {
            Ok(Some(envelope)) => envelope,
            Ok(None) => {
                log::debug!(target: LOG_TARGET, "Cache miss for '{key}'");
                return None;
            }
            Err(e) => {
                log::debug!(target: LOG_TARGET, "Cache miss for '{key}': {e:#}");
                return None;
            }
        };

        // A timestamp in the future (clock skew) counts as fresh
        let age = self.now.signed_duration_since(envelope.timestamp);
        if age.num_milliseconds() < 0 {
            log::debug!(target: LOG_TARGET, "Cache timestamp is in the future for '{key}' (clock skew detected), treating as fresh");
            return Some(envelope.value);
        }

        let age_duration = age.to_std().unwrap_or(Duration::MAX);
        if age_duration > self.ttl {
            log::debug!(
                target: LOG_TARGET,
                "Cache expired for '{key}' (age: {:.1} minutes, TTL: {:.1} minutes)",
                age_duration.as_secs_f64() / 60.0,
                self.ttl.as_secs_f64() / 60.0
            );
            return None;
        }

        log::debug!(target: LOG_TARGET, "Cache hit for '{key}' (age: {:.1} minutes)", age_duration.as_secs_f64() / 60.0);
        Some(envelope.value)
    }

    /// Save `value` under `key`, stamped with this cache's timestamp.
    pub fn save<T>(&self, key: &str, value: &T) -> Result<()>
    where
        T: Serialize,
    {
        let envelope = Envelope { timestamp: self.now, value };
        self.store.put(key, &envelope)
    }

    /// Remove the entry stored under `key`.
    pub fn remove(&self, key: &str) -> Result<()> {
        self.store.remove(key)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    #[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
    struct TestData {
        name: String,
        value: u64,
    }

    fn make_cache(dir: &Path, now: DateTime<Utc>) -> Cache {
        Cache::new(Store::new(dir), DEFAULT_CACHE_TTL, now, false)
    }

    #[test]
    fn save_and_load_data() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = make_cache(tmp.path(), Utc::now());

        let data = TestData { name: "test".to_string(), value: 42 };
        cache.save("item", &data).unwrap();

        assert_eq!(cache.load::<TestData>("item"), Some(data));
    }

    #[test]
    fn load_nonexistent_entry() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = make_cache(tmp.path(), Utc::now());

        assert_eq!(cache.load::<TestData>("nope"), None);
    }

    #[test]
    fn load_invalid_json_is_miss() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = make_cache(tmp.path(), Utc::now());
        fs::write(cache.store().path_for("bad"), "not valid json").unwrap();

        assert_eq!(cache.load::<TestData>("bad"), None);
    }

    #[test]
    fn load_wrong_shape_is_miss() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = make_cache(tmp.path(), Utc::now());
        fs::write(cache.store().path_for("shape"), r#"{"t": 1, "v": {}}"#).unwrap();

        assert_eq!(cache.load::<TestData>("shape"), None);
    }

    #[test]
    fn expired_entry_is_miss_but_stays_on_disk() {
        let tmp = tempfile::tempdir().unwrap();
        let then = Utc::now();
        let cache = make_cache(tmp.path(), then);

        cache.save("item", &TestData { name: "old".to_string(), value: 1 }).unwrap();

        let later = cache.at(then + chrono::Duration::hours(2));
        assert_eq!(later.load::<TestData>("item"), None);
        assert!(cache.store().path_for("item").exists());
    }

    #[test]
    fn exactly_at_ttl_boundary_is_hit() {
        let tmp = tempfile::tempdir().unwrap();
        let then = Utc::now();
        let cache = make_cache(tmp.path(), then);

        cache.save("item", &TestData { name: "edge".to_string(), value: 1 }).unwrap();

        let edge = cache.at(then + chrono::Duration::hours(1));
        assert!(edge.load::<TestData>("item").is_some());

        let past_edge = cache.at(then + chrono::Duration::hours(1) + chrono::Duration::seconds(1));
        assert!(past_edge.load::<TestData>("item").is_none());
    }

    #[test]
    fn future_timestamp_treated_as_fresh() {
        let tmp = tempfile::tempdir().unwrap();
        let now = Utc::now();
        let future = make_cache(tmp.path(), now + chrono::Duration::hours(5));

        future.save("item", &TestData { name: "future".to_string(), value: 1 }).unwrap();

        let cache = future.at(now);
        assert_eq!(cache.load::<TestData>("item").unwrap().name, "future");
    }

    #[test]
    fn ignore_cache_returns_miss() {
        let tmp = tempfile::tempdir().unwrap();
        let now = Utc::now();
        make_cache(tmp.path(), now)
            .save("item", &TestData { name: "ignored".to_string(), value: 1 })
            .unwrap();

        let cache = Cache::new(Store::new(tmp.path()), DEFAULT_CACHE_TTL, now, true);
        assert_eq!(cache.load::<TestData>("item"), None);
    }

    #[test]
    fn save_overwrites_and_refreshes_timestamp() {
        let tmp = tempfile::tempdir().unwrap();
        let then = Utc::now();
        let cache = make_cache(tmp.path(), then);

        cache.save("item", &TestData { name: "first".to_string(), value: 1 }).unwrap();

        let later = cache.at(then + chrono::Duration::minutes(90));
        later.save("item", &TestData { name: "second".to_string(), value: 2 }).unwrap();

        assert_eq!(later.load::<TestData>("item").unwrap().name, "second");
    }

    #[test]
    fn remove_makes_entry_absent() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = make_cache(tmp.path(), Utc::now());

        cache.save("item", &TestData { name: "x".to_string(), value: 1 }).unwrap();
        cache.remove("item").unwrap();

        assert_eq!(cache.load::<TestData>("item"), None);
        assert!(!cache.store().path_for("item").exists());
    }

    #[test]
    fn envelope_field_names() {
        let envelope = Envelope {
            timestamp: DateTime::from_timestamp(1_704_067_200, 0).unwrap(),
            value: 7u32,
        };
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["value"], 7);
        assert_eq!(json["timestamp"], "2024-01-01T00:00:00Z");
    }
}
