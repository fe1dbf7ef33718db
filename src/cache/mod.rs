//! TTL cache for read-heavy resources.
//!
//! One process-wide store shared by every resource the DAO reads. The TTL is
//! supplied by the caller on each `get`, not stored with the entry, so
//! `products` and the config resources can use independently configured
//! expirations while sharing one store. Expiry is lazy (checked on read);
//! entries are replaced wholesale on refresh and never partially updated.
//!
//! The clock is injected so tests can advance time deterministically.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::records::{ConfigMap, Record};

/// Monotonic clock source.
///
/// Wall-clock adjustments must not cause premature or delayed expiry, so
/// implementations are expected to be monotonic.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Default clock backed by `std::time::Instant`.
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Payload stored for one named resource.
#[derive(Debug, Clone)]
pub enum CachedPayload {
    /// Per-row records (products).
    Records(Vec<Record>),
    /// Key-value configuration.
    Config(ConfigMap),
}

/// Shared TTL cache keyed by resource name.
///
/// The key space is a small fixed set of resource names, so there is no
/// eviction beyond lazy expiry: stale entries for keys no longer queried
/// stay in memory.
pub struct TtlCache {
    entries: Mutex<HashMap<String, (Instant, CachedPayload)>>,
    clock: Arc<dyn Clock>,
}

impl TtlCache {
    /// Create a cache using the system monotonic clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create a cache with an injected clock.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// Return the cached payload for `key` if it is younger than `ttl`.
    pub fn get(&self, key: &str, ttl: Duration) -> Option<CachedPayload> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let (stored_at, payload) = entries.get(key)?;
        if self.clock.now().duration_since(*stored_at) > ttl {
            return None;
        }
        Some(payload.clone())
    }

    /// Store a payload for `key`, replacing any previous entry.
    pub fn set(&self, key: &str, payload: CachedPayload) {
        let now = self.clock.now();
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), (now, payload));
    }
}

impl Default for TtlCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Clock whose reading is advanced by hand.
    struct ManualClock {
        origin: Instant,
        offset: Mutex<Duration>,
    }

    impl ManualClock {
        fn new() -> Self {
            Self {
                origin: Instant::now(),
                offset: Mutex::new(Duration::ZERO),
            }
        }

        fn advance(&self, by: Duration) {
            *self.offset.lock().unwrap() += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Instant {
            self.origin + *self.offset.lock().unwrap()
        }
    }

    fn config_payload(key: &str, value: &str) -> CachedPayload {
        let mut map = ConfigMap::new();
        map.insert(key.into(), crate::records::ConfigValue::Text(value.into()));
        CachedPayload::Config(map)
    }

    #[test]
    fn test_fresh_entry_is_returned() {
        let cache = TtlCache::new();
        cache.set("config_bot", config_payload("welcome", "hi"));

        match cache.get("config_bot", Duration::from_secs(10)) {
            Some(CachedPayload::Config(map)) => assert!(map.contains_key("welcome")),
            other => panic!("expected config payload, got {:?}", other.is_some()),
        }
    }

    #[test]
    fn test_entry_expires_after_ttl() {
        let clock = Arc::new(ManualClock::new());
        let cache = TtlCache::with_clock(clock.clone());
        cache.set("k", config_payload("a", "b"));

        clock.advance(Duration::from_secs(11));
        assert!(cache.get("k", Duration::from_secs(10)).is_none());
    }

    #[test]
    fn test_same_key_different_ttls() {
        let clock = Arc::new(ManualClock::new());
        let cache = TtlCache::with_clock(clock.clone());
        cache.set("k", config_payload("a", "b"));

        clock.advance(Duration::from_secs(30));
        assert!(cache.get("k", Duration::from_secs(20)).is_none());
        assert!(cache.get("k", Duration::from_secs(45)).is_some());
    }

    #[test]
    fn test_absent_key() {
        let cache = TtlCache::new();
        assert!(cache.get("missing", Duration::from_secs(10)).is_none());
    }

    #[test]
    fn test_set_replaces_entry_and_timestamp() {
        let clock = Arc::new(ManualClock::new());
        let cache = TtlCache::with_clock(clock.clone());
        cache.set("k", config_payload("v", "1"));

        clock.advance(Duration::from_secs(9));
        cache.set("k", config_payload("v", "2"));

        clock.advance(Duration::from_secs(9));
        // 18s since first set, 9s since refresh: still fresh under a 10s TTL.
        match cache.get("k", Duration::from_secs(10)) {
            Some(CachedPayload::Config(map)) => {
                assert_eq!(
                    map.get("v"),
                    Some(&crate::records::ConfigValue::Text("2".into()))
                );
            }
            _ => panic!("expected refreshed entry"),
        }
    }
}
