use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt::Display;
use std::hash::Hash;
use std::sync::{Arc, Mutex, RwLock};
use tracing::debug;

/// Time source for cache expiry
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        if let Ok(mut now) = self.now.lock() {
            *now += by;
        }
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.lock().map(|now| *now).unwrap_or_else(|_| Utc::now())
    }
}

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    stored_at: DateTime<Utc>,
}

/// Size and keys of a cache, for diagnostics
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CacheStats {
    pub size: usize,
    pub entries: Vec<String>,
}

/// Keyed store whose entries stop being served once older than the TTL.
///
/// Expired entries are not evicted eagerly; the next insert for the same key
/// replaces them. Clones share the same storage.
pub struct TtlCache<K, V> {
    entries: Arc<RwLock<HashMap<K, CacheEntry<V>>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone + Display,
    V: Clone,
{
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl,
            clock,
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Fresh value for `key`, if any
    pub fn get(&self, key: &K) -> Option<V> {
        let cache = self.entries.read().ok()?;
        let entry = cache.get(key)?;
        let age = self.clock.now() - entry.stored_at;

        if age < self.ttl {
            Some(entry.value.clone())
        } else {
            debug!("Cache entry expired for {} (age {}s)", key, age.num_seconds());
            None
        }
    }

    pub fn insert(&self, key: K, value: V) {
        let stored_at = self.clock.now();
        if let Ok(mut cache) = self.entries.write() {
            cache.insert(key, CacheEntry { value, stored_at });
        }
    }

    pub fn clear(&self) {
        if let Ok(mut cache) = self.entries.write() {
            cache.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|cache| cache.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        let mut entries: Vec<String> = self
            .entries
            .read()
            .map(|cache| cache.keys().map(|k| k.to_string()).collect())
            .unwrap_or_default();
        entries.sort();

        CacheStats {
            size: entries.len(),
            entries,
        }
    }
}

impl<K, V> Clone for TtlCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
            ttl: self.ttl,
            clock: self.clock.clone(),
        }
    }
}
