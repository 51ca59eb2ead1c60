use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};

use crate::clock::Clock;

pub const DEFAULT_CACHE_CAPACITY: usize = 256;

struct CacheEntry<V> {
    stored_at: DateTime<Utc>,
    value: Arc<V>,
}

/// Time bounded, size bounded memo keyed by `K`.
///
/// Entries older than the TTL are never served. A zero TTL disables caching. When the cache is
/// full the oldest entry is evicted.
pub struct TtlCache<K, V> {
    clock: Arc<dyn Clock>,
    ttl: Duration,
    capacity: usize,
    entries: Mutex<HashMap<K, CacheEntry<V>>>,
}

impl<K: Eq + Hash + Clone, V> TtlCache<K, V> {
    pub fn new(clock: Arc<dyn Clock>, ttl: Duration, capacity: usize) -> Self {
        Self {
            clock,
            ttl,
            capacity,
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<K, CacheEntry<V>>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn is_enabled(&self) -> bool {
        self.ttl > Duration::zero() && self.capacity > 0
    }

    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        if !self.is_enabled() {
            return None;
        }
        let now = self.clock.now();
        let mut entries = self.entries();
        let lookup = entries
            .get(key)
            .map(|entry| (now - entry.stored_at < self.ttl, Arc::clone(&entry.value)));
        match lookup {
            Some((true, value)) => Some(value),
            Some((false, _)) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Stores the value, replacing any previous entry for the key, and returns the shared handle.
    pub fn insert(&self, key: K, value: V) -> Arc<V> {
        let value = Arc::new(value);
        if !self.is_enabled() {
            return value;
        }
        let now = self.clock.now();
        let mut entries = self.entries();
        if !entries.contains_key(&key) && entries.len() >= self.capacity {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.stored_at)
                .map(|(key, _)| key.clone());
            if let Some(oldest) = oldest {
                entries.remove(&oldest);
            }
        }
        entries.insert(
            key,
            CacheEntry {
                stored_at: now,
                value: Arc::clone(&value),
            },
        );
        value
    }

    pub fn invalidate(&self, key: &K) {
        self.entries().remove(key);
    }

    pub fn clear(&self) {
        self.entries().clear();
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
