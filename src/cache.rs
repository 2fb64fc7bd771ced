//! In-memory LRU cache with a fixed time-to-live per entry.
//!
//! Expired entries are dropped lazily when looked up. A full cache evicts
//! its least-recently-used entry on insert.

use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use lru::LruCache;
use parking_lot::Mutex;

use crate::pipeline::CachedResult;

struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
}

pub struct TtlCache<V> {
    inner: Mutex<LruCache<String, CacheEntry<V>>>,
    ttl: Duration,
}

/// Finished summaries keyed by source URL.
pub type SummaryCache = TtlCache<CachedResult>;

impl<V: Clone> TtlCache<V> {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
            ttl,
        }
    }

    /// Returns a copy of the live entry for `key`, or None if absent or expired.
    pub fn get(&self, key: &str) -> Option<V> {
        let mut cache = self.inner.lock();
        if let Some(entry) = cache.get(key) {
            if entry.inserted_at.elapsed() < self.ttl {
                return Some(entry.value.clone());
            }
            cache.pop(key);
        }
        None
    }

    /// Stores `value`, replacing any previous entry for `key`.
    pub fn put(&self, key: impl Into<String>, value: V) {
        self.inner.lock().put(
            key.into(),
            CacheEntry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
