//! Insertion-ordered result cache
//!
//! Entries are evicted strictly by insertion order (oldest first) once the
//! cache is full; reads never refresh an entry's position. Expiry is lazy:
//! a `get` that finds an entry older than the TTL deletes it and reports a
//! miss. Nothing sweeps expired entries in the background.

use crate::config::CacheConfig;
use genforge_artifact::CacheKey;
use indexmap::IndexMap;
use parking_lot::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// Counters for cache behavior
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups that returned a live entry
    pub hits: u64,
    /// Lookups that found nothing or an expired entry
    pub misses: u64,
    /// Entries deleted on read because their TTL had passed
    pub expirations: u64,
    /// Entries dropped to make room for a new one
    pub evictions: u64,
    /// Entries currently held, expired ones included
    pub size: usize,
}

impl CacheStats {
    /// Hit ratio over all lookups, 0.0 when there were none
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Debug)]
struct Entry<V> {
    value: V,
    inserted_at: Instant,
}

#[derive(Debug)]
struct Inner<V> {
    entries: IndexMap<CacheKey, Entry<V>>,
    stats: CacheStats,
}

/// Bounded FIFO cache with lazy TTL expiry
///
/// A single mutex guards the map and its order. Values are cloned out on
/// read, so store them behind an `Arc` when they are large.
#[derive(Debug)]
pub struct ResultCache<V> {
    inner: Mutex<Inner<V>>,
    max_size: usize,
    ttl: Duration,
}

impl<V: Clone> ResultCache<V> {
    /// Create cache holding at most `max_size` entries for `ttl` each
    ///
    /// A zero capacity is raised to one.
    #[must_use]
    pub fn new(max_size: usize, ttl: Duration) -> Self {
        let max_size = max_size.max(1);
        Self {
            inner: Mutex::new(Inner {
                entries: IndexMap::with_capacity(max_size),
                stats: CacheStats::default(),
            }),
            max_size,
            ttl,
        }
    }

    /// Create cache from configuration
    #[must_use]
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.max_size, config.ttl())
    }

    /// Look up a live entry
    pub fn get(&self, key: &CacheKey) -> Option<V> {
        let mut inner = self.inner.lock();
        let expired = match inner.entries.get(key) {
            None => {
                inner.stats.misses += 1;
                return None;
            }
            Some(entry) => entry.inserted_at.elapsed() > self.ttl,
        };

        if expired {
            inner.entries.shift_remove(key);
            inner.stats.expirations += 1;
            inner.stats.misses += 1;
            tracing::debug!(key = %key, "cache entry expired");
            return None;
        }

        inner.stats.hits += 1;
        inner.entries.get(key).map(|entry| entry.value.clone())
    }

    /// Insert or overwrite an entry
    ///
    /// An overwritten key becomes the newest entry. When the cache is full
    /// the oldest-inserted entry is evicted first.
    pub fn set(&self, key: CacheKey, value: V) {
        let mut inner = self.inner.lock();
        inner.entries.shift_remove(&key);

        while inner.entries.len() >= self.max_size {
            if let Some((evicted, _)) = inner.entries.shift_remove_index(0) {
                inner.stats.evictions += 1;
                tracing::debug!(key = %evicted, "cache entry evicted");
            }
        }

        inner.entries.insert(
            key,
            Entry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Remove an entry; returns whether it was present
    pub fn remove(&self, key: &CacheKey) -> bool {
        self.inner.lock().entries.shift_remove(key).is_some()
    }

    /// Remove every entry; counters are kept
    pub fn clear(&self) {
        self.inner.lock().entries.clear();
    }

    /// Entries currently held, expired ones included
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    /// Check if the cache holds no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keys in eviction order, oldest first
    #[must_use]
    pub fn keys(&self) -> Vec<CacheKey> {
        self.inner.lock().entries.keys().copied().collect()
    }

    /// Snapshot of the counters
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        CacheStats {
            size: inner.entries.len(),
            ..inner.stats
        }
    }

    /// Capacity
    #[inline]
    #[must_use]
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Entry lifetime
    #[inline]
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl<V: Clone> Default for ResultCache<V> {
    fn default() -> Self {
        Self::from_config(&CacheConfig::default())
    }
}
