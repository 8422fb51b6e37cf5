//! Bounded, time-expiring response store.

use super::key::RequestKey;
use crate::transport::HttpResponse;
use lru::LruCache;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of cached responses.
    pub max_entries: usize,
    /// Lifetime of an entry, measured from its last insert.
    pub ttl_secs: u64,
    /// Whether a final non-2xx response is stored as well.
    pub store_error_responses: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 200,
            ttl_secs: 300,
            store_error_responses: true,
        }
    }
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    /// Entry lifetime, rounded up to whole seconds.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl_secs = ttl
            .as_secs()
            .saturating_add(u64::from(ttl.subsec_nanos() > 0));
        self
    }

    pub fn with_store_error_responses(mut self, enabled: bool) -> Self {
        self.store_error_responses = enabled;
        self
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub expirations: u64,
    pub inserts: u64,
    pub evictions: u64,
}

impl CacheStats {
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

struct AtomicStats {
    hits: AtomicU64,
    misses: AtomicU64,
    expirations: AtomicU64,
    inserts: AtomicU64,
    evictions: AtomicU64,
}

impl AtomicStats {
    fn new() -> Self {
        Self {
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            expirations: AtomicU64::new(0),
            inserts: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    fn to_stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            expirations: self.expirations.load(Ordering::Relaxed),
            inserts: self.inserts.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }
}

struct CacheEntry {
    response: Arc<HttpResponse>,
    refreshed_at: Instant,
}

/// LRU response cache with lazy expiry.
///
/// Entry store, timestamps and recency order live in one `LruCache` behind a
/// single mutex, so every lookup, insert and eviction is atomic with respect
/// to the others. The lock is only held for in-memory bookkeeping.
///
/// A hit moves the key to the front but leaves its timestamp alone; only an
/// insert restamps it. Entries are therefore served for at most `ttl` after
/// the network last produced them.
pub struct ResponseCache {
    ttl: Duration,
    entries: Mutex<LruCache<RequestKey, CacheEntry>>,
    stats: AtomicStats,
}

impl ResponseCache {
    /// `max_entries` is clamped to at least 1.
    pub fn new(config: &CacheConfig) -> Self {
        let capacity = NonZeroUsize::new(config.max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            ttl: config.ttl(),
            entries: Mutex::new(LruCache::new(capacity)),
            stats: AtomicStats::new(),
        }
    }

    fn state(&self) -> MutexGuard<'_, LruCache<RequestKey, CacheEntry>> {
        // Every critical section leaves the LruCache consistent, so a poisoned
        // lock still guards valid data.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Return the cached response for `key` if present and fresh.
    ///
    /// An expired entry is removed and reported as a miss.
    pub fn lookup(&self, key: &RequestKey) -> Option<Arc<HttpResponse>> {
        let now = Instant::now();
        let mut entries = self.state();

        let expired = match entries.peek(key) {
            None => {
                self.stats.misses.fetch_add(1, Ordering::Relaxed);
                debug!(key = key.short(), url = %key.url, "cache miss");
                return None;
            }
            Some(entry) => now.saturating_duration_since(entry.refreshed_at) > self.ttl,
        };

        if expired {
            entries.pop(key);
            self.stats.expirations.fetch_add(1, Ordering::Relaxed);
            self.stats.misses.fetch_add(1, Ordering::Relaxed);
            debug!(key = key.short(), url = %key.url, "cache entry expired");
            return None;
        }

        let response = entries.get(key).map(|entry| Arc::clone(&entry.response));
        self.stats.hits.fetch_add(1, Ordering::Relaxed);
        debug!(key = key.short(), url = %key.url, "cache hit");
        response
    }

    /// Store `response` under `key`, restamping it and moving it to the front.
    ///
    /// Inserting a new key into a full cache evicts the least recently used entry.
    pub fn insert(&self, key: RequestKey, response: Arc<HttpResponse>) {
        let entry = CacheEntry {
            response,
            refreshed_at: Instant::now(),
        };
        let short = key.short().to_string();
        let mut entries = self.state();
        // `push` hands back either the replaced value for this key or the evicted LRU entry.
        if let Some((old_key, _)) = entries.push(key.clone(), entry) {
            if old_key != key {
                self.stats.evictions.fetch_add(1, Ordering::Relaxed);
                debug!(evicted = old_key.short(), url = %old_key.url, "cache eviction");
            }
        }
        self.stats.inserts.fetch_add(1, Ordering::Relaxed);
        debug!(key = %short, size = entries.len(), "cache insert");
    }

    pub fn remove(&self, key: &RequestKey) -> bool {
        self.state().pop(key).is_some()
    }

    /// Whether `key` is currently held, without touching recency or expiry.
    pub fn contains(&self, key: &RequestKey) -> bool {
        self.state().contains(key)
    }

    pub fn clear(&self) {
        self.state().clear();
    }

    pub fn len(&self) -> usize {
        self.state().len()
    }

    pub fn is_empty(&self) -> bool {
        self.state().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.state().cap().get()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Held keys, most recently used first.
    pub fn keys(&self) -> Vec<RequestKey> {
        self.state().iter().map(|(k, _)| k.clone()).collect()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.to_stats()
    }
}
