//! In-memory TTL cache for provider responses
//!
//! One cache instance is created at startup and shared by every remote lookup.
//! Entries expire a fixed TTL after they are stored and are evicted lazily on
//! read. There is no capacity bound.

pub mod client;
pub mod key;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Source of "now" for expiry checks.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall clock backed by [`Instant::now`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Default lifetime of a cache entry
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

struct CacheEntry<V> {
    value: V,
    stored_at: Instant,
}

/// Key/value store whose entries expire a fixed TTL after `set`.
///
/// `get` returning `None` means "not cached". A cached value that itself
/// encodes absence (for example `serde_json::Value::Null`) comes back as
/// `Some`, so known-missing lookups are not repeated.
pub struct TtlCache<V> {
    entries: Mutex<HashMap<String, CacheEntry<V>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry<V>>> {
        // A panic while holding the lock cannot leave an entry half-written.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn is_expired(&self, entry: &CacheEntry<V>, now: Instant) -> bool {
        now.saturating_duration_since(entry.stored_at) >= self.ttl
    }

    /// Get a live value, evicting it first if it has expired.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now();
        let mut entries = self.lock();

        let expired = self.is_expired(entries.get(key)?, now);
        if expired {
            entries.remove(key);
            log::debug!("Cache expired: {}", key);
            return None;
        }

        entries.get(key).map(|entry| entry.value.clone())
    }

    /// Store a value, replacing any previous entry and restarting its TTL.
    pub fn set(&self, key: impl Into<String>, value: V) {
        let stored_at = self.clock.now();
        self.lock()
            .insert(key.into(), CacheEntry { value, stored_at });
    }

    /// Number of entries held, including expired ones not yet read.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Clock that only moves when told to.
#[cfg(test)]
pub struct ManualClock {
    base: Instant,
    offset: Mutex<Duration>,
}

#[cfg(test)]
impl ManualClock {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.offset.lock().unwrap() += by;
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + *self.offset.lock().unwrap()
    }
}

// Re-export main types
pub use client::CachedFootballClient;
pub use key::cache_key;
