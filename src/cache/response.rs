//! TTL + capacity-bounded response cache with FIFO eviction.
//!
//! [`ResponseCache`] maps a request fingerprint to its
//! [`AnalysisResponse`]. Two bounds apply:
//!
//! - **TTL**, checked lazily on read: an expired entry is removed and
//!   treated as a miss, never returned.
//! - **Capacity**, checked eagerly on write: once the store exceeds its
//!   capacity, the oldest-*inserted* entry is evicted. This is strict
//!   FIFO, not LRU — reads do not refresh an entry's position, so a
//!   frequently-read entry still ages out in insertion order.
//!
//! The store is an explicit `HashMap` + insertion-order `VecDeque` rather
//! than an off-the-shelf cache crate, because FIFO-on-insert semantics
//! are part of the observable contract.
//!
//! Timestamps use `tokio::time::Instant`, so TTL behaviour is testable
//! under a paused runtime clock.

use std::collections::HashMap;
use std::collections::VecDeque;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;

use crate::types::{AnalysisOptions, AnalysisResponse};

/// Maximum entries before FIFO eviction kicks in.
pub const DEFAULT_CACHE_CAPACITY: usize = 1000;

#[derive(Debug, Clone)]
struct CachedResult {
    response: AnalysisResponse,
    stored_at: Instant,
    ttl: Duration,
}

#[derive(Default)]
struct Store {
    entries: HashMap<u64, CachedResult>,
    /// Keys in insertion order. May contain keys already removed from
    /// `entries` (lazy expiry); eviction skips those.
    order: VecDeque<u64>,
}

/// In-memory response cache for analysis calls.
pub struct ResponseCache {
    store: Mutex<Store>,
    capacity: usize,
}

impl ResponseCache {
    /// Create a cache bounded at [`DEFAULT_CACHE_CAPACITY`] entries.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }

    /// Create a cache with an explicit capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            store: Mutex::new(Store::default()),
            capacity,
        }
    }

    /// Look up a cached response.
    ///
    /// Returns `None` for missing or expired entries; expired entries are
    /// removed on the spot. A hit does not refresh the entry's insertion
    /// position.
    pub fn get(&self, key: u64) -> Option<AnalysisResponse> {
        let mut store = self.store.lock().expect("cache lock poisoned");
        let expired = match store.entries.get(&key) {
            Some(entry) => entry.stored_at.elapsed() > entry.ttl,
            None => return None,
        };
        if expired {
            store.entries.remove(&key);
            return None;
        }
        store.entries.get(&key).map(|e| e.response.clone())
    }

    /// Insert or overwrite an entry, then enforce the capacity bound.
    ///
    /// Overwriting an existing key refreshes its timestamp but keeps its
    /// original insertion position.
    pub fn insert(&self, key: u64, response: AnalysisResponse, ttl: Duration) {
        let mut store = self.store.lock().expect("cache lock poisoned");
        let previous = store.entries.insert(
            key,
            CachedResult {
                response,
                stored_at: Instant::now(),
                ttl,
            },
        );
        if previous.is_none() {
            // Drop any stale order slot left behind by lazy expiry so the
            // re-inserted key ages from its new position.
            store.order.retain(|k| *k != key);
            store.order.push_back(key);
        }
        while store.entries.len() > self.capacity {
            match store.order.pop_front() {
                // Stale order slots (entries already expired out) are skipped.
                Some(oldest) => {
                    store.entries.remove(&oldest);
                }
                None => break,
            }
        }
    }

    /// Number of live entries (expired-but-unread entries included).
    pub fn len(&self) -> usize {
        self.store.lock().expect("cache lock poisoned").entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Empty the store.
    pub fn clear(&self) {
        let mut store = self.store.lock().expect("cache lock poisoned");
        store.entries.clear();
        store.order.clear();
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Compute a request fingerprint from method, text, and options.
///
/// Uses `DefaultHasher` (SipHash) for a reasonable collision-resistance /
/// performance trade-off. Deterministic within a process lifetime, which
/// is sufficient for an in-memory cache; collisions are tolerated, not
/// prevented.
pub(crate) fn fingerprint(method: &str, text: &str, options: &AnalysisOptions) -> u64 {
    let mut hasher = DefaultHasher::new();
    method.hash(&mut hasher);
    text.hash(&mut hasher);
    options.language.hash(&mut hasher);
    options.engines.hash(&mut hasher);
    hasher.finish()
}
