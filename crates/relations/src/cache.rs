//! Memoizing cache in front of a [`RelationFetcher`].
//!
//! ## Guarantees
//! - A key is looked up in the cache before the fetcher is called
//! - Successful fetches are kept; failed fetches are not, so a later call retries
//! - At most one fetch per key is in flight: concurrent callers asking for
//!   the same key wait on that key's slot and then read the stored result
//!
//! The cache is unbounded by default. [`RelationCache::with_capacity`] bounds
//! it with LRU eviction; an evicted key is fetched again on its next use.

use crate::fetcher::{FetchError, RelationFetcher};
use data_loader::{EntityKey, Relations};
use lru::LruCache;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

/// In-flight fetch of one key. Its lock is held for the duration of the fetch.
#[derive(Default)]
struct Slot {
    relations: Mutex<Option<Relations>>,
}

/// Stored lists plus the fetches still running.
///
/// Only successful fetches reach `ready`, so a failing key never takes an
/// LRU position from a stored list.
struct Slots {
    ready: LruCache<EntityKey, Relations>,
    pending: HashMap<EntityKey, Arc<Slot>>,
}

/// Counters describing how the cache has been used
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache
    pub hits: u64,
    /// Calls made to the fetcher (successful or not)
    pub fetches: u64,
    /// Fetcher calls that returned an error
    pub failures: u64,
}

/// Cache of relation lists keyed by entity key.
///
/// Construct one per process or per batch of queries and share it
/// (`Arc<RelationCache<_>>`) between searches.
pub struct RelationCache<F> {
    fetcher: F,
    slots: Mutex<Slots>,
    hits: AtomicU64,
    fetches: AtomicU64,
    failures: AtomicU64,
}

impl<F: RelationFetcher> RelationCache<F> {
    /// Unbounded cache
    pub fn new(fetcher: F) -> Self {
        Self::from_slots(fetcher, LruCache::unbounded())
    }

    /// Cache holding at most `capacity` keys, evicting the least recently used
    pub fn with_capacity(fetcher: F, capacity: NonZeroUsize) -> Self {
        Self::from_slots(fetcher, LruCache::new(capacity))
    }

    fn from_slots(fetcher: F, ready: LruCache<EntityKey, Relations>) -> Self {
        Self {
            fetcher,
            slots: Mutex::new(Slots {
                ready,
                pending: HashMap::new(),
            }),
            hits: AtomicU64::new(0),
            fetches: AtomicU64::new(0),
            failures: AtomicU64::new(0),
        }
    }

    /// Relation list of `key`, fetched on first use.
    pub fn get(&self, key: &EntityKey) -> Result<Relations, FetchError> {
        let slot = {
            let mut slots = lock(&self.slots);
            if let Some(relations) = slots.ready.get(key) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Ok(Arc::clone(relations));
            }
            Arc::clone(slots.pending.entry(key.clone()).or_default())
        };

        // Waiters on a running fetch see its result once the lock is released
        let mut cached = lock(&slot.relations);
        if let Some(relations) = cached.as_ref() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(Arc::clone(relations));
        }

        self.fetches.fetch_add(1, Ordering::Relaxed);
        debug!(key = %key, "Fetching relations");
        let result = self.fetcher.fetch_relations(key);

        let mut slots = lock(&self.slots);
        if slots
            .pending
            .get(key)
            .is_some_and(|pending| Arc::ptr_eq(pending, &slot))
        {
            slots.pending.remove(key);
        }

        match result {
            Ok(list) => {
                let relations: Relations = list.into();
                *cached = Some(Arc::clone(&relations));
                slots.ready.put(key.clone(), Arc::clone(&relations));
                Ok(relations)
            }
            Err(e) => {
                self.failures.fetch_add(1, Ordering::Relaxed);
                warn!(key = %key, error = %e, "Failed to fetch relations");
                Err(e)
            }
        }
    }

    /// Whether `key` currently has a stored relation list
    pub fn contains(&self, key: &EntityKey) -> bool {
        lock(&self.slots).ready.contains(key)
    }

    /// Number of keys with a stored relation list
    pub fn len(&self) -> usize {
        lock(&self.slots).ready.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every stored entry. Counters are kept.
    pub fn clear(&self) {
        lock(&self.slots).ready.clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            fetches: self.fetches.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }
}

/// A panic while holding a lock leaves the data usable; keep going
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
