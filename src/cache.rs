//! In-process memoization of provider results.
//!
//! Entries are keyed by the exact fetch parameters and hold either the
//! fetched value or the failure. Concurrent callers for the same key share a
//! single in-flight producer call.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use std::time::{Duration, Instant};

/// How long stored results stay valid. `None` means for the whole session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    pub success_ttl: Option<Duration>,
    pub failure_ttl: Option<Duration>,
}

impl CachePolicy {
    /// Keep everything, failures included, until the process exits.
    pub const fn session() -> Self {
        Self {
            success_ttl: None,
            failure_ttl: None,
        }
    }

    /// Keep successes for the session and retry failures after `ttl`.
    pub const fn retry_failures_after(ttl: Duration) -> Self {
        Self {
            success_ttl: None,
            failure_ttl: Some(ttl),
        }
    }
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self::session()
    }
}

struct Entry<T, E> {
    value: Result<T, E>,
    stored_at: Instant,
}

struct Slot<T, E> {
    cell: OnceLock<Entry<T, E>>,
}

impl<T, E> Slot<T, E> {
    fn new() -> Self {
        Self {
            cell: OnceLock::new(),
        }
    }

    /// An in-flight slot (cell not yet set) never counts as expired.
    fn is_expired(&self, policy: &CachePolicy, now: Instant) -> bool {
        let Some(entry) = self.cell.get() else {
            return false;
        };
        let ttl = match entry.value {
            Ok(_) => policy.success_ttl,
            Err(_) => policy.failure_ttl,
        };
        ttl.is_some_and(|ttl| now.duration_since(entry.stored_at) >= ttl)
    }
}

/// Thread-safe memo table of `Result<T, E>` keyed by `K`.
pub struct ResultCache<K, T, E> {
    policy: CachePolicy,
    slots: Mutex<HashMap<K, Arc<Slot<T, E>>>>,
}

impl<K, T, E> ResultCache<K, T, E>
where
    K: Eq + Hash + Clone,
    T: Clone,
    E: Clone,
{
    pub fn new(policy: CachePolicy) -> Self {
        Self {
            policy,
            slots: Mutex::new(HashMap::new()),
        }
    }

    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    /// Return the stored result for `key`, calling `producer` only when no
    /// live entry exists.
    ///
    /// Callers racing on the same key block until the first caller's
    /// producer finishes and then all observe its result.
    pub fn get_or_fetch<F>(&self, key: &K, producer: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        let slot = {
            let mut slots = self.lock();
            let now = Instant::now();
            if slots
                .get(key)
                .is_some_and(|slot| slot.is_expired(&self.policy, now))
            {
                tracing::debug!("cache entry expired; refetching");
                slots.remove(key);
            }
            Arc::clone(
                slots
                    .entry(key.clone())
                    .or_insert_with(|| Arc::new(Slot::new())),
            )
        };

        let entry = slot.cell.get_or_init(|| Entry {
            value: producer(),
            stored_at: Instant::now(),
        });
        entry.value.clone()
    }

    /// Stored, unexpired result for `key` without producing one.
    pub fn get(&self, key: &K) -> Option<Result<T, E>> {
        let slots = self.lock();
        let slot = slots.get(key)?;
        if slot.is_expired(&self.policy, Instant::now()) {
            return None;
        }
        slot.cell.get().map(|entry| entry.value.clone())
    }

    /// Drop the entry for `key`. Returns whether one existed.
    pub fn invalidate(&self, key: &K) -> bool {
        self.lock().remove(key).is_some()
    }

    /// Number of entries, including expired ones not yet replaced.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<K, Arc<Slot<T, E>>>> {
        // A panicking producer runs outside the lock, so the map itself is
        // never left half-updated.
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<K, T, E> Default for ResultCache<K, T, E>
where
    K: Eq + Hash + Clone,
    T: Clone,
    E: Clone,
{
    fn default() -> Self {
        Self::new(CachePolicy::default())
    }
}
