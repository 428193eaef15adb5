//! In-memory replay cache.

use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::error::{CacheError, CacheResult};
use crate::replay::ReplayCacheProvider;

/// Replay cache backed by a sharded concurrent map.
///
/// The check and the insert happen under the same shard lock through the
/// map's entry API, so racing validations of the same assertion ID cannot
/// both succeed. A slot counter is reserved before a new identifier is
/// inserted and released after it is evicted, so the number of stored
/// identifiers never exceeds the capacity, even under concurrent inserts.
#[derive(Debug)]
pub struct InMemoryReplayCache {
    entries: DashMap<String, DateTime<Utc>>,
    occupied: AtomicUsize,
    capacity: usize,
}

impl InMemoryReplayCache {
    /// Creates a cache holding at most `capacity` identifiers.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: DashMap::new(),
            occupied: AtomicUsize::new(0),
            capacity: capacity.max(1),
        }
    }

    /// Returns the configured capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Evicts expired entries when every slot is taken.
    fn make_room(&self, now: DateTime<Utc>) {
        if self.occupied.load(Ordering::Acquire) < self.capacity {
            return;
        }
        let evicted = self.evict_expired(now);
        tracing::debug!(evicted, "replay cache full, evicted expired entries");
    }

    /// Claims a slot for a new identifier. Fails when the cache is full.
    fn reserve_slot(&self) -> CacheResult<()> {
        self.occupied
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |occupied| {
                (occupied < self.capacity).then_some(occupied + 1)
            })
            .map(|_| ())
            .map_err(|_| {
                tracing::warn!(capacity = self.capacity, "replay cache capacity exceeded");
                CacheError::CapacityExceeded {
                    capacity: self.capacity,
                }
            })
    }
}

impl Default for InMemoryReplayCache {
    fn default() -> Self {
        Self::new(100_000)
    }
}

impl ReplayCacheProvider for InMemoryReplayCache {
    fn check_and_insert(
        &self,
        id: &str,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> CacheResult<bool> {
        self.make_room(now);

        match self.entries.entry(id.to_owned()) {
            Entry::Occupied(mut entry) => {
                if *entry.get() > now {
                    return Ok(false);
                }
                // Expired entry, the identifier may be consumed again.
                entry.insert(expires_at);
                Ok(true)
            }
            Entry::Vacant(entry) => {
                self.reserve_slot()?;
                entry.insert(expires_at);
                Ok(true)
            }
        }
    }

    fn contains(&self, id: &str, now: DateTime<Utc>) -> CacheResult<bool> {
        Ok(self
            .entries
            .get(id)
            .is_some_and(|expires_at| *expires_at > now))
    }

    fn evict_expired(&self, now: DateTime<Utc>) -> usize {
        let mut removed = 0;
        self.entries.retain(|_, expires_at| {
            let live = *expires_at > now;
            if !live {
                removed += 1;
            }
            live
        });
        self.occupied.fetch_sub(removed, Ordering::AcqRel);
        removed
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
