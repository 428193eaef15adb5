//! Replay cache.
//!
//! Tracks assertion identifiers that have already been consumed so that a
//! captured assertion cannot establish a second session.

use chrono::{DateTime, Utc};

use crate::error::CacheResult;

/// Replay cache provider.
///
/// An identifier that is present and not yet expired is a replay. Entries
/// whose expiry is at or before `now` are treated as absent and may be
/// evicted at any time.
///
/// Implementations are shared by every request being validated, so they
/// must be `Send + Sync`, and [`check_and_insert`](Self::check_and_insert)
/// must be a single atomic step with respect to other callers.
pub trait ReplayCacheProvider: Send + Sync {
    /// Records `id` as consumed until `expires_at`.
    ///
    /// Returns `true` if this is the first sighting of the identifier (or
    /// the previous entry had expired), `false` if the identifier is a
    /// replay. Two concurrent callers with the same identifier observe
    /// exactly one `true`.
    fn check_and_insert(
        &self,
        id: &str,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> CacheResult<bool>;

    /// Checks whether `id` is currently recorded and unexpired.
    fn contains(&self, id: &str, now: DateTime<Utc>) -> CacheResult<bool>;

    /// Removes entries that expired at or before `now`.
    ///
    /// Returns the number of entries removed.
    fn evict_expired(&self, now: DateTime<Utc>) -> usize;

    /// Returns the number of stored entries, expired or not.
    fn len(&self) -> usize;

    /// Returns true if no entries are stored.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
