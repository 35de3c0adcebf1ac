//! Known-group cache
//!
//! Memoizes group expansions for the lifetime of one scan run so every
//! group is expanded remotely at most once. Entries are stored relative to
//! their owning group (see
//! [`KnownGroupEntry`](crate::core::types::KnownGroupEntry)), which lets an
//! ancestor replay a whole cached subtree by prefixing its own breadcrumb
//! segment.

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

use crate::core::types::{GroupKey, KnownGroupEntry};

/// Cache statistics
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Lookups that found a cached expansion
    pub hits: u64,
    /// Lookups that found nothing
    pub misses: u64,
    /// Expansions stored
    pub stores: u64,
}

impl CacheStats {
    /// Calculate hit rate
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            return 0.0;
        }
        self.hits as f64 / total as f64
    }
}

/// Memoized group expansions, keyed by [`GroupKey`].
///
/// The default contract is one cache per scan run. The map is still safe
/// to share between concurrent site resolutions; per-group flight locks
/// let a second caller await an in-progress expansion instead of
/// duplicating the remote call.
pub struct KnownGroupCache {
    entries: DashMap<GroupKey, Arc<Vec<KnownGroupEntry>>>,
    flights: DashMap<GroupKey, Arc<Mutex<()>>>,
    stats: RwLock<CacheStats>,
}

impl KnownGroupCache {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            flights: DashMap::new(),
            stats: RwLock::new(CacheStats::default()),
        }
    }

    /// Cached expansion for the group, if any. An empty entry list is a
    /// valid cached outcome (a group with no direct users) and replays as
    /// zero records.
    pub fn lookup(&self, key: &GroupKey) -> Option<Arc<Vec<KnownGroupEntry>>> {
        match self.entries.get(key) {
            Some(entries) => {
                self.stats.write().hits += 1;
                debug!(group = %key.id_or_name, rows = entries.len(), "known group cache hit");
                Some(Arc::clone(entries.value()))
            }
            None => {
                self.stats.write().misses += 1;
                None
            }
        }
    }

    /// Store an expansion. First write wins: a concurrent duplicate
    /// expansion of the same group produces identical entries, so the
    /// racing writer's copy is simply dropped.
    pub fn store(&self, key: GroupKey, entries: Vec<KnownGroupEntry>) {
        self.entries.entry(key).or_insert_with(|| {
            self.stats.write().stores += 1;
            Arc::new(entries)
        });
    }

    /// Serialize expansion of one group across concurrent callers.
    ///
    /// The caller holds the guard for the duration of lookup-fetch-store
    /// and must re-check [`lookup`](Self::lookup) after acquiring it; the
    /// previous holder may have stored the expansion already.
    pub async fn flight_guard(&self, key: &GroupKey) -> OwnedMutexGuard<()> {
        let lock = {
            let entry = self.flights.entry(key.clone()).or_default();
            Arc::clone(entry.value())
        };
        lock.lock_owned().await
    }

    /// Number of cached groups.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot of the current statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats.read().clone()
    }
}

impl Default for KnownGroupCache {
    fn default() -> Self {
        Self::new()
    }
}
