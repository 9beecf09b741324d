use std::sync::Arc;
use std::time::Duration;

use reachwatch_core::Snapshot;
use tokio::sync::RwLock;
use tokio::time::Instant;

struct CacheEntry {
    snapshot: Arc<Snapshot>,
    stored_at: Instant,
}

#[derive(Default)]
struct Slot {
    entry: Option<CacheEntry>,
    // Bumped by every clear; a collection started under an older generation
    // must not be stored.
    generation: u64,
}

/// Single-slot cache holding the most recent cache-worthy snapshot.
///
/// Staleness is checked when reading; a stale entry stays in place until the
/// next [`SnapshotCache::set`] replaces it.
pub struct SnapshotCache {
    ttl: Duration,
    slot: RwLock<Slot>,
}

impl SnapshotCache {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: RwLock::new(Slot::default()),
        }
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the stored snapshot if it is at most `ttl` old.
    pub async fn get(&self) -> Option<Arc<Snapshot>> {
        let slot = self.slot.read().await;
        slot.entry
            .as_ref()
            .filter(|entry| entry.stored_at.elapsed() <= self.ttl)
            .map(|entry| Arc::clone(&entry.snapshot))
    }

    /// Current invalidation generation, to be passed to [`SnapshotCache::set_if_current`].
    pub async fn generation(&self) -> u64 {
        self.slot.read().await.generation
    }

    /// Replaces the stored snapshot and restarts its age.
    pub async fn set(&self, snapshot: Arc<Snapshot>) {
        self.slot.write().await.entry = Some(CacheEntry {
            snapshot,
            stored_at: Instant::now(),
        });
    }

    /// Stores `snapshot` only if no [`SnapshotCache::clear`] happened since
    /// `generation` was read. Returns whether it was stored.
    pub async fn set_if_current(&self, snapshot: Arc<Snapshot>, generation: u64) -> bool {
        let mut slot = self.slot.write().await;
        if slot.generation != generation {
            return false;
        }
        slot.entry = Some(CacheEntry {
            snapshot,
            stored_at: Instant::now(),
        });
        true
    }

    /// Drops the stored snapshot so the next read misses, and rejects any
    /// store from a collection that began before this call.
    pub async fn clear(&self) {
        let mut slot = self.slot.write().await;
        slot.entry = None;
        slot.generation = slot.generation.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::Utc;

    use super::*;

    fn snapshot() -> Arc<Snapshot> {
        Arc::new(Snapshot::new(BTreeMap::new(), Utc::now()))
    }

    #[tokio::test(start_paused = true)]
    async fn entry_is_served_until_ttl_elapses() {
        let cache = SnapshotCache::new(Duration::from_secs(60));
        assert!(cache.get().await.is_none());

        let stored = snapshot();
        cache.set(Arc::clone(&stored)).await;

        tokio::time::advance(Duration::from_secs(60)).await;
        let hit = cache.get().await.expect("entry at exactly ttl is still valid");
        assert!(Arc::ptr_eq(&hit, &stored));

        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(cache.get().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn set_overwrites_and_refreshes_timestamp() {
        let cache = SnapshotCache::new(Duration::from_secs(10));
        cache.set(snapshot()).await;
        tokio::time::advance(Duration::from_secs(8)).await;

        let replacement = snapshot();
        cache.set(Arc::clone(&replacement)).await;
        tokio::time::advance(Duration::from_secs(8)).await;

        let hit = cache.get().await.expect("replacement should still be fresh");
        assert!(Arc::ptr_eq(&hit, &replacement));
    }

    #[tokio::test]
    async fn clear_empties_the_slot() {
        let cache = SnapshotCache::new(Duration::from_secs(10));
        cache.set(snapshot()).await;
        cache.clear().await;
        assert!(cache.get().await.is_none());
    }

    #[tokio::test]
    async fn store_from_before_a_clear_is_rejected() {
        let cache = SnapshotCache::new(Duration::from_secs(10));
        let generation = cache.generation().await;
        cache.clear().await;

        assert!(!cache.set_if_current(snapshot(), generation).await);
        assert!(cache.get().await.is_none());

        let current = cache.generation().await;
        assert!(cache.set_if_current(snapshot(), current).await);
        assert!(cache.get().await.is_some());
    }
}
