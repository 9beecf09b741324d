use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::future::join_all;
use reachwatch_core::{Platform, PlatformResult, SettingsStore, Snapshot};
use reachwatch_scraper::PlatformFetcher;
use tokio::sync::Mutex;

use crate::cache::SnapshotCache;

/// Gathers every platform's result into a [`Snapshot`], serving from the
/// cache while it is fresh.
pub struct Collector {
    settings: Arc<SettingsStore>,
    fetchers: BTreeMap<Platform, Arc<dyn PlatformFetcher>>,
    cache: SnapshotCache,
    // Held while a fresh collection runs so concurrent misses wait for it
    // instead of issuing duplicate upstream requests.
    refresh: Mutex<()>,
}

impl Collector {
    /// Builds a collector whose cache TTL is read once from `settings`.
    pub async fn new(settings: Arc<SettingsStore>, fetchers: Vec<Arc<dyn PlatformFetcher>>) -> Self {
        let ttl = Duration::from_secs(settings.cache_ttl_seconds().await);
        Self::with_ttl(settings, fetchers, ttl)
    }

    #[must_use]
    pub fn with_ttl(
        settings: Arc<SettingsStore>,
        fetchers: Vec<Arc<dyn PlatformFetcher>>,
        ttl: Duration,
    ) -> Self {
        let fetchers = fetchers
            .into_iter()
            .map(|fetcher| (fetcher.platform(), fetcher))
            .collect();
        Self {
            settings,
            fetchers,
            cache: SnapshotCache::new(ttl),
            refresh: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.cache.ttl()
    }

    /// Returns the cached snapshot while it is fresh, otherwise collects a
    /// new one.
    ///
    /// The new snapshot is cached only when every platform came back `Ok`;
    /// it is returned either way.
    pub async fn get_snapshot(&self) -> Arc<Snapshot> {
        if let Some(snapshot) = self.cache.get().await {
            tracing::debug!(generated_at = %snapshot.generated_at, "snapshot cache hit");
            return snapshot;
        }

        let _guard = self.refresh.lock().await;
        if let Some(snapshot) = self.cache.get().await {
            tracing::debug!("snapshot refreshed by a concurrent caller");
            return snapshot;
        }

        tracing::info!("snapshot cache expired, collecting fresh metrics");
        let generation = self.cache.generation().await;
        let snapshot = Arc::new(self.collect_fresh().await);
        if snapshot.is_cacheable() {
            if !self.cache.set_if_current(Arc::clone(&snapshot), generation).await {
                tracing::info!("not caching snapshot because the cache was invalidated mid-collection");
            }
        } else {
            let statuses: Vec<String> = snapshot
                .results
                .iter()
                .map(|(platform, result)| format!("{platform}={:?}", result.status()))
                .collect();
            tracing::info!(
                statuses = %statuses.join(","),
                "not caching snapshot because a platform did not return ok"
            );
        }
        snapshot
    }

    /// Discards the cached snapshot, e.g. after a profile target changes.
    ///
    /// A collection already in flight still returns its snapshot to its
    /// callers but will not store it.
    pub async fn invalidate(&self) {
        self.cache.clear().await;
    }

    /// Fetches every known platform concurrently, bypassing the cache.
    ///
    /// Always yields exactly one result per platform: unconfigured platforms
    /// are `NotConfigured`, and a fetch task that panics becomes `Error`
    /// without affecting the others.
    pub async fn collect_fresh(&self) -> Snapshot {
        let mut handles = Vec::with_capacity(Platform::ALL.len());
        for platform in Platform::ALL {
            let target = self.settings.target(platform).await;
            let fetcher = self.fetchers.get(&platform).cloned();
            handles.push(tokio::spawn(fetch_platform(platform, target, fetcher)));
        }

        let outcomes = join_all(handles).await;
        let results = Platform::ALL
            .into_iter()
            .zip(outcomes)
            .map(|(platform, outcome)| {
                let result = outcome.unwrap_or_else(|e| {
                    tracing::error!(platform = %platform, error = %e, "fetch task failed");
                    PlatformResult::error(format!("{} fetch task failed: {e}", platform.title()))
                });
                (platform, result)
            })
            .collect();

        Snapshot::new(results, Utc::now())
    }
}

async fn fetch_platform(
    platform: Platform,
    target: Option<String>,
    fetcher: Option<Arc<dyn PlatformFetcher>>,
) -> PlatformResult {
    let Some(target) = target else {
        tracing::debug!(platform = %platform, "platform not configured");
        return PlatformResult::NotConfigured;
    };
    let Some(fetcher) = fetcher else {
        tracing::error!(platform = %platform, "no fetcher registered");
        return PlatformResult::error(format!("no fetcher registered for {}", platform.title()));
    };

    tracing::info!(platform = %platform, profile = %target, "fetching platform metrics");
    fetcher.fetch(&target).await
}
