//! One-shot statistics collection.

use std::sync::Arc;

use reachwatch_collector::Collector;
use reachwatch_core::{render_report, AppConfig, SettingsStore, Snapshot};

/// Runs a single collection and prints the report, or the raw snapshot
/// when `json` is set.
///
/// # Errors
///
/// Returns an error if the settings file cannot be loaded, the HTTP client
/// cannot be built, or the snapshot cannot be serialized. Per-platform fetch
/// failures are part of the snapshot and never fail the command.
pub(crate) async fn run_stats(config: &AppConfig, json: bool) -> anyhow::Result<()> {
    let settings = Arc::new(SettingsStore::load(&config.settings_path).await?);
    let fetchers = reachwatch_scraper::default_fetchers(config)?;
    let collector = Collector::new(Arc::clone(&settings), fetchers).await;

    tracing::info!(settings = %config.settings_path.display(), "collecting stats");
    let snapshot = collector.get_snapshot().await;
    let unavailable = unavailable_platforms(&snapshot);
    if !unavailable.is_empty() {
        tracing::warn!(platforms = %unavailable.join(","), "some platforms did not return statistics");
    }
    if json {
        println!("{}", serde_json::to_string_pretty(&*snapshot)?);
    } else {
        let profiles = settings.profiles().await;
        println!(
            "{}",
            render_report(&snapshot, &profiles, collector.ttl().as_secs())
        );
    }
    Ok(())
}

/// Platforms whose result is anything but `Ok`.
pub(crate) fn unavailable_platforms(snapshot: &Snapshot) -> Vec<&'static str> {
    snapshot
        .results
        .iter()
        .filter(|(_, result)| !result.is_ok())
        .map(|(platform, _)| platform.as_str())
        .collect()
}
