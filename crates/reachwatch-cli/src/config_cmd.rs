//! `config show` / `config set` handlers.

use anyhow::{bail, Context};
use clap::Subcommand;
use reachwatch_core::{AppConfig, Platform, SettingsStore};

/// Sub-commands available under `config`.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the settings file values
    Show,
    /// Set a profile target, e.g. `tiktok_username=creator`
    Set {
        /// `key=value` assignment
        assignment: String,
    },
}

/// Splits `key=value`, trimming both sides.
///
/// The key must name a known profile; the value may be empty, which clears
/// the target.
///
/// # Errors
///
/// Returns an error if there is no `=` or the key is not a profile key.
pub(crate) fn parse_assignment(raw: &str) -> anyhow::Result<(Platform, String)> {
    let Some((key, value)) = raw.split_once('=') else {
        bail!("expected key=value, got '{raw}'");
    };
    let key = key.trim();
    let Some(platform) = Platform::from_profile_key(key) else {
        bail!(
            "unknown profile key '{key}'; expected one of: {}",
            known_keys().join(", ")
        );
    };
    Ok((platform, value.trim().to_string()))
}

fn known_keys() -> Vec<&'static str> {
    Platform::ALL.iter().map(|p| p.profile_key()).collect()
}

pub(crate) async fn run_config_show(config: &AppConfig) -> anyhow::Result<()> {
    let settings = SettingsStore::load(&config.settings_path).await?;

    println!("settings file: {}", settings.path().display());
    for (platform, value) in settings.profiles().await {
        println!(
            "  {:<26} {}",
            platform.profile_key(),
            value.as_deref().unwrap_or("(not set)")
        );
    }
    println!("  {:<26} {}", "cache_ttl_seconds", settings.cache_ttl_seconds().await);
    println!(
        "  {:<26} {}",
        "broadcast_interval_seconds", settings.broadcast_interval_seconds().await
    );
    println!(
        "  {:<26} {}",
        "broadcast_webhook_url",
        settings
            .broadcast_webhook_url()
            .await
            .as_deref()
            .unwrap_or("(disabled)")
    );
    Ok(())
}

pub(crate) async fn run_config_set(config: &AppConfig, assignment: &str) -> anyhow::Result<()> {
    let (platform, value) = parse_assignment(assignment)?;
    tracing::debug!(
        key = platform.profile_key(),
        settings = %config.settings_path.display(),
        "updating profile"
    );
    let settings = SettingsStore::load(&config.settings_path).await?;
    settings
        .update_profile(platform.profile_key(), &value)
        .await
        .with_context(|| format!("failed to update {}", platform.profile_key()))?;

    match settings.target(platform).await {
        Some(target) => println!("{} target set to {target}", platform.title()),
        None => println!("{} target cleared", platform.title()),
    }
    Ok(())
}
