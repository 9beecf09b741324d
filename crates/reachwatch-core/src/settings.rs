//! Operator-editable settings file: profile targets and cache/broadcast tunables.
//!
//! Reads take a shared lock; [`SettingsStore::update_profile`] holds the
//! exclusive lock across both the in-memory change and the file write, so
//! profile updates are serialized against each other and against readers.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::platform::Platform;
use crate::ConfigError;

pub const DEFAULT_CACHE_TTL_SECS: u64 = 600;

/// On-disk shape of the settings file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub profiles: BTreeMap<String, Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_ttl_seconds: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub broadcast_interval_seconds: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub broadcast_webhook_url: Option<String>,
    /// Keys this version does not know about, preserved on rewrite.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Settings {
    #[must_use]
    pub fn target(&self, platform: Platform) -> Option<String> {
        self.profiles
            .get(platform.profile_key())
            .and_then(Option::as_deref)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(ToOwned::to_owned)
    }

    #[must_use]
    pub fn cache_ttl_seconds(&self) -> u64 {
        self.cache_ttl_seconds.unwrap_or(DEFAULT_CACHE_TTL_SECS)
    }

    /// Broadcast cadence; defaults to the cache TTL and is never below one second.
    #[must_use]
    pub fn broadcast_interval_seconds(&self) -> u64 {
        self.broadcast_interval_seconds
            .unwrap_or_else(|| self.cache_ttl_seconds())
            .max(1)
    }
}

/// Shared handle to the settings file.
#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
    inner: RwLock<Settings>,
}

impl SettingsStore {
    /// Wraps already-parsed settings. Nothing is written until the first update.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, settings: Settings) -> Self {
        Self {
            path: path.into(),
            inner: RwLock::new(settings),
        }
    }

    /// Reads and parses the settings file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::SettingsFileMissing`] if the file does not exist,
    /// [`ConfigError::SettingsFileIo`] if it cannot be read, and
    /// [`ConfigError::SettingsFileParse`] if it is not valid settings JSON.
    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ConfigError::SettingsFileMissing {
                    path: path.display().to_string(),
                });
            }
            Err(e) => {
                return Err(ConfigError::SettingsFileIo {
                    path: path.display().to_string(),
                    source: e,
                });
            }
        };
        let settings: Settings = serde_json::from_str(&content)?;
        Ok(Self::new(path, settings))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Configured target for `platform`; blank values count as not configured.
    pub async fn target(&self, platform: Platform) -> Option<String> {
        self.inner.read().await.target(platform)
    }

    pub async fn cache_ttl_seconds(&self) -> u64 {
        self.inner.read().await.cache_ttl_seconds()
    }

    pub async fn broadcast_interval_seconds(&self) -> u64 {
        self.inner.read().await.broadcast_interval_seconds()
    }

    pub async fn broadcast_webhook_url(&self) -> Option<String> {
        self.inner
            .read()
            .await
            .broadcast_webhook_url
            .clone()
            .filter(|url| !url.trim().is_empty())
    }

    /// Current target of every known platform.
    pub async fn profiles(&self) -> BTreeMap<Platform, Option<String>> {
        let settings = self.inner.read().await;
        Platform::ALL
            .into_iter()
            .map(|platform| (platform, settings.target(platform)))
            .collect()
    }

    /// Records a new target identifier and persists the whole file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownProfileKey`] if `key` is not a known
    /// profile key, or [`ConfigError::SettingsFileIo`] if the file cannot be
    /// written. On a write failure the in-memory value is rolled back.
    pub async fn update_profile(&self, key: &str, value: &str) -> Result<Platform, ConfigError> {
        let platform = Platform::from_profile_key(key)
            .ok_or_else(|| ConfigError::UnknownProfileKey(key.to_string()))?;

        let mut settings = self.inner.write().await;
        let previous = settings
            .profiles
            .insert(key.to_string(), Some(value.trim().to_string()));

        let write_result = match serde_json::to_string_pretty(&*settings) {
            Ok(json) => tokio::fs::write(&self.path, json + "\n")
                .await
                .map_err(|e| ConfigError::SettingsFileIo {
                    path: self.path.display().to_string(),
                    source: e,
                }),
            Err(e) => Err(ConfigError::SettingsFileParse(e)),
        };

        if let Err(e) = write_result {
            match previous {
                Some(old) => settings.profiles.insert(key.to_string(), old),
                None => settings.profiles.remove(key),
            };
            return Err(e);
        }

        tracing::info!(platform = %platform, key, "profile target updated");
        Ok(platform)
    }
}
