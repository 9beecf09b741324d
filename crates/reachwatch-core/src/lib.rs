pub mod app_config;
pub mod config;
pub mod platform;
pub mod report;
pub mod settings;
pub mod stats;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use platform::{Metric, Platform};
pub use report::render_report;
pub use settings::{Settings, SettingsStore, DEFAULT_CACHE_TTL_SECS};
pub use stats::{Metrics, PlatformResult, ProfileStats, Snapshot, Status};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("settings file '{path}' not found; create it from config.json.example")]
    SettingsFileMissing { path: String },

    #[error("failed to access settings file '{path}': {source}")]
    SettingsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings file: {0}")]
    SettingsFileParse(#[from] serde_json::Error),

    #[error("unknown profile key: {0}")]
    UnknownProfileKey(String),
}
