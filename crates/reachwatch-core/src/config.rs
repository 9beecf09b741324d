use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Desktop Chrome fingerprint sent to upstream sites unless overridden.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let env = parse_environment(&or_default("REACHWATCH_ENV", "development"));
    let bind_addr = parse_addr("REACHWATCH_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("REACHWATCH_LOG_LEVEL", "info");
    let settings_path = PathBuf::from(or_default("REACHWATCH_SETTINGS_PATH", "./config.json"));

    let api_tokens = lookup("REACHWATCH_API_TOKENS")
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .collect();

    let request_timeout_secs = parse_u64("REACHWATCH_REQUEST_TIMEOUT_SECS", "30")?;
    if request_timeout_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "REACHWATCH_REQUEST_TIMEOUT_SECS".to_string(),
            reason: "timeout must be greater than zero".to_string(),
        });
    }

    let user_agent = or_default("REACHWATCH_USER_AGENT", DEFAULT_USER_AGENT);
    let ytdlp_bin = or_default("REACHWATCH_YTDLP_BIN", "yt-dlp");

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        settings_path,
        api_tokens,
        request_timeout_secs,
        user_agent,
        ytdlp_bin,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::env::VarError;

    use super::*;

    fn lookup_from_map<'a>(
        map: &'a HashMap<&'a str, &'a str>,
    ) -> impl Fn(&str) -> Result<String, VarError> + 'a {
        move |key| {
            map.get(key)
                .map(|v| (*v).to_string())
                .ok_or(VarError::NotPresent)
        }
    }

    #[test]
    fn parse_environment_known_values() {
        assert_eq!(parse_environment("development"), Environment::Development);
        assert_eq!(parse_environment("test"), Environment::Test);
        assert_eq!(parse_environment("production"), Environment::Production);
    }

    #[test]
    fn parse_environment_unknown_defaults_to_development() {
        assert_eq!(parse_environment("staging"), Environment::Development);
    }

    #[test]
    fn build_app_config_applies_defaults() {
        let map: HashMap<&str, &str> = HashMap::new();
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.env, Environment::Development);
        assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:3000");
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.settings_path.to_str(), Some("./config.json"));
        assert!(cfg.api_tokens.is_empty());
        assert_eq!(cfg.request_timeout_secs, 30);
        assert_eq!(cfg.user_agent, DEFAULT_USER_AGENT);
        assert_eq!(cfg.ytdlp_bin, "yt-dlp");
    }

    #[test]
    fn build_app_config_reads_overrides() {
        let mut map = HashMap::new();
        map.insert("REACHWATCH_ENV", "production");
        map.insert("REACHWATCH_BIND_ADDR", "127.0.0.1:8080");
        map.insert("REACHWATCH_SETTINGS_PATH", "/etc/reachwatch/config.json");
        map.insert("REACHWATCH_REQUEST_TIMEOUT_SECS", "12");
        map.insert("REACHWATCH_USER_AGENT", "custom-agent/2.0");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.env, Environment::Production);
        assert_eq!(cfg.bind_addr.port(), 8080);
        assert_eq!(
            cfg.settings_path.to_str(),
            Some("/etc/reachwatch/config.json")
        );
        assert_eq!(cfg.request_timeout_secs, 12);
        assert_eq!(cfg.user_agent, "custom-agent/2.0");
    }

    #[test]
    fn build_app_config_splits_api_tokens() {
        let mut map = HashMap::new();
        map.insert("REACHWATCH_API_TOKENS", " alpha, ,beta ");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.api_tokens, vec!["alpha".to_string(), "beta".to_string()]);
    }

    #[test]
    fn build_app_config_fails_with_invalid_bind_addr() {
        let mut map = HashMap::new();
        map.insert("REACHWATCH_BIND_ADDR", "not-a-socket-addr");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "REACHWATCH_BIND_ADDR"),
            "expected InvalidEnvVar(REACHWATCH_BIND_ADDR), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_fails_with_invalid_timeout() {
        let mut map = HashMap::new();
        map.insert("REACHWATCH_REQUEST_TIMEOUT_SECS", "soon");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "REACHWATCH_REQUEST_TIMEOUT_SECS"),
            "expected InvalidEnvVar(REACHWATCH_REQUEST_TIMEOUT_SECS), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_rejects_zero_timeout() {
        let mut map = HashMap::new();
        map.insert("REACHWATCH_REQUEST_TIMEOUT_SECS", "0");
        let result = build_app_config(lookup_from_map(&map));
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar { .. })));
    }

    #[test]
    fn debug_output_redacts_api_tokens() {
        let mut map = HashMap::new();
        map.insert("REACHWATCH_API_TOKENS", "super-secret");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        let rendered = format!("{cfg:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("1 redacted"));
    }
}
