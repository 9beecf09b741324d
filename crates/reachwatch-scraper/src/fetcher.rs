use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use reachwatch_core::{AppConfig, Platform, PlatformResult, ProfileStats};

use crate::error::FetchError;
use crate::http::build_http_client;
use crate::tiktok::TiktokFetcher;
use crate::youtube::{YoutubeFetcher, YtDlpResolver};

/// Fetches one platform's metrics for a configured target.
///
/// Implementations never fail across this boundary: every failure is folded
/// into the returned [`PlatformResult`].
pub trait PlatformFetcher: Send + Sync {
    fn platform(&self) -> Platform;

    fn fetch<'a>(&'a self, target: &'a str) -> BoxFuture<'a, PlatformResult>;
}

/// Converts a strategy outcome into the platform result shape, classifying
/// temporary blocks separately from every other failure.
pub fn into_platform_result(
    platform: Platform,
    outcome: Result<ProfileStats, FetchError>,
) -> PlatformResult {
    match outcome {
        Ok(stats) => {
            tracing::info!(platform = %platform, identifier = %stats.identifier, "fetch succeeded");
            PlatformResult::from(stats)
        }
        Err(e) if e.is_temporary_block() => {
            tracing::warn!(platform = %platform, error = %e, "fetch temporarily blocked");
            PlatformResult::blocked(e.to_string())
        }
        Err(e) => {
            tracing::error!(platform = %platform, error = %e, "fetch failed");
            PlatformResult::error(e.to_string())
        }
    }
}

/// Builds the production fetcher for every known platform, sharing one HTTP
/// client.
///
/// # Errors
///
/// Returns [`FetchError::Http`] if the HTTP client cannot be built.
pub fn default_fetchers(config: &AppConfig) -> Result<Vec<Arc<dyn PlatformFetcher>>, FetchError> {
    let client = build_http_client(config.request_timeout_secs, &config.user_agent)?;
    let resolver = Arc::new(YtDlpResolver::new(
        config.ytdlp_bin.clone(),
        Duration::from_secs(config.request_timeout_secs),
    ));

    let youtube = YoutubeFetcher::new(client.clone(), resolver);
    let tiktok = TiktokFetcher::new(client, config.user_agent.clone());

    Ok(vec![Arc::new(youtube), Arc::new(tiktok)])
}

#[cfg(test)]
mod tests {
    use reachwatch_core::{Metric, Metrics, Status};

    use super::*;

    #[test]
    fn blocked_error_maps_to_blocked_status() {
        let result = into_platform_result(
            Platform::Tiktok,
            Err(FetchError::Blocked("TokCount returned 429".to_string())),
        );
        assert_eq!(result.status(), Status::Blocked);
        assert_eq!(result.message(), Some("TokCount returned 429"));
    }

    #[test]
    fn other_errors_map_to_error_status_with_message() {
        let result = into_platform_result(
            Platform::Youtube,
            Err(FetchError::UnexpectedStatus {
                service: "YouTube",
                status: 503,
            }),
        );
        assert_eq!(result.status(), Status::Error);
        assert_eq!(result.message(), Some("YouTube responded with status 503"));
    }

    #[test]
    fn success_maps_to_ok_with_metrics() {
        let result = into_platform_result(
            Platform::Youtube,
            Ok(ProfileStats {
                identifier: "https://www.youtube.com/@chan".to_string(),
                metrics: Metrics::from([(Metric::Followers, Some(12))]),
            }),
        );
        assert!(result.is_ok());
        assert_eq!(result.metric(Metric::Followers), Some(12));
    }
}
