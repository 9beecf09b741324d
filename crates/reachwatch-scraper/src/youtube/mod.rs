//! Video channel fetcher that scrapes the channel's "about" page.

mod resolver;

use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use reachwatch_core::{Metric, Metrics, Platform, PlatformResult, ProfileStats};
use reqwest::{Client, StatusCode};
use serde_json::Value;

use crate::embed::{extract_initial_data, find_key};
use crate::error::FetchError;
use crate::fetcher::{into_platform_result, PlatformFetcher};
use crate::http::normalize_base_url;
use crate::normalize::parse_count;

pub use resolver::{
    channel_id_from_target, looks_like_channel_id, resolve_channel_id, ChannelResolver,
    ResolvedChannel, YtDlpResolver,
};

const DEFAULT_BASE_URL: &str = "https://www.youtube.com";
const SERVICE: &str = "YouTube";

/// Fetches subscriber, video and view counts for a channel.
///
/// Use [`YoutubeFetcher::new`] for production or
/// [`YoutubeFetcher::with_base_url`] to point at a mock server in tests.
pub struct YoutubeFetcher {
    client: Client,
    base_url: String,
    resolver: Arc<dyn ChannelResolver>,
}

impl YoutubeFetcher {
    #[must_use]
    pub fn new(client: Client, resolver: Arc<dyn ChannelResolver>) -> Self {
        Self {
            client,
            base_url: DEFAULT_BASE_URL.to_owned(),
            resolver,
        }
    }

    /// # Errors
    ///
    /// Returns [`FetchError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        client: Client,
        resolver: Arc<dyn ChannelResolver>,
        base_url: &str,
    ) -> Result<Self, FetchError> {
        Ok(Self {
            client,
            base_url: normalize_base_url(base_url)?,
            resolver,
        })
    }

    /// Resolves the channel id and scrapes its about page.
    ///
    /// # Errors
    ///
    /// - [`FetchError::Resolve`] if no channel id can be determined.
    /// - [`FetchError::Http`] on network failure or timeout.
    /// - [`FetchError::UnexpectedStatus`] on a non-200 response.
    /// - [`FetchError::Parse`] if the embedded page data or the about
    ///   section is missing.
    pub async fn fetch_stats(&self, target: &str) -> Result<ProfileStats, FetchError> {
        let channel_id = resolve_channel_id(target, self.resolver.as_ref()).await?;
        let url = format!("{}/channel/{channel_id}/about", self.base_url);

        tracing::info!(profile = target, %channel_id, "fetching channel about page");
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::UnexpectedStatus {
                service: SERVICE,
                status: status.as_u16(),
            });
        }
        let html = response.text().await?;

        parse_about_page(&html, &channel_id)
    }
}

impl PlatformFetcher for YoutubeFetcher {
    fn platform(&self) -> Platform {
        Platform::Youtube
    }

    fn fetch<'a>(&'a self, target: &'a str) -> BoxFuture<'a, PlatformResult> {
        async move { into_platform_result(Platform::Youtube, self.fetch_stats(target).await) }
            .boxed()
    }
}

/// Reads the about section out of a channel page.
///
/// # Errors
///
/// Returns [`FetchError::Parse`] if `ytInitialData` or the about renderer is
/// missing.
pub fn parse_about_page(html: &str, channel_id: &str) -> Result<ProfileStats, FetchError> {
    let payload = extract_initial_data(html)?;
    let about = find_key(&payload, "aboutChannelRenderer")
        .ok_or_else(|| FetchError::Parse("channel data not found on the about page".to_string()))?;

    let empty = Value::Null;
    let view_model = about
        .get("metadata")
        .and_then(|m| m.get("aboutChannelViewModel"))
        .unwrap_or(&empty);

    let identifier = ["displayCanonicalChannelUrl", "canonicalChannelUrl"]
        .iter()
        .find_map(|key| {
            view_model
                .get(*key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
        })
        .unwrap_or(channel_id)
        .to_owned();

    let metrics = Metrics::from([
        (Metric::Followers, count_field(view_model, "subscriberCountText")),
        (Metric::Videos, count_field(view_model, "videoCountText")),
        (Metric::Views, count_field(view_model, "viewCountText")),
    ]);

    Ok(ProfileStats {
        identifier,
        metrics,
    })
}

/// Count fields are plain strings on current pages and `{simpleText}` or
/// `{content}` objects on older layouts.
fn count_field(view_model: &Value, key: &str) -> Option<u64> {
    let field = view_model.get(key)?;
    let text = match field {
        Value::String(s) => Some(s.as_str()),
        Value::Object(map) => map
            .get("simpleText")
            .or_else(|| map.get("content"))
            .and_then(Value::as_str),
        _ => None,
    };
    parse_count(text)
}
