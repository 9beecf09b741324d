//! Fallback short-video strategy: scrape the public profile page.

use futures::future::BoxFuture;
use futures::FutureExt;
use percent_encoding::utf8_percent_encode;
use reachwatch_core::{Metric, Metrics, ProfileStats};
use reqwest::header::REFERER;
use reqwest::{Client, StatusCode};
use serde_json::Value;

use super::{is_truthy, PATH_SEGMENT};
use crate::embed::extract_rehydration_data;
use crate::error::FetchError;
use crate::fallback::FetchStrategy;
use crate::http::normalize_base_url;
use crate::normalize::normalize_stat;

pub(crate) const DEFAULT_BASE_URL: &str = "https://www.tiktok.com";
const SERVICE: &str = "TikTok";

pub struct ProfilePage {
    client: Client,
    base_url: String,
}

impl ProfilePage {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: DEFAULT_BASE_URL.to_owned(),
        }
    }

    /// # Errors
    ///
    /// Returns [`FetchError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(client: Client, base_url: &str) -> Result<Self, FetchError> {
        Ok(Self {
            client,
            base_url: normalize_base_url(base_url)?,
        })
    }

    /// # Errors
    ///
    /// - [`FetchError::Http`] on network failure or timeout.
    /// - [`FetchError::UnexpectedStatus`] on a non-200 response.
    /// - [`FetchError::Parse`] if the embedded profile data is missing.
    pub async fn fetch_stats(&self, username: &str) -> Result<ProfileStats, FetchError> {
        tracing::info!(username, "fetching short-video stats from the profile page");
        let encoded = utf8_percent_encode(username, PATH_SEGMENT);
        let url = format!("{}/@{encoded}", self.base_url);

        let response = self
            .client
            .get(&url)
            .header(REFERER, format!("{}/", self.base_url))
            .send()
            .await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::UnexpectedStatus {
                service: SERVICE,
                status: status.as_u16(),
            });
        }
        let html = response.text().await?;
        parse_profile_page(&html, username)
    }
}

impl FetchStrategy for ProfilePage {
    fn name(&self) -> &'static str {
        "profile_page"
    }

    fn fetch<'a>(&'a self, target: &'a str) -> BoxFuture<'a, Result<ProfileStats, FetchError>> {
        self.fetch_stats(target).boxed()
    }
}

/// Reads the user's stats from the page's rehydration payload.
///
/// # Errors
///
/// Returns [`FetchError::Parse`] naming the first missing level.
pub fn parse_profile_page(html: &str, username: &str) -> Result<ProfileStats, FetchError> {
    let data = extract_rehydration_data(html)?;

    let user_detail = data
        .get("__DEFAULT_SCOPE__")
        .and_then(|scope| scope.get("webapp.user-detail"))
        .filter(|v| is_truthy(Some(*v)))
        .ok_or_else(|| {
            FetchError::Parse(
                "TikTok did not return the expected data (webapp.user-detail missing)".to_string(),
            )
        })?;

    let user_info = user_detail
        .get("userInfo")
        .filter(|v| is_truthy(Some(*v)))
        .ok_or_else(|| {
            FetchError::Parse("TikTok did not return the user's profile (userInfo missing)".to_string())
        })?;
    let stats = user_info
        .get("stats")
        .filter(|v| is_truthy(Some(*v)))
        .ok_or_else(|| FetchError::Parse("TikTok did not return the user's statistics".to_string()))?;

    let handle = user_info
        .get("user")
        .and_then(|user| user.get("uniqueId"))
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or(username);

    let likes = stats
        .get("heartCount")
        .filter(|v| is_truthy(Some(*v)))
        .or_else(|| stats.get("heart"));

    Ok(ProfileStats {
        identifier: format!("@{handle}"),
        metrics: Metrics::from([
            (Metric::Followers, normalize_stat(stats.get("followerCount"))),
            (Metric::Likes, normalize_stat(likes)),
            (Metric::Following, normalize_stat(stats.get("followingCount"))),
            (Metric::Videos, normalize_stat(stats.get("videoCount"))),
        ]),
    })
}
