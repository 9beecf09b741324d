//! Primary short-video strategy: the signed TokCount JSON API.

use futures::future::BoxFuture;
use futures::FutureExt;
use percent_encoding::utf8_percent_encode;
use reachwatch_core::{Metric, Metrics, ProfileStats};
use reqwest::{Client, StatusCode};
use serde_json::Value;

use super::signing::signed_headers;
use super::{is_truthy, PATH_SEGMENT};
use crate::error::FetchError;
use crate::fallback::FetchStrategy;
use crate::http::normalize_base_url;
use crate::normalize::normalize_stat;

pub(crate) const DEFAULT_BASE_URL: &str = "https://tiktok.tokcount.com";
const SERVICE: &str = "TokCount";

/// Client for the TokCount user lookup and stats endpoints.
pub struct TokcountApi {
    client: Client,
    base_url: String,
    user_agent: String,
}

impl TokcountApi {
    #[must_use]
    pub fn new(client: Client, user_agent: String) -> Self {
        Self {
            client,
            base_url: DEFAULT_BASE_URL.to_owned(),
            user_agent,
        }
    }

    /// # Errors
    ///
    /// Returns [`FetchError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        client: Client,
        user_agent: String,
        base_url: &str,
    ) -> Result<Self, FetchError> {
        Ok(Self {
            client,
            base_url: normalize_base_url(base_url)?,
            user_agent,
        })
    }

    /// Resolves `username` to its internal id, then fetches its stats.
    ///
    /// # Errors
    ///
    /// - [`FetchError::Blocked`] on 401/403/429 or a challenge response.
    /// - [`FetchError::Api`] when the body reports `success: false`.
    /// - [`FetchError::Http`], [`FetchError::UnexpectedStatus`] or
    ///   [`FetchError::Parse`] for transport and shape failures.
    pub async fn fetch_stats(&self, username: &str) -> Result<ProfileStats, FetchError> {
        tracing::info!(username, "fetching short-video stats via TokCount");
        let encoded = utf8_percent_encode(username, PATH_SEGMENT).to_string();
        let user = self.get(&format!("/user/data/{encoded}")).await?;

        let user_id = user_id(&user).ok_or_else(|| FetchError::Api {
            service: SERVICE,
            message: "response did not include the user id".to_string(),
        })?;
        let stats = self.get(&format!("/user/stats/{user_id}")).await?;

        let handle = user
            .get("username")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .unwrap_or(username);

        Ok(ProfileStats {
            identifier: format!("@{handle}"),
            metrics: Metrics::from([
                (Metric::Followers, normalize_stat(stats.get("followerCount"))),
                (Metric::Likes, normalize_stat(stats.get("likeCount"))),
                (Metric::Following, normalize_stat(stats.get("followingCount"))),
                (Metric::Videos, normalize_stat(stats.get("videoCount"))),
            ]),
        })
    }

    /// Sends one freshly signed GET and checks the response envelope.
    ///
    /// Block statuses are classified before the body is read.
    async fn get(&self, path: &str) -> Result<Value, FetchError> {
        let url = format!("{}{path}", self.base_url);
        let timestamp_ms = chrono::Utc::now().timestamp_millis();

        let mut request = self.client.get(&url);
        for (name, value) in signed_headers(timestamp_ms, &self.user_agent, true) {
            request = request.header(name, value);
        }

        let response = request.send().await?;
        let status = response.status();
        if matches!(
            status,
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS
        ) {
            return Err(FetchError::Blocked(format!(
                "TokCount blocked access (status {})",
                status.as_u16()
            )));
        }
        if !status.is_success() {
            return Err(FetchError::UnexpectedStatus {
                service: SERVICE,
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let payload: Value = serde_json::from_str(&body)
            .map_err(|e| FetchError::Parse(format!("TokCount returned an invalid response: {e}")))?;
        check_envelope(payload)
    }
}

/// Rejects `success: false` bodies, treating a challenge flag as a block.
fn check_envelope(payload: Value) -> Result<Value, FetchError> {
    if is_truthy(payload.get("success")) {
        return Ok(payload);
    }
    let message = payload
        .get("message")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or("TokCount returned an error")
        .to_owned();
    if is_truthy(payload.get("challenge")) {
        return Err(FetchError::Blocked(message));
    }
    Err(FetchError::Api {
        service: SERVICE,
        message,
    })
}

fn user_id(user: &Value) -> Option<String> {
    match user.get("userId")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

impl FetchStrategy for TokcountApi {
    fn name(&self) -> &'static str {
        "tokcount"
    }

    fn fetch<'a>(&'a self, target: &'a str) -> BoxFuture<'a, Result<ProfileStats, FetchError>> {
        self.fetch_stats(target).boxed()
    }
}
