//! Shared `reqwest` client with a desktop-browser header fingerprint.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL};
use reqwest::{Client, Url};

use crate::error::FetchError;

const BROWSER_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";

/// Builds the client every fetcher shares.
///
/// `timeout_secs` bounds each request end to end; a timed-out request
/// surfaces as [`FetchError::Http`].
///
/// # Errors
///
/// Returns [`FetchError::Http`] if the underlying `reqwest::Client`
/// cannot be constructed (e.g., invalid TLS config or user agent).
pub fn build_http_client(timeout_secs: u64, user_agent: &str) -> Result<Client, FetchError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(BROWSER_ACCEPT));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));

    let client = Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .user_agent(user_agent)
        .default_headers(headers)
        .build()?;
    Ok(client)
}

/// Validates `base_url` and strips trailing slashes so paths can be appended
/// with a single `/`.
///
/// # Errors
///
/// Returns [`FetchError::InvalidBaseUrl`] if `base_url` does not parse.
pub(crate) fn normalize_base_url(base_url: &str) -> Result<String, FetchError> {
    let trimmed = base_url.trim_end_matches('/');
    Url::parse(trimmed).map_err(|e| FetchError::InvalidBaseUrl {
        url: base_url.to_owned(),
        reason: e.to_string(),
    })?;
    Ok(trimmed.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_base_url_strips_trailing_slashes() {
        assert_eq!(
            normalize_base_url("https://www.youtube.com//").unwrap(),
            "https://www.youtube.com"
        );
    }

    #[test]
    fn normalize_base_url_rejects_garbage() {
        assert!(matches!(
            normalize_base_url("not a url"),
            Err(FetchError::InvalidBaseUrl { .. })
        ));
    }

    #[test]
    fn build_http_client_accepts_browser_user_agent() {
        assert!(build_http_client(30, reachwatch_core::config::DEFAULT_USER_AGENT).is_ok());
    }
}
