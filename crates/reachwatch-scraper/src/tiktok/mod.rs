//! Short-video profile fetcher.
//!
//! Tries the signed TokCount API first and falls back to scraping the public
//! profile page. A block on the API is preserved as `Blocked` when the page
//! scrape also fails.

pub mod signing;
mod tokcount;
mod web;

use futures::future::BoxFuture;
use futures::FutureExt;
use percent_encoding::{AsciiSet, CONTROLS};
use reachwatch_core::{Platform, PlatformResult, ProfileStats};
use reqwest::Client;
use serde_json::Value;

use crate::error::FetchError;
use crate::fallback::FallbackChain;
use crate::fetcher::{into_platform_result, PlatformFetcher};

pub use tokcount::TokcountApi;
pub use web::{parse_profile_page, ProfilePage};

/// Characters escaped when a username is placed in a URL path segment.
pub(crate) const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

pub struct TiktokFetcher {
    chain: FallbackChain,
}

impl TiktokFetcher {
    /// Production fetcher: TokCount first, profile page second.
    #[must_use]
    pub fn new(client: Client, user_agent: String) -> Self {
        let chain = FallbackChain::new(Box::new(TokcountApi::new(client.clone(), user_agent)))
            .then(Box::new(ProfilePage::new(client)));
        Self { chain }
    }

    /// Same chain pointed at alternate hosts (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidBaseUrl`] if either base URL does not
    /// parse.
    pub fn with_base_urls(
        client: Client,
        user_agent: String,
        tokcount_base_url: &str,
        page_base_url: &str,
    ) -> Result<Self, FetchError> {
        let chain = FallbackChain::new(Box::new(TokcountApi::with_base_url(
            client.clone(),
            user_agent,
            tokcount_base_url,
        )?))
        .then(Box::new(ProfilePage::with_base_url(client, page_base_url)?));
        Ok(Self { chain })
    }

    /// Wraps an arbitrary strategy chain.
    #[must_use]
    pub fn from_chain(chain: FallbackChain) -> Self {
        Self { chain }
    }

    /// # Errors
    ///
    /// Returns [`FetchError::Parse`] for a blank username, otherwise the
    /// folded chain failure.
    pub async fn fetch_stats(&self, target: &str) -> Result<ProfileStats, FetchError> {
        let username = normalize_username(target);
        if username.is_empty() {
            return Err(FetchError::Parse("TikTok username is empty".to_string()));
        }
        self.chain.run(username).await
    }
}

impl PlatformFetcher for TiktokFetcher {
    fn platform(&self) -> Platform {
        Platform::Tiktok
    }

    fn fetch<'a>(&'a self, target: &'a str) -> BoxFuture<'a, PlatformResult> {
        async move { into_platform_result(Platform::Tiktok, self.fetch_stats(target).await) }
            .boxed()
    }
}

/// Strips surrounding whitespace and any leading `@`.
fn normalize_username(target: &str) -> &str {
    target.trim().trim_start_matches('@').trim()
}

/// Loose truthiness for JSON flags: `null`, `false`, `0`, `""`, `[]` and
/// `{}` are false.
pub(crate) fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f.abs() > 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
    }
}
