//! Integration tests for `YoutubeFetcher` against a `wiremock` about page.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use reachwatch_core::{Metric, Status};
use reachwatch_scraper::{
    build_http_client, ChannelResolver, FetchError, PlatformFetcher, ResolvedChannel,
    YoutubeFetcher,
};

const CHANNEL_ID: &str = "UCX6OQ3DkcsbYNE6H8uQQuVA";

/// Resolver double that records calls and returns a fixed outcome.
struct StubResolver {
    id: Option<&'static str>,
    calls: AtomicU32,
}

impl StubResolver {
    fn new(id: Option<&'static str>) -> Arc<Self> {
        Arc::new(Self {
            id,
            calls: AtomicU32::new(0),
        })
    }
}

impl ChannelResolver for StubResolver {
    fn resolve<'a>(&'a self, _url: &'a str) -> BoxFuture<'a, Result<ResolvedChannel, FetchError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let outcome = match self.id {
            Some(id) => Ok(ResolvedChannel {
                id: id.to_string(),
                handle: Some("@chan".to_string()),
            }),
            None => Err(FetchError::Resolve("yt-dlp exited with 1".to_string())),
        };
        async move { outcome }.boxed()
    }
}

fn test_fetcher(server: &MockServer, resolver: Arc<StubResolver>, timeout_secs: u64) -> YoutubeFetcher {
    let client = build_http_client(timeout_secs, "reachwatch-test/0.1").expect("failed to build client");
    YoutubeFetcher::with_base_url(client, resolver, &server.uri()).expect("failed to build fetcher")
}

fn about_html() -> String {
    let data = json!({
        "onResponseReceivedEndpoints": [{
            "showEngagementPanelEndpoint": {
                "engagementPanel": {
                    "aboutChannelRenderer": {
                        "metadata": {
                            "aboutChannelViewModel": {
                                "displayCanonicalChannelUrl": "www.youtube.com/@chan",
                                "subscriberCountText": "12.3K subscribers",
                                "videoCountText": "1,234 videos",
                                "viewCountText": "2M views"
                            }
                        }
                    }
                }
            }
        }]
    });
    format!("<html><script nonce=\"x\">var ytInitialData = {data};</script></html>")
}

#[tokio::test]
async fn about_page_metrics_are_normalized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/channel/{CHANNEL_ID}/about")))
        .respond_with(ResponseTemplate::new(200).set_body_string(about_html()))
        .expect(1)
        .mount(&server)
        .await;

    let resolver = StubResolver::new(None);
    let fetcher = test_fetcher(&server, Arc::clone(&resolver), 5);
    let result = fetcher
        .fetch(&format!("https://www.youtube.com/channel/{CHANNEL_ID}"))
        .await;

    assert!(result.is_ok(), "expected Ok, got: {result:?}");
    assert_eq!(result.metric(Metric::Followers), Some(12_300));
    assert_eq!(result.metric(Metric::Videos), Some(1_234));
    assert_eq!(result.metric(Metric::Views), Some(2_000_000));
    assert_eq!(resolver.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn handle_is_resolved_before_fetching() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/channel/{CHANNEL_ID}/about")))
        .respond_with(ResponseTemplate::new(200).set_body_string(about_html()))
        .expect(1)
        .mount(&server)
        .await;

    let resolver = StubResolver::new(Some(CHANNEL_ID));
    let fetcher = test_fetcher(&server, Arc::clone(&resolver), 5);
    let result = fetcher.fetch("https://www.youtube.com/@chan").await;

    assert!(result.is_ok(), "expected Ok, got: {result:?}");
    assert_eq!(resolver.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unresolvable_handle_is_error() {
    let server = MockServer::start().await;
    let fetcher = test_fetcher(&server, StubResolver::new(None), 5);

    let result = fetcher.fetch("@chan").await;

    assert_eq!(result.status(), Status::Error);
    assert!(result
        .message()
        .is_some_and(|m| m.starts_with("channel id could not be resolved")));
}

#[tokio::test]
async fn non_200_about_page_is_error_with_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/channel/{CHANNEL_ID}/about")))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let fetcher = test_fetcher(&server, StubResolver::new(None), 5);
    let result = fetcher.fetch(CHANNEL_ID).await;

    assert_eq!(result.status(), Status::Error);
    assert_eq!(result.message(), Some("YouTube responded with status 503"));
}

#[tokio::test]
async fn page_without_about_section_is_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/channel/{CHANNEL_ID}/about")))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("<html>var ytInitialData = {\"a\":1};</html>"),
        )
        .mount(&server)
        .await;

    let fetcher = test_fetcher(&server, StubResolver::new(None), 5);
    let result = fetcher.fetch(CHANNEL_ID).await;

    assert_eq!(result.status(), Status::Error);
    assert_eq!(
        result.message(),
        Some("channel data not found on the about page")
    );
}

#[tokio::test]
async fn slow_about_page_times_out_as_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/channel/{CHANNEL_ID}/about")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(about_html())
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let fetcher = test_fetcher(&server, StubResolver::new(None), 1);
    let result = fetcher.fetch(CHANNEL_ID).await;

    assert_eq!(result.status(), Status::Error);
}
