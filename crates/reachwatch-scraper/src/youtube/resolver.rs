//! Channel-id resolution for the video channel fetcher.
//!
//! Canonical ids are taken verbatim or read from the URL path. Anything else
//! (handles, custom URLs, video links) goes through a [`ChannelResolver`],
//! which in production shells out to `yt-dlp`.

use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::Url;
use serde::Deserialize;

use crate::error::FetchError;

/// Canonical channel ids start with this prefix.
const CHANNEL_ID_PREFIX: &str = "UC";
const CHANNEL_ID_MIN_LEN: usize = 24;

/// Result of resolving a channel URL through a metadata extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedChannel {
    pub id: String,
    pub handle: Option<String>,
}

/// Resolves a channel URL or handle to a channel id.
pub trait ChannelResolver: Send + Sync {
    fn resolve<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<ResolvedChannel, FetchError>>;
}

#[must_use]
pub fn looks_like_channel_id(candidate: &str) -> bool {
    candidate.starts_with(CHANNEL_ID_PREFIX) && candidate.len() >= CHANNEL_ID_MIN_LEN
}

/// Returns the canonical channel id for `target` without any I/O, if the
/// target is an id or a URL whose path contains one.
#[must_use]
pub fn channel_id_from_target(target: &str) -> Option<String> {
    let candidate = target.trim();
    if looks_like_channel_id(candidate) {
        return Some(candidate.to_owned());
    }
    let url = Url::parse(candidate).ok()?;
    let segments: Vec<&str> = url.path_segments()?.filter(|s| !s.is_empty()).collect();
    segments
        .into_iter()
        .rev()
        .find(|s| looks_like_channel_id(s))
        .map(str::to_owned)
}

/// Resolves `target` to a channel id, consulting `resolver` only when the
/// target does not already carry one.
///
/// # Errors
///
/// Returns [`FetchError::Resolve`] if the resolver fails.
pub async fn resolve_channel_id(
    target: &str,
    resolver: &dyn ChannelResolver,
) -> Result<String, FetchError> {
    if let Some(id) = channel_id_from_target(target) {
        return Ok(id);
    }

    tracing::debug!(profile = target, "channel id not in target, asking metadata resolver");
    let resolved = resolver.resolve(target.trim()).await.map_err(|e| match e {
        FetchError::Resolve(_) => e,
        other => FetchError::Resolve(other.to_string()),
    })?;
    tracing::debug!(
        profile = target,
        id = %resolved.id,
        handle = resolved.handle.as_deref().unwrap_or(""),
        "resolved channel"
    );
    Ok(resolved.id)
}

#[derive(Debug, Default, Deserialize)]
struct YtDlpInfo {
    channel_id: Option<String>,
    channel: Option<String>,
    uploader_id: Option<String>,
    uploader: Option<String>,
}

impl YtDlpInfo {
    fn into_resolved(self) -> Option<ResolvedChannel> {
        let handle = self.uploader_id.clone().filter(|s| !s.is_empty());
        let id = [self.channel_id, self.channel, self.uploader_id, self.uploader]
            .into_iter()
            .flatten()
            .find(|s| !s.is_empty())?;
        Some(ResolvedChannel { id, handle })
    }
}

/// Resolves channels by running the `yt-dlp` binary as a subprocess.
pub struct YtDlpResolver {
    bin: String,
    timeout: Duration,
}

impl YtDlpResolver {
    #[must_use]
    pub fn new(bin: impl Into<String>, timeout: Duration) -> Self {
        Self {
            bin: bin.into(),
            timeout,
        }
    }

    async fn run(&self, url: &str) -> Result<ResolvedChannel, FetchError> {
        let command = tokio::process::Command::new(&self.bin)
            .args([
                "--dump-single-json",
                "--flat-playlist",
                "--playlist-items",
                "0",
                "--skip-download",
                "--no-warnings",
                "--quiet",
                url,
            ])
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.timeout, command)
            .await
            .map_err(|_| {
                FetchError::Resolve(format!(
                    "{} timed out after {}s",
                    self.bin,
                    self.timeout.as_secs()
                ))
            })?
            .map_err(|e| FetchError::Resolve(format!("{} subprocess error: {e}", self.bin)))?;

        if !output.status.success() {
            tracing::warn!(
                bin = %self.bin,
                url,
                status = %output.status,
                "metadata extractor returned non-zero exit"
            );
            return Err(FetchError::Resolve(format!(
                "{} exited with {}",
                self.bin, output.status
            )));
        }

        parse_ytdlp_output(&output.stdout)
    }
}

impl ChannelResolver for YtDlpResolver {
    fn resolve<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<ResolvedChannel, FetchError>> {
        self.run(url).boxed()
    }
}

fn parse_ytdlp_output(stdout: &[u8]) -> Result<ResolvedChannel, FetchError> {
    let info: YtDlpInfo = serde_json::from_slice(stdout)
        .map_err(|e| FetchError::Resolve(format!("unreadable metadata output: {e}")))?;
    info.into_resolved()
        .ok_or_else(|| FetchError::Resolve("metadata carried no channel fields".to_string()))
}
