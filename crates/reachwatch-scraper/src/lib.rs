//! Per-platform audience metric fetchers.
//!
//! Every fetcher implements [`PlatformFetcher`] and folds its failures into a
//! [`reachwatch_core::PlatformResult`]; nothing escapes as an error. The
//! short-video fetcher composes a signed API client and a public page scrape
//! through a [`FallbackChain`].

pub mod embed;
pub mod error;
pub mod fallback;
pub mod fetcher;
pub mod http;
pub mod normalize;
pub mod tiktok;
pub mod youtube;

pub use error::FetchError;
pub use fallback::{FallbackChain, FetchStrategy};
pub use fetcher::{default_fetchers, into_platform_result, PlatformFetcher};
pub use http::build_http_client;
pub use normalize::{normalize_stat, parse_count};
pub use tiktok::TiktokFetcher;
pub use youtube::{ChannelResolver, ResolvedChannel, YoutubeFetcher, YtDlpResolver};
