//! Per-platform fetch outcomes and the snapshot assembled from them.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::platform::{Metric, Platform};

/// Metric name to value. A metric the upstream did not expose maps to `None`,
/// never to zero.
pub type Metrics = BTreeMap<Metric, Option<u64>>;

/// Identifier and metrics returned by a successful fetch strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileStats {
    pub identifier: String,
    pub metrics: Metrics,
}

/// Discriminant of [`PlatformResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Ok,
    NotConfigured,
    Blocked,
    Error,
}

/// Outcome of fetching one platform for one collection cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PlatformResult {
    Ok { identifier: String, metrics: Metrics },
    NotConfigured,
    /// Rate limited or challenged; expected to clear on a later cycle.
    Blocked { message: String },
    Error { message: String },
}

impl PlatformResult {
    #[must_use]
    pub fn status(&self) -> Status {
        match self {
            PlatformResult::Ok { .. } => Status::Ok,
            PlatformResult::NotConfigured => Status::NotConfigured,
            PlatformResult::Blocked { .. } => Status::Blocked,
            PlatformResult::Error { .. } => Status::Error,
        }
    }

    #[must_use]
    pub fn is_ok(&self) -> bool {
        matches!(self, PlatformResult::Ok { .. })
    }

    pub fn error(message: impl Into<String>) -> Self {
        PlatformResult::Error {
            message: message.into(),
        }
    }

    pub fn blocked(message: impl Into<String>) -> Self {
        PlatformResult::Blocked {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn metric(&self, metric: Metric) -> Option<u64> {
        match self {
            PlatformResult::Ok { metrics, .. } => metrics.get(&metric).copied().flatten(),
            _ => None,
        }
    }

    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            PlatformResult::Blocked { message } | PlatformResult::Error { message } => {
                Some(message)
            }
            _ => None,
        }
    }
}

impl From<ProfileStats> for PlatformResult {
    fn from(stats: ProfileStats) -> Self {
        PlatformResult::Ok {
            identifier: stats.identifier,
            metrics: stats.metrics,
        }
    }
}

/// One collection cycle's output: exactly one result per known platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub results: BTreeMap<Platform, PlatformResult>,
    pub generated_at: DateTime<Utc>,
}

impl Snapshot {
    #[must_use]
    pub fn new(results: BTreeMap<Platform, PlatformResult>, generated_at: DateTime<Utc>) -> Self {
        Self {
            results,
            generated_at,
        }
    }

    #[must_use]
    pub fn get(&self, platform: Platform) -> Option<&PlatformResult> {
        self.results.get(&platform)
    }

    /// A snapshot may be cached only when every platform came back `Ok`.
    ///
    /// A `NotConfigured` platform therefore disables caching for the whole
    /// snapshot until it is configured.
    #[must_use]
    pub fn is_cacheable(&self) -> bool {
        !self.results.is_empty() && self.results.values().all(PlatformResult::is_ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok_result(followers: Option<u64>) -> PlatformResult {
        PlatformResult::Ok {
            identifier: "@someone".to_string(),
            metrics: Metrics::from([(Metric::Followers, followers)]),
        }
    }

    #[test]
    fn ok_result_serializes_with_status_tag_and_null_for_absent_metric() {
        let value = serde_json::to_value(ok_result(None)).unwrap();
        assert_eq!(value["status"], "ok");
        assert_eq!(value["identifier"], "@someone");
        assert!(value["metrics"]["followers"].is_null());
        assert!(value.get("message").is_none());
    }

    #[test]
    fn failure_results_carry_message_only() {
        let value = serde_json::to_value(PlatformResult::blocked("rate limited")).unwrap();
        assert_eq!(value["status"], "blocked");
        assert_eq!(value["message"], "rate limited");
        assert!(value.get("metrics").is_none());

        let value = serde_json::to_value(PlatformResult::NotConfigured).unwrap();
        assert_eq!(value, serde_json::json!({"status": "not_configured"}));
    }

    #[test]
    fn metric_lookup_distinguishes_absent_from_zero() {
        assert_eq!(ok_result(Some(0)).metric(Metric::Followers), Some(0));
        assert_eq!(ok_result(None).metric(Metric::Followers), None);
        assert_eq!(ok_result(Some(5)).metric(Metric::Likes), None);
    }

    #[test]
    fn snapshot_cacheable_only_when_every_platform_ok() {
        let now = Utc::now();
        let all_ok = Snapshot::new(
            BTreeMap::from([
                (Platform::Youtube, ok_result(Some(1))),
                (Platform::Tiktok, ok_result(Some(2))),
            ]),
            now,
        );
        assert!(all_ok.is_cacheable());

        for failing in [
            PlatformResult::NotConfigured,
            PlatformResult::blocked("429"),
            PlatformResult::error("boom"),
        ] {
            let mixed = Snapshot::new(
                BTreeMap::from([
                    (Platform::Youtube, ok_result(Some(1))),
                    (Platform::Tiktok, failing),
                ]),
                now,
            );
            assert!(!mixed.is_cacheable());
        }
    }

    #[test]
    fn snapshot_round_trips_through_json() {
        let snapshot = Snapshot::new(
            BTreeMap::from([
                (Platform::Youtube, ok_result(Some(10))),
                (Platform::Tiktok, PlatformResult::error("boom")),
            ]),
            Utc::now(),
        );
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
    }
}
