//! Plain-text rendering of a [`Snapshot`] for chat-style delivery.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use chrono::{Duration, Local};

use crate::platform::{Metric, Platform};
use crate::stats::{PlatformResult, Snapshot};

const NOT_CONFIGURED: &str = "not configured";

fn report_fields(platform: Platform) -> &'static [Metric] {
    match platform {
        Platform::Youtube => &[Metric::Followers, Metric::Videos, Metric::Views],
        Platform::Tiktok => &[Metric::Followers, Metric::Likes],
    }
}

/// Renders `snapshot` as a multi-line report.
///
/// `profiles` supplies the configured target shown next to each platform
/// title; `ttl_seconds` drives the "next refresh" footer.
#[must_use]
pub fn render_report(
    snapshot: &Snapshot,
    profiles: &BTreeMap<Platform, Option<String>>,
    ttl_seconds: u64,
) -> String {
    let generated_local = snapshot.generated_at.with_timezone(&Local);
    let timestamp = generated_local.format("%d/%m/%Y - %H:%M").to_string();
    let next_refresh = i64::try_from(ttl_seconds)
        .ok()
        .and_then(Duration::try_seconds)
        .and_then(|ttl| generated_local.checked_add_signed(ttl))
        .unwrap_or(generated_local);
    let ttl_minutes = (ttl_seconds / 60).max(1);

    let mut lines = vec![format!("📊 Your updated statistics ({timestamp})"), String::new()];
    for platform in Platform::ALL {
        let target = profiles.get(&platform).cloned().flatten();
        lines.push(render_platform_block(
            platform,
            target.as_deref(),
            snapshot.get(platform),
        ));
        lines.push(String::new());
    }
    lines.push(format!("Last update: {timestamp}"));
    lines.push(format!(
        "Next automatic update: {} (cache max. {ttl_minutes} min)",
        next_refresh.format("%H:%M")
    ));
    lines.join("\n")
}

fn render_platform_block(
    platform: Platform,
    target: Option<&str>,
    result: Option<&PlatformResult>,
) -> String {
    let shown = match (platform, target) {
        (_, None) => NOT_CONFIGURED.to_string(),
        (Platform::Tiktok, Some(user)) => format!("@{}", user.trim_start_matches('@')),
        (Platform::Youtube, Some(url)) => url.to_string(),
    };
    let mut block = format!("{}: {shown}", platform.title());

    match result {
        None => block.push_str("\n➡️ No data."),
        Some(PlatformResult::NotConfigured) => {
            block.push_str("\n➡️ Configure it with `config set`.");
        }
        Some(PlatformResult::Blocked { .. }) => {
            block.push_str("\n➡️ Temporarily unavailable (temporary block).");
        }
        Some(PlatformResult::Error { message }) => {
            let _ = write!(block, "\n➡️ Error: {message}.");
        }
        Some(ok @ PlatformResult::Ok { .. }) => {
            for metric in report_fields(platform) {
                let _ = write!(
                    block,
                    "\n{}: {}",
                    metric.label(),
                    format_number(ok.metric(*metric))
                );
            }
        }
    }
    block
}

/// Formats a count with `.` thousands grouping; absent values read "unavailable".
#[must_use]
pub fn format_number(value: Option<u64>) -> String {
    let Some(value) = value else {
        return "unavailable".to_string();
    };
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::stats::Metrics;

    fn snapshot() -> Snapshot {
        Snapshot::new(
            BTreeMap::from([
                (
                    Platform::Youtube,
                    PlatformResult::Ok {
                        identifier: "youtube.com/@chan".to_string(),
                        metrics: Metrics::from([
                            (Metric::Followers, Some(1_234_567)),
                            (Metric::Videos, Some(42)),
                            (Metric::Views, None),
                        ]),
                    },
                ),
                (Platform::Tiktok, PlatformResult::blocked("429")),
            ]),
            Utc::now(),
        )
    }

    #[test]
    fn format_number_groups_thousands() {
        assert_eq!(format_number(Some(0)), "0");
        assert_eq!(format_number(Some(999)), "999");
        assert_eq!(format_number(Some(1000)), "1.000");
        assert_eq!(format_number(Some(1_234_567)), "1.234.567");
        assert_eq!(format_number(None), "unavailable");
    }

    #[test]
    fn report_renders_metrics_and_status_lines() {
        let profiles = BTreeMap::from([
            (Platform::Youtube, Some("https://youtube.com/@chan".to_string())),
            (Platform::Tiktok, Some("creator".to_string())),
        ]);
        let text = render_report(&snapshot(), &profiles, 600);
        assert!(text.contains("YouTube: https://youtube.com/@chan"));
        assert!(text.contains("Followers: 1.234.567"));
        assert!(text.contains("Videos: 42"));
        assert!(text.contains("Total views: unavailable"));
        assert!(text.contains("TikTok: @creator"));
        assert!(text.contains("Temporarily unavailable"));
        assert!(text.contains("cache max. 10 min"));
    }

    #[test]
    fn report_handles_unconfigured_and_errors() {
        let snap = Snapshot::new(
            BTreeMap::from([
                (Platform::Youtube, PlatformResult::NotConfigured),
                (Platform::Tiktok, PlatformResult::error("page changed")),
            ]),
            Utc::now(),
        );
        let profiles = BTreeMap::from([
            (Platform::Youtube, None),
            (Platform::Tiktok, Some("creator".to_string())),
        ]);
        let text = render_report(&snap, &profiles, 30);
        assert!(text.contains("YouTube: not configured"));
        assert!(text.contains("Configure it with `config set`."));
        assert!(text.contains("Error: page changed."));
        assert!(text.contains("cache max. 1 min"));
    }
}
