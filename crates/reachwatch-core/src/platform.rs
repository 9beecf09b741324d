use serde::{Deserialize, Serialize};

/// An upstream site whose audience metrics are tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Youtube,
    Tiktok,
}

impl Platform {
    /// Every platform the collector reports on, in display order.
    pub const ALL: [Platform; 2] = [Platform::Youtube, Platform::Tiktok];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Youtube => "youtube",
            Platform::Tiktok => "tiktok",
        }
    }

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Platform::Youtube => "YouTube",
            Platform::Tiktok => "TikTok",
        }
    }

    /// Settings-file key holding this platform's target identifier.
    #[must_use]
    pub fn profile_key(self) -> &'static str {
        match self {
            Platform::Youtube => "youtube_channel_url",
            Platform::Tiktok => "tiktok_username",
        }
    }

    /// Human description of what the profile key expects.
    #[must_use]
    pub fn profile_description(self) -> &'static str {
        match self {
            Platform::Youtube => "URL or ID of the main YouTube channel",
            Platform::Tiktok => "TikTok username without @",
        }
    }

    #[must_use]
    pub fn from_profile_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.profile_key() == key)
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Name of a single normalized audience metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Followers,
    Videos,
    Views,
    Likes,
    Following,
}

impl Metric {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Metric::Followers => "Followers",
            Metric::Videos => "Videos",
            Metric::Views => "Total views",
            Metric::Likes => "Total likes",
            Metric::Following => "Following",
        }
    }
}
