use serde::{Deserialize, Serialize};

/// Profile attributes as returned by the upstream client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamProfile {
    pub username: String,
    pub full_name: Option<String>,
    pub biography: Option<String>,
    pub profile_pic_url: String,
    pub followers: u64,
    pub followees: u64,
    pub mediacount: u64,
}

/// Shaped profile returned to callers and stored in the response cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub full_name: String,
    pub bio: String,
    pub profile_pic_url: String,
    pub followers: u64,
    pub following: u64,
    pub posts_count: u64,
}

impl From<UpstreamProfile> for ProfileSummary {
    fn from(profile: UpstreamProfile) -> Self {
        Self {
            full_name: profile.full_name.unwrap_or_default(),
            bio: profile.biography.unwrap_or_default(),
            profile_pic_url: profile.profile_pic_url,
            followers: profile.followers,
            following: profile.followees,
            posts_count: profile.mediacount,
        }
    }
}

/// Trim and lower-case a username. Every cache key goes through this.
pub fn normalize_username(raw: &str) -> String {
    raw.trim().to_lowercase()
}
