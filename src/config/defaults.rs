/// Configuration default values
///
/// This module contains all the default values for configuration options,
/// making them easily changeable in one central location.
// Web server defaults
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_INDEX_PAGE: &str = "index.html";

// Response cache defaults
pub const DEFAULT_CACHE_MAX_ENTRIES: usize = 500;
pub const DEFAULT_CACHE_TTL: &str = "600s";

// Rate limiting defaults
pub const DEFAULT_RATE_LIMIT_ENABLED: bool = true;
pub const DEFAULT_PROFILE_REQUESTS_PER_MINUTE: u32 = 10;

// Instagram defaults
pub const DEFAULT_SESSION_DIR: &str = "./sessions";
pub const DEFAULT_INSTAGRAM_BASE_URL: &str = "https://www.instagram.com";
pub const DEFAULT_INSTAGRAM_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36";
pub const DEFAULT_UPSTREAM_TIMEOUT: &str = "30s";

/// Prefix of the environment variable holding an account password when the
/// account does not name one explicitly.
pub const PASSWORD_ENV_PREFIX: &str = "IG_PROFILE_PROXY_PASSWORD_";

// Image proxy defaults
pub const DEFAULT_IMAGE_USER_AGENT: &str = "Mozilla/5.0";
pub const DEFAULT_IMAGE_CONTENT_TYPE: &str = "image/jpeg";
