use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

pub mod defaults;

use defaults::*;

use crate::errors::UpstreamError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub instagram: InstagramConfig,
    #[serde(default)]
    pub image_proxy: ImageProxyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Embedded page served at `/`
    #[serde(default = "default_index_page")]
    pub index_page: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_max_entries")]
    pub max_entries: usize,
    #[serde(default = "default_cache_ttl")]
    pub ttl: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_rate_limit_enabled")]
    pub enabled: bool,
    /// Per client address, applies to the profile endpoint only
    #[serde(default = "default_profile_requests_per_minute")]
    pub profile_requests_per_minute: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstagramConfig {
    #[serde(default = "default_session_dir")]
    pub session_dir: PathBuf,
    #[serde(default = "default_instagram_base_url")]
    pub base_url: String,
    #[serde(default = "default_instagram_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_upstream_timeout")]
    pub request_timeout: String,
    #[serde(default)]
    pub accounts: Vec<AccountConfig>,
}

/// A scraping account. Passwords never live in the config file; they are
/// looked up from the environment when a fresh login is needed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountConfig {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_env: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageProxyConfig {
    #[serde(default = "default_image_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_image_content_type")]
    pub default_content_type: String,
    #[serde(default = "default_upstream_timeout")]
    pub request_timeout: String,
}

// Web defaults
fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_index_page() -> String {
    DEFAULT_INDEX_PAGE.to_string()
}

// Cache defaults
fn default_cache_max_entries() -> usize {
    DEFAULT_CACHE_MAX_ENTRIES
}

fn default_cache_ttl() -> String {
    DEFAULT_CACHE_TTL.to_string()
}

// Rate limit defaults
fn default_rate_limit_enabled() -> bool {
    DEFAULT_RATE_LIMIT_ENABLED
}

fn default_profile_requests_per_minute() -> u32 {
    DEFAULT_PROFILE_REQUESTS_PER_MINUTE
}

// Instagram defaults
fn default_session_dir() -> PathBuf {
    PathBuf::from(DEFAULT_SESSION_DIR)
}

fn default_instagram_base_url() -> String {
    DEFAULT_INSTAGRAM_BASE_URL.to_string()
}

fn default_instagram_user_agent() -> String {
    DEFAULT_INSTAGRAM_USER_AGENT.to_string()
}

fn default_upstream_timeout() -> String {
    DEFAULT_UPSTREAM_TIMEOUT.to_string()
}

// Image proxy defaults
fn default_image_user_agent() -> String {
    DEFAULT_IMAGE_USER_AGENT.to_string()
}

fn default_image_content_type() -> String {
    DEFAULT_IMAGE_CONTENT_TYPE.to_string()
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            index_page: default_index_page(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: default_cache_max_entries(),
            ttl: default_cache_ttl(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: default_rate_limit_enabled(),
            profile_requests_per_minute: default_profile_requests_per_minute(),
        }
    }
}

impl Default for InstagramConfig {
    fn default() -> Self {
        Self {
            session_dir: default_session_dir(),
            base_url: default_instagram_base_url(),
            user_agent: default_instagram_user_agent(),
            request_timeout: default_upstream_timeout(),
            accounts: Vec::new(),
        }
    }
}

impl Default for ImageProxyConfig {
    fn default() -> Self {
        Self {
            user_agent: default_image_user_agent(),
            default_content_type: default_image_content_type(),
            request_timeout: default_upstream_timeout(),
        }
    }
}

impl CacheConfig {
    pub fn ttl_duration(&self) -> Result<Duration> {
        parse_duration("cache.ttl", &self.ttl)
    }
}

impl InstagramConfig {
    pub fn request_timeout_duration(&self) -> Result<Duration> {
        parse_duration("instagram.request_timeout", &self.request_timeout)
    }
}

impl ImageProxyConfig {
    pub fn request_timeout_duration(&self) -> Result<Duration> {
        parse_duration("image_proxy.request_timeout", &self.request_timeout)
    }
}

impl AccountConfig {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password_env: None,
        }
    }

    /// Name of the environment variable holding this account's password
    pub fn password_env_var(&self) -> String {
        if let Some(name) = &self.password_env {
            return name.clone();
        }
        let suffix: String = self
            .username
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_uppercase()
                } else {
                    '_'
                }
            })
            .collect();
        format!("{PASSWORD_ENV_PREFIX}{suffix}")
    }

    /// Resolve the password from the environment
    pub fn password(&self) -> Result<String, UpstreamError> {
        let env_var = self.password_env_var();
        match std::env::var(&env_var) {
            Ok(password) if !password.is_empty() => Ok(password),
            _ => Err(UpstreamError::MissingCredentials {
                username: self.username.clone(),
                env_var,
            }),
        }
    }
}

fn parse_duration(field: &str, value: &str) -> Result<Duration> {
    humantime::parse_duration(value)
        .with_context(|| format!("Invalid duration for {field}: '{value}'"))
}

/// Instagram usernames are limited to letters, digits, periods and
/// underscores, which also keeps session file names inside the session dir.
fn is_valid_username(username: &str) -> bool {
    !username.is_empty()
        && username.len() <= 30
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_')
}

impl Config {
    pub fn load_from_file(config_file: &str) -> Result<Self> {
        let config = if std::path::Path::new(&config_file).exists() {
            let contents = std::fs::read_to_string(config_file)?;
            toml::from_str(&contents)?
        } else {
            let default_config = Self::default();
            let contents = toml::to_string_pretty(&default_config)?;
            std::fs::write(config_file, contents)?;
            info!("Created default config file: {}", config_file);
            default_config
        };
        Ok(config)
    }

    /// Check values that serde cannot enforce
    pub fn validate(&self) -> Result<()> {
        if self.cache.max_entries == 0 {
            bail!("cache.max_entries must be greater than zero");
        }
        self.cache.ttl_duration()?;
        self.instagram.request_timeout_duration()?;
        self.image_proxy.request_timeout_duration()?;

        if self.rate_limit.enabled && self.rate_limit.profile_requests_per_minute == 0 {
            bail!("rate_limit.profile_requests_per_minute must be greater than zero");
        }

        url::Url::parse(&self.instagram.base_url)
            .with_context(|| format!("Invalid instagram.base_url: '{}'", self.instagram.base_url))?;

        let mut seen = std::collections::HashSet::new();
        for account in &self.instagram.accounts {
            if !is_valid_username(&account.username) {
                bail!("Invalid Instagram username in config: '{}'", account.username);
            }
            if !seen.insert(account.username.to_lowercase()) {
                bail!("Duplicate Instagram account in config: '{}'", account.username);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_service_contract() {
        let config = Config::default();
        assert_eq!(config.cache.max_entries, 500);
        assert_eq!(config.cache.ttl_duration().unwrap(), Duration::from_secs(600));
        assert_eq!(config.rate_limit.profile_requests_per_minute, 10);
        assert_eq!(config.image_proxy.default_content_type, "image/jpeg");
        assert_eq!(config.instagram.session_dir, PathBuf::from("./sessions"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [web]
            port = 9000

            [[instagram.accounts]]
            username = "first.account"

            [[instagram.accounts]]
            username = "second_account"
            password_env = "SECOND_SECRET"
            "#,
        )
        .unwrap();

        assert_eq!(config.web.port, 9000);
        assert_eq!(config.web.host, "0.0.0.0");
        assert_eq!(config.instagram.accounts.len(), 2);
        assert_eq!(config.instagram.accounts[1].password_env.as_deref(), Some("SECOND_SECRET"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_password_env_var_naming() {
        let account = AccountConfig::new("first.account");
        assert_eq!(account.password_env_var(), "IG_PROFILE_PROXY_PASSWORD_FIRST_ACCOUNT");

        let explicit = AccountConfig {
            username: "whatever".to_string(),
            password_env: Some("MY_SECRET".to_string()),
        };
        assert_eq!(explicit.password_env_var(), "MY_SECRET");
    }

    #[test]
    fn test_missing_password_is_reported() {
        let account = AccountConfig {
            username: "nobody".to_string(),
            password_env: Some("IG_PROFILE_PROXY_TEST_UNSET_SECRET".to_string()),
        };
        match account.password() {
            Err(UpstreamError::MissingCredentials { username, env_var }) => {
                assert_eq!(username, "nobody");
                assert_eq!(env_var, "IG_PROFILE_PROXY_TEST_UNSET_SECRET");
            }
            other => panic!("expected missing credentials, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.cache.ttl = "soon".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.instagram.accounts.push(AccountConfig::new("../etc"));
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.instagram.accounts.push(AccountConfig::new("Same"));
        config.instagram.accounts.push(AccountConfig::new("same"));
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.rate_limit.profile_requests_per_minute = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_writes_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let path_str = path.to_str().unwrap();

        let config = Config::load_from_file(path_str).unwrap();
        assert!(path.exists());
        assert_eq!(config.web.port, DEFAULT_PORT);

        let reloaded = Config::load_from_file(path_str).unwrap();
        assert_eq!(reloaded.cache.max_entries, config.cache.max_entries);
    }
}
