use bytes::Bytes;
use reqwest::{header::CONTENT_TYPE, Client};
use tracing::debug;
use url::Url;

use crate::config::ImageProxyConfig;
use crate::errors::{AppError, AppResult};

/// A remote image relayed as-is
#[derive(Debug, Clone)]
pub struct ProxiedImage {
    pub bytes: Bytes,
    pub content_type: String,
}

/// Fetches remote images server-side so browsers never hit the origin
#[derive(Debug, Clone)]
pub struct ImageProxyService {
    client: Client,
    default_content_type: String,
}

impl ImageProxyService {
    pub fn new(config: &ImageProxyConfig) -> AppResult<Self> {
        let timeout = config
            .request_timeout_duration()
            .map_err(|e| AppError::configuration(e.to_string()))?;
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            default_content_type: config.default_content_type.clone(),
        })
    }

    /// Fetch `raw_url` and return its body with the upstream content type.
    /// The upstream status code is not inspected.
    pub async fn fetch(&self, raw_url: &str) -> AppResult<ProxiedImage> {
        let url = Url::parse(raw_url)
            .map_err(|e| AppError::validation(format!("Invalid image URL '{raw_url}': {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(AppError::validation(format!(
                "Unsupported image URL scheme: {}",
                url.scheme()
            )));
        }

        let response = self.client.get(url).send().await?;
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty())
            .map(str::to_owned)
            .unwrap_or_else(|| self.default_content_type.clone());
        let bytes = response.bytes().await?;

        debug!("Proxied {} bytes of {} from {}", bytes.len(), content_type, raw_url);
        Ok(ProxiedImage {
            bytes,
            content_type,
        })
    }
}
