//! Instagram web client
//!
//! Talks to the same JSON endpoints the Instagram web app uses. Session
//! state is a plain cookie map carried in a [`SessionToken`], so the client
//! itself holds no cookie jar and can be rebuilt from a saved file.

use async_trait::async_trait;
use reqwest::{
    header::{COOKIE, REFERER},
    Client, Response, StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::{ProfileSource, SessionFactory, SessionToken, UpstreamProfile};
use crate::config::{AccountConfig, InstagramConfig};
use crate::errors::{UpstreamError, UpstreamResult};

const IG_APP_ID: &str = "936619743392459";
const PROFILE_INFO_PATH: &str = "/api/v1/users/web_profile_info/";
const LOGIN_PAGE_PATH: &str = "/accounts/login/";
const LOGIN_AJAX_PATH: &str = "/api/v1/web/accounts/login/ajax/";

/// Connection settings shared by every session
#[derive(Debug, Clone)]
pub struct InstagramSettings {
    pub base_url: String,
    pub user_agent: String,
    pub timeout: Duration,
}

impl InstagramSettings {
    pub fn from_config(config: &InstagramConfig) -> anyhow::Result<Self> {
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            user_agent: config.user_agent.clone(),
            timeout: config.request_timeout_duration()?,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn http_client(&self) -> UpstreamResult<Client> {
        Client::builder()
            .user_agent(&self.user_agent)
            .timeout(self.timeout)
            .build()
            .map_err(|e| UpstreamError::unexpected(format!("Failed to create HTTP client: {e}")))
    }
}

#[derive(Debug, Deserialize)]
struct WebProfileInfo {
    data: Option<WebProfileData>,
}

#[derive(Debug, Deserialize)]
struct WebProfileData {
    user: Option<WebUser>,
}

#[derive(Debug, Deserialize)]
struct WebUser {
    username: Option<String>,
    full_name: Option<String>,
    biography: Option<String>,
    profile_pic_url: Option<String>,
    profile_pic_url_hd: Option<String>,
    #[serde(default)]
    edge_followed_by: EdgeCount,
    #[serde(default)]
    edge_follow: EdgeCount,
    #[serde(default)]
    edge_owner_to_timeline_media: EdgeCount,
}

#[derive(Debug, Default, Deserialize)]
struct EdgeCount {
    #[serde(default)]
    count: u64,
}

#[derive(Debug, Default, Deserialize)]
struct LoginOutcome {
    #[serde(default)]
    authenticated: bool,
    #[serde(default)]
    two_factor_required: bool,
    checkpoint_url: Option<String>,
    message: Option<String>,
}

/// Statuses meaning "try again later" rather than "this request is wrong"
fn is_transient(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS
        || status == StatusCode::UNAUTHORIZED
        || status == StatusCode::FORBIDDEN
        || status.is_server_error()
}

/// One logged-in Instagram session
pub struct InstagramClient {
    http: Client,
    settings: InstagramSettings,
    token: SessionToken,
}

impl InstagramClient {
    pub fn new(settings: InstagramSettings, token: SessionToken) -> UpstreamResult<Self> {
        let http = settings.http_client()?;
        Ok(Self {
            http,
            settings,
            token,
        })
    }

    pub fn token(&self) -> &SessionToken {
        &self.token
    }

    /// Log in with username and password, returning the resulting cookies
    pub async fn login(
        settings: &InstagramSettings,
        username: &str,
        password: &str,
    ) -> UpstreamResult<SessionToken> {
        let http = settings.http_client()?;
        let mut token = SessionToken::new(username);
        let login_page = settings.url(LOGIN_PAGE_PATH);

        let page = http.get(&login_page).send().await?;
        token.absorb_set_cookies(page.headers());
        if is_transient(page.status()) {
            return Err(UpstreamError::connection(format!(
                "login page returned HTTP {}",
                page.status()
            )));
        }
        let csrf = token
            .csrf_token()
            .map(str::to_owned)
            .ok_or_else(|| UpstreamError::login_failed(username, "no CSRF token issued"))?;

        let enc_password = format!(
            "#PWD_INSTAGRAM_BROWSER:0:{}:{}",
            chrono::Utc::now().timestamp(),
            password
        );
        let mut request = http
            .post(settings.url(LOGIN_AJAX_PATH))
            .header("X-CSRFToken", &csrf)
            .header("X-Requested-With", "XMLHttpRequest")
            .header("X-IG-App-ID", IG_APP_ID)
            .header(REFERER, &login_page)
            .form(&[
                ("username", username),
                ("enc_password", enc_password.as_str()),
                ("queryParams", "{}"),
                ("optIntoOneTap", "false"),
            ]);
        if let Some(cookies) = token.cookie_header() {
            request = request.header(COOKIE, cookies);
        }

        let response = request.send().await?;
        token.absorb_set_cookies(response.headers());
        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            return Err(UpstreamError::connection(format!("login returned HTTP {status}")));
        }

        let body = response.bytes().await?;
        let outcome: LoginOutcome = serde_json::from_slice(&body).map_err(|e| {
            UpstreamError::login_failed(username, format!("unreadable login response ({status}): {e}"))
        })?;

        if outcome.two_factor_required {
            return Err(UpstreamError::login_failed(
                username,
                "two-factor authentication required",
            ));
        }
        if let Some(checkpoint) = outcome.checkpoint_url {
            return Err(UpstreamError::login_failed(
                username,
                format!("checkpoint required: {checkpoint}"),
            ));
        }
        if !outcome.authenticated || !token.is_authenticated() {
            let message = outcome
                .message
                .unwrap_or_else(|| "credentials were rejected".to_string());
            return Err(UpstreamError::login_failed(username, message));
        }

        debug!("Instagram login succeeded for {}", username);
        Ok(token)
    }

    async fn read_profile_response(
        response: Response,
        username: &str,
    ) -> UpstreamResult<UpstreamProfile> {
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(UpstreamError::ProfileNotFound {
                username: username.to_string(),
            });
        }
        if is_transient(status) {
            return Err(UpstreamError::connection(format!("HTTP {status}")));
        }
        // An expired session gets bounced to the login page
        if response.url().path().starts_with(LOGIN_PAGE_PATH) {
            return Err(UpstreamError::connection("session redirected to login"));
        }
        if !status.is_success() {
            return Err(UpstreamError::unexpected(format!("HTTP {status}")));
        }

        let body = response.bytes().await?;
        let info: WebProfileInfo = serde_json::from_slice(&body)
            .map_err(|e| UpstreamError::unexpected(format!("invalid profile payload: {e}")))?;

        let user = info
            .data
            .and_then(|data| data.user)
            .ok_or_else(|| UpstreamError::ProfileNotFound {
                username: username.to_string(),
            })?;

        Ok(UpstreamProfile {
            username: user.username.unwrap_or_else(|| username.to_string()),
            full_name: user.full_name,
            biography: user.biography,
            profile_pic_url: user
                .profile_pic_url_hd
                .or(user.profile_pic_url)
                .unwrap_or_default(),
            followers: user.edge_followed_by.count,
            followees: user.edge_follow.count,
            mediacount: user.edge_owner_to_timeline_media.count,
        })
    }
}

#[async_trait]
impl ProfileSource for InstagramClient {
    fn account(&self) -> &str {
        &self.token.username
    }

    async fn fetch_profile(&self, username: &str) -> UpstreamResult<UpstreamProfile> {
        let mut request = self
            .http
            .get(self.settings.url(PROFILE_INFO_PATH))
            .query(&[("username", username)])
            .header("X-IG-App-ID", IG_APP_ID)
            .header(REFERER, format!("{}/{}/", self.settings.base_url, username));
        if let Some(cookies) = self.token.cookie_header() {
            request = request.header(COOKIE, cookies);
        }
        if let Some(csrf) = self.token.csrf_token() {
            request = request.header("X-CSRFToken", csrf);
        }

        let response = request.send().await?;
        Self::read_profile_response(response, username).await
    }
}

/// Session factory backed by the real Instagram endpoints
#[derive(Debug, Clone)]
pub struct InstagramSessionFactory {
    settings: InstagramSettings,
}

impl InstagramSessionFactory {
    pub fn new(settings: InstagramSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl SessionFactory for InstagramSessionFactory {
    async fn login(&self, account: &AccountConfig) -> UpstreamResult<SessionToken> {
        let password = account.password()?;
        InstagramClient::login(&self.settings, &account.username, &password).await
    }

    fn open(&self, token: SessionToken) -> UpstreamResult<Arc<dyn ProfileSource>> {
        Ok(Arc::new(InstagramClient::new(self.settings.clone(), token)?))
    }
}
