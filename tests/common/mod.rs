#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{HeaderMap, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use ig_profile_proxy::{
    config::Config,
    errors::{UpstreamError, UpstreamResult},
    models::UpstreamProfile,
    sessions::AccountPool,
    upstream::ProfileSource,
    web::{router, AppState},
};

/// Canned Instagram session counting how often it is asked
pub struct MockSource {
    account: String,
    profiles: HashMap<String, UpstreamResult<UpstreamProfile>>,
    calls: AtomicUsize,
}

impl MockSource {
    pub fn new(account: &str) -> Self {
        Self {
            account: account.to_string(),
            profiles: HashMap::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_profile(mut self, profile: UpstreamProfile) -> Self {
        self.profiles.insert(profile.username.clone(), Ok(profile));
        self
    }

    pub fn with_error(mut self, username: &str, error: UpstreamError) -> Self {
        self.profiles.insert(username.to_string(), Err(error));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProfileSource for MockSource {
    fn account(&self) -> &str {
        &self.account
    }

    async fn fetch_profile(&self, username: &str) -> UpstreamResult<UpstreamProfile> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.profiles
            .get(username)
            .cloned()
            .unwrap_or_else(|| {
                Err(UpstreamError::ProfileNotFound {
                    username: username.to_string(),
                })
            })
    }
}

pub fn sample_profile(username: &str) -> UpstreamProfile {
    UpstreamProfile {
        username: username.to_string(),
        full_name: Some("National Geographic".to_string()),
        biography: Some("Taking our understanding of the world further.".to_string()),
        profile_pic_url: "https://cdn.example.com/natgeo.jpg".to_string(),
        followers: 283_000_000,
        followees: 160,
        mediacount: 30_000,
    }
}

/// Source that knows `natgeo`, reports `ghost` as missing, `busy` as a
/// connection failure and `broken` as an unexpected failure
pub fn default_source() -> Arc<MockSource> {
    Arc::new(
        MockSource::new("scraper_one")
            .with_profile(sample_profile("natgeo"))
            .with_error(
                "ghost",
                UpstreamError::ProfileNotFound {
                    username: "ghost".to_string(),
                },
            )
            .with_error("busy", UpstreamError::connection("HTTP 429 Too Many Requests"))
            .with_error("broken", UpstreamError::unexpected("response had no data field")),
    )
}

pub fn test_state(config: Config, source: Arc<MockSource>) -> AppState {
    let pool = AccountPool::new(vec![source as Arc<dyn ProfileSource>]).unwrap();
    AppState::new(config, pool).unwrap()
}

pub fn test_app(source: Arc<MockSource>) -> (Router, AppState) {
    let state = test_state(Config::default(), source);
    (router(state.clone()), state)
}

pub fn client_addr(last_octet: u8) -> SocketAddr {
    SocketAddr::from(([192, 0, 2, last_octet], 40000))
}

pub async fn send_raw(
    app: &Router,
    uri: &str,
    client: SocketAddr,
    headers: &[(&str, &str)],
) -> (StatusCode, HeaderMap, Vec<u8>) {
    let mut builder = Request::builder().method("GET").uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let mut request = builder.body(Body::empty()).unwrap();
    request.extensions_mut().insert(ConnectInfo(client));

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, headers, body.to_vec())
}

/// Issue a GET from `client` and decode the JSON body
pub async fn send_request(app: &Router, uri: &str, client: SocketAddr) -> (StatusCode, Value) {
    let (status, _, body) = send_raw(app, uri, client, &[]).await;
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}
