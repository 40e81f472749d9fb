use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, SET_COOKIE};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const SESSION_COOKIE: &str = "sessionid";
const CSRF_COOKIE: &str = "csrftoken";

/// Persisted authentication state of one account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionToken {
    pub username: String,
    pub cookies: BTreeMap<String, String>,
    pub created_at: DateTime<Utc>,
}

impl SessionToken {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            cookies: BTreeMap::new(),
            created_at: Utc::now(),
        }
    }

    /// Whether Instagram issued a session cookie
    pub fn is_authenticated(&self) -> bool {
        self.cookies.contains_key(SESSION_COOKIE)
    }

    pub fn csrf_token(&self) -> Option<&str> {
        self.cookies.get(CSRF_COOKIE).map(String::as_str)
    }

    /// `Cookie` header value, `None` when no cookies are held
    pub fn cookie_header(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }
        Some(
            self.cookies
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    /// Merge every `Set-Cookie` header of a response into the token.
    /// Cookies set to an empty value or `deleted` are dropped.
    pub fn absorb_set_cookies(&mut self, headers: &HeaderMap) {
        for value in headers.get_all(SET_COOKIE) {
            let Ok(raw) = value.to_str() else { continue };
            let pair = raw.split(';').next().unwrap_or_default();
            let Some((name, value)) = pair.split_once('=') else {
                continue;
            };
            let name = name.trim();
            let value = value.trim().trim_matches('"');
            if name.is_empty() {
                continue;
            }
            if value.is_empty() || value == "deleted" {
                self.cookies.remove(name);
            } else {
                self.cookies.insert(name.to_string(), value.to_string());
            }
        }
    }
}
