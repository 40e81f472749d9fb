//! Instagram collaborator
//!
//! The rest of the service only talks to Instagram through the two traits
//! defined here: a [`ProfileSource`] is one authenticated session able to
//! look up profiles, and a [`SessionFactory`] knows how to log an account in
//! and how to turn a persisted [`SessionToken`] back into a live session.

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::AccountConfig;
use crate::errors::UpstreamResult;

pub mod instagram;
pub mod session;

pub use crate::models::UpstreamProfile;
pub use instagram::{InstagramClient, InstagramSessionFactory, InstagramSettings};
pub use session::SessionToken;

/// An authenticated handle able to fetch profile attributes
#[async_trait]
pub trait ProfileSource: Send + Sync {
    /// Username of the account this session belongs to
    fn account(&self) -> &str;

    /// Look up a profile by its (already normalized) username
    async fn fetch_profile(&self, username: &str) -> UpstreamResult<UpstreamProfile>;
}

/// Creates sessions, either by logging in or from a saved token
#[async_trait]
pub trait SessionFactory: Send + Sync {
    /// Authenticate with the account's credentials
    async fn login(&self, account: &AccountConfig) -> UpstreamResult<SessionToken>;

    /// Build a live session around a token
    fn open(&self, token: SessionToken) -> UpstreamResult<Arc<dyn ProfileSource>>;
}
