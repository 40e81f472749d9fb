use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::cache::ProfileCache;
use crate::errors::{AppError, AppResult, UpstreamError};
use crate::models::{normalize_username, ProfileSummary};
use crate::sessions::AccountPool;

/// Cache-first profile lookups
#[derive(Clone)]
pub struct ProfileService {
    pool: AccountPool,
    cache: Arc<ProfileCache>,
}

impl ProfileService {
    pub fn new(pool: AccountPool, cache: Arc<ProfileCache>) -> Self {
        Self { pool, cache }
    }

    pub fn pool(&self) -> &AccountPool {
        &self.pool
    }

    pub fn cache(&self) -> &Arc<ProfileCache> {
        &self.cache
    }

    pub async fn lookup(&self, raw_username: &str) -> AppResult<ProfileSummary> {
        let username = normalize_username(raw_username);
        if username.is_empty() {
            return Err(AppError::validation("Username must not be empty"));
        }

        if let Some(cached) = self.cache.get(&username).await {
            debug!("Cache hit for profile {}", username);
            return Ok(cached);
        }

        let session = self.pool.pick();
        debug!(account = session.account(), "Fetching profile {}", username);

        let profile = session.fetch_profile(&username).await.map_err(|e| {
            match &e {
                UpstreamError::ProfileNotFound { .. } => debug!("{}", e),
                UpstreamError::Connection { .. } => {
                    warn!(account = session.account(), "Instagram connection failed: {}", e)
                }
                _ => error!("Error while fetching profile {}: {}", username, e),
            }
            AppError::from(e)
        })?;

        let summary = ProfileSummary::from(profile);
        self.cache.insert(&username, summary.clone()).await;
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::UpstreamResult;
    use crate::models::UpstreamProfile;
    use crate::upstream::ProfileSource;
    use crate::web::handle_error;
    use async_trait::async_trait;
    use std::time::Duration;
    use tracing_test::traced_test;

    struct FailingSource(UpstreamError);

    #[async_trait]
    impl ProfileSource for FailingSource {
        fn account(&self) -> &str {
            "scraper"
        }

        async fn fetch_profile(&self, _username: &str) -> UpstreamResult<UpstreamProfile> {
            Err(self.0.clone())
        }
    }

    fn service(error: UpstreamError) -> ProfileService {
        let pool = AccountPool::new(vec![Arc::new(FailingSource(error))]).unwrap();
        ProfileService::new(pool, Arc::new(ProfileCache::new(10, Duration::from_secs(600))))
    }

    #[tokio::test]
    #[traced_test]
    async fn test_unexpected_failure_is_logged_once_at_error() {
        let service = service(UpstreamError::unexpected("payload without data"));

        let error = service.lookup("broken").await.unwrap_err();
        assert!(matches!(error, AppError::Internal { .. }));
        let _ = handle_error(error);

        logs_assert(|lines: &[&str]| {
            let errors: Vec<_> = lines.iter().filter(|line| line.contains("ERROR")).collect();
            match errors.as_slice() {
                [only] if only.contains("broken") => Ok(()),
                other => Err(format!("expected one error line naming the profile, got {other:?}")),
            }
        });
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let service = service(UpstreamError::connection("HTTP 429"));

        let error = service.lookup("Busy ").await.unwrap_err();
        assert!(matches!(error, AppError::UpstreamUnavailable { .. }));
        assert!(service.cache().is_empty().await);
    }
}
