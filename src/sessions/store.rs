use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use super::AccountPool;
use crate::config::AccountConfig;
use crate::errors::{AppError, AppResult};
use crate::upstream::{ProfileSource, SessionFactory, SessionToken};

/// Per-account session files under a single directory
#[derive(Debug, Clone)]
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn session_path(&self, username: &str) -> PathBuf {
        self.dir.join(format!("{username}_session.json"))
    }

    /// Read a saved token, `Ok(None)` when the account has no file yet
    pub async fn load(&self, username: &str) -> AppResult<Option<SessionToken>> {
        let path = self.session_path(username);
        let contents = match tokio::fs::read(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let token: SessionToken = serde_json::from_slice(&contents)?;
        if token.username != username {
            return Err(AppError::validation(format!(
                "session file {} belongs to '{}'",
                path.display(),
                token.username
            )));
        }
        Ok(Some(token))
    }

    pub async fn save(&self, token: &SessionToken) -> AppResult<PathBuf> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.session_path(&token.username);
        let contents = serde_json::to_vec_pretty(token)?;
        tokio::fs::write(&path, contents).await?;
        Ok(path)
    }

    /// Open a session for every account that can be loaded or logged in.
    ///
    /// Accounts that fail are logged and skipped; the call only fails when
    /// no account at all produced a session.
    pub async fn initialize_pool(
        &self,
        accounts: &[AccountConfig],
        factory: &dyn SessionFactory,
    ) -> AppResult<AccountPool> {
        let mut sessions = Vec::with_capacity(accounts.len());

        for account in accounts {
            match self.open_session(account, factory).await {
                Ok(session) => sessions.push(session),
                Err(e) => warn!("Failed session for {}: {}", account.username, e),
            }
        }

        let pool = AccountPool::new(sessions)?;
        info!(
            "Session pool ready with {} of {} accounts",
            pool.len(),
            accounts.len()
        );
        Ok(pool)
    }

    async fn open_session(
        &self,
        account: &AccountConfig,
        factory: &dyn SessionFactory,
    ) -> AppResult<Arc<dyn ProfileSource>> {
        match self.load(&account.username).await {
            Ok(Some(token)) => {
                let session = factory.open(token)?;
                info!("Loaded session: {}", account.username);
                return Ok(session);
            }
            Ok(None) => {}
            Err(e) => warn!(
                "Ignoring unreadable session file for {}: {}",
                account.username, e
            ),
        }

        info!("Logging in: {}...", account.username);
        let token = factory.login(account).await?;
        let path = self.save(&token).await?;
        let session = factory.open(token)?;
        info!(path = %path.display(), "New session saved: {}", account.username);
        Ok(session)
    }
}
