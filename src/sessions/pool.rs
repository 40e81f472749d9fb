use rand::Rng;
use std::sync::Arc;

use crate::errors::{AppError, AppResult};
use crate::upstream::ProfileSource;

/// Authenticated sessions shared by all requests. Never empty.
#[derive(Clone)]
pub struct AccountPool {
    sessions: Arc<[Arc<dyn ProfileSource>]>,
}

impl std::fmt::Debug for AccountPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountPool")
            .field("accounts", &self.accounts())
            .finish()
    }
}

impl AccountPool {
    pub fn new(sessions: Vec<Arc<dyn ProfileSource>>) -> AppResult<Self> {
        if sessions.is_empty() {
            return Err(AppError::configuration(
                "No valid Instagram sessions found or created.",
            ));
        }
        Ok(Self {
            sessions: sessions.into(),
        })
    }

    /// Pick a session uniformly at random
    pub fn pick(&self) -> Arc<dyn ProfileSource> {
        let index = rand::rng().random_range(0..self.sessions.len());
        Arc::clone(&self.sessions[index])
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn accounts(&self) -> Vec<&str> {
        self.sessions.iter().map(|s| s.account()).collect()
    }
}
