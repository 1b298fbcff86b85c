use std::sync::Arc;

use anyhow::Result;

use crate::storage::Storage;

const TOKEN_KEY: &str = "token";
const USER_KEY: &str = "user";
const VISITED_KEY: &str = "hasVisitedBefore";

/// Persisted client session: the auth token and the first-visit flag.
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn Storage>,
}

impl Session {
    pub fn new(store: Arc<dyn Storage>) -> Self {
        Self { store }
    }

    pub async fn token(&self) -> Result<Option<String>> {
        Ok(self.store.get(TOKEN_KEY).await?.filter(|t| !t.trim().is_empty()))
    }

    pub async fn set_token(&self, token: &str) -> Result<()> {
        self.store.put(TOKEN_KEY, token).await
    }

    pub async fn clear_token(&self) -> Result<()> {
        self.store.remove(TOKEN_KEY).await
    }

    pub async fn is_authenticated(&self) -> Result<bool> {
        Ok(self.token().await?.is_some())
    }

    /// Drop everything tied to the signed-in user.
    pub async fn logout(&self) -> Result<()> {
        self.store.remove(TOKEN_KEY).await?;
        self.store.remove(USER_KEY).await
    }

    /// True exactly once: on the first call for this store.
    pub async fn mark_visited(&self) -> Result<bool> {
        if self.store.get(VISITED_KEY).await?.is_some() {
            return Ok(false);
        }
        self.store.put(VISITED_KEY, "true").await?;
        Ok(true)
    }
}
