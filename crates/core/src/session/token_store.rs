//! Token store
//!
//! Holds the access/refresh pair in client-persisted storage. Pure
//! accessor: refresh, expiry and logout policy belong to the callers.

use std::sync::Arc;

use bookline_common::{PersistentStore, StorageResult};
use bookline_domain::constants::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
use bookline_domain::{TokenGrant, TokenPair};
use tracing::warn;

#[derive(Clone)]
pub struct TokenStore {
    store: Arc<dyn PersistentStore>,
}

impl TokenStore {
    pub fn new(store: Arc<dyn PersistentStore>) -> Self {
        Self { store }
    }

    /// Current pair, `None` when no access token is held
    #[must_use]
    pub fn get(&self) -> Option<TokenPair> {
        let access = self.access_token()?;
        Some(TokenPair::restore(access, self.refresh_token()))
    }

    #[must_use]
    pub fn access_token(&self) -> Option<String> {
        self.read(ACCESS_TOKEN_KEY)
    }

    #[must_use]
    pub fn refresh_token(&self) -> Option<String> {
        self.read(REFRESH_TOKEN_KEY)
    }

    /// Persist a freshly issued grant.
    ///
    /// A grant without a refresh token keeps the one already stored.
    ///
    /// # Errors
    /// Returns error if the backing store cannot be written
    pub fn store(&self, grant: &TokenGrant) -> StorageResult<()> {
        self.store.set(ACCESS_TOKEN_KEY, &grant.access)?;
        if let Some(refresh) = &grant.refresh {
            self.store.set(REFRESH_TOKEN_KEY, refresh)?;
        }
        Ok(())
    }

    /// Replace the access token after a successful refresh
    ///
    /// # Errors
    /// Returns error if the backing store cannot be written
    pub fn replace_access(&self, access: &str) -> StorageResult<()> {
        self.store.set(ACCESS_TOKEN_KEY, access)
    }

    /// Remove both tokens. Both removals are attempted even if one fails.
    ///
    /// # Errors
    /// Returns the first removal error
    pub fn clear(&self) -> StorageResult<()> {
        let access = self.store.remove(ACCESS_TOKEN_KEY);
        let refresh = self.store.remove(REFRESH_TOKEN_KEY);
        access.and(refresh)
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(e) => {
                warn!(key, error = %e, "failed to read token");
                None
            }
        }
    }
}
