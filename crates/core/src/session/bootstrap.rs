//! Session bootstrap
//!
//! Runs once when the application starts and settles the session. The
//! client variant works from the persisted access token; the server
//! variant works from the inbound request's cookies and never touches
//! client storage.

use std::sync::Arc;

use async_trait::async_trait;
use bookline_domain::Session;
use tracing::{debug, info, warn};

use super::ports::IdentityApi;
use super::store::SessionStore;
use super::token_store::TokenStore;

/// Produces the initial session
#[async_trait]
pub trait SessionBootstrapper: Send + Sync {
    /// Settle the session. Never fails: anything short of a confirmed
    /// identity is an anonymous session.
    async fn bootstrap(&self) -> Session;
}

/// Bootstrap from the persisted access token
pub struct ClientBootstrapper {
    tokens: TokenStore,
    identity: Arc<dyn IdentityApi>,
    session: SessionStore,
}

impl ClientBootstrapper {
    pub fn new(tokens: TokenStore, identity: Arc<dyn IdentityApi>, session: SessionStore) -> Self {
        Self { tokens, identity, session }
    }
}

#[async_trait]
impl SessionBootstrapper for ClientBootstrapper {
    async fn bootstrap(&self) -> Session {
        if self.tokens.access_token().is_none() {
            debug!("no stored access token, starting anonymous");
            self.session.clear();
            return self.session.snapshot();
        }

        match self.identity.current_user().await {
            Ok(user) => {
                info!(user_id = user.id, "session restored");
                self.session.set_user(Some(user));
            }
            Err(failure) => {
                warn!(kind = ?failure.kind, "stored token rejected, clearing session");
                if let Err(e) = self.tokens.clear() {
                    warn!(error = %e, "failed to clear tokens");
                }
                self.session.clear();
            }
        }
        self.session.snapshot()
    }
}

/// Bootstrap for server-side rendering.
///
/// `identity` must forward the inbound request's cookies; `None` means the
/// request carried no credentials at all.
pub struct ServerBootstrapper {
    identity: Option<Arc<dyn IdentityApi>>,
}

impl ServerBootstrapper {
    pub fn new(identity: Option<Arc<dyn IdentityApi>>) -> Self {
        Self { identity }
    }
}

#[async_trait]
impl SessionBootstrapper for ServerBootstrapper {
    async fn bootstrap(&self) -> Session {
        let Some(identity) = &self.identity else {
            return Session::anonymous();
        };

        match identity.current_user().await {
            Ok(user) => Session::authenticated(user),
            Err(failure) => {
                debug!(kind = ?failure.kind, "inbound request not authenticated");
                Session::anonymous()
            }
        }
    }
}
