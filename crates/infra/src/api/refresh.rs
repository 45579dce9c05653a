//! Coalescing access-token refresh
//!
//! Concurrent callers that all hit a 401 share one in-flight refresh: the
//! first caller starts it, the rest await the same shared future. The
//! failure side effects (token wipe, forced-logout notice) run inside that
//! future, so they happen once per refresh no matter how many callers wait.

use std::sync::Arc;

use bookline_core::{LogoutNotice, LogoutNotifier, TokenStore};
use bookline_domain::constants::{SESSION_EXPIRED_MESSAGE, TOKEN_REFRESH_PATH};
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::http::HttpClient;

type InFlight = Shared<BoxFuture<'static, Option<String>>>;

#[derive(Deserialize)]
struct RefreshResponse {
    access: String,
}

/// Exchanges the stored refresh token for a new access token
#[derive(Clone)]
pub struct TokenRefresher {
    inner: Arc<Inner>,
}

struct Inner {
    http: HttpClient,
    base_url: String,
    tokens: TokenStore,
    notifier: Arc<dyn LogoutNotifier>,
    sign_in_route: String,
    in_flight: Mutex<Option<InFlight>>,
}

impl TokenRefresher {
    pub fn new(
        http: HttpClient,
        base_url: impl Into<String>,
        tokens: TokenStore,
        notifier: Arc<dyn LogoutNotifier>,
        sign_in_route: impl Into<String>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                http,
                base_url: base_url.into(),
                tokens,
                notifier,
                sign_in_route: sign_in_route.into(),
                in_flight: Mutex::new(None),
            }),
        }
    }

    /// New access token, or `None` when the session could not be renewed.
    ///
    /// Joins the refresh already in flight if there is one.
    pub async fn refresh(&self) -> Option<String> {
        let in_flight = {
            let mut slot = self.inner.in_flight.lock();
            if let Some(existing) = slot.as_ref() {
                debug!("joining in-flight token refresh");
                existing.clone()
            } else {
                let started = Arc::clone(&self.inner).run().boxed().shared();
                *slot = Some(started.clone());
                started
            }
        };

        in_flight.await
    }

    /// Whether a refresh is currently in flight
    #[must_use]
    pub fn is_refreshing(&self) -> bool {
        self.inner.in_flight.lock().is_some()
    }
}

impl Inner {
    async fn run(self: Arc<Self>) -> Option<String> {
        let renewed = self.exchange().await;

        match &renewed {
            Some(access) => {
                if let Err(e) = self.tokens.replace_access(access) {
                    warn!(error = %e, "failed to persist refreshed access token");
                }
                info!("access token refreshed");
            }
            None => self.force_logout(),
        }

        *self.in_flight.lock() = None;
        renewed
    }

    async fn exchange(&self) -> Option<String> {
        let refresh = self.tokens.refresh_token()?;
        let url = format!("{}{}", self.base_url, TOKEN_REFRESH_PATH);

        let request = self.http.request(Method::POST, &url).json(&json!({ "refresh": refresh }));
        let response = match self.http.send(request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "token refresh request failed");
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "token refresh rejected");
            return None;
        }

        match response.json::<RefreshResponse>().await {
            Ok(body) if !body.access.is_empty() => Some(body.access),
            Ok(_) => {
                warn!("token refresh returned an empty access token");
                None
            }
            Err(e) => {
                warn!(error = %e, "token refresh returned an unreadable body");
                None
            }
        }
    }

    fn force_logout(&self) {
        if let Err(e) = self.tokens.clear() {
            warn!(error = %e, "failed to clear tokens after refresh failure");
        }
        warn!(redirect_to = %self.sign_in_route, "session expired, forcing logout");
        self.notifier.session_expired(&LogoutNotice {
            message: SESSION_EXPIRED_MESSAGE.to_string(),
            redirect_to: self.sign_in_route.clone(),
        });
    }
}
