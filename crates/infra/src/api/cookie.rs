//! Cookie-forwarding identity channel
//!
//! Used when rendering on the server: the inbound request's `Cookie` header
//! is forwarded to the identity endpoint as-is. There is no token store and
//! no refresh on this path; any failure just means "anonymous".

use async_trait::async_trait;
use bookline_core::IdentityApi;
use bookline_domain::constants::CURRENT_USER_PATH;
use bookline_domain::{ApiFailure, UserRecord};
use reqwest::header::COOKIE;
use reqwest::Method;
use tracing::debug;

use super::errors::{classify, decode_failure, network_failure};
use crate::http::HttpClient;

/// Current-user lookup that forwards a server request's cookie
pub struct CookieIdentity {
    http: HttpClient,
    base_url: String,
    cookie: String,
}

impl CookieIdentity {
    /// Channel for one inbound request, `None` when it carried no cookies
    pub fn from_cookie_header(
        http: HttpClient,
        base_url: &str,
        cookie: Option<&str>,
    ) -> Option<Self> {
        let cookie = cookie.map(str::trim).filter(|c| !c.is_empty())?;
        Some(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            cookie: cookie.to_string(),
        })
    }
}

#[async_trait]
impl IdentityApi for CookieIdentity {
    async fn current_user(&self) -> Result<UserRecord, ApiFailure> {
        let url = format!("{}{}", self.base_url, CURRENT_USER_PATH);
        let request = self.http.request(Method::GET, &url).header(COOKIE, &self.cookie);

        let response = self.http.send(request).await.map_err(|e| {
            debug!(error = %e, "identity request failed");
            network_failure()
        })?;

        let status = response.status();
        if !status.is_success() {
            let body: Option<serde_json::Value> = response.json().await.ok();
            return Err(classify(status.as_u16(), body.as_ref()));
        }

        response.json().await.map_err(|e| decode_failure(Some(status.as_u16()), e))
    }
}
