//! Resilient API gateway
//!
//! Every call resolves to `Result<T, ApiFailure>`; transport faults,
//! undecodable bodies and non-2xx statuses all land in the `Err` slot. A 401
//! triggers at most one token refresh and at most one resend for that call.

use std::sync::Arc;

use bookline_core::{LogoutNotifier, TokenStore};
use bookline_domain::{
    ApiConfig, ApiFailure, BooklineError, HttpMethod, MultipartPart, PartValue, RequestBody,
    RequestContext,
};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::errors::{classify, decode_failure, network_failure};
use super::refresh::TokenRefresher;
use crate::http::HttpClient;

const JSON_CONTENT_TYPE: &str = "application/json";

/// Authenticated JSON client for the Bookline backend
#[derive(Clone)]
pub struct ApiGateway {
    http: HttpClient,
    base_url: String,
    tokens: TokenStore,
    refresher: TokenRefresher,
}

impl ApiGateway {
    /// Create a gateway for `config.base_url`.
    ///
    /// `notifier` is told when a refresh fails and the session is dropped.
    ///
    /// # Errors
    /// Returns `BooklineError::Config` if the HTTP client cannot be built
    pub fn new(
        config: &ApiConfig,
        tokens: TokenStore,
        notifier: Arc<dyn LogoutNotifier>,
    ) -> Result<Self, BooklineError> {
        let http = HttpClient::builder().timeout(config.timeout()).build()?;
        Ok(Self::with_client(http, config, tokens, notifier))
    }

    /// Create a gateway over an existing HTTP client
    pub fn with_client(
        http: HttpClient,
        config: &ApiConfig,
        tokens: TokenStore,
        notifier: Arc<dyn LogoutNotifier>,
    ) -> Self {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        let refresher = TokenRefresher::new(
            http.clone(),
            base_url.clone(),
            tokens.clone(),
            notifier,
            config.sign_in_route.clone(),
        );
        Self { http, base_url, tokens, refresher }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    /// Perform a request and decode the body into `T`.
    ///
    /// Empty successful bodies decode from `null`; non-JSON successful bodies
    /// decode from a JSON string.
    ///
    /// # Errors
    /// Returns the normalized failure; never a transport error
    pub async fn request<T: DeserializeOwned>(
        &self,
        ctx: RequestContext,
    ) -> Result<T, ApiFailure> {
        let value = self.request_value(ctx).await?;
        serde_json::from_value(value).map_err(|e| decode_failure(None, e))
    }

    /// Perform a request and return the raw JSON body
    ///
    /// # Errors
    /// Returns the normalized failure; never a transport error
    #[instrument(skip(self, ctx), fields(method = %ctx.method, endpoint = %ctx.endpoint))]
    pub async fn request_value(&self, ctx: RequestContext) -> Result<Value, ApiFailure> {
        let token = self.tokens.access_token();
        let response = self.send(&ctx, token.as_deref()).await?;

        if response.status() != StatusCode::UNAUTHORIZED || ctx.retried_after_refresh() {
            return read_body(response).await;
        }

        let Some(renewed) = self.renewed_token(token.as_deref()).await else {
            return Err(ApiFailure::authentication_required());
        };

        let retry = ctx.after_refresh();
        debug!("retrying once after token refresh");
        let response = self.send(&retry, Some(&renewed)).await?;
        read_body(response).await
    }

    /// `GET endpoint?query`
    ///
    /// # Errors
    /// Returns the normalized failure
    pub async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ApiFailure> {
        let ctx = RequestContext::new(HttpMethod::Get, endpoint)
            .with_query(query.iter().map(|(k, v)| (*k, *v)));
        self.request(ctx).await
    }

    /// `POST endpoint` with a JSON body
    ///
    /// # Errors
    /// Returns the normalized failure
    pub async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T, ApiFailure> {
        self.with_json(HttpMethod::Post, endpoint, body).await
    }

    /// `PUT endpoint` with a JSON body
    ///
    /// # Errors
    /// Returns the normalized failure
    pub async fn put<B: Serialize, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T, ApiFailure> {
        self.with_json(HttpMethod::Put, endpoint, body).await
    }

    /// `PATCH endpoint` with a JSON body
    ///
    /// # Errors
    /// Returns the normalized failure
    pub async fn patch<B: Serialize, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T, ApiFailure> {
        self.with_json(HttpMethod::Patch, endpoint, body).await
    }

    /// `DELETE endpoint`
    ///
    /// # Errors
    /// Returns the normalized failure
    pub async fn delete<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiFailure> {
        self.request(RequestContext::new(HttpMethod::Delete, endpoint)).await
    }

    async fn with_json<B: Serialize, T: DeserializeOwned>(
        &self,
        method: HttpMethod,
        endpoint: &str,
        body: &B,
    ) -> Result<T, ApiFailure> {
        let body = serde_json::to_value(body).map_err(|e| decode_failure(None, e))?;
        self.request(RequestContext::new(method, endpoint).with_body(body)).await
    }

    /// Token to retry with after a 401, refreshing only when needed.
    ///
    /// If another call already rotated the token since this one was sent,
    /// the current token is reused. If the tokens were wiped meanwhile, the
    /// session is already gone and no new refresh is started.
    async fn renewed_token(&self, sent_with: Option<&str>) -> Option<String> {
        let current = self.tokens.access_token();
        match (sent_with, current) {
            (Some(sent), Some(current)) if sent != current => {
                debug!("access token rotated by a concurrent refresh");
                Some(current)
            }
            (Some(_), None) => {
                debug!("tokens cleared while the request was in flight");
                None
            }
            _ => self.refresher.refresh().await,
        }
    }

    async fn send(
        &self,
        ctx: &RequestContext,
        token: Option<&str>,
    ) -> Result<Response, ApiFailure> {
        let url = format!("{}{}", self.base_url, ctx.endpoint);
        let builder = self.build(ctx, &url, token)?;

        self.http.send(builder).await.map_err(|e| {
            warn!(
                error = %e,
                retried = ctx.retried_after_refresh(),
                "request failed without a response"
            );
            network_failure()
        })
    }

    fn build(
        &self,
        ctx: &RequestContext,
        url: &str,
        token: Option<&str>,
    ) -> Result<RequestBuilder, ApiFailure> {
        let mut builder = self.http.request(to_method(ctx.method), url);
        if !ctx.query.is_empty() {
            builder = builder.query(&ctx.query);
        }
        builder = builder.headers(headers_for(ctx, token)?);

        let builder = match &ctx.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => {
                let bytes = serde_json::to_vec(value).map_err(|e| decode_failure(None, e))?;
                builder.body(bytes)
            }
            RequestBody::Raw(text) => builder.body(text.clone()),
            RequestBody::Binary(bytes) => builder.body(bytes.clone()),
            RequestBody::Multipart(parts) => builder.multipart(multipart_form(parts)?),
        };
        Ok(builder)
    }
}

fn to_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
    }
}

/// JSON content type first, then caller headers (which may override it),
/// then the bearer token.
fn headers_for(ctx: &RequestContext, token: Option<&str>) -> Result<HeaderMap, ApiFailure> {
    let mut headers = HeaderMap::new();
    if ctx.body.wants_json_content_type() {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
    }

    for (name, value) in &ctx.headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| decode_failure(None, format!("invalid header name: {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| decode_failure(None, format!("invalid header value: {e}")))?;
        headers.insert(name, value);
    }

    if let Some(token) = token {
        let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|e| decode_failure(None, format!("invalid access token: {e}")))?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }

    Ok(headers)
}

/// Multipart forms are single-use in reqwest, so each send builds a fresh one
fn multipart_form(parts: &[MultipartPart]) -> Result<Form, ApiFailure> {
    let mut form = Form::new();
    for part in parts {
        form = match &part.value {
            PartValue::Text(text) => form.text(part.name.clone(), text.clone()),
            PartValue::File { bytes, file_name, mime } => {
                let mut file = Part::bytes(bytes.clone()).file_name(file_name.clone());
                if let Some(mime) = mime {
                    file = file
                        .mime_str(mime)
                        .map_err(|e| decode_failure(None, format!("invalid mime type: {e}")))?;
                }
                form.part(part.name.clone(), file)
            }
        };
    }
    Ok(form)
}

/// Decode a response into the success value or the classified failure
async fn read_body(response: Response) -> Result<Value, ApiFailure> {
    let status = response.status();
    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains(JSON_CONTENT_TYPE));

    let text = response.text().await.map_err(|e| {
        warn!(error = %e, status = status.as_u16(), "failed to read response body");
        network_failure()
    })?;

    if status.is_success() {
        let no_content = status == StatusCode::NO_CONTENT || status == StatusCode::RESET_CONTENT;
        if no_content || text.is_empty() {
            return Ok(Value::Null);
        }
        if is_json {
            return serde_json::from_str(&text)
                .map_err(|e| decode_failure(Some(status.as_u16()), e));
        }
        return Ok(Value::String(text));
    }

    let body = if is_json {
        match serde_json::from_str::<Value>(&text) {
            Ok(value) => Some(value),
            Err(e) => {
                debug!(error = %e, "error body is not valid JSON");
                None
            }
        }
    } else {
        None
    };

    let failure = classify(status.as_u16(), body.as_ref());
    debug!(status = status.as_u16(), kind = ?failure.kind, "request returned an error status");
    Err(failure)
}
