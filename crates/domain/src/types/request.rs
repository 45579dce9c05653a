//! Per-call request description used by the API gateway

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::impl_label_conversions;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl_label_conversions!(HttpMethod {
    Get => "get",
    Post => "post",
    Put => "put",
    Patch => "patch",
    Delete => "delete",
});

/// One part of a multipart form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartPart {
    pub name: String,
    pub value: PartValue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartValue {
    Text(String),
    File { bytes: Vec<u8>, file_name: String, mime: Option<String> },
}

impl MultipartPart {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into(), value: PartValue::Text(value.into()) }
    }

    pub fn file(
        name: impl Into<String>,
        file_name: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
        mime: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            value: PartValue::File { bytes: bytes.into(), file_name: file_name.into(), mime },
        }
    }
}

/// Outbound request body.
///
/// `Json` bodies are serialized by the gateway. `Binary` and `Multipart`
/// bodies pass through untouched and never get a forced content type, so
/// the transport can set the multipart boundary itself.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(Value),
    /// Pre-serialized text, sent as-is with the JSON content type
    Raw(String),
    Binary(Vec<u8>),
    Multipart(Vec<MultipartPart>),
}

impl RequestBody {
    /// Whether the gateway should send `Content-Type: application/json`
    #[must_use]
    pub const fn wants_json_content_type(&self) -> bool {
        !matches!(self, Self::Binary(_) | Self::Multipart(_))
    }
}

impl From<Value> for RequestBody {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

/// Per-call state of one gateway request.
///
/// Built fresh for every call. `retried_after_refresh` is never mutated in
/// place: the retry after a refresh uses the context returned by
/// [`RequestContext::after_refresh`], so the single-retry bound is local to
/// the call and unaffected by concurrent calls.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestContext {
    pub endpoint: String,
    pub method: HttpMethod,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
    retried_after_refresh: bool,
}

impl RequestContext {
    pub fn new(method: HttpMethod, endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            method,
            headers: Vec::new(),
            query: Vec::new(),
            body: RequestBody::Empty,
            retried_after_refresh: false,
        }
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<RequestBody>) -> Self {
        self.body = body.into();
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn with_query<K, V>(mut self, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.query.extend(pairs.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Whether this context is the single retry that follows a refresh
    #[must_use]
    pub const fn retried_after_refresh(&self) -> bool {
        self.retried_after_refresh
    }

    /// Context for the one retry allowed after a token refresh
    #[must_use]
    pub fn after_refresh(&self) -> Self {
        Self { retried_after_refresh: true, ..self.clone() }
    }
}
