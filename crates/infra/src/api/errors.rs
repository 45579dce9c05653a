//! Gateway error classification
//!
//! Turns an HTTP status plus whatever body the server returned into an
//! [`ApiFailure`] with a user-facing message. A message supplied by the
//! server always wins over the generic text for the status.

use bookline_domain::constants::NON_FIELD_ERRORS_KEY;
use bookline_domain::{ApiErrorKind, ApiFailure};
use serde_json::{Map, Value};

/// Message used when no response was received at all
pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred";

/// Generic user-facing message for a failed status
#[must_use]
pub fn status_message(status: u16) -> String {
    match status {
        400 => "Invalid request. Please check your input.".to_string(),
        401 => "You need to sign in to access this resource.".to_string(),
        403 => "You do not have permission to perform this action.".to_string(),
        404 => "The requested resource was not found.".to_string(),
        422 => "Please check your input and try again.".to_string(),
        429 => "Too many requests. Please wait a moment and try again.".to_string(),
        500 => "Server error. Please try again later.".to_string(),
        502..=504 => "Service temporarily unavailable. Please try again later.".to_string(),
        other => format!("Request failed ({other}). Please try again."),
    }
}

/// Classify a non-2xx response
#[must_use]
pub fn classify(status: u16, body: Option<&Value>) -> ApiFailure {
    let message = body.and_then(server_message).unwrap_or_else(|| status_message(status));
    ApiFailure::new(ApiErrorKind::from_status(status), message, Some(status))
}

/// Failure for a request that never produced a response
#[must_use]
pub fn network_failure() -> ApiFailure {
    ApiFailure::new(ApiErrorKind::Network, UNEXPECTED_ERROR_MESSAGE, None)
}

/// Failure for a body that could not be encoded or decoded
#[must_use]
pub fn decode_failure(status: Option<u16>, detail: impl std::fmt::Display) -> ApiFailure {
    ApiFailure::new(ApiErrorKind::Decode, format!("Unexpected response format: {detail}"), status)
}

/// Message carried by an error body, if any.
///
/// Precedence: a bare string body, then `detail`, `message`, `error`,
/// `non_field_errors`, and finally the flattened per-field errors.
#[must_use]
pub fn server_message(body: &Value) -> Option<String> {
    match body {
        Value::String(text) => non_empty(text.clone()),
        Value::Object(map) => ["detail", "message", "error"]
            .iter()
            .find_map(|key| map.get(*key).and_then(render))
            .or_else(|| map.get(NON_FIELD_ERRORS_KEY).and_then(render))
            .or_else(|| flatten_field_errors(map)),
        _ => None,
    }
}

/// Flatten `{field: [messages]}` into one readable string.
///
/// Each group reads `field: a, b`; the `non_field_errors` group carries no
/// prefix. Groups are joined with spaces. Values that are neither strings
/// nor lists are skipped.
#[must_use]
pub fn flatten_field_errors(fields: &Map<String, Value>) -> Option<String> {
    let groups: Vec<String> = fields
        .iter()
        .filter_map(|(field, messages)| {
            let text = match messages {
                Value::Array(items) => {
                    items.iter().map(text_of).collect::<Vec<_>>().join(", ")
                }
                Value::String(text) => text.clone(),
                _ => return None,
            };
            if field == NON_FIELD_ERRORS_KEY {
                Some(text)
            } else {
                Some(format!("{field}: {text}"))
            }
        })
        .collect();

    non_empty(groups.join(" "))
}

fn render(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(text) => non_empty(text.clone()),
        Value::Array(items) => non_empty(items.iter().map(text_of).collect::<Vec<_>>().join(" ")),
        other => Some(other.to_string()),
    }
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}
