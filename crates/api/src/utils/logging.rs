use std::str::FromStr;
use std::time::Duration;

use bookline_domain::{ApiErrorKind, ApiFailure, AuthError, AuthSuccess};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Output format of the tracing subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format: {other}")),
        }
    }
}

/// Install the global tracing subscriber.
///
/// The filter comes from `RUST_LOG` and defaults to `info`. Returns `false`
/// when a subscriber was already installed (tests, embedding hosts).
pub fn init_tracing(format: LogFormat) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let installed = match format {
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).try_init(),
        LogFormat::Json => tracing_subscriber::fmt().json().with_env_filter(filter).try_init(),
    };
    installed.is_ok()
}

/// Log the outcome of a login attempt with structured fields.
///
/// Only the user id and a stable failure label are recorded; tokens and
/// provider payloads never reach the log.
#[inline]
pub fn log_login_outcome(outcome: &Result<AuthSuccess, AuthError>, elapsed: Duration) {
    let duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);

    match outcome {
        Ok(success) => info!(user_id = success.user.id, duration_ms, "login_success"),
        Err(error) => warn!(reason = error_label(error), duration_ms, "login_failure"),
    }
}

/// Convert an `AuthError` into a stable label suitable for metrics/logging.
#[inline]
pub fn error_label(error: &AuthError) -> &'static str {
    error.label()
}

/// Stable label for a gateway failure
#[inline]
pub fn api_failure_label(failure: &ApiFailure) -> &'static str {
    match failure.kind {
        ApiErrorKind::BadRequest => "bad_request",
        ApiErrorKind::Unauthorized => "unauthorized",
        ApiErrorKind::Forbidden => "forbidden",
        ApiErrorKind::NotFound => "not_found",
        ApiErrorKind::Unprocessable => "unprocessable",
        ApiErrorKind::RateLimited => "rate_limited",
        ApiErrorKind::ServerError => "server_error",
        ApiErrorKind::ServiceUnavailable => "service_unavailable",
        ApiErrorKind::Http => "http",
        ApiErrorKind::Network => "network",
        ApiErrorKind::AuthenticationRequired => "authentication_required",
        ApiErrorKind::Decode => "decode",
    }
}
