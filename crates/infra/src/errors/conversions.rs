//! Conversions from external infrastructure errors into domain errors.

use bookline_domain::BooklineError;
use reqwest::Error as HttpError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub BooklineError);

impl From<InfraError> for BooklineError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<BooklineError> for InfraError {
    fn from(value: BooklineError) -> Self {
        InfraError(value)
    }
}

trait IntoBooklineError {
    fn into_bookline(self) -> BooklineError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → BooklineError */
/* -------------------------------------------------------------------------- */

impl IntoBooklineError for HttpError {
    fn into_bookline(self) -> BooklineError {
        if self.is_builder() {
            return BooklineError::Config(format!("invalid HTTP client setup: {self}"));
        }

        if self.is_timeout() {
            return BooklineError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return BooklineError::Network("HTTP connection failure".into());
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                401 | 403 => BooklineError::Auth(message),
                400..=499 => BooklineError::InvalidInput(message),
                _ => BooklineError::Network(message),
            };
        }

        BooklineError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_bookline())
    }
}

/* -------------------------------------------------------------------------- */
/* std::io::Error → BooklineError */
/* -------------------------------------------------------------------------- */

impl IntoBooklineError for std::io::Error {
    fn into_bookline(self) -> BooklineError {
        use std::io::ErrorKind;

        match self.kind() {
            ErrorKind::NotFound => BooklineError::Storage(format!("file not found: {self}")),
            ErrorKind::PermissionDenied => {
                BooklineError::Storage(format!("permission denied: {self}"))
            }
            _ => BooklineError::Storage(self.to_string()),
        }
    }
}

impl From<std::io::Error> for InfraError {
    fn from(value: std::io::Error) -> Self {
        InfraError(value.into_bookline())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
