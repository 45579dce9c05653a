//! Logging setup and structured log helpers

pub mod logging;

pub use logging::{api_failure_label, error_label, init_tracing, log_login_outcome, LogFormat};
