//! # Bookline API
//!
//! Application layer: wires the authentication coordinator, the session
//! services and the API gateway into one context.
//!
//! This crate contains:
//! - Application context (dependency injection)
//! - Forced-logout fan-out to the session store and the host
//! - Logging setup and structured log helpers
//!
//! ## Architecture
//! - Depends on `common`, `domain`, `core`, and `infra`
//! - Browser capabilities are supplied by the host at construction

pub mod context;
pub mod utils;

// Re-export for convenience
pub use context::*;
pub use utils::logging::{init_tracing, LogFormat};
