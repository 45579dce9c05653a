//! # Bookline Infrastructure
//!
//! Infrastructure implementations of core ports.
//!
//! This crate contains:
//! - The resilient API gateway, token refresh and account endpoints
//! - The cookie-forwarding identity channel for server rendering
//! - File-backed persistent storage
//! - In-process window messaging
//! - Configuration loading
//!
//! ## Architecture
//! - Implements traits defined in `bookline-core`
//! - Depends on `bookline-common`, `bookline-domain` and `bookline-core`
//! - Contains all "impure" code (HTTP, filesystem, environment)

pub mod api;
pub mod config;
pub mod errors;
pub mod http;
pub mod messaging;
pub mod storage;

// Re-export commonly used items
pub use api::{ApiGateway, AuthApi, CookieIdentity, TokenRefresher};
pub use http::HttpClient;
pub use messaging::InProcessBus;
pub use storage::FileStore;
