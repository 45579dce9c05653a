//! Modular common utilities shared across Bookline crates.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - `foundation`: OAuth nonce helpers and the `PersistentStore` capability
//! - `runtime`: async retry executor and the in-memory store

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Foundation tier
// -----------------------------------------------------------------
#[cfg(feature = "foundation")]
pub mod auth;
#[cfg(feature = "foundation")]
pub mod storage;

// Runtime tier
// --------------------------------------------------------------------
#[cfg(feature = "runtime")]
pub mod resilience;

// Re-export commonly used types and traits for convenience
// ------------------------
#[cfg(feature = "foundation")]
pub use auth::{constant_time_eq, generate_state};
#[cfg(feature = "runtime")]
pub use resilience::{
    retry, BackoffStrategy, InvalidRetryConfig, Jitter, RetryConfig, RetryConfigBuilder, RetryError,
};
#[cfg(feature = "runtime")]
pub use storage::MemoryStore;
#[cfg(feature = "foundation")]
pub use storage::{PersistentStore, StorageError, StorageResult};
