//! # Bookline Domain
//!
//! Data types shared by the authentication coordinator and the API gateway.
//!
//! This crate contains:
//! - Token, user, session and cross-window message types
//! - Error taxonomies and the crate-wide `Result` alias
//! - Configuration structures with their design defaults
//! - Storage keys, endpoint paths and other constants
//!
//! ## Architecture
//! - No dependencies on other Bookline crates
//! - Only external dependencies allowed
//! - Pure data, no I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
