//! OAuth helpers shared by the login flow.
//!
//! Only the capability-free pieces live here: nonce generation and the
//! comparison used to check a returned `state` value. Storage of the nonce
//! and its single-use policy belong to the state guard in `bookline-core`.

pub mod nonce;

pub use nonce::{constant_time_eq, generate_state};
