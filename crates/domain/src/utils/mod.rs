//! Small helpers shared by domain types

pub mod serde;
