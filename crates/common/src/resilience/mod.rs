//! Resilience patterns for transient failures
//!
//! Provides a generic async retry executor with pluggable backoff and jitter.
//! The identity-SDK script loader uses it to retry whole load cycles; any
//! other component that needs "try N times, back off, surface only the last
//! failure" semantics should reuse it rather than hand-roll a loop.

pub mod retry;

pub use retry::{
    retry, BackoffStrategy, InvalidRetryConfig, Jitter, RetryConfig, RetryConfigBuilder, RetryError,
    RetryResult,
};
