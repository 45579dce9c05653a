//! CSRF `state` nonces for the OAuth redirect flow
//!
//! A nonce binds one authorization request to its callback. It must be
//! unguessable, URL-safe, and compared without leaking timing information.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;

/// Number of random bytes behind each nonce (43 base64url characters).
pub const STATE_BYTES: usize = 32;

/// Generate a random state token for CSRF protection
///
/// Returns a URL-safe base64-encoded random string of 32 bytes (43
/// characters), drawn from the thread-local CSPRNG.
#[must_use]
pub fn generate_state() -> String {
    let mut bytes = [0u8; STATE_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Compare two strings in time independent of where they first differ.
///
/// Length is not secret: strings of different length compare unequal
/// immediately.
#[must_use]
pub fn constant_time_eq(expected: &str, actual: &str) -> bool {
    let (a, b) = (expected.as_bytes(), actual.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
