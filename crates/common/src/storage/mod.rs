//! Client-persisted key/value storage
//!
//! The `PersistentStore` capability abstracts browser-style storage (string
//! keys to string values, synchronous access) so token and nonce holders can
//! be exercised without a real browsing context. Production wiring supplies a
//! file-backed or host-backed implementation; `MemoryStore` serves tests and
//! the per-process session scope.

pub mod error;
#[cfg(feature = "runtime")]
pub mod memory;

pub use error::{StorageError, StorageResult};
#[cfg(feature = "runtime")]
pub use memory::MemoryStore;

/// Synchronous string key/value storage.
///
/// Implementations must be safe to share across tasks; every call is a
/// complete read or write with no partial states visible to other callers.
pub trait PersistentStore: Send + Sync {
    /// Read the value stored under `key`, `None` when absent.
    ///
    /// # Errors
    /// Returns error if the backend cannot be read
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    /// Returns error if the backend cannot be written
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove `key`. Removing an absent key is not an error.
    ///
    /// # Errors
    /// Returns error if the backend cannot be written
    fn remove(&self, key: &str) -> StorageResult<()>;

    /// Check whether a value exists under `key`.
    fn contains(&self, key: &str) -> bool {
        matches!(self.get(key), Ok(Some(_)))
    }
}
