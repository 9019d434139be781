//! Persistent key-value storage for Eventide.
//!
//! Provides the [`KeyValueStore`] trait, the one capability the session
//! store and the bookings list need from "somewhere that survives a
//! reload": get, set, and remove a byte value under a string key.
//!
//! # Implementations
//!
//! - [`MemoryStore`]: a shared in-process map. Clones share the same map,
//!   so creating a second store instance over a clone behaves like
//!   reloading the page.
//! - [`FileStore`]: one file per key inside a directory.

mod error;
mod file;
mod memory;

pub use error::StorageError;
pub use file::FileStore;
pub use memory::MemoryStore;

/// A synchronous, fallible key-value store.
///
/// Synchronous because the stores it stands in for (browser local storage,
/// a small file) answer immediately; fallible because they can still be
/// full, disabled, or corrupted.
pub trait KeyValueStore: Send + Sync + 'static {
    /// Returns the value under `key`, or `Ok(None)` if the key is absent.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &[u8]) -> Result<(), StorageError>;

    /// Removes `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Keys are restricted to `[A-Za-z0-9._-]`, must not be empty, and must
/// not start with a dot.
pub(crate) fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}
