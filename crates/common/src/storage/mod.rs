//! Durable client-side key/value storage
//!
//! The API client keeps its session credentials and reads the tenant
//! selection from a small string-keyed store. This module defines that
//! store and two backends:
//!
//! - **[`MemoryStorage`]**: process-local, lost on exit (tests, headless use)
//! - **[`FileStorage`]**: a JSON document on disk that survives restarts
//!
//! Multi-key writes (`set_many`, `remove_many`) are atomic: readers observe
//! either all of the entries or none of them.

pub mod error;
pub mod file;
pub mod memory;

pub use error::{StorageError, StorageResult};
pub use file::FileStorage;
pub use memory::MemoryStorage;

/// String key/value storage shared by the auth components.
pub trait KeyValueStorage: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    /// Returns error if the backend cannot be read
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    /// Returns error if the backend cannot be written
    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.set_many(&[(key, value)])
    }

    /// Remove `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    /// Returns error if the backend cannot be written
    fn remove(&self, key: &str) -> StorageResult<()> {
        self.remove_many(&[key])
    }

    /// Store every entry in one atomic step.
    ///
    /// # Errors
    /// Returns error if the backend cannot be written; no entry is applied
    fn set_many(&self, entries: &[(&str, &str)]) -> StorageResult<()>;

    /// Remove every key in one atomic step.
    ///
    /// # Errors
    /// Returns error if the backend cannot be written; no key is removed
    fn remove_many(&self, keys: &[&str]) -> StorageResult<()>;
}
