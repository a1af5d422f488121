//! In-memory storage backend

use std::collections::HashMap;

use parking_lot::RwLock;

use super::{KeyValueStorage, StorageResult};

/// Process-local [`KeyValueStorage`].
///
/// # Examples
///
/// ```
/// use erpadmin_common::storage::{KeyValueStorage, MemoryStorage};
///
/// let storage = MemoryStorage::new();
/// storage.set("accessToken", "A1").unwrap();
/// assert_eq!(storage.get("accessToken").unwrap(), Some("A1".to_string()));
/// ```
#[derive(Debug, Default)]
pub struct MemoryStorage {
    data: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create an empty storage
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Check if storage is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.data.read().get(key).cloned())
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> StorageResult<()> {
        let mut data = self.data.write();
        for (key, value) in entries {
            data.insert((*key).to_string(), (*value).to_string());
        }
        Ok(())
    }

    fn remove_many(&self, keys: &[&str]) -> StorageResult<()> {
        let mut data = self.data.write();
        for key in keys {
            data.remove(*key);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_remove() {
        let storage = MemoryStorage::new();
        assert!(storage.is_empty());

        storage.set("k", "v").unwrap();
        assert_eq!(storage.get("k").unwrap(), Some("v".to_string()));

        storage.remove("k").unwrap();
        assert_eq!(storage.get("k").unwrap(), None);
    }

    #[test]
    fn removing_missing_key_is_ok() {
        let storage = MemoryStorage::new();
        storage.remove("missing").unwrap();
        storage.remove_many(&["a", "b"]).unwrap();
    }

    #[test]
    fn set_many_replaces_existing_values() {
        let storage = MemoryStorage::new();
        storage.set("accessToken", "A1").unwrap();

        storage.set_many(&[("accessToken", "A2"), ("refreshToken", "R2")]).unwrap();

        assert_eq!(storage.get("accessToken").unwrap(), Some("A2".to_string()));
        assert_eq!(storage.get("refreshToken").unwrap(), Some("R2".to_string()));
        assert_eq!(storage.len(), 2);
    }
}
