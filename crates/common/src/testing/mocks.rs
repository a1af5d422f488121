//! Mock implementations of common traits

// Allow missing error/panic docs for test mocks - they are designed to be simple
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

use parking_lot::Mutex;

use crate::auth::SessionNavigator;
use crate::storage::{KeyValueStorage, StorageError, StorageResult};

/// Navigator that records every redirect instead of performing it.
///
/// `current_path` starts at the value given to [`RecordingNavigator::at`] and
/// follows each redirect, like a browser location would.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    current: Mutex<Option<String>>,
    redirects: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    /// Navigator without a current location
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Navigator currently showing `path`
    #[must_use]
    pub fn at(path: impl Into<String>) -> Self {
        Self { current: Mutex::new(Some(path.into())), redirects: Mutex::new(Vec::new()) }
    }

    /// Move to `path` without recording a redirect
    pub fn set_current_path(&self, path: impl Into<String>) {
        *self.current.lock() = Some(path.into());
    }

    /// Every redirect target, oldest first
    #[must_use]
    pub fn redirects(&self) -> Vec<String> {
        self.redirects.lock().clone()
    }
}

impl SessionNavigator for RecordingNavigator {
    fn current_path(&self) -> Option<String> {
        self.current.lock().clone()
    }

    fn redirect_to(&self, location: &str) {
        self.redirects.lock().push(location.to_string());
        *self.current.lock() = Some(location.to_string());
    }
}

/// Storage whose every operation fails with [`StorageError::Unavailable`].
#[derive(Debug, Clone, Default)]
pub struct FailingStorage {
    reason: String,
}

impl FailingStorage {
    /// Failing storage with a generic reason
    #[must_use]
    pub fn new() -> Self {
        Self::with_reason("storage disabled")
    }

    /// Failing storage reporting `reason`
    #[must_use]
    pub fn with_reason(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }

    fn fail<T>(&self) -> StorageResult<T> {
        Err(StorageError::Unavailable(self.reason.clone()))
    }
}

impl KeyValueStorage for FailingStorage {
    fn get(&self, _key: &str) -> StorageResult<Option<String>> {
        self.fail()
    }

    fn set_many(&self, _pairs: &[(&str, &str)]) -> StorageResult<()> {
        self.fail()
    }

    fn remove_many(&self, _keys: &[&str]) -> StorageResult<()> {
        self.fail()
    }
}
