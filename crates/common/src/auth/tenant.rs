//! Tenant selection reader
//!
//! The admin panel persists the selected tenant in its own namespaced entry.
//! The client only reads it, and never lets a missing or corrupt entry get in
//! the way of a request.

use std::sync::Arc;

use erpadmin_domain::TenantSelection;
use tracing::warn;

use crate::storage::KeyValueStorage;

/// Read-only view of the persisted tenant selection.
#[derive(Clone)]
pub struct TenantContext {
    storage: Arc<dyn KeyValueStorage>,
    key: String,
}

impl TenantContext {
    /// Read the tenant selection stored under `key`
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStorage>, key: impl Into<String>) -> Self {
        Self { storage, key: key.into() }
    }

    /// Currently selected tenant identifier.
    ///
    /// Storage and parse failures are logged and reported as "no tenant".
    #[must_use]
    pub fn tenant_id(&self) -> Option<i64> {
        let raw = match self.storage.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(key = %self.key, error = %e, "failed to read tenant selection");
                return None;
            }
        };

        match TenantSelection::parse(&raw) {
            Ok(selection) => selection.map(|s| s.tenant_id),
            Err(e) => {
                warn!(key = %self.key, error = %e, "ignoring unreadable tenant selection");
                None
            }
        }
    }
}

impl std::fmt::Debug for TenantContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TenantContext").field("key", &self.key).finish_non_exhaustive()
    }
}
