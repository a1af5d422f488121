//! Wire and persisted types
//!
//! Field names follow the JSON produced and consumed by the ERP backend and
//! the admin panel's persisted stores (camelCase).

use serde::{Deserialize, Serialize};

use crate::errors::{ErpAdminError, Result};

/// Body of the refresh call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Body returned by the refresh endpoint.
///
/// Every field is optional on the wire; a missing `access_token` is a
/// malformed response and is rejected by the caller, a missing
/// `refresh_token` means the previous one stays valid.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// Username/password pair posted to the login endpoint.
#[derive(Clone, Serialize, Deserialize)]
pub struct LoginCredentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Body returned by the login endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
    /// Profile of the signed-in user, passed through untouched
    #[serde(default)]
    pub user: Option<serde_json::Value>,
}

/// Tenant currently selected in the admin panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantSelection {
    pub tenant_id: i64,
}

/// Persisted-store envelope: `{ "state": {...}, "version": n }`.
#[derive(Deserialize)]
struct PersistedEnvelope {
    state: PersistedTenantState,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedTenantState {
    #[serde(default)]
    tenant_id: Option<i64>,
}

impl TenantSelection {
    /// Parse the raw contents of the tenant-selection store.
    ///
    /// Accepts both the bare `{"tenantId": 7}` form and the persisted
    /// envelope `{"state": {"tenantId": 7}, "version": 0}`. A well-formed
    /// document without a tenant (`tenantId` missing or `null`) yields
    /// `Ok(None)`.
    ///
    /// # Errors
    /// Returns `ErpAdminError::InvalidInput` if `raw` is not valid JSON or has
    /// neither shape.
    pub fn parse(raw: &str) -> Result<Option<Self>> {
        let value: serde_json::Value = serde_json::from_str(raw)
            .map_err(|e| ErpAdminError::InvalidInput(format!("tenant store is not JSON: {e}")))?;

        if value.get("state").is_some() {
            let envelope: PersistedEnvelope = serde_json::from_value(value).map_err(|e| {
                ErpAdminError::InvalidInput(format!("invalid tenant store envelope: {e}"))
            })?;
            return Ok(envelope.state.tenant_id.map(|tenant_id| Self { tenant_id }));
        }

        let state: PersistedTenantState = serde_json::from_value(value)
            .map_err(|e| ErpAdminError::InvalidInput(format!("invalid tenant store: {e}")))?;
        Ok(state.tenant_id.map(|tenant_id| Self { tenant_id }))
    }
}
