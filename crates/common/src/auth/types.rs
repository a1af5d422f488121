//! Session credential types

use serde::{Deserialize, Serialize};

/// The live access/refresh credential pair.
///
/// Exactly one pair is live at a time; a refresh replaces both values
/// together. `Debug` output never contains the secrets.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    /// Short-lived bearer credential sent with each request
    pub access_token: String,

    /// Longer-lived credential used only to obtain a new access token
    pub refresh_token: String,
}

impl TokenPair {
    /// Create a new credential pair
    #[must_use]
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self { access_token: access_token.into(), refresh_token: refresh_token.into() }
    }
}

impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}
