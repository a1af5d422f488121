//! Storage error types

use erpadmin_domain::ErpAdminError;
use thiserror::Error;

/// Storage error type
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage file {path} is corrupt: {reason}")]
    Corrupt { path: String, reason: String },

    #[error("Storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage backend unavailable: {0}")]
    Unavailable(String),
}

/// Storage result type
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for ErpAdminError {
    fn from(err: StorageError) -> Self {
        Self::Storage(err.to_string())
    }
}
