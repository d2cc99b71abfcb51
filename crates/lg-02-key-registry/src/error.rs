//! Error types for the key registry.

use shared_types::StorageError;
use thiserror::Error;

/// Errors that can occur in the key registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Public key already registered: {0}")]
    DuplicatePublicKey(String),

    #[error("Owner already registered: {0}")]
    DuplicateOwner(String),

    #[error("Invalid public key for '{owner}'")]
    InvalidPublicKey { owner: String },

    #[error("Owner name is empty")]
    EmptyOwner,

    #[error("No key registered for '{0}'")]
    UnknownOwner(String),

    #[error("Key for '{0}' is already revoked")]
    AlreadyRevoked(String),

    #[error("Registry storage error: {0}")]
    Storage(#[from] StorageError),
}

impl From<shared_storage::KVStoreError> for RegistryError {
    fn from(err: shared_storage::KVStoreError) -> Self {
        RegistryError::Storage(err.into())
    }
}


impl From<RegistryError> for StorageError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::Storage(e) => e,
            other => StorageError::Database(other.to_string()),
        }
    }
}
