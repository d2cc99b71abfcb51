//! # Inbound Ports (Driving Ports)
//!
//! The registry API consumed by the chain store and block validator.

use crate::error::RegistryError;
use shared_types::{AuthorizationError, AuthorizedKey, LedgerResult, StorageError};

/// Authorized-signer directory.
pub trait KeyRegistry: Send + Sync {
    /// Register `public_key` (hex Ed25519) for `owner_name`.
    ///
    /// ## Errors
    ///
    /// - `DuplicatePublicKey` / `DuplicateOwner`: uniqueness violated
    /// - `InvalidPublicKey`: not a valid Ed25519 key
    /// - `EmptyOwner`: blank owner name
    fn try_add_key(&self, public_key: &str, owner_name: &str) -> Result<AuthorizedKey, RegistryError>;

    /// Look up a record by owner, active or revoked.
    fn find_by_owner(&self, owner_name: &str) -> Result<Option<AuthorizedKey>, RegistryError>;

    /// Look up a record by public key, active or revoked.
    fn find_by_public_key(&self, public_key: &str) -> Result<Option<AuthorizedKey>, RegistryError>;

    /// Every record, active and revoked, ordered by owner name.
    fn list_all(&self) -> Result<Vec<AuthorizedKey>, RegistryError>;

    /// Mark the owner's key revoked. The record is kept.
    ///
    /// ## Errors
    ///
    /// - `UnknownOwner`: no such owner
    /// - `AlreadyRevoked`: nothing to do
    fn try_revoke(&self, owner_name: &str) -> Result<AuthorizedKey, RegistryError>;

    /// [`try_add_key`](Self::try_add_key) reported as success/failure.
    fn add_key(&self, public_key: &str, owner_name: &str) -> bool {
        self.try_add_key(public_key, owner_name).is_ok()
    }

    /// [`try_revoke`](Self::try_revoke) reported as success/failure.
    fn revoke(&self, owner_name: &str) -> bool {
        self.try_revoke(owner_name).is_ok()
    }

    /// Active records, ordered by owner name.
    fn list_active(&self) -> Result<Vec<AuthorizedKey>, RegistryError> {
        Ok(self
            .list_all()?
            .into_iter()
            .filter(|k| k.active)
            .collect())
    }

    /// True if `public_key` is registered and active.
    fn is_active(&self, public_key: &str) -> bool {
        matches!(self.find_by_public_key(public_key), Ok(Some(k)) if k.active)
    }

    /// Resolve a signer for a new block: registered and active, or a typed refusal.
    ///
    /// A registry read failure is `Storage`, never a refusal.
    fn authorize(&self, public_key: &str) -> LedgerResult<AuthorizedKey> {
        match self.find_by_public_key(public_key).map_err(StorageError::from)? {
            Some(key) if key.active => Ok(key),
            Some(key) => Err(AuthorizationError::RevokedSigner {
                owner: key.owner_name,
                public_key: key.public_key,
            }
            .into()),
            None => Err(AuthorizationError::UnknownSigner {
                public_key: public_key.to_string(),
            }
            .into()),
        }
    }
}
