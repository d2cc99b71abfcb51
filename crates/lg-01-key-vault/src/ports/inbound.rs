//! # Inbound Ports (Driving Ports)
//!
//! The public API of the key vault.

use shared_types::KeyVaultError;
use zeroize::Zeroizing;

/// Primary API for at-rest private key storage.
///
/// The `try_*` methods report the precise failure. The plain methods
/// collapse expected failures (missing entry, wrong password, corruption)
/// into `false` / `None` and never panic.
pub trait KeyVaultApi: Send + Sync {
    /// Encrypt and store `private_key` for `owner`, replacing any existing entry.
    ///
    /// ## Errors
    ///
    /// - `InvalidInput`: empty owner, key or password, or an owner name that
    ///   is not a safe file name
    /// - `PolicyViolation`: password fails the password policy
    /// - `Storage`: filesystem failure
    fn try_save(&self, owner: &str, private_key: &[u8], password: &str) -> Result<(), KeyVaultError>;

    /// Load and decrypt the key stored for `owner`.
    ///
    /// ## Errors
    ///
    /// - `NotFound`: no entry for `owner`
    /// - `WrongPassword`: authentication tag did not verify
    /// - `Corrupted`: entry is truncated or malformed
    /// - `Storage`: filesystem failure
    fn try_load(&self, owner: &str, password: &str) -> Result<Zeroizing<Vec<u8>>, KeyVaultError>;

    /// Remove the entry for `owner`. `Ok(false)` if there was none.
    fn try_delete(&self, owner: &str) -> Result<bool, KeyVaultError>;

    /// Owners with a stored entry, sorted.
    fn try_list(&self) -> Result<Vec<String>, KeyVaultError>;

    /// True if an entry exists for `owner`.
    fn exists(&self, owner: &str) -> bool;

    /// [`try_save`](Self::try_save) reported as success/failure.
    fn save(&self, owner: &str, private_key: &[u8], password: &str) -> bool {
        self.try_save(owner, private_key, password).is_ok()
    }

    /// [`try_load`](Self::try_load) with every failure mapped to `None`.
    fn load(&self, owner: &str, password: &str) -> Option<Zeroizing<Vec<u8>>> {
        self.try_load(owner, password).ok()
    }

    /// [`try_delete`](Self::try_delete) with failures mapped to `false`.
    fn delete(&self, owner: &str) -> bool {
        self.try_delete(owner).unwrap_or(false)
    }

    /// [`try_list`](Self::try_list) with failures mapped to an empty list.
    fn list(&self) -> Vec<String> {
        self.try_list().unwrap_or_default()
    }
}
