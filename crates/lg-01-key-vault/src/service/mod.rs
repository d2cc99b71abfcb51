//! # Key Vault Service
//!
//! Filesystem-backed implementation of [`KeyVaultApi`].
//!
//! Operations on one owner are serialized twice over: an in-process mutex
//! per owner, then an fs2 lock on `.<owner>.lock` for other processes.
//! Distinct owners never contend. A mutex leaves the map once no caller
//! holds it, and deleting an entry removes its lock file; reads and
//! deletes of a missing owner take no lock at all.


use crate::domain::config::VaultConfig;
use crate::domain::entry::{VaultEntry, MAX_ENTRY_BYTES};
use crate::ports::inbound::KeyVaultApi;
use parking_lot::Mutex;
use shared_crypto::CryptoError;
use shared_storage::{atomic_write, remove_if_exists, FileLock};
use shared_types::KeyVaultError;
use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use zeroize::Zeroizing;

/// Entry file extension.
const KEY_EXTENSION: &str = "key";

/// Longest accepted owner name.
const MAX_OWNER_LEN: usize = 128;

/// Password-protected key store rooted at a directory.
pub struct KeyVault {
    config: VaultConfig,
    /// Per-owner mutexes of in-flight operations.
    owner_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl KeyVault {
    /// Create a vault. The directory is not touched until the first save.
    pub fn new(config: VaultConfig) -> Self {
        Self {
            config,
            owner_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Vault configuration.
    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    fn entry_path(&self, owner: &str) -> PathBuf {
        self.config.dir.join(format!("{}.{}", owner, KEY_EXTENSION))
    }

    fn lock_path(&self, owner: &str) -> PathBuf {
        self.config.dir.join(format!(".{}.lock", owner))
    }

    fn owner_mutex(&self, owner: &str) -> Arc<Mutex<()>> {
        Arc::clone(
            self.owner_locks
                .lock()
                .entry(owner.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(()))),
        )
    }

    /// Drop the map's mutex for `owner` unless another caller still holds a clone.
    fn release_owner_mutex(&self, owner: &str, mutex: Arc<Mutex<()>>) {
        let mut locks = self.owner_locks.lock();
        drop(mutex);
        if locks.get(owner).is_some_and(|m| Arc::strong_count(m) == 1) {
            locks.remove(owner);
        }
    }

    /// Run `op` holding both the in-process and the cross-process lock for `owner`.
    /// With `remove_lock_file`, the lock file is unlinked before release.
    fn with_owner_lock<T>(
        &self,
        owner: &str,
        remove_lock_file: bool,
        op: impl FnOnce() -> Result<T, KeyVaultError>,
    ) -> Result<T, KeyVaultError> {
        let mutex = self.owner_mutex(owner);
        let result = {
            let _local = mutex.lock();
            match FileLock::exclusive(&self.lock_path(owner)) {
                Ok(file) => {
                    let result = op();
                    if remove_lock_file {
                        if let Err(e) = file.remove() {
                            tracing::warn!("[lg-01] Could not remove lock file for '{}': {}", owner, e);
                        }
                    }
                    result
                }
                Err(e) => Err(storage_error(owner, &e)),
            }
        };
        self.release_owner_mutex(owner, mutex);
        result
    }

    /// Number of owners with a live in-process mutex.
    #[cfg(test)]
    fn tracked_owners(&self) -> usize {
        self.owner_locks.lock().len()
    }

    fn read_entry(&self, owner: &str) -> Result<VaultEntry, KeyVaultError> {
        let path = self.entry_path(owner);

        let metadata = match std::fs::metadata(&path) {
            Ok(m) => m,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(KeyVaultError::NotFound {
                    owner: owner.to_string(),
                })
            }
            Err(e) => return Err(storage_error(owner, &e)),
        };
        if metadata.is_file() && metadata.len() > MAX_ENTRY_BYTES {
            return Err(KeyVaultError::Corrupted {
                owner: owner.to_string(),
                message: format!("entry is {} bytes", metadata.len()),
            });
        }

        let bytes = std::fs::read(&path).map_err(|e| storage_error(owner, &e))?;
        VaultEntry::from_bytes(&bytes).map_err(|e| KeyVaultError::Corrupted {
            owner: owner.to_string(),
            message: e.to_string(),
        })
    }
}

impl KeyVaultApi for KeyVault {
    fn try_save(&self, owner: &str, private_key: &[u8], password: &str) -> Result<(), KeyVaultError> {
        validate_owner(owner)?;
        if private_key.is_empty() {
            return Err(invalid_input(owner, "private key is empty"));
        }
        if password.is_empty() {
            return Err(invalid_input(owner, "password is empty"));
        }
        self.config
            .policy
            .check(password)
            .map_err(|e| KeyVaultError::PolicyViolation {
                owner: owner.to_string(),
                message: e.to_string(),
            })?;

        std::fs::create_dir_all(&self.config.dir).map_err(|e| storage_error(owner, &e))?;

        self.with_owner_lock(owner, false, || {
            let entry = VaultEntry::seal(owner, private_key, password, self.config.kdf)
                .map_err(|e| invalid_input(owner, &e.to_string()))?;
            let bytes = entry
                .to_bytes()
                .map_err(|e| invalid_input(owner, &e.to_string()))?;

            atomic_write(&self.entry_path(owner), &bytes).map_err(|e| storage_error(owner, &e))?;
            tracing::info!("[lg-01] 🔐 Stored key for '{}'", owner);
            Ok(())
        })
        .inspect_err(|e| tracing::warn!("[lg-01] Save rejected: {}", e))
    }

    fn try_load(&self, owner: &str, password: &str) -> Result<Zeroizing<Vec<u8>>, KeyVaultError> {
        validate_owner(owner)?;
        if !self.entry_path(owner).exists() {
            return Err(KeyVaultError::NotFound {
                owner: owner.to_string(),
            });
        }

        self.with_owner_lock(owner, false, || {
            let entry = self.read_entry(owner)?;
            entry.open(owner, password).map_err(|e| match e {
                CryptoError::DecryptionFailed => KeyVaultError::WrongPassword {
                    owner: owner.to_string(),
                },
                other => KeyVaultError::Corrupted {
                    owner: owner.to_string(),
                    message: other.to_string(),
                },
            })
        })
        .inspect(|_| tracing::debug!("[lg-01] 🔓 Loaded key for '{}'", owner))
        .inspect_err(|e| tracing::debug!("[lg-01] Load failed: {}", e))
    }

    fn try_delete(&self, owner: &str) -> Result<bool, KeyVaultError> {
        validate_owner(owner)?;
        if !self.entry_path(owner).exists() {
            return Ok(false);
        }

        self.with_owner_lock(owner, true, || {
            let removed =
                remove_if_exists(&self.entry_path(owner)).map_err(|e| storage_error(owner, &e))?;
            if removed {
                tracing::info!("[lg-01] 🗑️ Deleted key for '{}'", owner);
            }
            Ok(removed)
        })
    }

    fn try_list(&self) -> Result<Vec<String>, KeyVaultError> {
        let entries = match std::fs::read_dir(&self.config.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(storage_error("*", &e)),
        };

        let mut owners = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| storage_error("*", &e))?.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(KEY_EXTENSION) {
                continue;
            }
            if let Some(owner) = path.file_stem().and_then(|s| s.to_str()) {
                if validate_owner(owner).is_ok() {
                    owners.push(owner.to_string());
                }
            }
        }
        owners.sort();
        Ok(owners)
    }

    fn exists(&self, owner: &str) -> bool {
        validate_owner(owner).is_ok() && self.entry_path(owner).is_file()
    }
}

/// Owner names become file names: reject anything that could escape the
/// vault directory or collide with lock and temp files.
fn validate_owner(owner: &str) -> Result<(), KeyVaultError> {
    if owner.trim().is_empty() {
        return Err(invalid_input(owner, "owner name is empty"));
    }
    if owner.len() > MAX_OWNER_LEN {
        return Err(invalid_input(owner, "owner name is too long"));
    }
    if owner.starts_with('.') {
        return Err(invalid_input(owner, "owner name cannot start with '.'"));
    }
    let allowed = |c: char| c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | '@');
    if !owner.chars().all(allowed) {
        return Err(invalid_input(owner, "owner name contains unsupported characters"));
    }
    Ok(())
}

fn invalid_input(owner: &str, message: &str) -> KeyVaultError {
    KeyVaultError::InvalidInput {
        owner: owner.to_string(),
        message: message.to_string(),
    }
}

fn storage_error(owner: &str, err: &io::Error) -> KeyVaultError {
    KeyVaultError::Storage {
        owner: owner.to_string(),
        message: err.to_string(),
    }
}
