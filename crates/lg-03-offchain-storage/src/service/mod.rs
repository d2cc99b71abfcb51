//! # File Off-Chain Store
//!
//! [`OffChainStorage`] over a directory of `<id>.dat` files.
//!
//! Files are always resolved from the descriptor's id, never from its
//! recorded path, so a descriptor cannot point the store outside its
//! directory and a relocated data directory keeps working.

#[cfg(test)]
mod tests;

use crate::adapters::master_key;
use crate::domain::config::OffChainConfig;
use crate::ports::inbound::{OffChainStorage, QuarantineTicket, RecoveryReport};
use chrono::Utc;
use shared_crypto::{decrypt, encrypt, sha256_hex, Cipher, Nonce, SecretKey};
use shared_storage::{atomic_write, remove_if_exists};
use shared_types::{OffChainData, StorageError};
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use uuid::Uuid;

const DATA_EXTENSION: &str = "dat";
const TRASH_DIR: &str = ".trash";
const CIPHER: Cipher = Cipher::XChaCha20Poly1305;

/// Off-chain store rooted at a directory.
pub struct FileOffChainStore {
    config: OffChainConfig,
    master_key: SecretKey,
}

impl FileOffChainStore {
    /// Open the store, creating the directory and master key if needed.
    pub fn open(config: OffChainConfig) -> Result<Self, StorageError> {
        std::fs::create_dir_all(&config.dir).map_err(|e| StorageError::io(&config.dir, &e))?;

        let master_key = match &config.master_key {
            Some(key) => key.clone(),
            None => master_key::load_or_create(&config.master_key_path())?,
        };

        tracing::info!(
            "[lg-03] 📦 Off-chain store at {} (threshold {} bytes, encryption {})",
            config.dir.display(),
            config.threshold_bytes,
            if config.encrypt { "on" } else { "off" }
        );
        Ok(Self { config, master_key })
    }

    /// Store configuration.
    pub fn config(&self) -> &OffChainConfig {
        &self.config
    }

    fn data_path(&self, id: Uuid) -> PathBuf {
        self.config.dir.join(format!("{}.{}", id, DATA_EXTENSION))
    }

    fn trash_dir(&self) -> PathBuf {
        self.config.dir.join(TRASH_DIR)
    }

    fn trash_path(&self, id: Uuid) -> PathBuf {
        self.trash_dir().join(format!("{}.{}", id, DATA_EXTENSION))
    }

    fn seal(&self, id: Uuid, payload: &[u8]) -> Result<(Vec<u8>, Sealed), StorageError> {
        let aad = id.as_bytes();
        let data_key = SecretKey::generate();

        let (ciphertext, iv) = encrypt(CIPHER, &data_key, payload, aad)
            .map_err(|e| StorageError::Encryption(e.to_string()))?;
        let (wrapped_key, key_nonce) = encrypt(CIPHER, &self.master_key, data_key.as_bytes(), aad)
            .map_err(|e| StorageError::Encryption(e.to_string()))?;

        Ok((
            ciphertext,
            Sealed {
                iv: hex::encode(iv.as_bytes()),
                wrapped_key: hex::encode(wrapped_key),
                key_nonce: hex::encode(key_nonce.as_bytes()),
            },
        ))
    }

    fn open_sealed(&self, data: &OffChainData, ciphertext: &[u8]) -> Result<Vec<u8>, StorageError> {
        let id = data.id.to_string();
        let aad = data.id.as_bytes();

        let iv = decode_nonce(&id, "encryption_iv", data.encryption_iv.as_deref())?;
        let key_nonce = decode_nonce(&id, "key_nonce", data.key_nonce.as_deref())?;
        let wrapped = decode_hex(&id, "wrapped_key", data.wrapped_key.as_deref())?;

        let key_bytes = decrypt(CIPHER, &self.master_key, &wrapped, &key_nonce, aad)
            .map_err(|_| StorageError::Decryption(id.clone()))?;
        let data_key =
            SecretKey::from_slice(&key_bytes).map_err(|_| StorageError::Decryption(id.clone()))?;

        decrypt(CIPHER, &data_key, ciphertext, &iv, aad).map_err(|_| StorageError::Decryption(id))
    }

    fn read_file(&self, id: Uuid) -> Result<Vec<u8>, StorageError> {
        let path = self.data_path(id);
        std::fs::read(&path).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                StorageError::NotFound(format!("off-chain record {}", id))
            } else {
                StorageError::io(&path, &e)
            }
        })
    }
}

struct Sealed {
    iv: String,
    wrapped_key: String,
    key_nonce: String,
}

impl OffChainStorage for FileOffChainStore {
    fn threshold(&self) -> usize {
        self.config.threshold_bytes
    }

    fn encrypt_by_default(&self) -> bool {
        self.config.encrypt
    }

    fn store_as(
        &self,
        id: Uuid,
        payload: &[u8],
        content_type: &str,
        encrypt: bool,
    ) -> Result<OffChainData, StorageError> {
        let path = self.data_path(id);
        if path.exists() {
            return Err(StorageError::Corrupted(format!(
                "off-chain record {} already exists",
                id
            )));
        }
        let checksum = sha256_hex(payload);

        let (bytes, sealed) = if encrypt {
            let (ciphertext, sealed) = self.seal(id, payload)?;
            (ciphertext, Some(sealed))
        } else {
            (payload.to_vec(), None)
        };

        atomic_write(&path, &bytes).map_err(|e| StorageError::io(&path, &e))?;

        tracing::info!(
            "[lg-03] 💾 Stored off-chain record {} ({} bytes, {})",
            id,
            payload.len(),
            if encrypt { "encrypted" } else { "plain" }
        );

        let (encryption_iv, wrapped_key, key_nonce) = match sealed {
            Some(s) => (Some(s.iv), Some(s.wrapped_key), Some(s.key_nonce)),
            None => (None, None, None),
        };
        Ok(OffChainData {
            id,
            file_path: path,
            file_size: payload.len() as u64,
            content_type: content_type.to_string(),
            checksum,
            encrypted: encrypt,
            encryption_iv,
            wrapped_key,
            key_nonce,
            block_number: None,
            created_at: Utc::now(),
        })
    }

    fn retrieve(&self, data: &OffChainData) -> Result<Vec<u8>, StorageError> {
        let stored = self.read_file(data.id)?;
        let plaintext = if data.encrypted {
            self.open_sealed(data, &stored)?
        } else {
            stored
        };

        let actual = sha256_hex(&plaintext);
        if actual != data.checksum || plaintext.len() as u64 != data.file_size {
            tracing::error!("[lg-03] ❌ Checksum mismatch for off-chain record {}", data.id);
            return Err(StorageError::ChecksumMismatch {
                id: data.id.to_string(),
                expected: data.checksum.clone(),
                actual,
            });
        }
        Ok(plaintext)
    }

    fn try_delete(&self, data: &OffChainData) -> Result<bool, StorageError> {
        let path = self.data_path(data.id);
        let removed = remove_if_exists(&path).map_err(|e| StorageError::io(&path, &e))?;
        if removed {
            tracing::info!("[lg-03] 🗑️ Deleted off-chain record {}", data.id);
        }
        Ok(removed)
    }

    fn exists(&self, data: &OffChainData) -> bool {
        self.data_path(data.id).is_file()
    }

    fn quarantine(&self, data: &OffChainData) -> Result<QuarantineTicket, StorageError> {
        let original = self.data_path(data.id);
        if !original.exists() {
            tracing::warn!("[lg-03] Off-chain record {} already missing", data.id);
            return Ok(QuarantineTicket {
                id: data.id,
                original,
                quarantined: None,
            });
        }

        let trash = self.trash_dir();
        std::fs::create_dir_all(&trash).map_err(|e| StorageError::io(&trash, &e))?;
        let target = self.trash_path(data.id);
        std::fs::rename(&original, &target).map_err(|e| StorageError::io(&original, &e))?;

        Ok(QuarantineTicket {
            id: data.id,
            original,
            quarantined: Some(target),
        })
    }

    fn restore(&self, ticket: &QuarantineTicket) -> Result<(), StorageError> {
        if let Some(quarantined) = &ticket.quarantined {
            std::fs::rename(quarantined, &ticket.original)
                .map_err(|e| StorageError::io(quarantined, &e))?;
            tracing::debug!("[lg-03] ↩️ Restored off-chain record {}", ticket.id);
        }
        Ok(())
    }

    fn purge(&self, ticket: &QuarantineTicket) -> Result<(), StorageError> {
        if let Some(quarantined) = &ticket.quarantined {
            remove_if_exists(quarantined).map_err(|e| StorageError::io(quarantined, &e))?;
            tracing::info!("[lg-03] 🗑️ Deleted off-chain record {}", ticket.id);
        }
        Ok(())
    }

    fn recover(&self, referenced: &HashSet<Uuid>) -> Result<RecoveryReport, StorageError> {
        let mut report = RecoveryReport::default();

        for (id, path) in list_data_files(&self.trash_dir())? {
            if referenced.contains(&id) && !self.data_path(id).exists() {
                std::fs::rename(&path, self.data_path(id)).map_err(|e| StorageError::io(&path, &e))?;
                report.restored += 1;
            } else {
                remove_if_exists(&path).map_err(|e| StorageError::io(&path, &e))?;
                report.purged += 1;
            }
        }

        for (id, path) in list_data_files(&self.config.dir)? {
            if !referenced.contains(&id) {
                remove_if_exists(&path).map_err(|e| StorageError::io(&path, &e))?;
                report.orphans_removed += 1;
            }
        }

        remove_temp_files(&self.config.dir);

        if report != RecoveryReport::default() {
            tracing::warn!(
                "[lg-03] 🔧 Recovery: {} restored, {} purged, {} orphans removed",
                report.restored,
                report.purged,
                report.orphans_removed
            );
        }
        Ok(report)
    }
}

/// `(id, path)` of every `<uuid>.dat` directly under `dir`.
fn list_data_files(dir: &Path) -> Result<Vec<(Uuid, PathBuf)>, StorageError> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(StorageError::io(dir, &e)),
    };

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| StorageError::io(dir, &e))?.path();
        if path.extension().and_then(|e| e.to_str()) != Some(DATA_EXTENSION) {
            continue;
        }
        let id = path
            .file_stem()
            .and_then(|s| s.to_str())
            .and_then(|s| Uuid::parse_str(s).ok());
        if let Some(id) = id {
            files.push((id, path));
        }
    }
    Ok(files)
}

fn remove_temp_files(dir: &Path) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for path in entries.flatten().map(|e| e.path()) {
        if path.extension().and_then(|e| e.to_str()) == Some("tmp") {
            match std::fs::remove_file(&path) {
                Ok(()) => tracing::debug!("[lg-03] Removed stale temp file {}", path.display()),
                Err(e) => tracing::warn!(
                    "[lg-03] Could not remove stale temp file {}: {}",
                    path.display(),
                    e
                ),
            }
        }
    }
}

fn decode_hex(id: &str, field: &str, value: Option<&str>) -> Result<Vec<u8>, StorageError> {
    let value = value.ok_or_else(|| StorageError::Corrupted(format!("{}: missing {}", id, field)))?;
    hex::decode(value).map_err(|_| StorageError::Corrupted(format!("{}: malformed {}", id, field)))
}

fn decode_nonce(id: &str, field: &str, value: Option<&str>) -> Result<Nonce, StorageError> {
    let bytes = decode_hex(id, field, value)?;
    Nonce::from_slice(CIPHER, &bytes)
        .map_err(|_| StorageError::Corrupted(format!("{}: malformed {}", id, field)))
}
