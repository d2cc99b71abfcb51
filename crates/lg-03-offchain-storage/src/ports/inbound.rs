//! # Inbound Ports (Driving Ports)
//!
//! The off-chain storage API consumed by the chain store, the rollback
//! engine and search.

use crate::domain::policy::StorageDecision;
use shared_types::{OffChainData, StorageError};
use std::collections::HashSet;
use std::path::PathBuf;
use uuid::Uuid;

/// A file moved aside by [`OffChainStorage::quarantine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuarantineTicket {
    /// File id.
    pub id: Uuid,
    /// Live location.
    pub original: PathBuf,
    /// Trash location, `None` if the file was already gone.
    pub quarantined: Option<PathBuf>,
}

/// What [`OffChainStorage::recover`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecoveryReport {
    /// Quarantined files moved back because a block still references them.
    pub restored: usize,
    /// Quarantined files deleted because no block references them.
    pub purged: usize,
    /// Live files deleted because no block references them.
    pub orphans_removed: usize,
}

/// Off-chain payload storage.
pub trait OffChainStorage: Send + Sync {
    /// Size threshold in bytes above which payloads go off-chain.
    fn threshold(&self) -> usize;

    /// Whether new off-chain payloads are encrypted by default.
    fn encrypt_by_default(&self) -> bool;

    /// True if a payload of `len` bytes exceeds the threshold.
    fn should_store_off_chain(&self, len: usize) -> bool {
        StorageDecision::for_payload(len, self.threshold(), false).is_off_chain()
    }

    /// Write `payload` to a new file.
    ///
    /// `checksum` and `file_size` always describe the plaintext.
    fn store(&self, payload: &[u8], content_type: &str, encrypt: bool) -> Result<OffChainData, StorageError> {
        self.store_as(Uuid::new_v4(), payload, content_type, encrypt)
    }

    /// [`store`](Self::store) under a caller-chosen id, used when importing
    /// blocks whose hash already covers the id.
    ///
    /// Fails without writing if a file with that id is already live.
    fn store_as(
        &self,
        id: Uuid,
        payload: &[u8],
        content_type: &str,
        encrypt: bool,
    ) -> Result<OffChainData, StorageError>;

    /// Read, decrypt if flagged, and verify the checksum.
    ///
    /// ## Errors
    ///
    /// - `NotFound`: backing file missing
    /// - `Decryption`: tag verification failed (tampered file or key)
    /// - `ChecksumMismatch`: plaintext does not hash to the recorded checksum
    fn retrieve(&self, data: &OffChainData) -> Result<Vec<u8>, StorageError>;

    /// Remove the backing file. `Ok(false)` if it was already gone.
    fn try_delete(&self, data: &OffChainData) -> Result<bool, StorageError>;

    /// [`try_delete`](Self::try_delete) reported as success/failure.
    fn delete(&self, data: &OffChainData) -> bool {
        self.try_delete(data).unwrap_or(false)
    }

    /// True if the backing file is present.
    fn exists(&self, data: &OffChainData) -> bool;

    /// Move the backing file out of the live set, reversibly.
    fn quarantine(&self, data: &OffChainData) -> Result<QuarantineTicket, StorageError>;

    /// Undo a quarantine.
    fn restore(&self, ticket: &QuarantineTicket) -> Result<(), StorageError>;

    /// Permanently delete a quarantined file.
    fn purge(&self, ticket: &QuarantineTicket) -> Result<(), StorageError>;

    /// Reconcile files with the ids the chain references: restore referenced
    /// files found in quarantine, delete everything unreferenced.
    fn recover(&self, referenced: &HashSet<Uuid>) -> Result<RecoveryReport, StorageError>;
}
