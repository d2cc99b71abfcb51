//! Storage plumbing errors.

use shared_types::StorageError;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Key-value store errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KVStoreError {
    /// I/O error during read/write.
    IOError { message: String },
    /// Data corruption in the store.
    CorruptionError { message: String },
}

impl fmt::Display for KVStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KVStoreError::IOError { message } => write!(f, "KV store I/O error: {}", message),
            KVStoreError::CorruptionError { message } => {
                write!(f, "KV store corruption: {}", message)
            }
        }
    }
}

impl std::error::Error for KVStoreError {}

impl From<KVStoreError> for StorageError {
    fn from(err: KVStoreError) -> Self {
        match err {
            KVStoreError::IOError { message } => StorageError::Database(message),
            KVStoreError::CorruptionError { message } => StorageError::Corrupted(message),
        }
    }
}

/// Errors from process locking.
#[derive(Debug)]
pub enum LockError {
    /// Lock file could not be created or locked.
    CreateFailed(io::Error),
    /// Another process (or handle) holds the lock.
    AlreadyLocked { pid: Option<u32>, path: PathBuf },
    /// Failed to write PID to lock file.
    WriteFailed(io::Error),
}

impl fmt::Display for LockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LockError::CreateFailed(e) => write!(f, "Failed to create lock file: {}", e),
            LockError::AlreadyLocked { pid, path } => {
                if let Some(p) = pid {
                    write!(f, "Ledger already in use by process {} ({})", p, path.display())
                } else {
                    write!(f, "Ledger already in use ({})", path.display())
                }
            }
            LockError::WriteFailed(e) => write!(f, "Failed to write PID to lock file: {}", e),
        }
    }
}

impl std::error::Error for LockError {}
