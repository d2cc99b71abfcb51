//! Off-chain storage configuration.

use shared_crypto::SecretKey;
use std::path::{Path, PathBuf};

/// Default off-chain threshold: 512 KiB.
pub const DEFAULT_THRESHOLD_BYTES: usize = 512 * 1024;

/// Configuration for the off-chain store.
#[derive(Debug, Clone)]
pub struct OffChainConfig {
    /// Directory holding `<id>.dat` files.
    pub dir: PathBuf,
    /// Payloads strictly larger than this go off-chain (default: 512 KiB).
    pub threshold_bytes: usize,
    /// Whether appends encrypt off-chain payloads (default: true).
    pub encrypt: bool,
    /// Master key for wrapping data keys. When unset, the key is loaded
    /// from (or created at) `<dir>/master.key`.
    pub master_key: Option<SecretKey>,
}

impl Default for OffChainConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("offchain"),
            threshold_bytes: DEFAULT_THRESHOLD_BYTES,
            encrypt: true,
            master_key: None,
        }
    }
}

impl OffChainConfig {
    /// Configuration rooted at `dir` with default threshold and encryption.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    /// Set the off-chain threshold.
    pub fn with_threshold(mut self, threshold_bytes: usize) -> Self {
        self.threshold_bytes = threshold_bytes;
        self
    }

    /// Enable or disable encryption of off-chain payloads.
    pub fn with_encryption(mut self, encrypt: bool) -> Self {
        self.encrypt = encrypt;
        self
    }

    /// Use an explicit master key instead of the key file.
    pub fn with_master_key(mut self, key: SecretKey) -> Self {
        self.master_key = Some(key);
        self
    }

    /// Path of the master key file.
    pub fn master_key_path(&self) -> PathBuf {
        self.dir.join("master.key")
    }
}
