//! Key vault configuration.

use super::policy::PasswordPolicy;
use shared_crypto::KdfParams;
use std::path::{Path, PathBuf};

/// Configuration for the key vault.
#[derive(Debug, Clone)]
pub struct VaultConfig {
    /// Directory holding `<owner>.key` files (created on first save).
    pub dir: PathBuf,
    /// Argon2id cost for newly written entries.
    pub kdf: KdfParams,
    /// Password rules applied on save.
    pub policy: PasswordPolicy,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("vault"),
            kdf: KdfParams::default(),
            policy: PasswordPolicy::default(),
        }
    }
}

impl VaultConfig {
    /// Configuration rooted at `dir` with default cost and policy.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    /// Set the KDF parameters.
    pub fn with_kdf(mut self, kdf: KdfParams) -> Self {
        self.kdf = kdf;
        self
    }

    /// Set the password policy.
    pub fn with_policy(mut self, policy: PasswordPolicy) -> Self {
        self.policy = policy;
        self
    }
}
