//! # Key Vault (lg-01)
//!
//! Password-derived encryption of signer private keys at rest.
//!
//! ## Entry Format
//!
//! One file per owner, `<vault_dir>/<owner>.key`, holding a bincode
//! [`VaultEntry`]: magic, format version, the Argon2id parameters used,
//! salt, AES-256-GCM IV and ciphertext. The owner name is bound as
//! associated data, so an entry copied under another owner's name fails
//! to decrypt.
//!
//! ## Guarantees
//!
//! | Property | Mechanism |
//! |----------|-----------|
//! | No partial entries | write-to-temp, fsync, rename |
//! | Same-owner serialization | in-process mutex + fs2 lock file |
//! | Wrong password vs. I/O failure | distinct `KeyVaultError` variants |
//! | No plaintext on disk or in logs | KEK and key bytes zeroized on drop |
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - Config, password policy, entry codec
//! - `ports/` - `KeyVaultApi` inbound port
//! - `service/` - `KeyVault` filesystem-backed service

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::config::VaultConfig;
pub use domain::entry::VaultEntry;
pub use domain::policy::{PasswordPolicy, PasswordRejection};
pub use ports::inbound::KeyVaultApi;
pub use service::KeyVault;
