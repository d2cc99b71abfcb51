//! # Error Types
//!
//! The ledger error taxonomy. Each kind carries enough structure (check,
//! owner, block number, field) for a caller to render a precise message;
//! rendering itself is left to the caller.

use crate::entities::BlockNumber;
use std::fmt;
use thiserror::Error;

/// One of the five per-block checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationCheck {
    /// `previous_hash` equals the predecessor's hash.
    PreviousHash,
    /// `block_number` is the predecessor's plus one.
    BlockNumber,
    /// Recomputed hash equals the stored hash.
    HashIntegrity,
    /// Signature verifies against the signer key.
    Signature,
    /// Signer is registered and active.
    AuthorizedKey,
}

impl ValidationCheck {
    /// All checks in evaluation order.
    pub const ALL: [ValidationCheck; 5] = [
        ValidationCheck::PreviousHash,
        ValidationCheck::BlockNumber,
        ValidationCheck::HashIntegrity,
        ValidationCheck::Signature,
        ValidationCheck::AuthorizedKey,
    ];

    /// True for the checks that make up structural integrity.
    pub fn is_structural(self) -> bool {
        matches!(
            self,
            ValidationCheck::PreviousHash
                | ValidationCheck::BlockNumber
                | ValidationCheck::HashIntegrity
        )
    }
}

impl fmt::Display for ValidationCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValidationCheck::PreviousHash => "previousHashValid",
            ValidationCheck::BlockNumber => "blockNumberValid",
            ValidationCheck::HashIntegrity => "hashIntegrityValid",
            ValidationCheck::Signature => "signatureValid",
            ValidationCheck::AuthorizedKey => "authorizedKeyValid",
        };
        f.write_str(name)
    }
}

/// A block failed one of the five checks during append or audit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Block {block_number} failed {check}: {message}")]
pub struct ValidationError {
    /// Height of the offending block.
    pub block_number: BlockNumber,
    /// First failing check.
    pub check: ValidationCheck,
    /// Human-readable summary.
    pub message: String,
}

/// Signer could not be authorized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthorizationError {
    /// Public key is not in the registry.
    #[error("Unknown signer: {public_key}")]
    UnknownSigner { public_key: String },

    /// Public key is registered but revoked.
    #[error("Signer '{owner}' has been revoked")]
    RevokedSigner { owner: String, public_key: String },

    /// Supplied private key does not derive the supplied public key.
    #[error("Private key does not match public key {public_key}")]
    KeyMismatch { public_key: String },
}

/// Off-chain or block store failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// Filesystem failure.
    #[error("I/O error on {path}: {message}")]
    Io { path: String, message: String },

    /// Decrypted content does not hash to the recorded checksum.
    #[error("Checksum mismatch for off-chain record {id}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        id: String,
        expected: String,
        actual: String,
    },

    /// Encryption failed.
    #[error("Encryption failed: {0}")]
    Encryption(String),

    /// Decryption or tag verification failed.
    #[error("Decryption failed for {0}")]
    Decryption(String),

    /// Backing file or record is missing.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Persisted record could not be decoded.
    #[error("Corrupted record: {0}")]
    Corrupted(String),

    /// Key-value backend failure.
    #[error("Database error: {0}")]
    Database(String),
}

impl StorageError {
    /// Build an I/O error for `path`.
    pub fn io(path: impl AsRef<std::path::Path>, err: &std::io::Error) -> Self {
        StorageError::Io {
            path: path.as_ref().display().to_string(),
            message: err.to_string(),
        }
    }
}

/// Key vault failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyVaultError {
    /// No entry for the owner.
    #[error("No key stored for '{owner}'")]
    NotFound { owner: String },

    /// Authentication tag did not verify.
    #[error("Wrong password for '{owner}'")]
    WrongPassword { owner: String },

    /// Entry is truncated or malformed.
    #[error("Corrupted key entry for '{owner}': {message}")]
    Corrupted { owner: String, message: String },

    /// Password does not meet the policy.
    #[error("Password rejected for '{owner}': {message}")]
    PolicyViolation { owner: String, message: String },

    /// Owner name cannot be used as a file name, or an input is empty.
    #[error("Invalid input for '{owner}': {message}")]
    InvalidInput { owner: String, message: String },

    /// Filesystem failure, never conflated with a wrong password.
    #[error("Storage failure for '{owner}': {message}")]
    Storage { owner: String, message: String },
}

impl KeyVaultError {
    /// Owner the failure relates to.
    pub fn owner(&self) -> &str {
        match self {
            KeyVaultError::NotFound { owner }
            | KeyVaultError::WrongPassword { owner }
            | KeyVaultError::Corrupted { owner, .. }
            | KeyVaultError::PolicyViolation { owner, .. }
            | KeyVaultError::InvalidInput { owner, .. }
            | KeyVaultError::Storage { owner, .. } => owner,
        }
    }
}

/// Rollback failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RollbackError {
    /// More blocks requested than exist above genesis.
    #[error("Cannot remove {requested} blocks: only {available} blocks exist (genesis cannot be removed)")]
    InsufficientBlocks { requested: u64, available: u64 },

    /// Target height above the chain tip.
    #[error("Invalid target block {target}: current max height is {max_height}")]
    InvalidTarget { target: u64, max_height: u64 },

    /// I/O failure during truncation; the chain was left unchanged.
    #[error("Truncation aborted, chain unchanged: {0}")]
    TruncationFailed(String),
}

/// Caller-supplied argument violates a precondition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid parameter '{field}': {message}")]
pub struct ParameterError {
    /// Offending argument.
    pub field: String,
    /// What was wrong with it.
    pub message: String,
}

impl ParameterError {
    /// Create a parameter error.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Umbrella error for ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Authorization(#[from] AuthorizationError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    KeyVault(#[from] KeyVaultError),

    #[error(transparent)]
    Rollback(#[from] RollbackError),

    #[error(transparent)]
    Parameter(#[from] ParameterError),
}

/// Result alias for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;
