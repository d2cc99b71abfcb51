//! Crypto error types.
//!
//! Callers map these onto the ledger taxonomy: a tag failure becomes
//! `KeyVaultError::WrongPassword` in the vault and `StorageError::Decryption`
//! off-chain. Messages never include key material.

use thiserror::Error;

/// Cryptographic operation errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// AEAD encryption failed.
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// Wrong key, tampered ciphertext or mismatched associated data.
    #[error("Decryption failed: authentication tag mismatch")]
    DecryptionFailed,

    #[error("Invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("Invalid nonce length: expected {expected}, got {actual}")]
    InvalidNonceLength { expected: usize, actual: usize },

    /// Well-formed signature that does not verify.
    #[error("Signature verification failed")]
    SignatureVerificationFailed,

    /// Signature is not 64 bytes of hex.
    #[error("Invalid signature format")]
    InvalidSignatureFormat,

    /// Public key is not 32 bytes of hex or not a curve point.
    #[error("Invalid public key")]
    InvalidPublicKey,

    /// Private key seed has the wrong length.
    #[error("Invalid private key")]
    InvalidPrivateKey,

    /// Argon2id rejected its parameters or inputs.
    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),
}
