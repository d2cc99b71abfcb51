//! # Shared Crypto - Ledger Cryptographic Primitives
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `hashing` | SHA-256 | Block hashes, off-chain checksums |
//! | `signatures` | Ed25519 | Block signing and verification |
//! | `symmetric` | XChaCha20-Poly1305, AES-256-GCM | Payload and key encryption |
//! | `kdf` | Argon2id | Password-derived key-encryption keys |
//!
//! ## Security Properties
//!
//! - **XChaCha20**: 192-bit nonce, safe to generate randomly per message
//! - **AES-256-GCM**: 96-bit IV, used for at-rest key vault entries
//! - **Ed25519**: Deterministic nonces, no RNG dependency when signing
//! - **Argon2id**: Memory-hard, parameters stored alongside every ciphertext

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod errors;
pub mod hashing;
pub mod kdf;
pub mod signatures;
pub mod symmetric;

// Re-exports
pub use errors::CryptoError;
pub use hashing::sha256_hex;
pub use kdf::{derive_key, generate_salt, KdfParams, SALT_LEN};
pub use signatures::{Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};
pub use symmetric::{decrypt, encrypt, Cipher, Nonce, SecretKey};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    #[test]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
    }
}
