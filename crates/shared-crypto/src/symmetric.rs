//! # Symmetric Encryption
//!
//! Provides XChaCha20-Poly1305 (default) and AES-256-GCM authenticated
//! encryption with optional associated data.
//!
//! ## Security Properties
//!
//! - **XChaCha20-Poly1305**: 192-bit nonce, constant-time ARX design
//! - **AES-256-GCM**: 96-bit nonce, never reuse a (key, nonce) pair
//!
//! Any tampering with the ciphertext, nonce or associated data surfaces as
//! [`CryptoError::DecryptionFailed`]; no partial plaintext is ever returned.

use crate::CryptoError;
use aes_gcm::{aead::generic_array::GenericArray, Aes256Gcm};
use chacha20poly1305::{
    aead::{Aead, KeyInit, Payload},
    XChaCha20Poly1305, XNonce,
};
use zeroize::Zeroize;

/// Secret key length (256-bit).
pub const KEY_LEN: usize = 32;

/// Secret key (256-bit).
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct SecretKey([u8; KEY_LEN]);

impl SecretKey {
    /// Create from bytes.
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Create from a slice, checking the length.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        let arr: [u8; KEY_LEN] = bytes.try_into().map_err(|_| CryptoError::InvalidKeyLength {
            expected: KEY_LEN,
            actual: bytes.len(),
        })?;
        Ok(Self(arr))
    }

    /// Generate random key.
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_LEN];
        rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut bytes);
        Self(bytes)
    }

    /// Get inner bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretKey(<redacted>)")
    }
}

/// Cipher selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Cipher {
    /// XChaCha20-Poly1305 (default, side-channel immune)
    #[default]
    XChaCha20Poly1305,
    /// AES-256-GCM
    Aes256Gcm,
}

impl Cipher {
    /// Nonce length in bytes for this cipher.
    pub const fn nonce_len(self) -> usize {
        match self {
            Cipher::XChaCha20Poly1305 => 24,
            Cipher::Aes256Gcm => 12,
        }
    }
}

/// Nonce for encryption. Length depends on the cipher.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Nonce(Vec<u8>);

impl Nonce {
    /// Create from bytes, checking the length against the cipher.
    pub fn from_slice(cipher: Cipher, bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != cipher.nonce_len() {
            return Err(CryptoError::InvalidNonceLength {
                expected: cipher.nonce_len(),
                actual: bytes.len(),
            });
        }
        Ok(Self(bytes.to_vec()))
    }

    /// Generate a random nonce sized for the cipher.
    pub fn generate(cipher: Cipher) -> Self {
        let mut bytes = vec![0u8; cipher.nonce_len()];
        rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut bytes);
        Self(bytes)
    }

    /// Get inner bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Encrypt plaintext, binding `aad` as associated data.
///
/// Returns (ciphertext, nonce). A fresh random nonce is generated per call.
///
/// # Errors
///
/// Returns `CryptoError::EncryptionFailed` if encryption fails.
pub fn encrypt(
    cipher: Cipher,
    key: &SecretKey,
    plaintext: &[u8],
    aad: &[u8],
) -> Result<(Vec<u8>, Nonce), CryptoError> {
    let nonce = Nonce::generate(cipher);
    let payload = Payload {
        msg: plaintext,
        aad,
    };

    let ciphertext = match cipher {
        Cipher::XChaCha20Poly1305 => XChaCha20Poly1305::new(key.as_bytes().into())
            .encrypt(XNonce::from_slice(nonce.as_bytes()), payload),
        Cipher::Aes256Gcm => Aes256Gcm::new(key.as_bytes().into())
            .encrypt(GenericArray::from_slice(nonce.as_bytes()), payload),
    }
    .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

    Ok((ciphertext, nonce))
}

/// Decrypt ciphertext produced by [`encrypt`] with the same cipher, key and `aad`.
///
/// # Errors
///
/// - `CryptoError::InvalidNonceLength` if the nonce does not fit the cipher
/// - `CryptoError::DecryptionFailed` on authentication failure
pub fn decrypt(
    cipher: Cipher,
    key: &SecretKey,
    ciphertext: &[u8],
    nonce: &Nonce,
    aad: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    if nonce.as_bytes().len() != cipher.nonce_len() {
        return Err(CryptoError::InvalidNonceLength {
            expected: cipher.nonce_len(),
            actual: nonce.as_bytes().len(),
        });
    }
    let payload = Payload {
        msg: ciphertext,
        aad,
    };

    match cipher {
        Cipher::XChaCha20Poly1305 => XChaCha20Poly1305::new(key.as_bytes().into())
            .decrypt(XNonce::from_slice(nonce.as_bytes()), payload),
        Cipher::Aes256Gcm => Aes256Gcm::new(key.as_bytes().into())
            .decrypt(GenericArray::from_slice(nonce.as_bytes()), payload),
    }
    .map_err(|_| CryptoError::DecryptionFailed)
}
