//! # Password Envelope
//!
//! Inline payloads encrypted with a caller password. The block stores
//! `lgenc1:` followed by the hex of the bincode-encoded envelope, so the
//! block hash covers the ciphertext and the KDF parameters.

use serde::{Deserialize, Serialize};
use shared_crypto::{decrypt, derive_key, encrypt, generate_salt, Cipher, CryptoError, KdfParams, Nonce};
use thiserror::Error;

/// Marker prefix of an encoded envelope.
pub const ENVELOPE_PREFIX: &str = "lgenc1:";

const CIPHER: Cipher = Cipher::XChaCha20Poly1305;
const AAD: &[u8] = b"lg-05/inline-payload";

/// Why an envelope could not be opened.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvelopeError {
    /// Not an envelope, or undecodable.
    #[error("malformed password envelope: {0}")]
    Malformed(String),
    /// Wrong password or tampered ciphertext.
    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

/// Password-encrypted payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordEnvelope {
    memory_kib: u32,
    iterations: u32,
    parallelism: u32,
    salt: Vec<u8>,
    nonce: Vec<u8>,
    ciphertext: Vec<u8>,
}

impl PasswordEnvelope {
    /// Encrypt `plaintext` under a key derived from `password`.
    pub fn seal(plaintext: &[u8], password: &str, params: KdfParams) -> Result<Self, CryptoError> {
        let salt = generate_salt();
        let key = derive_key(password.as_bytes(), &salt, params)?;
        let (ciphertext, nonce) = encrypt(CIPHER, &key, plaintext, AAD)?;
        Ok(Self {
            memory_kib: params.memory_kib,
            iterations: params.iterations,
            parallelism: params.parallelism,
            salt: salt.to_vec(),
            nonce: nonce.as_bytes().to_vec(),
            ciphertext,
        })
    }

    /// Decrypt with `password`.
    pub fn open(&self, password: &str) -> Result<Vec<u8>, CryptoError> {
        let params = KdfParams {
            memory_kib: self.memory_kib,
            iterations: self.iterations,
            parallelism: self.parallelism,
        };
        let key = derive_key(password.as_bytes(), &self.salt, params)?;
        let nonce = Nonce::from_slice(CIPHER, &self.nonce)?;
        decrypt(CIPHER, &key, &self.ciphertext, &nonce, AAD)
    }

    /// Encode as the string stored in the block.
    pub fn encode(&self) -> Result<String, EnvelopeError> {
        let bytes = bincode::serialize(self).map_err(|e| EnvelopeError::Malformed(e.to_string()))?;
        Ok(format!("{}{}", ENVELOPE_PREFIX, hex::encode(bytes)))
    }

    /// Decode a stored string.
    pub fn decode(text: &str) -> Result<Self, EnvelopeError> {
        let body = text
            .strip_prefix(ENVELOPE_PREFIX)
            .ok_or_else(|| EnvelopeError::Malformed("missing envelope prefix".into()))?;
        let bytes = hex::decode(body).map_err(|e| EnvelopeError::Malformed(e.to_string()))?;
        bincode::deserialize(&bytes).map_err(|e| EnvelopeError::Malformed(e.to_string()))
    }

    /// True if `text` carries the envelope marker.
    pub fn is_envelope(text: &str) -> bool {
        text.starts_with(ENVELOPE_PREFIX)
    }
}
