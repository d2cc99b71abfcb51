//! # Vault Entry Codec
//!
//! Sealing and opening of a single at-rest key entry.

use serde::{Deserialize, Serialize};
use shared_crypto::{decrypt, derive_key, encrypt, generate_salt, Cipher, CryptoError, KdfParams, Nonce};
use thiserror::Error;
use zeroize::Zeroizing;

/// File magic.
pub const ENTRY_MAGIC: [u8; 4] = *b"LGKV";

/// Current entry format version.
pub const ENTRY_VERSION: u8 = 1;

/// Upper bound on an entry file; anything larger is not a vault entry.
pub const MAX_ENTRY_BYTES: u64 = 64 * 1024;

const CIPHER: Cipher = Cipher::Aes256Gcm;

/// Why an entry could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryFormatError {
    #[error("malformed entry: {0}")]
    Malformed(String),

    #[error("not a vault entry (bad magic)")]
    BadMagic,

    #[error("unsupported entry version {0}")]
    UnsupportedVersion(u8),
}

/// Encrypted private key at rest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultEntry {
    magic: [u8; 4],
    version: u8,
    /// Argon2id memory cost used for this entry.
    pub memory_kib: u32,
    /// Argon2id passes used for this entry.
    pub iterations: u32,
    /// Argon2id lanes used for this entry.
    pub parallelism: u32,
    /// KDF salt.
    pub salt: Vec<u8>,
    /// AES-256-GCM IV.
    pub iv: Vec<u8>,
    /// Encrypted key bytes with authentication tag.
    pub ciphertext: Vec<u8>,
}

impl VaultEntry {
    /// Encrypt `private_key` under a key derived from `password`, binding
    /// `owner` as associated data. Salt and IV are fresh per call.
    pub fn seal(
        owner: &str,
        private_key: &[u8],
        password: &str,
        params: KdfParams,
    ) -> Result<Self, CryptoError> {
        let salt = generate_salt();
        let kek = derive_key(password.as_bytes(), &salt, params)?;
        let (ciphertext, iv) = encrypt(CIPHER, &kek, private_key, owner.as_bytes())?;

        Ok(Self {
            magic: ENTRY_MAGIC,
            version: ENTRY_VERSION,
            memory_kib: params.memory_kib,
            iterations: params.iterations,
            parallelism: params.parallelism,
            salt: salt.to_vec(),
            iv: iv.as_bytes().to_vec(),
            ciphertext,
        })
    }

    /// Decrypt the key. A wrong password, a different owner or a tampered
    /// ciphertext all surface as `CryptoError::DecryptionFailed`.
    pub fn open(&self, owner: &str, password: &str) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
        let kek = derive_key(password.as_bytes(), &self.salt, self.kdf_params())?;
        let iv = Nonce::from_slice(CIPHER, &self.iv)?;
        decrypt(CIPHER, &kek, &self.ciphertext, &iv, owner.as_bytes()).map(Zeroizing::new)
    }

    /// KDF parameters recorded in the entry.
    pub fn kdf_params(&self) -> KdfParams {
        KdfParams {
            memory_kib: self.memory_kib,
            iterations: self.iterations,
            parallelism: self.parallelism,
        }
    }

    /// Encode for storage.
    pub fn to_bytes(&self) -> Result<Vec<u8>, EntryFormatError> {
        bincode::serialize(self).map_err(|e| EntryFormatError::Malformed(e.to_string()))
    }

    /// Decode and check magic and version.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, EntryFormatError> {
        if bytes.len() as u64 > MAX_ENTRY_BYTES {
            return Err(EntryFormatError::Malformed(format!(
                "{} bytes exceeds entry limit",
                bytes.len()
            )));
        }
        let entry: VaultEntry =
            bincode::deserialize(bytes).map_err(|e| EntryFormatError::Malformed(e.to_string()))?;
        if entry.magic != ENTRY_MAGIC {
            return Err(EntryFormatError::BadMagic);
        }
        if entry.version != ENTRY_VERSION {
            return Err(EntryFormatError::UnsupportedVersion(entry.version));
        }
        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PARAMS: KdfParams = KdfParams::insecure_for_tests();

    #[test]
    fn test_seal_open() {
        let entry = VaultEntry::seal("alice", &[9u8; 32], "password1", PARAMS).unwrap();
        let key = entry.open("alice", "password1").unwrap();
        assert_eq!(key.as_slice(), &[9u8; 32]);
    }

    #[test]
    fn test_owner_is_bound() {
        let entry = VaultEntry::seal("alice", &[9u8; 32], "password1", PARAMS).unwrap();
        assert_eq!(
            entry.open("bob", "password1"),
            Err(CryptoError::DecryptionFailed)
        );
    }

    #[test]
    fn test_fresh_salt_and_iv_per_seal() {
        let a = VaultEntry::seal("alice", &[9u8; 32], "password1", PARAMS).unwrap();
        let b = VaultEntry::seal("alice", &[9u8; 32], "password1", PARAMS).unwrap();
        assert_ne!(a.salt, b.salt);
        assert_ne!(a.iv, b.iv);
        assert_ne!(a.ciphertext, b.ciphertext);
    }

    #[test]
    fn test_decode_rejects_foreign_bytes() {
        let entry = VaultEntry::seal("alice", &[1u8; 32], "password1", PARAMS).unwrap();
        let mut bytes = entry.to_bytes().unwrap();
        bytes[0] = b'X';
        assert_eq!(VaultEntry::from_bytes(&bytes), Err(EntryFormatError::BadMagic));

        let truncated = &entry.to_bytes().unwrap()[..10];
        assert!(matches!(
            VaultEntry::from_bytes(truncated),
            Err(EntryFormatError::Malformed(_))
        ));
    }

    #[test]
    fn test_recorded_params_are_used_on_open() {
        let custom = KdfParams {
            memory_kib: 128,
            iterations: 2,
            parallelism: 1,
        };
        let entry = VaultEntry::seal("alice", b"seed", "password1", custom).unwrap();
        assert_eq!(entry.kdf_params(), custom);
        assert!(entry.open("alice", "password1").is_ok());
    }
}
