//! # Password-Based Key Derivation
//!
//! Argon2id derivation of 256-bit key-encryption keys from passwords.
//! The cost parameters travel with every ciphertext so that they can be
//! raised later without breaking existing entries.

use crate::{CryptoError, SecretKey};
use argon2::{Algorithm, Argon2, Params, Version};
use zeroize::Zeroizing;

/// Salt length in bytes.
pub const SALT_LEN: usize = 16;

/// Argon2id cost parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KdfParams {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    /// Number of passes.
    pub iterations: u32,
    /// Degree of parallelism.
    pub parallelism: u32,
}

impl KdfParams {
    /// Minimum memory cost accepted by Argon2 (8 KiB per lane).
    pub const MIN_MEMORY_KIB: u32 = Params::MIN_M_COST;

    /// Minimum number of passes accepted by Argon2.
    pub const MIN_ITERATIONS: u32 = Params::MIN_T_COST;

    /// Cheap parameters for unit tests. Never use for real keys.
    pub const fn insecure_for_tests() -> Self {
        Self {
            memory_kib: 64,
            iterations: 1,
            parallelism: 1,
        }
    }

    /// Check the parameters against the Argon2 minimums.
    pub fn validate(&self) -> Result<(), CryptoError> {
        self.to_argon_params().map(|_| ())
    }

    fn to_argon_params(self) -> Result<Params, CryptoError> {
        Params::new(
            self.memory_kib,
            self.iterations,
            self.parallelism,
            Some(crate::symmetric::KEY_LEN),
        )
        .map_err(|e| CryptoError::KeyDerivationFailed(e.to_string()))
    }
}

impl Default for KdfParams {
    /// OWASP baseline for Argon2id: 19 MiB, 2 passes, 1 lane.
    fn default() -> Self {
        Self {
            memory_kib: 19 * 1024,
            iterations: 2,
            parallelism: 1,
        }
    }
}

/// Generate a random salt.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut salt);
    salt
}

/// Derive a 256-bit key from `password` and `salt`.
///
/// # Errors
///
/// Returns `CryptoError::KeyDerivationFailed` for invalid parameters or a
/// salt shorter than Argon2 accepts.
pub fn derive_key(password: &[u8], salt: &[u8], params: KdfParams) -> Result<SecretKey, CryptoError> {
    let argon = Argon2::new(Algorithm::Argon2id, Version::V0x13, params.to_argon_params()?);

    let mut output = Zeroizing::new([0u8; crate::symmetric::KEY_LEN]);
    argon
        .hash_password_into(password, salt, output.as_mut())
        .map_err(|e| CryptoError::KeyDerivationFailed(e.to_string()))?;

    Ok(SecretKey::from_bytes(*output))
}
