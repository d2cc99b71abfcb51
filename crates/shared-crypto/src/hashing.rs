//! # SHA-256 Hashing
//!
//! Content hashing for blocks and off-chain checksums. Hashes are exchanged
//! as 64-character lowercase hex strings.

use sha2::{Digest, Sha256};

/// Hash data with SHA-256 and return the lowercase hex digest.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}
