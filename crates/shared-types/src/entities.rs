//! # Core Domain Entities
//!
//! Blocks, governance records and off-chain descriptors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// Previous-hash sentinel carried by the genesis block.
pub const GENESIS_PREVIOUS_HASH: &str = "0";

/// Signer identifier carried by the genesis block.
pub const GENESIS_SIGNER: &str = "GENESIS";

/// Height of the genesis block.
pub const GENESIS_NUMBER: u64 = 0;

/// Block height.
pub type BlockNumber = u64;

// =============================================================================
// BLOCK
// =============================================================================

/// An immutable, ordered ledger entry.
///
/// Created once by the chain store's append pipeline and never mutated in
/// place. Removed only by tail truncation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Strictly sequential height, 0 for genesis.
    pub block_number: BlockNumber,
    /// Creation time, millisecond precision, non-decreasing along the chain.
    pub timestamp: DateTime<Utc>,
    /// Hash of the preceding block, [`GENESIS_PREVIOUS_HASH`] for genesis.
    pub previous_hash: String,
    /// Inline payload. Empty for genesis and for off-chain blocks.
    pub data: String,
    /// SHA-256 hex over the canonical content.
    pub hash: String,
    /// Ed25519 signature (hex) over the canonical content.
    pub signature: String,
    /// Signer public key (hex), [`GENESIS_SIGNER`] for genesis.
    pub signer_public_key: String,
    /// Whether the payload (inline or off-chain) is encrypted.
    pub is_encrypted: bool,
    /// Caller-supplied keywords, normalised.
    pub manual_keywords: Vec<String>,
    /// Keywords extracted from the inline payload at append time.
    pub auto_keywords: Vec<String>,
    /// Optional content category.
    pub content_category: Option<String>,
    /// Descriptor of the off-chain payload, present iff the payload is stored off-chain.
    pub off_chain_data: Option<OffChainData>,
}

impl Block {
    /// True for the block at height 0.
    pub fn is_genesis(&self) -> bool {
        self.block_number == GENESIS_NUMBER
    }

    /// True when the payload lives in an off-chain file.
    pub fn is_off_chain(&self) -> bool {
        self.off_chain_data.is_some()
    }

    /// True when the payload is a password envelope.
    ///
    /// Password-protected payloads are never store-encrypted off-chain, so
    /// an encrypted block whose off-chain file is plaintext carries one.
    pub fn is_password_protected(&self) -> bool {
        self.is_encrypted && self.off_chain_data.as_ref().map_or(true, |o| !o.encrypted)
    }

    /// Timestamp as Unix milliseconds, the form covered by the hash.
    pub fn timestamp_millis(&self) -> i64 {
        self.timestamp.timestamp_millis()
    }

    /// Payload reference covered by the hash: the inline data, or a pointer
    /// to the off-chain record including its plaintext checksum.
    pub fn payload_ref(&self) -> String {
        match &self.off_chain_data {
            Some(off_chain) => format!("offchain:{}:{}", off_chain.id, off_chain.checksum),
            None => self.data.clone(),
        }
    }

    /// Canonical content string. Both the hash and the signature are
    /// computed over these bytes.
    pub fn canonical_content(&self) -> String {
        format!(
            "{}|{}|{}|{}|{}",
            self.block_number,
            self.previous_hash,
            self.timestamp_millis(),
            self.payload_ref(),
            self.signer_public_key
        )
    }

    /// Manual keywords followed by automatic keywords.
    pub fn all_keywords(&self) -> impl Iterator<Item = &str> {
        self.manual_keywords
            .iter()
            .chain(self.auto_keywords.iter())
            .map(String::as_str)
    }
}

/// Truncate a timestamp to the millisecond precision the hash covers.
pub fn truncate_to_millis(timestamp: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(timestamp.timestamp_millis()).unwrap_or(timestamp)
}

// =============================================================================
// GOVERNANCE
// =============================================================================

/// Authorized-signer record.
///
/// Revocation flips `active` and stamps `revoked_at`; the record itself is
/// never deleted so that historical signatures stay attributable.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizedKey {
    /// Signer public key (hex), unique across the registry.
    pub public_key: String,
    /// Owner name, unique across the registry.
    pub owner_name: String,
    /// False once revoked.
    pub active: bool,
    /// Registration time.
    pub created_at: DateTime<Utc>,
    /// Revocation time, if revoked.
    pub revoked_at: Option<DateTime<Utc>>,
}

impl AuthorizedKey {
    /// Create an active record stamped with the current time.
    pub fn new(public_key: impl Into<String>, owner_name: impl Into<String>) -> Self {
        Self {
            public_key: public_key.into(),
            owner_name: owner_name.into(),
            active: true,
            created_at: Utc::now(),
            revoked_at: None,
        }
    }
}

// =============================================================================
// OFF-CHAIN STORAGE
// =============================================================================

/// Descriptor of a payload stored outside the chain record.
///
/// The file identity (`id`) is independent of block numbering.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffChainData {
    /// File identity.
    pub id: Uuid,
    /// Path of the backing file.
    pub file_path: PathBuf,
    /// Plaintext length in bytes.
    pub file_size: u64,
    /// MIME-style content type supplied by the caller.
    pub content_type: String,
    /// SHA-256 hex of the plaintext.
    pub checksum: String,
    /// Whether the backing file holds ciphertext.
    pub encrypted: bool,
    /// Payload nonce (hex), present when encrypted.
    pub encryption_iv: Option<String>,
    /// Per-file data key wrapped under the store master key (hex).
    pub wrapped_key: Option<String>,
    /// Nonce used to wrap the data key (hex).
    pub key_nonce: Option<String>,
    /// Height of the owning block, set by the chain store.
    pub block_number: Option<BlockNumber>,
    /// Write time.
    pub created_at: DateTime<Utc>,
}
