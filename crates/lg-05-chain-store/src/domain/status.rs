//! Typed results of chain-wide queries.

use chrono::{DateTime, Utc};
use lg_04_block_validation::ChainValidationReport;
use serde::{Deserialize, Serialize};
use shared_types::{AuthorizedKey, Block, BlockNumber};
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

/// Export format version. Version 1 carried no off-chain payloads.
pub const EXPORT_FORMAT_VERSION: u32 = 2;

/// Summary of the committed chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainStatus {
    pub block_count: u64,
    pub max_height: BlockNumber,
    pub tail_hash: String,
    pub off_chain_blocks: u64,
    pub encrypted_blocks: u64,
}

impl ChainStatus {
    pub(crate) fn from_blocks(blocks: &[Arc<Block>]) -> Self {
        let tail = blocks.last();
        Self {
            block_count: blocks.len() as u64,
            max_height: tail.map_or(0, |b| b.block_number),
            tail_hash: tail.map(|b| b.hash.clone()).unwrap_or_default(),
            off_chain_blocks: blocks.iter().filter(|b| b.is_off_chain()).count() as u64,
            encrypted_blocks: blocks.iter().filter(|b| b.is_encrypted).count() as u64,
        }
    }
}

/// JSON snapshot written by [`export_chain`](crate::ChainStore::export_chain)
/// and read by [`import_chain`](crate::ChainStore::import_chain).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainExport {
    pub format_version: u32,
    pub exported_at: DateTime<Utc>,
    pub block_count: u64,
    pub blocks: Vec<Block>,
    pub authorized_keys: Vec<AuthorizedKey>,
    /// Verified payload of every off-chain block.
    #[serde(default)]
    pub off_chain_payloads: Vec<ExportedPayload>,
}

/// Off-chain payload carried inside an export.
///
/// `data` is the payload as the block committed it: a password envelope
/// stays an envelope, a store-encrypted file is exported decrypted and
/// re-encrypted under the importing store's master key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedPayload {
    pub id: Uuid,
    pub block_number: BlockNumber,
    /// Payload bytes, hex.
    pub data: String,
}

/// What [`import_chain`](crate::ChainStore::import_chain) did, or would do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOutcome {
    pub dry_run: bool,
    /// Blocks in the imported chain, genesis included.
    pub imported_blocks: u64,
    /// Blocks of the chain that was (or would be) replaced.
    pub replaced_blocks: u64,
    /// Off-chain payloads written from the export.
    pub off_chain_restored: u64,
    /// Where the previous chain was exported before replacement.
    pub backup_path: Option<PathBuf>,
    /// Validation of the imported blocks against the current registry.
    pub report: ChainValidationReport,
}

/// What a committed truncation removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TruncationOutcome {
    /// Block count before the call.
    pub previous_count: u64,
    /// Height of the new tail.
    pub new_height: BlockNumber,
    /// Removed blocks, in chain order.
    pub removed: Vec<Arc<Block>>,
}

impl TruncationOutcome {
    pub fn removed_count(&self) -> u64 {
        self.removed.len() as u64
    }
}
