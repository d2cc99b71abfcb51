//! # Chain Store Service
//!
//! Owns the block sequence. Writers (append, truncate) serialize on the
//! key-value store mutex; readers clone an `Arc` of the last committed
//! snapshot and never block on a writer.
//!
//! ## Startup
//!
//! 1. Load every block record and check it against the tail marker
//! 2. Create the genesis block if the store is empty
//! 3. Reconcile the off-chain directory with the referenced file ids

mod append;
mod transfer;
mod truncate;

use crate::domain::config::{ChainConfig, KeyPrefix};
use crate::domain::envelope::PasswordEnvelope;
use crate::domain::status::ChainStatus;
use crate::ports::inbound::ChainReader;
use chrono::Utc;
use lg_02_key_registry::KeyRegistry;
use lg_03_offchain_storage::OffChainStorage;
use lg_04_block_validation::{compute_block_hash, BlockValidator, ChainValidationReport, StandardBlockValidator};
use parking_lot::{Mutex, RwLock};
use shared_storage::{BatchOperation, KeyValueStore};
use shared_types::{
    truncate_to_millis, Block, BlockNumber, LedgerResult, ParameterError, StorageError,
    GENESIS_NUMBER, GENESIS_PREVIOUS_HASH, GENESIS_SIGNER,
};
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

/// The chain store.
pub struct ChainStore {
    config: ChainConfig,
    /// Block records. Holding this lock is the single-writer lock.
    kv: Mutex<Box<dyn KeyValueStore>>,
    /// Last committed chain, swapped after every successful write.
    snapshot: RwLock<Arc<Vec<Arc<Block>>>>,
    registry: Arc<dyn KeyRegistry>,
    offchain: Arc<dyn OffChainStorage>,
    validator: Arc<dyn BlockValidator>,
}

impl ChainStore {
    /// Open the chain over `kv`, validating appends with the standard
    /// validator backed by `registry`.
    pub fn open(
        config: ChainConfig,
        kv: Box<dyn KeyValueStore>,
        registry: Arc<dyn KeyRegistry>,
        offchain: Arc<dyn OffChainStorage>,
    ) -> Result<Self, StorageError> {
        let validator = Arc::new(StandardBlockValidator::new(Arc::clone(&registry)));
        Self::with_validator(config, kv, registry, offchain, validator)
    }

    /// Open the chain with an explicit validator.
    pub fn with_validator(
        config: ChainConfig,
        mut kv: Box<dyn KeyValueStore>,
        registry: Arc<dyn KeyRegistry>,
        offchain: Arc<dyn OffChainStorage>,
        validator: Arc<dyn BlockValidator>,
    ) -> Result<Self, StorageError> {
        let mut blocks = load_blocks(kv.as_ref())?;

        if blocks.is_empty() {
            let genesis = create_genesis();
            kv.atomic_batch_write(vec![
                BatchOperation::put(KeyPrefix::block_key(GENESIS_NUMBER), encode_block(&genesis)?),
                BatchOperation::put(KeyPrefix::tail_key(), GENESIS_NUMBER.to_be_bytes().to_vec()),
            ])?;
            tracing::info!("[lg-05] 🌱 Created genesis block {}", short_hash(&genesis.hash));
            blocks.push(Arc::new(genesis));
        }

        let referenced: HashSet<Uuid> = blocks
            .iter()
            .filter_map(|b| b.off_chain_data.as_ref().map(|o| o.id))
            .collect();
        let report = offchain.recover(&referenced)?;
        if report.restored + report.purged + report.orphans_removed > 0 {
            tracing::warn!(
                "[lg-05] Off-chain recovery: {} restored, {} purged, {} orphans removed",
                report.restored,
                report.purged,
                report.orphans_removed
            );
        }

        tracing::info!(
            "[lg-05] ⛓ Chain loaded: {} blocks, tail #{}",
            blocks.len(),
            blocks.len().saturating_sub(1)
        );

        Ok(Self {
            config,
            kv: Mutex::new(kv),
            snapshot: RwLock::new(Arc::new(blocks)),
            registry,
            offchain,
            validator,
        })
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    /// Registry the store authorizes signers against.
    pub fn registry(&self) -> &Arc<dyn KeyRegistry> {
        &self.registry
    }

    /// Store holding off-chain payloads.
    pub fn offchain(&self) -> &Arc<dyn OffChainStorage> {
        &self.offchain
    }

    /// Run all five checks over the committed chain.
    pub fn validate_chain(&self) -> ChainValidationReport {
        let blocks = self.snapshot();
        let report = self.validator.validate_chain(&blocks);
        tracing::info!(
            "[lg-05] Validated {} blocks: intact={}, compliant={}",
            report.summary.total_blocks,
            report.is_structurally_intact,
            report.is_fully_compliant
        );
        report
    }

    pub fn status(&self) -> ChainStatus {
        ChainStatus::from_blocks(&self.snapshot())
    }

    /// Payload bytes of `block`: inline data, or the verified off-chain file.
    pub fn read_payload(&self, block: &Block) -> Result<Vec<u8>, StorageError> {
        match &block.off_chain_data {
            Some(record) => self.offchain.retrieve(record),
            None => Ok(block.data.as_bytes().to_vec()),
        }
    }

    /// Recover the plaintext of a password-encrypted block.
    ///
    /// ## Errors
    ///
    /// - `Parameter`: no such block, or the block is not password-protected
    /// - `Storage(Decryption)`: wrong password
    pub fn decrypt_block_data(&self, number: BlockNumber, password: &str) -> LedgerResult<Vec<u8>> {
        let block = self.get_block(number).ok_or_else(|| {
            ParameterError::new("block_number", format!("block {} does not exist", number))
        })?;
        if !block.is_password_protected() {
            return Err(ParameterError::new(
                "block_number",
                format!("block {} is not password-protected", number),
            )
            .into());
        }
        let payload = self.read_payload(&block)?;
        let envelope = std::str::from_utf8(&payload)
            .map_err(|e| StorageError::Corrupted(format!("block {}: {}", number, e)))
            .and_then(|text| {
                PasswordEnvelope::decode(text)
                    .map_err(|e| StorageError::Corrupted(format!("block {}: {}", number, e)))
            })?;

        match envelope.open(password) {
            Ok(plaintext) => Ok(plaintext),
            Err(_) => Err(StorageError::Decryption(format!("block {}", number)).into()),
        }
    }
}

impl ChainReader for ChainStore {
    fn snapshot(&self) -> Arc<Vec<Arc<Block>>> {
        Arc::clone(&self.snapshot.read())
    }
}

fn create_genesis() -> Block {
    let mut genesis = Block {
        block_number: GENESIS_NUMBER,
        timestamp: truncate_to_millis(Utc::now()),
        previous_hash: GENESIS_PREVIOUS_HASH.to_string(),
        data: String::new(),
        hash: String::new(),
        signature: String::new(),
        signer_public_key: GENESIS_SIGNER.to_string(),
        is_encrypted: false,
        manual_keywords: Vec::new(),
        auto_keywords: Vec::new(),
        content_category: None,
        off_chain_data: None,
    };
    genesis.hash = compute_block_hash(&genesis);
    genesis
}

/// Committed blocks in order, checked against the tail marker.
fn load_blocks(kv: &dyn KeyValueStore) -> Result<Vec<Arc<Block>>, StorageError> {
    let records = kv.prefix_scan(KeyPrefix::Block.as_bytes())?;
    let tail = match kv.get(&KeyPrefix::tail_key())? {
        Some(bytes) => decode_height(&bytes)?,
        None if records.is_empty() => return Ok(Vec::new()),
        None => {
            return Err(StorageError::Corrupted(format!(
                "{} block records but no tail marker",
                records.len()
            )))
        }
    };

    let mut blocks = Vec::with_capacity(records.len());
    for (_, value) in records {
        let block: Block = bincode::deserialize(&value)
            .map_err(|e| StorageError::Corrupted(format!("block record: {}", e)))?;
        if block.block_number > tail {
            tracing::warn!(
                "[lg-05] Ignoring block #{} above committed tail #{}",
                block.block_number,
                tail
            );
            continue;
        }
        if block.block_number != blocks.len() as u64 {
            return Err(StorageError::Corrupted(format!(
                "expected block #{}, found #{}",
                blocks.len(),
                block.block_number
            )));
        }
        blocks.push(Arc::new(block));
    }

    if blocks.len() as u64 != tail.saturating_add(1) {
        return Err(StorageError::Corrupted(format!(
            "tail marker #{} but {} blocks present",
            tail,
            blocks.len()
        )));
    }
    Ok(blocks)
}

fn encode_block(block: &Block) -> Result<Vec<u8>, StorageError> {
    bincode::serialize(block).map_err(|e| StorageError::Corrupted(format!("block encoding: {}", e)))
}

fn decode_height(bytes: &[u8]) -> Result<BlockNumber, StorageError> {
    let raw: [u8; 8] = bytes
        .try_into()
        .map_err(|_| StorageError::Corrupted(format!("tail marker has {} bytes", bytes.len())))?;
    Ok(BlockNumber::from_be_bytes(raw))
}

fn short_hash(hash: &str) -> &str {
    hash.get(..16).unwrap_or(hash)
}
