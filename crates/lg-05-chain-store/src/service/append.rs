//! # Append Pipeline
//!
//! ```text
//! params ─► key match ─► authorize ─► [encrypt] ─► [store off-chain]
//!        ─► seal ─► validate ─► atomic batch (block + tail) ─► swap snapshot
//! ```
//!
//! Everything after the parameter checks runs under the write lock. A
//! failure after the off-chain write deletes the file again, so no
//! rejected block leaves a payload behind.

use super::{encode_block, short_hash, ChainStore};
use crate::domain::config::KeyPrefix;
use crate::domain::envelope::PasswordEnvelope;
use crate::domain::keywords::{extract_auto_keywords, normalize_category, normalize_keywords};
use crate::domain::options::AppendOptions;
use crate::ports::inbound::ChainReader;
use chrono::Utc;
use lg_03_offchain_storage::StorageDecision;
use lg_04_block_validation::{seal_block, SignerStatus};
use shared_crypto::Ed25519KeyPair;
use shared_storage::{BatchOperation, KeyValueStore};
use shared_types::{
    truncate_to_millis, AuthorizationError, Block, LedgerResult, OffChainData, ParameterError,
    StorageError,
};
use std::sync::Arc;

impl ChainStore {
    /// Append a block carrying `data`, signed by `signer`.
    ///
    /// `signer_public_key` must be the public half of `signer` and must be
    /// registered and active.
    ///
    /// ## Errors
    ///
    /// - `Parameter`: empty data or empty password
    /// - `Authorization`: key mismatch, unknown or revoked signer
    /// - `Validation`: the sealed block failed a check
    /// - `Storage`: off-chain or block store failure
    ///
    /// On any error the chain is unchanged.
    pub fn append(
        &self,
        data: &str,
        signer: &Ed25519KeyPair,
        signer_public_key: &str,
        options: AppendOptions,
    ) -> LedgerResult<Arc<Block>> {
        if data.is_empty() {
            return Err(ParameterError::new("data", "payload must not be empty").into());
        }
        if options.encrypt_password.as_ref().is_some_and(|p| p.is_empty()) {
            return Err(ParameterError::new("password", "password must not be empty").into());
        }

        let public_key = signer.public_key().to_hex();
        if public_key != signer_public_key.trim().to_ascii_lowercase() {
            return Err(AuthorizationError::KeyMismatch {
                public_key: signer_public_key.to_string(),
            }
            .into());
        }

        let mut kv = self.kv.lock();
        let signer_record = self.registry.authorize(&public_key)?;

        let current = self.snapshot();
        let previous = current
            .last()
            .cloned()
            .ok_or_else(|| StorageError::Corrupted("chain has no genesis block".into()))?;
        let block_number = previous
            .block_number
            .checked_add(1)
            .ok_or_else(|| StorageError::Corrupted("block height overflow".into()))?;

        let (payload, password_protected) = match &options.encrypt_password {
            Some(password) => {
                let encoded = PasswordEnvelope::seal(data.as_bytes(), password, self.config.kdf)
                    .map_err(|e| StorageError::Encryption(e.to_string()))?
                    .encode()
                    .map_err(|e| StorageError::Encryption(e.to_string()))?;
                (encoded, true)
            }
            None => (data.to_string(), false),
        };

        let decision =
            StorageDecision::for_payload(payload.len(), self.offchain.threshold(), options.force_off_chain);
        let auto_keywords = if password_protected || decision.is_off_chain() {
            Vec::new()
        } else {
            extract_auto_keywords(data, self.config.min_keyword_len, self.config.max_auto_keywords)
        };

        let off_chain = if decision.is_off_chain() {
            Some(self.store_off_chain(&payload, &options, block_number, password_protected)?)
        } else {
            None
        };

        let mut block = Block {
            block_number,
            timestamp: truncate_to_millis(Utc::now()).max(previous.timestamp),
            previous_hash: previous.hash.clone(),
            data: if off_chain.is_some() { String::new() } else { payload },
            hash: String::new(),
            signature: String::new(),
            signer_public_key: String::new(),
            is_encrypted: password_protected || off_chain.as_ref().is_some_and(|o| o.encrypted),
            manual_keywords: normalize_keywords(&options.keywords),
            auto_keywords,
            content_category: normalize_category(options.category.as_deref()),
            off_chain_data: off_chain,
        };
        seal_block(&mut block, signer);

        if let Err(e) = self.commit(&mut **kv, &block, &previous) {
            if let Some(record) = &block.off_chain_data {
                if !self.offchain.delete(record) {
                    tracing::warn!(
                        "[lg-05] Could not remove off-chain file {} of rejected block; recovery will reclaim it",
                        record.id
                    );
                }
            }
            tracing::warn!("[lg-05] Append of block #{} rejected: {}", block_number, e);
            return Err(e);
        }

        let block = Arc::new(block);
        let mut next = Vec::with_capacity(current.len() + 1);
        next.extend(current.iter().cloned());
        next.push(Arc::clone(&block));
        *self.snapshot.write() = Arc::new(next);

        tracing::info!(
            "[lg-05] ✓ Block #{} appended by '{}' ({}{}), hash {}",
            block.block_number,
            signer_record.owner_name,
            if block.is_off_chain() { "off-chain" } else { "inline" },
            if block.is_encrypted { ", encrypted" } else { "" },
            short_hash(&block.hash)
        );
        Ok(block)
    }

    fn store_off_chain(
        &self,
        payload: &str,
        options: &AppendOptions,
        block_number: u64,
        password_protected: bool,
    ) -> Result<OffChainData, StorageError> {
        // An envelope is already ciphertext; the file stays plaintext so the
        // block still reads as password-protected.
        let encrypt = !password_protected
            && options
                .encrypt_off_chain
                .unwrap_or_else(|| self.offchain.encrypt_by_default());
        let content_type = options
            .content_type
            .as_deref()
            .unwrap_or(&self.config.default_content_type);

        let mut record = self.offchain.store(payload.as_bytes(), content_type, encrypt)?;
        record.block_number = Some(block_number);
        tracing::debug!(
            "[lg-05] Payload of block #{} stored off-chain as {} ({} bytes)",
            block_number,
            record.id,
            record.file_size
        );
        Ok(record)
    }

    /// Validate against the predecessor, then persist block and tail in one batch.
    fn commit(&self, kv: &mut dyn KeyValueStore, block: &Block, previous: &Block) -> LedgerResult<()> {
        let result = self.validator.validate_block(block, Some(previous));
        if let SignerStatus::LookupFailed { reason } = &result.signer_status {
            return Err(StorageError::Database(reason.clone()).into());
        }
        if let Some(err) = result.to_error() {
            return Err(err.into());
        }

        kv.atomic_batch_write(vec![
            BatchOperation::put(KeyPrefix::block_key(block.block_number), encode_block(block)?),
            BatchOperation::put(KeyPrefix::tail_key(), block.block_number.to_be_bytes().to_vec()),
        ])
        .map_err(StorageError::from)?;
        Ok(())
    }
}
