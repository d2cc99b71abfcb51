//! # Export and Import
//!
//! ```text
//! export: snapshot ─► verified off-chain payloads ─► JSON ─► atomic write
//!
//! import: read ─► check payloads ─► validate ─► [dry run: stop]
//!         ─► lock ─► [backup] ─► write payload files
//!         ─► atomic batch (replace every block + tail) ─► swap snapshot
//!         ─► delete files only the old chain used
//! ```
//!
//! Off-chain ids and checksums are covered by block hashes, so imported
//! payloads are written back under their original ids. A file already
//! live under that id with the same checksum is shared with the old chain.

use super::{encode_block, ChainStore};
use crate::domain::config::KeyPrefix;
use crate::domain::options::ImportOptions;
use crate::domain::status::{ChainExport, ExportedPayload, ImportOutcome, EXPORT_FORMAT_VERSION};
use crate::ports::inbound::ChainReader;
use chrono::Utc;
use lg_04_block_validation::{ChainValidationReport, SignerStatus};
use shared_crypto::sha256_hex;
use shared_storage::{atomic_write, BatchOperation};
use shared_types::{
    Block, LedgerError, LedgerResult, OffChainData, StorageError, ValidationCheck, ValidationError,
    GENESIS_NUMBER,
};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

impl ChainStore {
    /// Write a JSON snapshot of blocks, signer records and off-chain
    /// payloads to `path`. Returns the number of blocks exported.
    ///
    /// Fails if any off-chain payload cannot be read and verified.
    pub fn export_chain(&self, path: &Path) -> Result<u64, StorageError> {
        let blocks = self.snapshot();
        let count = self.write_export(&blocks, path)?;
        tracing::info!("[lg-05] 📤 Exported {} blocks to {}", count, path.display());
        Ok(count)
    }

    /// Replace the chain with the one exported at `path`.
    ///
    /// The imported blocks are validated against this store's registry
    /// before anything is written; the replacement is one atomic batch
    /// under the write lock.
    ///
    /// ## Errors
    ///
    /// - `Storage(Corrupted | NotFound)`: unreadable export, unsupported
    ///   format, missing or mismatching off-chain payload
    /// - `Validation`: broken link, hash or signature; or, without
    ///   `force`, an unknown or revoked signer
    /// - `Storage`: backup, payload or block store failure
    ///
    /// On any error the chain and its off-chain files are unchanged.
    pub fn import_chain(&self, path: &Path, options: &ImportOptions) -> LedgerResult<ImportOutcome> {
        let export = read_export(path)?;
        let payloads = check_payloads(&export)?;
        let blocks: Vec<Arc<Block>> = export.blocks.into_iter().map(Arc::new).collect();

        let report = self.validator.validate_chain(&blocks);
        check_report(&report, options.force)?;

        let mut kv = self.kv.lock();
        let current = self.snapshot();
        let mut outcome = ImportOutcome {
            dry_run: options.dry_run,
            imported_blocks: blocks.len() as u64,
            replaced_blocks: current.len() as u64,
            off_chain_restored: 0,
            backup_path: None,
            report,
        };

        if options.dry_run {
            tracing::info!(
                "[lg-05] 🧪 Import of {} blocks from {} would replace {} blocks",
                outcome.imported_blocks,
                path.display(),
                outcome.replaced_blocks
            );
            return Ok(outcome);
        }

        if let Some(backup) = &options.backup_path {
            self.write_export(&current, backup)?;
            tracing::info!("[lg-05] Backed up {} blocks to {}", current.len(), backup.display());
            outcome.backup_path = Some(backup.clone());
        }

        let (imported, written) = self.restore_payloads(&blocks, &current, &payloads)?;
        outcome.off_chain_restored = written.len() as u64;

        let mut operations = Vec::with_capacity(current.len() + imported.len() + 1);
        for block in current.iter().skip(imported.len()) {
            operations.push(BatchOperation::delete(KeyPrefix::block_key(block.block_number)));
        }
        for block in &imported {
            match encode_block(block) {
                Ok(bytes) => operations.push(BatchOperation::put(KeyPrefix::block_key(block.block_number), bytes)),
                Err(e) => {
                    self.discard(&written);
                    return Err(e.into());
                }
            }
        }
        let tail = imported.len().saturating_sub(1) as u64;
        operations.push(BatchOperation::put(KeyPrefix::tail_key(), tail.to_be_bytes().to_vec()));

        if let Err(e) = kv.atomic_batch_write(operations) {
            tracing::error!("[lg-05] Import from {} failed, discarding payload files: {}", path.display(), e);
            self.discard(&written);
            return Err(StorageError::from(e).into());
        }

        let live: HashSet<Uuid> = imported
            .iter()
            .filter_map(|b| b.off_chain_data.as_ref().map(|o| o.id))
            .collect();
        for record in current.iter().filter_map(|b| b.off_chain_data.as_ref()) {
            if !live.contains(&record.id) && !self.offchain.delete(record) {
                tracing::warn!(
                    "[lg-05] Could not remove replaced off-chain file {}; recovery will reclaim it",
                    record.id
                );
            }
        }
        *self.snapshot.write() = Arc::new(imported);

        tracing::info!(
            "[lg-05] 📥 Imported {} blocks from {} (replaced {}, {} off-chain payloads)",
            outcome.imported_blocks,
            path.display(),
            outcome.replaced_blocks,
            outcome.off_chain_restored
        );
        Ok(outcome)
    }

    fn write_export(&self, blocks: &[Arc<Block>], path: &Path) -> Result<u64, StorageError> {
        let authorized_keys = self.registry.list_all().map_err(StorageError::from)?;

        let mut off_chain_payloads = Vec::new();
        for block in blocks {
            if let Some(record) = &block.off_chain_data {
                off_chain_payloads.push(ExportedPayload {
                    id: record.id,
                    block_number: block.block_number,
                    data: hex::encode(self.offchain.retrieve(record)?),
                });
            }
        }

        let export = ChainExport {
            format_version: EXPORT_FORMAT_VERSION,
            exported_at: Utc::now(),
            block_count: blocks.len() as u64,
            blocks: blocks.iter().map(|b| Block::clone(b)).collect(),
            authorized_keys,
            off_chain_payloads,
        };
        let json = serde_json::to_vec_pretty(&export)
            .map_err(|e| StorageError::Corrupted(format!("export encoding failed: {}", e)))?;
        atomic_write(path, &json).map_err(|e| StorageError::io(path, &e))?;
        Ok(export.block_count)
    }

    /// Give every imported off-chain block a live file under its id.
    /// Returns the blocks with their new descriptors and the files written.
    fn restore_payloads(
        &self,
        blocks: &[Arc<Block>],
        current: &[Arc<Block>],
        payloads: &HashMap<Uuid, Vec<u8>>,
    ) -> Result<(Vec<Arc<Block>>, Vec<OffChainData>), StorageError> {
        let existing: HashMap<Uuid, &OffChainData> = current
            .iter()
            .filter_map(|b| b.off_chain_data.as_ref().map(|o| (o.id, o)))
            .collect();

        let mut imported = Vec::with_capacity(blocks.len());
        let mut written = Vec::new();
        for block in blocks {
            let Some(record) = &block.off_chain_data else {
                imported.push(Arc::clone(block));
                continue;
            };

            let restored = match existing.get(&record.id) {
                Some(live) if live.checksum == record.checksum => Ok(OffChainData::clone(live)),
                Some(_) => Err(StorageError::Corrupted(format!(
                    "off-chain record {} differs from the live file with that id",
                    record.id
                ))),
                None => match payloads.get(&record.id) {
                    Some(bytes) => self
                        .offchain
                        .store_as(record.id, bytes, &record.content_type, record.encrypted)
                        .inspect(|stored| written.push(stored.clone())),
                    None => Err(StorageError::NotFound(format!(
                        "payload of off-chain record {} is not in the export",
                        record.id
                    ))),
                },
            };

            match restored {
                Ok(mut descriptor) => {
                    descriptor.block_number = Some(block.block_number);
                    let mut block = Block::clone(block);
                    block.off_chain_data = Some(descriptor);
                    imported.push(Arc::new(block));
                }
                Err(e) => {
                    self.discard(&written);
                    return Err(e);
                }
            }
        }
        Ok((imported, written))
    }

    fn discard(&self, written: &[OffChainData]) {
        for record in written {
            if !self.offchain.delete(record) {
                tracing::warn!(
                    "[lg-05] Could not remove imported off-chain file {}; recovery will reclaim it",
                    record.id
                );
            }
        }
    }
}

fn read_export(path: &Path) -> Result<ChainExport, StorageError> {
    let bytes = std::fs::read(path).map_err(|e| StorageError::io(path, &e))?;
    let export: ChainExport = serde_json::from_slice(&bytes)
        .map_err(|e| StorageError::Corrupted(format!("{}: {}", path.display(), e)))?;

    if export.format_version == 0 || export.format_version > EXPORT_FORMAT_VERSION {
        return Err(StorageError::Corrupted(format!(
            "{}: unsupported export format {}",
            path.display(),
            export.format_version
        )));
    }
    if export.block_count != export.blocks.len() as u64 {
        return Err(StorageError::Corrupted(format!(
            "{}: header says {} blocks, found {}",
            path.display(),
            export.block_count,
            export.blocks.len()
        )));
    }
    if export.blocks.first().map(|b| b.block_number) != Some(GENESIS_NUMBER) {
        return Err(StorageError::Corrupted(format!("{}: export does not start at genesis", path.display())));
    }
    Ok(export)
}

/// Decode exported payloads and check each against its block's descriptor.
fn check_payloads(export: &ChainExport) -> Result<HashMap<Uuid, Vec<u8>>, StorageError> {
    let records: HashMap<Uuid, &OffChainData> = export
        .blocks
        .iter()
        .filter_map(|b| b.off_chain_data.as_ref().map(|o| (o.id, o)))
        .collect();

    let mut payloads = HashMap::with_capacity(export.off_chain_payloads.len());
    for payload in &export.off_chain_payloads {
        let record = records.get(&payload.id).ok_or_else(|| {
            StorageError::Corrupted(format!("payload {} belongs to no exported block", payload.id))
        })?;
        let bytes = hex::decode(&payload.data)
            .map_err(|e| StorageError::Corrupted(format!("payload {}: {}", payload.id, e)))?;

        let actual = sha256_hex(&bytes);
        if actual != record.checksum || bytes.len() as u64 != record.file_size {
            return Err(StorageError::ChecksumMismatch {
                id: payload.id.to_string(),
                expected: record.checksum.clone(),
                actual,
            });
        }
        payloads.insert(payload.id, bytes);
    }
    Ok(payloads)
}

/// Links, hashes and signatures must hold; signer standing only unless forced.
fn check_report(report: &ChainValidationReport, force: bool) -> LedgerResult<()> {
    for failure in &report.failures {
        if let SignerStatus::LookupFailed { reason } = &failure.signer_status {
            return Err(StorageError::Database(reason.clone()).into());
        }
        let tampered = !failure.is_structurally_valid() || !failure.signature_valid;
        if tampered || !force {
            let err = failure.to_error().unwrap_or_else(|| ValidationError {
                block_number: failure.block_number,
                check: ValidationCheck::AuthorizedKey,
                message: "import rejected".to_string(),
            });
            return Err(LedgerError::Validation(err));
        }
    }
    if force && !report.is_fully_compliant {
        tracing::warn!(
            "[lg-05] Forcing import: {} revoked, {} unknown signer blocks",
            report.revoked_blocks.len(),
            report.unauthorized_blocks.len()
        );
    }
    Ok(())
}
