//! # Tail Truncation
//!
//! ```text
//! plan(count) ─► quarantine off-chain files (newest first)
//!             ─► atomic batch: delete block records + put tail
//!             ─► purge quarantined files ─► swap snapshot
//! ```
//!
//! If quarantine or the batch fails, quarantined files are restored and
//! the chain is untouched. Once the batch commits, a failed purge only
//! leaves trash that the next startup recovery removes.

use super::ChainStore;
use crate::domain::config::KeyPrefix;
use crate::domain::status::TruncationOutcome;
use crate::ports::inbound::{ChainReader, ChainTruncation};
use lg_03_offchain_storage::QuarantineTicket;
use shared_storage::BatchOperation;
use shared_types::{Block, BlockNumber, RollbackError};
use std::sync::Arc;

impl ChainTruncation for ChainStore {
    fn truncate_if(
        &self,
        plan: &dyn Fn(u64) -> Result<BlockNumber, RollbackError>,
    ) -> Result<TruncationOutcome, RollbackError> {
        let mut kv = self.kv.lock();
        let current = self.snapshot();
        let previous_count = current.len() as u64;

        let new_height = plan(previous_count)?;
        let keep = usize::try_from(new_height)
            .ok()
            .and_then(|h| h.checked_add(1))
            .filter(|k| *k <= current.len())
            .ok_or(RollbackError::InvalidTarget {
                target: new_height,
                max_height: previous_count.saturating_sub(1),
            })?;

        let removed: Vec<Arc<Block>> = current[keep..].to_vec();
        if removed.is_empty() {
            return Ok(TruncationOutcome {
                previous_count,
                new_height,
                removed,
            });
        }

        let tickets = self.quarantine_all(&removed)?;

        let mut operations: Vec<BatchOperation> = removed
            .iter()
            .rev()
            .map(|b| BatchOperation::delete(KeyPrefix::block_key(b.block_number)))
            .collect();
        operations.push(BatchOperation::put(
            KeyPrefix::tail_key(),
            new_height.to_be_bytes().to_vec(),
        ));

        if let Err(e) = kv.atomic_batch_write(operations) {
            tracing::error!(
                "[lg-05] Truncation to #{} failed, restoring {} off-chain files: {}",
                new_height,
                tickets.len(),
                e
            );
            self.restore_all(&tickets);
            return Err(RollbackError::TruncationFailed(e.to_string()));
        }

        for ticket in &tickets {
            if let Err(e) = self.offchain.purge(ticket) {
                tracing::warn!("[lg-05] Could not purge off-chain file {}: {}", ticket.id, e);
            }
        }
        *self.snapshot.write() = Arc::new(current[..keep].to_vec());

        tracing::info!(
            "[lg-05] ✂ Truncated chain to #{}: removed {} blocks, {} off-chain files",
            new_height,
            removed.len(),
            tickets.len()
        );
        Ok(TruncationOutcome {
            previous_count,
            new_height,
            removed,
        })
    }
}

impl ChainStore {
    /// Quarantine the off-chain files of `blocks`, newest first. On failure
    /// everything already moved is put back.
    fn quarantine_all(&self, blocks: &[Arc<Block>]) -> Result<Vec<QuarantineTicket>, RollbackError> {
        let mut tickets = Vec::new();
        for record in blocks.iter().rev().filter_map(|b| b.off_chain_data.as_ref()) {
            match self.offchain.quarantine(record) {
                Ok(ticket) => tickets.push(ticket),
                Err(e) => {
                    self.restore_all(&tickets);
                    return Err(RollbackError::TruncationFailed(format!(
                        "quarantine of off-chain file {} failed: {}",
                        record.id, e
                    )));
                }
            }
        }
        Ok(tickets)
    }

    fn restore_all(&self, tickets: &[QuarantineTicket]) {
        for ticket in tickets.iter().rev() {
            if let Err(e) = self.offchain.restore(ticket) {
                tracing::error!("[lg-05] Could not restore off-chain file {}: {}", ticket.id, e);
            }
        }
    }
}
