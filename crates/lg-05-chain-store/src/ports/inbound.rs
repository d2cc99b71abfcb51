//! # Inbound Ports (Driving Ports)
//!
//! Read and truncation interfaces consumed by rollback and search.

use crate::domain::status::TruncationOutcome;
use shared_types::{Block, BlockNumber, RollbackError};
use std::sync::Arc;

/// Read access to the last committed chain state.
///
/// Readers never take the write lock; every call sees one consistent
/// snapshot.
pub trait ChainReader: Send + Sync {
    /// Committed blocks in chain order.
    fn snapshot(&self) -> Arc<Vec<Arc<Block>>>;

    fn get_block(&self, number: BlockNumber) -> Option<Arc<Block>> {
        usize::try_from(number)
            .ok()
            .and_then(|i| self.snapshot().get(i).cloned())
    }

    fn get_all_blocks(&self) -> Vec<Arc<Block>> {
        self.snapshot().as_ref().clone()
    }

    fn get_block_count(&self) -> u64 {
        self.snapshot().len() as u64
    }

    /// Height of the tail block.
    fn max_height(&self) -> BlockNumber {
        self.get_block_count().saturating_sub(1)
    }

    fn get_block_by_hash(&self, hash: &str) -> Option<Arc<Block>> {
        let hash = hash.trim().to_ascii_lowercase();
        self.snapshot().iter().find(|b| b.hash == hash).cloned()
    }
}

/// Tail truncation under the chain's write lock.
pub trait ChainTruncation: ChainReader {
    /// Hold the write lock, ask `plan` for the new tail height given the
    /// current block count, then remove every block above it together with
    /// its off-chain file. All or nothing.
    ///
    /// `plan` runs under the lock, so its precondition checks see the same
    /// state the truncation acts on. Returning the current max height
    /// removes nothing.
    fn truncate_if(
        &self,
        plan: &dyn Fn(u64) -> Result<BlockNumber, RollbackError>,
    ) -> Result<TruncationOutcome, RollbackError>;
}
