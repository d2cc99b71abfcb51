//! # Rollback Engine Service
//!
//! Both operations reduce to "truncate to height H". Parameter checks run
//! first; the state-dependent checks run against the same block count the
//! truncation acts on, so a preview fails exactly when the real run would.

use crate::domain::{RollbackMode, RollbackOutcome, RollbackRequest};
use lg_05_chain_store::ChainTruncation;
use shared_types::{Block, LedgerResult};
use std::sync::Arc;

/// Destructive tail truncation over a chain.
///
/// Confirmation is the caller's concern; the engine only distinguishes
/// preview from execute.
pub struct RollbackEngine {
    chain: Arc<dyn ChainTruncation>,
}

impl RollbackEngine {
    pub fn new(chain: Arc<dyn ChainTruncation>) -> Self {
        Self { chain }
    }

    /// Remove the newest `n` blocks. Genesis is never removed.
    ///
    /// ## Errors
    ///
    /// - `Parameter`: `n <= 0`
    /// - `Rollback(InsufficientBlocks)`: `n` is at least the block count
    /// - `Rollback(TruncationFailed)`: I/O failure, chain unchanged
    pub fn remove_last(&self, n: i64, mode: RollbackMode) -> LedgerResult<RollbackOutcome> {
        self.run(RollbackRequest::RemoveLast(n), mode)
    }

    /// Truncate so that `target` becomes the tail.
    ///
    /// ## Errors
    ///
    /// - `Parameter`: `target < 0`
    /// - `Rollback(InvalidTarget)`: `target` above the current tail
    /// - `Rollback(TruncationFailed)`: I/O failure, chain unchanged
    pub fn rollback_to(&self, target: i64, mode: RollbackMode) -> LedgerResult<RollbackOutcome> {
        self.run(RollbackRequest::RollbackTo(target), mode)
    }

    pub fn run(&self, request: RollbackRequest, mode: RollbackMode) -> LedgerResult<RollbackOutcome> {
        request.check_parameters()?;
        let outcome = match mode {
            RollbackMode::Preview => self.preview(request)?,
            RollbackMode::Execute => self.execute(request)?,
        };

        tracing::info!(
            "[lg-06] {} {:?}: {} blocks removed, new height #{}",
            if outcome.dry_run { "Previewed" } else { "Executed" },
            request,
            outcome.removed_count,
            outcome.new_height
        );
        Ok(outcome)
    }

    fn preview(&self, request: RollbackRequest) -> LedgerResult<RollbackOutcome> {
        let blocks = self.chain.snapshot();
        let previous_count = blocks.len() as u64;
        let new_height = request.target_height(previous_count)?;
        let keep = usize::try_from(new_height).map_or(blocks.len(), |h| h.saturating_add(1));
        let removed = blocks.get(keep..).unwrap_or(&[]);

        Ok(outcome(previous_count, new_height, removed, true))
    }

    fn execute(&self, request: RollbackRequest) -> LedgerResult<RollbackOutcome> {
        let truncation = self
            .chain
            .truncate_if(&|count| request.target_height(count))?;

        Ok(outcome(
            truncation.previous_count,
            truncation.new_height,
            &truncation.removed,
            false,
        ))
    }
}

fn outcome(previous_count: u64, new_height: u64, removed: &[Arc<Block>], dry_run: bool) -> RollbackOutcome {
    RollbackOutcome {
        removed_count: removed.len() as u64,
        new_height,
        previous_count,
        dry_run,
        removed_blocks: removed.iter().map(|b| b.block_number).collect(),
        removed_off_chain_files: removed.iter().filter(|b| b.is_off_chain()).count() as u64,
    }
}
