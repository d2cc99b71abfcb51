//! # Inbound Ports (Driving Ports)

use crate::domain::report::ChainValidationReport;
use crate::domain::result::BlockValidationResult;
use shared_types::Block;
use std::sync::Arc;

/// Validates blocks against their predecessor and the signer registry.
pub trait BlockValidator: Send + Sync {
    /// Run all five checks on `block`. `previous` is `None` only for the
    /// first block of a chain, which must then be a well-formed genesis.
    fn validate_block(&self, block: &Block, previous: Option<&Block>) -> BlockValidationResult;

    /// Validate every block in chain order.
    fn validate_chain(&self, blocks: &[Arc<Block>]) -> ChainValidationReport {
        ChainValidationReport::from_results(blocks.iter().enumerate().map(|(i, block)| {
            let previous = i.checked_sub(1).map(|p| blocks[p].as_ref());
            self.validate_block(block, previous)
        }))
    }
}
