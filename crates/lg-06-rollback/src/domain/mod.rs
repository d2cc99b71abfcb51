//! Rollback requests, modes and outcomes.

use serde::Serialize;
use shared_types::{BlockNumber, ParameterError, RollbackError};

/// Whether a rollback mutates the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RollbackMode {
    /// Report the effect only.
    Preview,
    /// Truncate.
    Execute,
}

impl RollbackMode {
    pub fn from_dry_run(dry_run: bool) -> Self {
        if dry_run {
            RollbackMode::Preview
        } else {
            RollbackMode::Execute
        }
    }

    pub fn is_dry_run(self) -> bool {
        self == RollbackMode::Preview
    }
}

/// A truncation request as supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollbackRequest {
    /// Remove the newest `n` blocks.
    RemoveLast(i64),
    /// Keep blocks up to and including this height.
    RollbackTo(i64),
}

impl RollbackRequest {
    /// Checks that do not depend on chain state.
    pub fn check_parameters(&self) -> Result<(), ParameterError> {
        match *self {
            RollbackRequest::RemoveLast(n) if n <= 0 => Err(ParameterError::new(
                "n",
                format!("number of blocks to remove must be positive, got {}", n),
            )),
            RollbackRequest::RollbackTo(target) if target < 0 => Err(ParameterError::new(
                "target",
                format!("target block number must not be negative, got {}", target),
            )),
            _ => Ok(()),
        }
    }

    /// New tail height for a chain of `block_count` blocks.
    ///
    /// Genesis is never removed: removing `n >= block_count` blocks fails
    /// with the number of removable blocks.
    pub fn target_height(&self, block_count: u64) -> Result<BlockNumber, RollbackError> {
        let max_height = block_count.saturating_sub(1);
        match *self {
            RollbackRequest::RemoveLast(n) => {
                let requested = n.max(0) as u64;
                if requested > max_height {
                    return Err(RollbackError::InsufficientBlocks {
                        requested,
                        available: max_height,
                    });
                }
                Ok(max_height - requested)
            }
            RollbackRequest::RollbackTo(target) => {
                let target = target.max(0) as u64;
                if target > max_height {
                    return Err(RollbackError::InvalidTarget { target, max_height });
                }
                Ok(target)
            }
        }
    }
}

/// Effect of a rollback, real or previewed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RollbackOutcome {
    pub removed_count: u64,
    pub new_height: BlockNumber,
    pub previous_count: u64,
    pub dry_run: bool,
    /// Heights removed, ascending.
    pub removed_blocks: Vec<BlockNumber>,
    /// Off-chain files deleted with them.
    pub removed_off_chain_files: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_checks() {
        assert!(RollbackRequest::RemoveLast(0).check_parameters().is_err());
        assert!(RollbackRequest::RemoveLast(-3).check_parameters().is_err());
        assert!(RollbackRequest::RemoveLast(1).check_parameters().is_ok());
        assert_eq!(
            RollbackRequest::RollbackTo(-1).check_parameters().unwrap_err().field,
            "target"
        );
        assert!(RollbackRequest::RollbackTo(0).check_parameters().is_ok());
    }

    #[test]
    fn test_remove_last_heights() {
        assert_eq!(RollbackRequest::RemoveLast(1).target_height(4), Ok(2));
        assert_eq!(RollbackRequest::RemoveLast(3).target_height(4), Ok(0));
        assert_eq!(
            RollbackRequest::RemoveLast(4).target_height(4),
            Err(RollbackError::InsufficientBlocks {
                requested: 4,
                available: 3
            })
        );
    }

    #[test]
    fn test_rollback_to_heights() {
        assert_eq!(RollbackRequest::RollbackTo(0).target_height(4), Ok(0));
        assert_eq!(RollbackRequest::RollbackTo(3).target_height(4), Ok(3));
        assert_eq!(
            RollbackRequest::RollbackTo(4).target_height(4),
            Err(RollbackError::InvalidTarget {
                target: 4,
                max_height: 3
            })
        );
    }
}
