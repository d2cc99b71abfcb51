//! Chain-wide validation report.

use super::result::{BlockValidationResult, SignerStatus};
use serde::Serialize;
use shared_types::BlockNumber;

/// Aggregate counts over a validated chain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationSummary {
    pub total_blocks: u64,
    pub valid_blocks: u64,
    /// Blocks failing at least one of checks 1-3.
    pub structural_failures: u64,
    pub signature_failures: u64,
    /// Blocks signed by a key that has since been revoked.
    pub revoked_signers: u64,
    /// Blocks signed by a key the registry has never seen.
    pub unknown_signers: u64,
    /// Blocks whose signer lookup failed in the registry.
    pub registry_failures: u64,
}

/// Result of validating every block in order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChainValidationReport {
    /// Checks 1-3 hold for every block.
    pub is_structurally_intact: bool,
    /// All five checks hold for every block.
    pub is_fully_compliant: bool,
    /// Blocks failing any of checks 1-4.
    pub invalid_blocks: Vec<BlockNumber>,
    /// Blocks whose signer is registered but revoked.
    pub revoked_blocks: Vec<BlockNumber>,
    /// Blocks whose signer is not registered.
    pub unauthorized_blocks: Vec<BlockNumber>,
    /// Blocks whose signer could not be looked up. Not counted as unauthorized.
    pub lookup_failed_blocks: Vec<BlockNumber>,
    pub summary: ValidationSummary,
    /// Full results for every block that failed any check.
    pub failures: Vec<BlockValidationResult>,
}

impl ChainValidationReport {
    /// Build the report from per-block results in chain order.
    pub fn from_results(results: impl IntoIterator<Item = BlockValidationResult>) -> Self {
        let mut report = ChainValidationReport {
            is_structurally_intact: true,
            is_fully_compliant: true,
            ..Default::default()
        };

        for result in results {
            report.summary.total_blocks += 1;

            if !result.is_structurally_valid() {
                report.is_structurally_intact = false;
                report.summary.structural_failures += 1;
            }
            if !result.signature_valid {
                report.summary.signature_failures += 1;
            }
            if !result.is_structurally_valid() || !result.signature_valid {
                report.invalid_blocks.push(result.block_number);
            }
            match result.signer_status {
                SignerStatus::Revoked { .. } => {
                    report.summary.revoked_signers += 1;
                    report.revoked_blocks.push(result.block_number);
                }
                SignerStatus::Unknown => {
                    report.summary.unknown_signers += 1;
                    report.unauthorized_blocks.push(result.block_number);
                }
                SignerStatus::LookupFailed { .. } => {
                    report.summary.registry_failures += 1;
                    report.lookup_failed_blocks.push(result.block_number);
                }
                SignerStatus::Genesis | SignerStatus::Active { .. } => {}
            }

            if result.is_valid() {
                report.summary.valid_blocks += 1;
            } else {
                report.is_fully_compliant = false;
                report.failures.push(result);
            }
        }

        report
    }
}
