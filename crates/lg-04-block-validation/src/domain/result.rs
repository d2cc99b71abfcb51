//! Per-block validation result.

use serde::Serialize;
use shared_types::{BlockNumber, ValidationCheck, ValidationError};

/// Registry standing of a block's signer at audit time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SignerStatus {
    /// The genesis sentinel signer.
    Genesis,
    /// Registered and active.
    Active { owner: String },
    /// Registered, since revoked.
    Revoked { owner: String },
    /// Not in the registry.
    Unknown,
    /// The registry could not be read; standing is undetermined.
    LookupFailed { reason: String },
}

/// Outcome of the five checks on one block. All flags are always populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockValidationResult {
    pub block_number: BlockNumber,
    pub previous_hash_valid: bool,
    pub block_number_valid: bool,
    pub hash_integrity_valid: bool,
    pub signature_valid: bool,
    pub authorized_key_valid: bool,
    pub signer_status: SignerStatus,
    /// Summary of the first failing check.
    pub error_message: Option<String>,
}

impl BlockValidationResult {
    /// All five checks hold.
    pub fn is_valid(&self) -> bool {
        self.is_structurally_valid() && self.signature_valid && self.authorized_key_valid
    }

    /// Checks 1-3 hold.
    pub fn is_structurally_valid(&self) -> bool {
        self.previous_hash_valid && self.block_number_valid && self.hash_integrity_valid
    }

    /// Flag for one check.
    pub fn passed(&self, check: ValidationCheck) -> bool {
        match check {
            ValidationCheck::PreviousHash => self.previous_hash_valid,
            ValidationCheck::BlockNumber => self.block_number_valid,
            ValidationCheck::HashIntegrity => self.hash_integrity_valid,
            ValidationCheck::Signature => self.signature_valid,
            ValidationCheck::AuthorizedKey => self.authorized_key_valid,
        }
    }

    /// Failing checks in evaluation order.
    pub fn failed_checks(&self) -> Vec<ValidationCheck> {
        ValidationCheck::ALL
            .into_iter()
            .filter(|c| !self.passed(*c))
            .collect()
    }

    /// First failing check, if any.
    pub fn first_failure(&self) -> Option<ValidationCheck> {
        ValidationCheck::ALL.into_iter().find(|c| !self.passed(*c))
    }

    /// Typed error for the first failing check.
    pub fn to_error(&self) -> Option<ValidationError> {
        self.first_failure().map(|check| ValidationError {
            block_number: self.block_number,
            check,
            message: self
                .error_message
                .clone()
                .unwrap_or_else(|| format!("{} failed", check)),
        })
    }
}
