//! # Block Validation (lg-04)
//!
//! Five independent checks per block, always all evaluated:
//!
//! | # | Check | Tier |
//! |---|-------|------|
//! | 1 | `previous_hash_valid` | structural |
//! | 2 | `block_number_valid` | structural |
//! | 3 | `hash_integrity_valid` | structural |
//! | 4 | `signature_valid` | compliance |
//! | 5 | `authorized_key_valid` | compliance |
//!
//! A chain is *structurally intact* when checks 1-3 hold for every block
//! and *fully compliant* when all five do. Authorization is evaluated
//! against the current registry, so revoking a signer makes its historical
//! blocks non-compliant without breaking structural integrity. Compliance
//! is assessed per block; a revoked block does not taint its successors.

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::hashing::{compute_block_hash, seal_block};
pub use domain::report::{ChainValidationReport, ValidationSummary};
pub use domain::result::{BlockValidationResult, SignerStatus};
pub use ports::inbound::BlockValidator;
pub use service::StandardBlockValidator;
