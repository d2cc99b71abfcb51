//! # Rollback Engine (lg-06)
//!
//! Truncates the chain tail, either by count (`remove_last`) or to a
//! target height (`rollback_to`).
//!
//! ## Guarantees
//!
//! | Guarantee | How |
//! |-----------|-----|
//! | Genesis survives | Requests reaching below height 0 are rejected |
//! | All or nothing | Off-chain files quarantined, then one atomic batch |
//! | Preview fidelity | Preview and execute share every precondition check |
//! | No interleaving | Execution holds the chain's write lock |

pub mod domain;
pub mod service;

pub use domain::{RollbackMode, RollbackOutcome, RollbackRequest};
pub use service::RollbackEngine;
