//! # Ledger Container
//!
//! Configuration and lifetime management for one open ledger.

pub mod config;
pub mod ledger;

pub use config::{ConfigError, LedgerConfig, DEFAULT_OFFCHAIN_THRESHOLD};
pub use ledger::Ledger;
