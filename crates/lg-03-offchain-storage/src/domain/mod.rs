//! Off-chain domain: configuration and the inline/off-chain decision.

pub mod config;
pub mod policy;
