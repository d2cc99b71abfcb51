//! Pure chain-store domain: configuration, key layout, keyword rules,
//! password envelopes and typed results.

pub mod config;
pub mod envelope;
pub mod keywords;
pub mod options;
pub mod status;
