//! Key vault domain: configuration, password policy, entry codec.

pub mod config;
pub mod entry;
pub mod policy;
