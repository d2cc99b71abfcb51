//! Validation domain: hashing, per-block results, chain reports.

pub mod hashing;
pub mod report;
pub mod result;
