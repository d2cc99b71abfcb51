//! # Key Registry (lg-02)
//!
//! Directory of authorized signers. Each record maps a unique owner name to
//! a unique Ed25519 public key and an active flag.
//!
//! Revocation never deletes a record: blocks signed before revocation must
//! stay attributable for audits, which report them as structurally intact
//! but no longer compliant.
//!
//! ## Storage Layout
//!
//! | Key | Value |
//! |-----|-------|
//! | `k:owner:<owner>` | bincode `AuthorizedKey` |
//! | `k:pub:<public_key>` | owner name |

pub mod error;
pub mod ports;
pub mod service;

pub use error::RegistryError;
pub use ports::inbound::KeyRegistry;
pub use service::KvKeyRegistry;
