//! # Off-Chain Storage (lg-03)
//!
//! Payloads above the size threshold are written to their own file,
//! optionally encrypted, and referenced from the block by an
//! [`OffChainData`](shared_types::OffChainData) descriptor.
//!
//! ## Encryption
//!
//! Each file gets a random 256-bit data key (XChaCha20-Poly1305, file id as
//! associated data). The data key is wrapped under the store master key and
//! kept in the descriptor with both nonces. The checksum always covers the
//! plaintext and is verified on every read.
//!
//! ## File Lifecycle
//!
//! ```text
//! store ──► <dir>/<id>.dat                       (temp + fsync + rename)
//! quarantine ──► <dir>/.trash/<id>.dat ──► purge (rollback commit)
//!                                     └──► restore (rollback abort)
//! ```
//!
//! `recover` reconciles the directory with the set of ids the chain still
//! references after a crash.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use domain::config::OffChainConfig;
pub use domain::policy::StorageDecision;
pub use ports::inbound::{OffChainStorage, QuarantineTicket, RecoveryReport};
pub use service::FileOffChainStore;
