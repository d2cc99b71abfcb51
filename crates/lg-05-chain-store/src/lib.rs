//! # Chain Store (lg-05)
//!
//! Exclusive owner of the block sequence and its lifecycle.
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement |
//! |-----------|-------------|
//! | Sequential heights | Next height computed under the write lock |
//! | Hash linkage | Every append validated against the committed tail |
//! | Authorized signers | Registry consulted before sealing |
//! | Monotonic time | Timestamp is `max(now, tail.timestamp)` |
//! | Atomic writes | Block and tail marker committed in one batch |
//! | No orphaned payloads | Off-chain file removed when its append fails |
//! | Verified imports | Imported chains are validated before one replacing batch |
//!
//! ## Storage Layout
//!
//! | Key | Value |
//! |-----|-------|
//! | `b:` + big-endian height | bincode `Block` |
//! | `m:tail` | big-endian tail height |
//!
//! ## Usage
//!
//! ```ignore
//! let store = ChainStore::open(ChainConfig::default(), kv, registry, offchain)?;
//! let block = store.append("payload", &keypair, &public_key_hex, AppendOptions::new())?;
//! assert!(store.validate_chain().is_fully_compliant);
//! ```

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::config::{ChainConfig, KeyPrefix};
pub use domain::envelope::{EnvelopeError, PasswordEnvelope};
pub use domain::keywords::{extract_auto_keywords, normalize_category, normalize_keywords};
pub use domain::options::{AppendOptions, ImportOptions};
pub use domain::status::{
    ChainExport, ChainStatus, ExportedPayload, ImportOutcome, TruncationOutcome, EXPORT_FORMAT_VERSION,
};
pub use ports::inbound::{ChainReader, ChainTruncation};
pub use service::ChainStore;
