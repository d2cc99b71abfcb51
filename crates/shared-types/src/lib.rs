//! # Shared Types Crate
//!
//! Domain entities and the error taxonomy shared by every ledger subsystem.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: Block, AuthorizedKey and OffChainData are
//!   defined once here and flow unchanged between subsystems.
//! - **Errors as Values**: Expected conditions (wrong password, revoked
//!   signer, failed check) are typed results, never panics.
//! - **No Process Globals**: Run-wide switches travel in an explicit
//!   [`RunContext`] passed by reference.

pub mod context;
pub mod entities;
pub mod errors;

pub use context::RunContext;
pub use entities::*;
pub use errors::*;
