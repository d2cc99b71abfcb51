//! # Ledger Runtime
//!
//! Configuration, logging and wiring for a sealed ledger.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration (`LedgerConfig::from_env` or builders)
//! 2. Initialize logging (`telemetry::init_tracing`)
//! 3. `Ledger::open`: validate config, lock the data directory, open stores
//!    in dependency order, create genesis if the chain is empty and recover
//!    off-chain files left behind by an interrupted write
//!
//! ```rust,no_run
//! use ledger_runtime::{init_tracing, Ledger, LedgerConfig};
//! use shared_types::RunContext;
//!
//! fn main() -> anyhow::Result<()> {
//!     let ctx = RunContext::new();
//!     let config = LedgerConfig::from_env()?;
//!     init_tracing(&config, &ctx)?;
//!     let ledger = Ledger::open(config, &ctx)?;
//!     println!("{} blocks", ledger.chain().status().block_count);
//!     Ok(())
//! }
//! ```

pub mod container;
pub mod telemetry;

pub use container::{ConfigError, Ledger, LedgerConfig, DEFAULT_OFFCHAIN_THRESHOLD};
pub use telemetry::init_tracing;
