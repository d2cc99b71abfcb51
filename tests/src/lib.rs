//! # Sealed-Ledger Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── src/integration/
//! │   ├── fixtures.rs     # Ledger + signer setup over a temp directory
//! │   ├── scenarios.rs    # Concrete end-to-end scenarios
//! │   └── properties.rs   # Cross-subsystem invariants
//! └── benches/            # Append, audit and search throughput
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p lg-tests
//!
//! # By category
//! cargo test -p lg-tests integration::scenarios::
//! cargo test -p lg-tests integration::properties::
//!
//! # Benchmarks
//! cargo bench -p lg-tests
//! ```

pub mod integration;
