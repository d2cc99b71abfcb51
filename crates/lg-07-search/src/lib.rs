//! # Search (lg-07)
//!
//! Three levels of increasing cost and completeness:
//!
//! | Level | Reads |
//! |-------|-------|
//! | `FastOnly` | keywords, category, number, hash, timestamp |
//! | `IncludeData` | + inline payloads |
//! | `ExhaustiveOffchain` | + every off-chain payload, decrypted and verified |
//!
//! Results come back in chain order with the elapsed time and the number
//! of blocks scanned. Rendering is left to the caller.

pub mod domain;
pub mod service;

pub use domain::criteria::SearchCriteria;
pub use domain::level::SearchLevel;
pub use domain::metrics::{LevelStats, MetricsSnapshot, SearchMetrics};
pub use domain::{SearchConfig, SearchOutcome};
pub use service::SearchIndex;
