//! Search domain: criteria, levels, configuration, metrics and outcomes.

pub mod criteria;
pub mod level;
pub mod metrics;

use level::SearchLevel;
use shared_types::Block;
use std::sync::Arc;

/// Search configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    /// Level used by [`search_default`](crate::SearchIndex::search_default).
    pub default_level: SearchLevel,
    /// Searches slower than this are logged at warn level.
    pub slow_search_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_level: SearchLevel::IncludeData,
            slow_search_ms: 1_000,
        }
    }
}

impl SearchConfig {
    pub fn with_default_level(mut self, level: SearchLevel) -> Self {
        self.default_level = level;
        self
    }

    pub fn with_slow_search_ms(mut self, ms: u64) -> Self {
        self.slow_search_ms = ms;
        self
    }
}

/// Result of one search.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub level: SearchLevel,
    /// Matching blocks in chain order.
    pub results: Vec<Arc<Block>>,
    pub duration_ms: u64,
    /// Blocks examined before the search finished.
    pub total_scanned: u64,
    /// Off-chain payloads that could not be read and were skipped.
    pub offchain_failures: u64,
}

impl SearchOutcome {
    pub fn result_count(&self) -> usize {
        self.results.len()
    }
}
