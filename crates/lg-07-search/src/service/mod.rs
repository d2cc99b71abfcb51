//! # Search Index Service
//!
//! Scans one committed chain snapshot in order. Per block:
//!
//! ```text
//! metadata filters ──fail──► skip
//!        │
//!   term? ── none ──────────► match
//!        │
//!   keywords/category ─hit──► match
//!        │  (IncludeData)
//!   inline data ──────hit───► match
//!        │  (ExhaustiveOffchain)
//!   off-chain payload ─hit──► match
//! ```
//!
//! Password-protected payloads are only opened when the criteria carry a
//! password; a wrong password is a miss, not an error.


use crate::domain::criteria::{text_contains, SearchCriteria};
use crate::domain::level::SearchLevel;
use crate::domain::metrics::{MetricsSnapshot, SearchMetrics};
use crate::domain::{SearchConfig, SearchOutcome};
use lg_03_offchain_storage::OffChainStorage;
use lg_05_chain_store::{ChainReader, PasswordEnvelope};
use shared_types::{Block, LedgerResult, OffChainData, ParameterError};
use std::sync::Arc;
use std::time::Instant;

/// Multi-level content lookup over the chain and its off-chain payloads.
pub struct SearchIndex {
    chain: Arc<dyn ChainReader>,
    offchain: Arc<dyn OffChainStorage>,
    config: SearchConfig,
    metrics: SearchMetrics,
}

impl SearchIndex {
    pub fn new(chain: Arc<dyn ChainReader>, offchain: Arc<dyn OffChainStorage>, config: SearchConfig) -> Self {
        Self {
            chain,
            offchain,
            config,
            metrics: SearchMetrics::new(),
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Blocks matching `criteria` at `level`, in chain order.
    ///
    /// `limit = None` is unbounded.
    ///
    /// ## Errors
    ///
    /// - `Parameter("limit")`: `limit <= 0`
    /// - `Parameter("criteria" | "from")`: no filter, or an inverted date range
    pub fn search(
        &self,
        criteria: &SearchCriteria,
        level: SearchLevel,
        limit: Option<i64>,
    ) -> LedgerResult<SearchOutcome> {
        let limit = match limit {
            Some(l) if l <= 0 => {
                return Err(ParameterError::new("limit", format!("must be positive, got {}", l)).into())
            }
            Some(l) => usize::try_from(l).unwrap_or(usize::MAX),
            None => usize::MAX,
        };
        criteria.check()?;

        let started = Instant::now();
        let term = criteria.normalized_term();
        let password = criteria.password.as_ref().map(|p| p.as_str());
        let blocks = self.chain.snapshot();

        let mut results = Vec::new();
        let mut total_scanned = 0u64;
        let mut offchain_failures = 0u64;

        for block in blocks.iter() {
            if results.len() >= limit {
                break;
            }
            total_scanned += 1;

            if !criteria.matches_metadata(block) {
                continue;
            }
            let hit = match term.as_deref() {
                None => true,
                Some(term) => {
                    SearchCriteria::term_in_metadata(term, block)
                        || (level.scans_inline_data() && inline_contains(block, term, password))
                        || (level.scans_off_chain()
                            && self.off_chain_contains(block, term, password, &mut offchain_failures))
                }
            };
            if hit {
                results.push(Arc::clone(block));
            }
        }

        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        self.metrics
            .record(level, results.len() as u64, duration_ms, total_scanned);

        if duration_ms > self.config.slow_search_ms {
            tracing::warn!(
                "[lg-07] Slow {} search: {} ms over {} blocks",
                level,
                duration_ms,
                total_scanned
            );
        }
        tracing::debug!(
            "[lg-07] {} search: {} results, {} scanned, {} off-chain failures, {} ms",
            level,
            results.len(),
            total_scanned,
            offchain_failures,
            duration_ms
        );

        Ok(SearchOutcome {
            level,
            results,
            duration_ms,
            total_scanned,
            offchain_failures,
        })
    }

    /// [`search`](Self::search) at the configured default level.
    pub fn search_default(&self, criteria: &SearchCriteria, limit: Option<i64>) -> LedgerResult<SearchOutcome> {
        self.search(criteria, self.config.default_level, limit)
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    pub fn reset_metrics(&self) {
        self.metrics.reset();
    }

    fn off_chain_contains(
        &self,
        block: &Block,
        term: &str,
        password: Option<&str>,
        failures: &mut u64,
    ) -> bool {
        let Some(record) = &block.off_chain_data else {
            return false;
        };
        match self.offchain.retrieve(record) {
            Ok(bytes) => payload_contains(block, &String::from_utf8_lossy(&bytes), term, password),
            Err(e) => {
                *failures += 1;
                log_retrieval_failure(block, record, &e.to_string());
                false
            }
        }
    }
}

fn inline_contains(block: &Block, term: &str, password: Option<&str>) -> bool {
    !block.is_off_chain() && payload_contains(block, &block.data, term, password)
}

/// Scan payload text of `block`, opening its password envelope when a
/// password is given.
fn payload_contains(block: &Block, text: &str, term: &str, password: Option<&str>) -> bool {
    if !block.is_password_protected() {
        return text_contains(text, term);
    }
    let Some(password) = password else {
        return false;
    };
    PasswordEnvelope::decode(text)
        .ok()
        .and_then(|envelope| envelope.open(password).ok())
        .is_some_and(|plaintext| text_contains(&String::from_utf8_lossy(&plaintext), term))
}

fn log_retrieval_failure(block: &Block, record: &OffChainData, reason: &str) {
    tracing::warn!(
        "[lg-07] Skipping off-chain payload {} of block #{}: {}",
        record.id,
        block.block_number,
        reason
    );
}
