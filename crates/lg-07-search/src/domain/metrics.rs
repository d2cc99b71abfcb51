//! # Search Metrics
//!
//! Lock-free per-level counters, updated after every search.

use super::level::SearchLevel;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Default)]
struct LevelCounters {
    searches: AtomicU64,
    results: AtomicU64,
    duration_ms: AtomicU64,
    scanned: AtomicU64,
}

/// Cumulative search statistics.
#[derive(Default)]
pub struct SearchMetrics {
    levels: [LevelCounters; 3],
}

/// Point-in-time counters for one level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelStats {
    pub level: SearchLevel,
    pub searches: u64,
    pub total_results: u64,
    pub total_duration_ms: u64,
    pub total_scanned: u64,
}

impl LevelStats {
    pub fn average_duration_ms(&self) -> f64 {
        if self.searches == 0 {
            0.0
        } else {
            self.total_duration_ms as f64 / self.searches as f64
        }
    }
}

/// Point-in-time copy of [`SearchMetrics`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub levels: Vec<LevelStats>,
}

impl MetricsSnapshot {
    pub fn total_searches(&self) -> u64 {
        self.levels.iter().map(|l| l.searches).sum()
    }

    pub fn level(&self, level: SearchLevel) -> Option<&LevelStats> {
        self.levels.iter().find(|l| l.level == level)
    }
}

impl SearchMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, level: SearchLevel, results: u64, duration_ms: u64, scanned: u64) {
        let counters = &self.levels[level.index()];
        counters.searches.fetch_add(1, Ordering::Relaxed);
        counters.results.fetch_add(results, Ordering::Relaxed);
        counters.duration_ms.fetch_add(duration_ms, Ordering::Relaxed);
        counters.scanned.fetch_add(scanned, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            levels: SearchLevel::ALL
                .into_iter()
                .map(|level| {
                    let c = &self.levels[level.index()];
                    LevelStats {
                        level,
                        searches: c.searches.load(Ordering::Relaxed),
                        total_results: c.results.load(Ordering::Relaxed),
                        total_duration_ms: c.duration_ms.load(Ordering::Relaxed),
                        total_scanned: c.scanned.load(Ordering::Relaxed),
                    }
                })
                .collect(),
        }
    }

    pub fn reset(&self) {
        for c in &self.levels {
            c.searches.store(0, Ordering::Relaxed);
            c.results.store(0, Ordering::Relaxed);
            c.duration_ms.store(0, Ordering::Relaxed);
            c.scanned.store(0, Ordering::Relaxed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_snapshot() {
        let metrics = SearchMetrics::new();
        metrics.record(SearchLevel::FastOnly, 3, 10, 100);
        metrics.record(SearchLevel::FastOnly, 1, 20, 100);
        metrics.record(SearchLevel::ExhaustiveOffchain, 0, 5, 7);

        let snapshot = metrics.snapshot();
        let fast = snapshot.level(SearchLevel::FastOnly).unwrap();
        assert_eq!(fast.searches, 2);
        assert_eq!(fast.total_results, 4);
        assert_eq!(fast.average_duration_ms(), 15.0);
        assert_eq!(snapshot.total_searches(), 3);

        metrics.reset();
        assert_eq!(metrics.snapshot().total_searches(), 0);
    }
}
