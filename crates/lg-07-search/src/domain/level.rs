//! Search levels.

use serde::Serialize;
use std::fmt;

/// How much of each block a search looks at. Each level includes the
/// previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum SearchLevel {
    /// Keywords, category, number, hash, date range.
    FastOnly,
    /// Also inline payloads.
    IncludeData,
    /// Also every off-chain payload, retrieved and decrypted.
    ExhaustiveOffchain,
}

impl SearchLevel {
    pub const ALL: [SearchLevel; 3] = [
        SearchLevel::FastOnly,
        SearchLevel::IncludeData,
        SearchLevel::ExhaustiveOffchain,
    ];

    pub fn scans_inline_data(self) -> bool {
        self >= SearchLevel::IncludeData
    }

    pub fn scans_off_chain(self) -> bool {
        self == SearchLevel::ExhaustiveOffchain
    }

    pub(crate) fn index(self) -> usize {
        match self {
            SearchLevel::FastOnly => 0,
            SearchLevel::IncludeData => 1,
            SearchLevel::ExhaustiveOffchain => 2,
        }
    }
}

impl fmt::Display for SearchLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SearchLevel::FastOnly => "FAST_ONLY",
            SearchLevel::IncludeData => "INCLUDE_DATA",
            SearchLevel::ExhaustiveOffchain => "EXHAUSTIVE_OFFCHAIN",
        })
    }
}
