//! Inline vs. off-chain decision.

/// Where a payload is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageDecision {
    /// In `Block.data`.
    Inline,
    /// In its own file.
    OffChain,
}

impl StorageDecision {
    /// Decide by byte length. A payload exactly at the threshold stays inline;
    /// `force_off_chain` overrides the size rule.
    pub fn for_payload(len: usize, threshold: usize, force_off_chain: bool) -> Self {
        if force_off_chain || len > threshold {
            StorageDecision::OffChain
        } else {
            StorageDecision::Inline
        }
    }

    pub fn is_off_chain(self) -> bool {
        self == StorageDecision::OffChain
    }
}
