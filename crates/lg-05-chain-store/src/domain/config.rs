//! Chain store configuration and key layout.

use shared_crypto::KdfParams;
use shared_types::BlockNumber;

/// Default content type recorded for off-chain payloads.
pub const DEFAULT_CONTENT_TYPE: &str = "text/plain";

/// Configuration for the chain store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainConfig {
    /// Argon2id cost for password-encrypted inline payloads.
    pub kdf: KdfParams,
    /// Cap on automatic keywords per block.
    pub max_auto_keywords: usize,
    /// Minimum token length for an automatic keyword.
    pub min_keyword_len: usize,
    /// Content type used when the caller supplies none.
    pub default_content_type: String,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            kdf: KdfParams::default(),
            max_auto_keywords: 20,
            min_keyword_len: 4,
            default_content_type: DEFAULT_CONTENT_TYPE.to_string(),
        }
    }
}

impl ChainConfig {
    /// Set the KDF parameters.
    pub fn with_kdf(mut self, kdf: KdfParams) -> Self {
        self.kdf = kdf;
        self
    }

    /// Set the automatic keyword cap.
    pub fn with_max_auto_keywords(mut self, max: usize) -> Self {
        self.max_auto_keywords = max;
        self
    }

    /// Set the minimum automatic keyword length.
    pub fn with_min_keyword_len(mut self, len: usize) -> Self {
        self.min_keyword_len = len;
        self
    }
}

/// Key prefixes in the block store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPrefix {
    /// `b:` + big-endian height → bincode `Block`.
    Block,
    /// `m:` + name → metadata.
    Metadata,
}

impl KeyPrefix {
    /// Byte prefix for this key type.
    pub fn as_bytes(&self) -> &'static [u8] {
        match self {
            KeyPrefix::Block => b"b:",
            KeyPrefix::Metadata => b"m:",
        }
    }

    /// Full key with the given suffix.
    pub fn key(&self, suffix: &[u8]) -> Vec<u8> {
        let mut key = self.as_bytes().to_vec();
        key.extend_from_slice(suffix);
        key
    }

    /// Block key. Big-endian so that prefix scans return chain order.
    pub fn block_key(number: BlockNumber) -> Vec<u8> {
        KeyPrefix::Block.key(&number.to_be_bytes())
    }

    /// Key holding the committed tail height.
    pub fn tail_key() -> Vec<u8> {
        KeyPrefix::Metadata.key(b"tail")
    }
}
