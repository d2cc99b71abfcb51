//! # Ledger Configuration
//!
//! Aggregated configuration for every subsystem plus runtime parameters.
//!
//! ## Data Directory Layout
//!
//! ```text
//! <data_dir>/
//! ├── LOCK          process lock (fs2)
//! ├── chain.db      block records
//! ├── keys.db       authorized keys
//! ├── offchain/     <id>.dat payloads + master.key
//! └── vault/        <owner>.key entries
//! ```

use lg_01_key_vault::VaultConfig;
use lg_03_offchain_storage::OffChainConfig;
use lg_05_chain_store::ChainConfig;
use lg_07_search::SearchConfig;
use shared_crypto::KdfParams;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Default off-chain threshold: 512 KiB.
pub const DEFAULT_OFFCHAIN_THRESHOLD: usize = 512 * 1024;

/// Complete ledger configuration.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Root of all persisted state.
    pub data_dir: PathBuf,
    /// Payloads strictly larger than this go off-chain.
    pub offchain_threshold: usize,
    /// Encrypt off-chain payloads.
    pub offchain_encrypt: bool,
    /// Argon2id cost shared by the vault and password-protected payloads.
    pub kdf: KdfParams,
    /// How long `open` waits for another process to release the directory.
    pub lock_timeout: Duration,
    /// Filter directive used when `RUST_LOG` is unset.
    pub log_level: Option<String>,
    /// JSON log lines instead of the pretty format.
    pub json_logs: bool,
    /// Chain store settings.
    pub chain: ChainConfig,
    /// Search settings.
    pub search: SearchConfig,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("ledger-data"),
            offchain_threshold: DEFAULT_OFFCHAIN_THRESHOLD,
            offchain_encrypt: true,
            kdf: KdfParams::default(),
            lock_timeout: Duration::from_secs(5),
            log_level: None,
            json_logs: false,
            chain: ChainConfig::default(),
            search: SearchConfig::default(),
        }
    }
}

impl LedgerConfig {
    /// Configuration rooted at `data_dir` with defaults elsewhere.
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `LEDGER_DATA_DIR`: data directory (default: ledger-data)
    /// - `LEDGER_OFFCHAIN_THRESHOLD`: off-chain threshold in bytes (default: 524288)
    /// - `LEDGER_OFFCHAIN_ENCRYPT`: encrypt off-chain payloads (default: true)
    /// - `LEDGER_KDF_MEMORY_KIB`: Argon2id memory cost
    /// - `LEDGER_KDF_ITERATIONS`: Argon2id passes
    /// - `LEDGER_LOG_LEVEL` or `RUST_LOG`: log filter (default: from `RunContext`)
    /// - `LEDGER_JSON_LOGS`: JSON log lines (default: false)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// [`from_env`](Self::from_env) over an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(dir) = lookup("LEDGER_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(raw) = lookup("LEDGER_OFFCHAIN_THRESHOLD") {
            config.offchain_threshold = parse_var("LEDGER_OFFCHAIN_THRESHOLD", &raw)?;
        }
        if let Some(raw) = lookup("LEDGER_OFFCHAIN_ENCRYPT") {
            config.offchain_encrypt = parse_flag("LEDGER_OFFCHAIN_ENCRYPT", &raw)?;
        }
        if let Some(raw) = lookup("LEDGER_KDF_MEMORY_KIB") {
            config.kdf.memory_kib = parse_var("LEDGER_KDF_MEMORY_KIB", &raw)?;
        }
        if let Some(raw) = lookup("LEDGER_KDF_ITERATIONS") {
            config.kdf.iterations = parse_var("LEDGER_KDF_ITERATIONS", &raw)?;
        }
        config.log_level = lookup("LEDGER_LOG_LEVEL").or_else(|| lookup("RUST_LOG"));
        if let Some(raw) = lookup("LEDGER_JSON_LOGS") {
            config.json_logs = parse_flag("LEDGER_JSON_LOGS", &raw)?;
        }

        config.chain.kdf = config.kdf;
        Ok(config)
    }

    /// Set the off-chain threshold.
    pub fn with_offchain_threshold(mut self, bytes: usize) -> Self {
        self.offchain_threshold = bytes;
        self
    }

    /// Enable or disable off-chain encryption.
    pub fn with_offchain_encryption(mut self, encrypt: bool) -> Self {
        self.offchain_encrypt = encrypt;
        self
    }

    /// Set the KDF cost for the vault and password-protected payloads.
    pub fn with_kdf(mut self, kdf: KdfParams) -> Self {
        self.kdf = kdf;
        self.chain.kdf = kdf;
        self
    }

    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = Some(level.into());
        self
    }

    pub fn with_json_logs(mut self, json: bool) -> Self {
        self.json_logs = json;
        self
    }

    pub fn with_search(mut self, search: SearchConfig) -> Self {
        self.search = search;
        self
    }

    /// Reject settings no subsystem can run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.offchain_threshold == 0 {
            return Err(ConfigError::ZeroThreshold);
        }
        if self.kdf.memory_kib < KdfParams::MIN_MEMORY_KIB
            || self.kdf.iterations < KdfParams::MIN_ITERATIONS
        {
            return Err(ConfigError::WeakKdf {
                memory_kib: self.kdf.memory_kib,
                iterations: self.kdf.iterations,
            });
        }
        self.kdf
            .validate()
            .map_err(|e| ConfigError::InvalidKdf(e.to_string()))
    }

    pub fn chain_db_path(&self) -> PathBuf {
        self.data_dir.join("chain.db")
    }

    pub fn keys_db_path(&self) -> PathBuf {
        self.data_dir.join("keys.db")
    }

    pub fn offchain_dir(&self) -> PathBuf {
        self.data_dir.join("offchain")
    }

    pub fn vault_dir(&self) -> PathBuf {
        self.data_dir.join("vault")
    }

    /// Off-chain store configuration derived from this one.
    pub fn offchain_config(&self) -> OffChainConfig {
        OffChainConfig::new(self.offchain_dir())
            .with_threshold(self.offchain_threshold)
            .with_encryption(self.offchain_encrypt)
    }

    /// Key vault configuration derived from this one.
    pub fn vault_config(&self) -> VaultConfig {
        VaultConfig::new(self.vault_dir()).with_kdf(self.kdf)
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Environment variable holds an unparsable value.
    #[error("Invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },

    /// Every payload would go off-chain.
    #[error("Off-chain threshold must be greater than zero")]
    ZeroThreshold,

    /// KDF cost below the Argon2 minimums.
    #[error("KDF parameters too weak: memory_kib={memory_kib}, iterations={iterations}")]
    WeakKdf { memory_kib: u32, iterations: u32 },

    /// KDF parameters rejected by Argon2.
    #[error("Invalid KDF parameters: {0}")]
    InvalidKdf(String),
}

fn parse_var<T: std::str::FromStr>(var: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        var,
        value: raw.to_string(),
    })
}

fn parse_flag(var: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            var,
            value: raw.to_string(),
        }),
    }
}
