//! # Ledger Container
//!
//! Holds every subsystem instance for one data directory.
//!
//! ## Initialization Order
//!
//! ```text
//! Level 0: directory lock, key vault (independent of the chain)
//! Level 1: key registry, off-chain store
//! Level 2: chain store (validator over the registry, crash recovery)
//! Level 3: rollback engine, search index (views over the chain)
//! ```

use super::config::LedgerConfig;
use anyhow::{Context, Result};
use lg_01_key_vault::KeyVault;
use lg_02_key_registry::KvKeyRegistry;
use lg_03_offchain_storage::FileOffChainStore;
use lg_04_block_validation::ChainValidationReport;
use lg_05_chain_store::{ChainReader, ChainStore};
use lg_06_rollback::RollbackEngine;
use lg_07_search::SearchIndex;
use shared_storage::{DirectoryLock, KeyValueStore};
use shared_types::RunContext;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// An open ledger. Dropping it releases the directory lock.
pub struct Ledger {
    config: LedgerConfig,
    vault: Arc<KeyVault>,
    registry: Arc<KvKeyRegistry>,
    offchain: Arc<FileOffChainStore>,
    chain: Arc<ChainStore>,
    rollback: RollbackEngine,
    search: SearchIndex,
    // Declared last so it is released after every store has closed.
    lock: DirectoryLock,
}

impl Ledger {
    /// Open (or create) the ledger under `config.data_dir`.
    ///
    /// Fails if the configuration is invalid, another process holds the
    /// directory past `config.lock_timeout`, or a store cannot be opened.
    pub fn open(config: LedgerConfig, ctx: &RunContext) -> Result<Self> {
        config.validate().context("Invalid ledger configuration")?;

        info!("[ledger] Opening ledger at {}", config.data_dir.display());

        // Level 0
        let lock = DirectoryLock::acquire(&config.data_dir, config.lock_timeout)
            .with_context(|| format!("Failed to lock {}", config.data_dir.display()))?;
        let vault = Arc::new(KeyVault::new(config.vault_config()));
        if ctx.verbose {
            debug!("  [01] Key vault at {}", config.vault_dir().display());
        }

        // Level 1
        let keys_db = open_kv(&config.keys_db_path())?;
        let registry = Arc::new(KvKeyRegistry::new(keys_db));
        let offchain = Arc::new(
            FileOffChainStore::open(config.offchain_config())
                .context("Failed to open off-chain store")?,
        );
        if ctx.verbose {
            debug!(
                "  [02] Key registry at {}",
                config.keys_db_path().display()
            );
            debug!(
                "  [03] Off-chain store at {} (threshold {} bytes, encrypt={})",
                config.offchain_dir().display(),
                config.offchain_threshold,
                config.offchain_encrypt
            );
        }

        // Level 2
        let chain_db = open_kv(&config.chain_db_path())?;
        let chain = Arc::new(
            ChainStore::open(
                config.chain.clone(),
                chain_db,
                registry.clone(),
                offchain.clone(),
            )
            .context("Failed to open chain store")?,
        );

        // Level 3
        let rollback = RollbackEngine::new(chain.clone());
        let search = SearchIndex::new(chain.clone(), offchain.clone(), config.search.clone());

        info!(
            "[ledger] ✅ Ledger ready: {} blocks, tail #{}",
            chain.get_block_count(),
            chain.max_height()
        );

        Ok(Self {
            config,
            vault,
            registry,
            offchain,
            chain,
            rollback,
            search,
            lock,
        })
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn vault(&self) -> &Arc<KeyVault> {
        &self.vault
    }

    pub fn registry(&self) -> &Arc<KvKeyRegistry> {
        &self.registry
    }

    pub fn offchain(&self) -> &Arc<FileOffChainStore> {
        &self.offchain
    }

    pub fn chain(&self) -> &Arc<ChainStore> {
        &self.chain
    }

    pub fn rollback(&self) -> &RollbackEngine {
        &self.rollback
    }

    pub fn search(&self) -> &SearchIndex {
        &self.search
    }

    /// Full-chain audit against the current registry.
    pub fn audit(&self) -> ChainValidationReport {
        self.chain.validate_chain()
    }

    /// Path of the held lock file.
    pub fn lock_path(&self) -> &Path {
        self.lock.path()
    }
}

#[cfg(not(feature = "rocksdb"))]
fn open_kv(path: &Path) -> Result<Box<dyn KeyValueStore>> {
    let store = shared_storage::FileBackedKVStore::open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    Ok(Box::new(store))
}

#[cfg(feature = "rocksdb")]
fn open_kv(path: &Path) -> Result<Box<dyn KeyValueStore>> {
    let store = shared_storage::RocksDbStore::open_default(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    Ok(Box::new(store))
}
