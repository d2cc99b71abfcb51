//! # Test Fixtures
//!
//! A ledger opened through the runtime container in a temp directory, with
//! cheap KDF parameters and the production off-chain threshold.

use std::sync::Arc;
use std::time::Duration;

use ledger_runtime::{Ledger, LedgerConfig};
use lg_02_key_registry::{KeyRegistry, KvKeyRegistry};
use lg_03_offchain_storage::{FileOffChainStore, OffChainConfig};
use lg_05_chain_store::{AppendOptions, ChainConfig, ChainStore};
use shared_crypto::{Ed25519KeyPair, KdfParams};
use shared_storage::testing::{FaultSwitch, FaultyKVStore};
use shared_types::{Block, RunContext};
use tempfile::TempDir;

/// A registered signer.
pub struct Signer {
    pub owner: String,
    pub keypair: Ed25519KeyPair,
    pub public_key: String,
}

impl Signer {
    pub fn new(owner: &str, seed: u8) -> Self {
        let keypair = Ed25519KeyPair::from_seed([seed; 32]);
        let public_key = keypair.public_key().to_hex();
        Self {
            owner: owner.to_string(),
            keypair,
            public_key,
        }
    }
}

pub struct TestLedger {
    pub ledger: Ledger,
    pub temp: TempDir,
}

impl TestLedger {
    pub fn open() -> Self {
        let temp = TempDir::new().unwrap();
        let ledger = Ledger::open(test_config(&temp), &RunContext::new()).unwrap();
        Self { ledger, temp }
    }

    /// Register `owner` with a key derived from `seed`.
    pub fn signer(&self, owner: &str, seed: u8) -> Signer {
        let signer = Signer::new(owner, seed);
        assert!(self.ledger.registry().add_key(&signer.public_key, owner));
        signer
    }

    pub fn append(&self, data: &str, signer: &Signer) -> Arc<Block> {
        self.ledger
            .chain()
            .append(data, &signer.keypair, &signer.public_key, AppendOptions::new())
            .unwrap()
    }

    pub fn append_off_chain(&self, data: &str, signer: &Signer) -> Arc<Block> {
        self.ledger
            .chain()
            .append(
                data,
                &signer.keypair,
                &signer.public_key,
                AppendOptions::new().with_force_off_chain(true),
            )
            .unwrap()
    }
}

pub fn test_config(temp: &TempDir) -> LedgerConfig {
    LedgerConfig::new(temp.path())
        .with_kdf(KdfParams::insecure_for_tests())
        .with_lock_timeout(Duration::ZERO)
}

/// A chain whose block store fails every write while the switch is armed.
pub struct FaultyChain {
    pub chain: Arc<ChainStore>,
    pub offchain: Arc<FileOffChainStore>,
    pub switch: FaultSwitch,
    pub signer: Signer,
    pub _temp: TempDir,
}

impl FaultyChain {
    pub fn open() -> Self {
        let temp = TempDir::new().unwrap();
        let offchain = Arc::new(FileOffChainStore::open(OffChainConfig::new(temp.path().join("offchain"))).unwrap());
        let registry = Arc::new(KvKeyRegistry::new_in_memory());
        let signer = Signer::new("carol", 31);
        registry.add_key(&signer.public_key, &signer.owner);

        let (kv, switch) = FaultyKVStore::new();
        let chain = Arc::new(
            ChainStore::open(
                ChainConfig::default().with_kdf(KdfParams::insecure_for_tests()),
                Box::new(kv),
                registry,
                offchain.clone(),
            )
            .unwrap(),
        );

        Self {
            chain,
            offchain,
            switch,
            signer,
            _temp: temp,
        }
    }

    pub fn append_off_chain(&self, data: &str) -> Arc<Block> {
        self.chain
            .append(
                data,
                &self.signer.keypair,
                &self.signer.public_key,
                AppendOptions::new().with_force_off_chain(true),
            )
            .unwrap()
    }
}
