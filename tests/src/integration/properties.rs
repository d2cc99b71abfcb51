//! # Cross-Subsystem Properties
//!
//! | Property | Subsystems |
//! |----------|------------|
//! | Hash-chain linkage and numbering | chain store, validator |
//! | Off-chain round trip, tamper detection | off-chain store |
//! | Vault round trip, wrong password | key vault |
//! | Dry-run idempotence | rollback |
//! | Truncation atomicity under I/O failure | rollback, chain store, off-chain store |
//! | Revocation tiering | registry, validator |
//! | Readers see whole snapshots during appends | chain store, search |

use super::fixtures::{FaultyChain, TestLedger};
use lg_01_key_vault::KeyVaultApi;
use lg_02_key_registry::KeyRegistry;
use lg_03_offchain_storage::OffChainStorage;
use lg_05_chain_store::{AppendOptions, ChainReader};
use lg_06_rollback::{RollbackEngine, RollbackMode};
use lg_07_search::{SearchCriteria, SearchLevel};
use shared_types::{LedgerError, RollbackError, StorageError};
use std::sync::Arc;
use std::thread;

#[test]
fn test_hash_chain_linkage_holds_for_every_block() {
    let t = TestLedger::open();
    let alice = t.signer("alice", 1);
    let bob = t.signer("bob", 2);
    for i in 0..12 {
        let signer = if i % 2 == 0 { &alice } else { &bob };
        if i % 4 == 3 {
            t.append_off_chain(&format!("attachment {}", i), signer);
        } else {
            t.append(&format!("entry {}", i), signer);
        }
    }

    let blocks = t.ledger.chain().get_all_blocks();
    assert_eq!(blocks.len(), 13);
    for (i, block) in blocks.iter().enumerate() {
        assert_eq!(block.block_number, i as u64);
        if i > 0 {
            assert_eq!(block.previous_hash, blocks[i - 1].hash);
            assert!(block.timestamp >= blocks[i - 1].timestamp);
        }
    }
    assert!(t.ledger.audit().is_fully_compliant);
}

#[test]
fn test_off_chain_round_trip_and_tamper_detection() {
    let t = TestLedger::open();
    let store = t.ledger.offchain();

    let payloads: [&[u8]; 4] = [b"", b"a", b"quarterly report body", &[0u8, 255, 7, 128, 64]];
    for payload in payloads {
        let record = store.store(payload, "application/octet-stream", true).unwrap();
        assert!(record.encrypted);
        assert_eq!(store.retrieve(&record).unwrap(), payload);
    }

    let record = store.store(b"do not alter", "text/plain", true).unwrap();
    let mut bytes = std::fs::read(&record.file_path).unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0x01;
    std::fs::write(&record.file_path, &bytes).unwrap();

    assert!(matches!(
        store.retrieve(&record),
        Err(StorageError::Decryption(_))
    ));
}

#[test]
fn test_plaintext_tampering_fails_checksum() {
    let t = TestLedger::open();
    let store = t.ledger.offchain();
    let record = store.store(b"signed contract", "text/plain", false).unwrap();

    std::fs::write(&record.file_path, b"signed c0ntract").unwrap();

    assert!(matches!(
        store.retrieve(&record),
        Err(StorageError::ChecksumMismatch { .. })
    ));
}

#[test]
fn test_vault_round_trip_and_wrong_password() {
    let t = TestLedger::open();
    let vault = t.ledger.vault();

    for (owner, key, password) in [
        ("alice", vec![1u8; 32], "Alice-Pass-1"),
        ("bob", vec![2u8; 64], "hunter2hunter2"),
        ("carol.ops", (0u8..=255).collect::<Vec<_>>(), "ünïcödé-9"),
    ] {
        assert!(vault.save(owner, &key, password));
        assert_eq!(vault.load(owner, password).unwrap().as_slice(), key.as_slice());
        assert!(vault.load(owner, "Wrong-Pass-0").is_none());
    }

    let mut owners = vault.list();
    owners.sort();
    assert_eq!(owners, vec!["alice", "bob", "carol.ops"]);
}

#[test]
fn test_dry_run_is_idempotent_and_matches_execute() {
    let t = TestLedger::open();
    let alice = t.signer("alice", 1);
    for i in 0..5 {
        t.append(&format!("entry {}", i), &alice);
    }
    let rollback = t.ledger.rollback();

    let first = rollback.remove_last(2, RollbackMode::Preview).unwrap();
    let second = rollback.remove_last(2, RollbackMode::Preview).unwrap();
    assert_eq!(t.ledger.chain().get_block_count(), 6);
    assert_eq!(
        (first.removed_count, first.new_height),
        (second.removed_count, second.new_height)
    );
    assert!(first.dry_run);

    let executed = rollback.remove_last(2, RollbackMode::Execute).unwrap();
    assert_eq!(executed.removed_count, first.removed_count);
    assert_eq!(executed.new_height, first.new_height);
    assert_eq!(executed.removed_blocks, first.removed_blocks);
    assert_eq!(t.ledger.chain().get_block_count(), 4);
}

#[test]
fn test_truncation_io_failure_leaves_chain_and_files_unchanged() {
    let f = FaultyChain::open();
    let records: Vec<_> = (0..3)
        .map(|i| f.append_off_chain(&format!("file {}", i)).off_chain_data.clone().unwrap())
        .collect();
    let engine = RollbackEngine::new(f.chain.clone());
    let before = f.chain.get_all_blocks();

    f.switch.arm();
    let result = engine.rollback_to(0, RollbackMode::Execute);
    f.switch.disarm();

    assert!(matches!(
        result,
        Err(LedgerError::Rollback(RollbackError::TruncationFailed(_)))
    ));
    assert_eq!(f.chain.get_block_count(), 4);
    assert_eq!(f.chain.get_all_blocks(), before);
    for record in &records {
        assert!(f.offchain.exists(record));
        assert!(f.offchain.retrieve(record).is_ok());
    }

    let retried = engine.rollback_to(0, RollbackMode::Execute).unwrap();
    assert_eq!(retried.removed_count, 3);
    assert!(records.iter().all(|r| !f.offchain.exists(r)));
}

#[test]
fn test_append_io_failure_leaves_no_block_and_no_file() {
    let f = FaultyChain::open();
    let files_before = std::fs::read_dir(&f.offchain.config().dir).unwrap().count();

    f.switch.arm();
    let result = f.chain.append(
        "lost write",
        &f.signer.keypair,
        &f.signer.public_key,
        AppendOptions::new().with_force_off_chain(true),
    );
    f.switch.disarm();

    assert!(matches!(result, Err(LedgerError::Storage(_))));
    assert_eq!(f.chain.get_block_count(), 1);
    assert_eq!(
        std::fs::read_dir(&f.offchain.config().dir).unwrap().count(),
        files_before
    );
}

#[test]
fn test_revocation_breaks_compliance_not_integrity() {
    let t = TestLedger::open();
    let alice = t.signer("alice", 1);
    let bob = t.signer("bob", 2);
    t.append("by alice", &alice);
    t.append("by bob", &bob);
    t.append("by alice again", &alice);

    assert!(t.ledger.registry().revoke("alice"));
    let report = t.ledger.audit();

    assert!(report.is_structurally_intact);
    assert!(!report.is_fully_compliant);
    assert_eq!(report.revoked_blocks, vec![1, 3]);
    assert!(report.invalid_blocks.is_empty());
}

#[test]
fn test_readers_see_whole_snapshots_during_appends() {
    let t = TestLedger::open();
    let alice = Arc::new(t.signer("alice", 1));
    let chain = t.ledger.chain().clone();

    thread::scope(|scope| {
        let writer = {
            let chain = chain.clone();
            let alice = alice.clone();
            scope.spawn(move || {
                for i in 0..30 {
                    chain
                        .append(
                            &format!("ticket {}", i),
                            &alice.keypair,
                            &alice.public_key,
                            AppendOptions::new().with_keywords(["ticket"]),
                        )
                        .unwrap();
                }
            })
        };

        for _ in 0..4 {
            let chain = chain.clone();
            scope.spawn(move || {
                for _ in 0..50 {
                    let blocks = chain.get_all_blocks();
                    for (i, block) in blocks.iter().enumerate() {
                        assert_eq!(block.block_number, i as u64);
                        if i > 0 {
                            assert_eq!(block.previous_hash, blocks[i - 1].hash);
                        }
                    }
                }
            });
        }

        writer.join().unwrap();
    });

    let hits = t
        .ledger
        .search()
        .search(&SearchCriteria::new().with_keywords(["ticket"]), SearchLevel::FastOnly, None)
        .unwrap();
    assert_eq!(hits.result_count(), 30);
    assert!(t.ledger.audit().is_fully_compliant);
}
