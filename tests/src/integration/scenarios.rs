//! # End-to-End Scenarios
//!
//! ```text
//! 1. genesis-only chain is compliant
//! 2. unauthorized signer is refused, count unchanged
//! 3. 512 KiB + 1 byte payload goes off-chain
//! 4. removeLast(1000) on genesis+3 fails with "only 3 blocks exist"
//! 5. rollbackTo(0) deletes removed blocks' off-chain files
//! 6. weak vault password is rejected before anything is written
//! 7. an exported chain imports into a fresh ledger and stays searchable
//! ```

use super::fixtures::{Signer, TestLedger};
use lg_01_key_vault::KeyVaultApi;
use lg_02_key_registry::KeyRegistry;
use lg_05_chain_store::{AppendOptions, ChainReader, ImportOptions};
use lg_07_search::{SearchCriteria, SearchLevel};
use lg_06_rollback::RollbackMode;
use shared_types::{AuthorizationError, KeyVaultError, LedgerError, RollbackError};

#[test]
fn test_genesis_only_chain_is_compliant() {
    let t = TestLedger::open();
    let chain = t.ledger.chain();

    assert_eq!(chain.get_block_count(), 1);
    let genesis = chain.get_block(0).unwrap();
    assert_eq!(genesis.previous_hash, "0");
    assert!(genesis.is_genesis());

    let report = t.ledger.audit();
    assert!(report.is_structurally_intact);
    assert!(report.is_fully_compliant);
}

#[test]
fn test_unauthorized_signer_refused() {
    let t = TestLedger::open();
    let stranger = Signer::new("mallory", 66);

    let result = t.ledger.chain().append(
        "forged entry",
        &stranger.keypair,
        &stranger.public_key,
        AppendOptions::new(),
    );

    assert!(matches!(
        result,
        Err(LedgerError::Authorization(AuthorizationError::UnknownSigner { .. }))
    ));
    assert_eq!(t.ledger.chain().get_block_count(), 1);
}

#[test]
fn test_revoked_signer_refused() {
    let t = TestLedger::open();
    let alice = t.signer("alice", 1);
    t.append("before revocation", &alice);
    assert!(t.ledger.registry().revoke("alice"));

    let result = t
        .ledger
        .chain()
        .append("after revocation", &alice.keypair, &alice.public_key, AppendOptions::new());

    assert!(matches!(
        result,
        Err(LedgerError::Authorization(AuthorizationError::RevokedSigner { ref owner, .. })) if owner == "alice"
    ));
    assert_eq!(t.ledger.chain().get_block_count(), 2);
}

#[test]
fn test_payload_above_threshold_goes_off_chain() {
    let t = TestLedger::open();
    let alice = t.signer("alice", 1);
    let payload = "x".repeat(512 * 1024 + 1);

    let block = t.append(&payload, &alice);

    let record = block.off_chain_data.as_ref().unwrap();
    assert!(block.data.is_empty());
    assert_eq!(record.file_size, 524_289);
    assert!(record.file_path.exists());
    assert_eq!(t.ledger.chain().read_payload(&block).unwrap(), payload.as_bytes());

    let at_threshold = t.append(&"y".repeat(512 * 1024), &alice);
    assert!(at_threshold.off_chain_data.is_none());
}

#[test]
fn test_remove_more_than_exist_reports_available_blocks() {
    let t = TestLedger::open();
    let alice = t.signer("alice", 1);
    for i in 0..3 {
        t.append(&format!("entry {}", i), &alice);
    }
    assert_eq!(t.ledger.chain().get_block_count(), 4);

    let err = t
        .ledger
        .rollback()
        .remove_last(1000, RollbackMode::Execute)
        .unwrap_err();

    assert_eq!(
        err,
        LedgerError::Rollback(RollbackError::InsufficientBlocks {
            requested: 1000,
            available: 3
        })
    );
    assert!(err.to_string().contains("only 3 blocks exist"));
    assert_eq!(t.ledger.chain().get_block_count(), 4);
}

#[test]
fn test_rollback_to_genesis_deletes_off_chain_files() {
    let t = TestLedger::open();
    let alice = t.signer("alice", 1);
    let files: Vec<_> = (0..3)
        .map(|i| {
            t.append_off_chain(&format!("attachment {}", i), &alice)
                .off_chain_data
                .clone()
                .unwrap()
                .file_path
        })
        .collect();
    assert!(files.iter().all(|p| p.exists()));

    let outcome = t.ledger.rollback().rollback_to(0, RollbackMode::Execute).unwrap();

    assert_eq!(outcome.removed_count, 3);
    assert_eq!(outcome.new_height, 0);
    assert_eq!(t.ledger.chain().get_block_count(), 1);
    assert!(files.iter().all(|p| !p.exists()));
    assert!(t.ledger.audit().is_fully_compliant);
}

#[test]
fn test_weak_vault_password_rejected_before_persistence() {
    let t = TestLedger::open();
    let vault = t.ledger.vault();
    let key = [9u8; 32];

    assert!(!vault.save("alice", &key, "Weak1"));
    assert!(!vault.exists("alice"));
    assert!(matches!(
        vault.try_save("alice", &key, "Weak1"),
        Err(KeyVaultError::PolicyViolation { ref owner, .. }) if owner == "alice"
    ));
    assert!(!t.temp.path().join("vault").join("alice.key").exists());
}

#[test]
fn test_chain_survives_reopen_with_files_intact() {
    let t = TestLedger::open();
    let alice = t.signer("alice", 1);
    t.append("inline entry", &alice);
    let attachment = t.append_off_chain("archived attachment", &alice);
    let tail_hash = t.ledger.chain().status().tail_hash;

    let TestLedger { ledger, temp } = t;
    drop(ledger);

    let reopened = ledger_runtime::Ledger::open(
        super::fixtures::test_config(&temp),
        &shared_types::RunContext::new(),
    )
    .unwrap();
    assert_eq!(reopened.chain().get_block_count(), 3);
    assert_eq!(reopened.chain().status().tail_hash, tail_hash);
    assert_eq!(
        reopened.chain().read_payload(&attachment).unwrap(),
        b"archived attachment"
    );
    assert!(reopened.audit().is_fully_compliant);
}

#[test]
fn test_exported_chain_imports_into_fresh_ledger() {
    let source = TestLedger::open();
    let alice = source.signer("alice", 1);
    source.append("inline entry", &alice);
    source.append_off_chain("turbine inspection notes", &alice);
    let export = source.temp.path().join("chain-export.json");
    assert_eq!(source.ledger.chain().export_chain(&export).unwrap(), 3);

    let target = TestLedger::open();
    target.signer("alice", 1);
    let outcome = target
        .ledger
        .chain()
        .import_chain(&export, &ImportOptions::new())
        .unwrap();

    assert_eq!(outcome.imported_blocks, 3);
    assert_eq!(outcome.off_chain_restored, 1);
    assert_eq!(
        target.ledger.chain().status().tail_hash,
        source.ledger.chain().status().tail_hash
    );
    assert!(target.ledger.audit().is_fully_compliant);

    let found = target
        .ledger
        .search()
        .search(&SearchCriteria::term("turbine"), SearchLevel::ExhaustiveOffchain, None)
        .unwrap();
    assert_eq!(found.results.len(), 1);
    assert_eq!(found.results[0].block_number, 2);
}
