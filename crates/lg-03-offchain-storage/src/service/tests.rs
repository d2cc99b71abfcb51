//! # Off-Chain Store Tests

use super::*;
use tempfile::TempDir;

fn make_test_store() -> (FileOffChainStore, TempDir) {
    let temp = TempDir::new().unwrap();
    let store = FileOffChainStore::open(OffChainConfig::new(temp.path().join("offchain"))).unwrap();
    (store, temp)
}

fn payload(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

#[test]
fn test_encrypted_roundtrip() {
    let (store, _temp) = make_test_store();
    let data = payload(600 * 1024);

    let descriptor = store.store(&data, "application/octet-stream", true).unwrap();

    assert!(descriptor.encrypted);
    assert_eq!(descriptor.file_size, data.len() as u64);
    assert_eq!(descriptor.checksum, sha256_hex(&data));
    assert_eq!(store.retrieve(&descriptor).unwrap(), data);
}

#[test]
fn test_ciphertext_on_disk_differs_from_plaintext() {
    let (store, _temp) = make_test_store();
    let data = b"confidential ledger attachment".to_vec();

    let descriptor = store.store(&data, "text/plain", true).unwrap();
    let on_disk = std::fs::read(&descriptor.file_path).unwrap();

    assert_ne!(on_disk, data);
    assert!(!on_disk.windows(12).any(|w| w == b"confidential"));
}

#[test]
fn test_plain_roundtrip_uses_same_checksum_rules() {
    let (store, _temp) = make_test_store();
    let data = payload(1000);

    let descriptor = store.store(&data, "text/plain", false).unwrap();

    assert!(!descriptor.encrypted);
    assert!(descriptor.encryption_iv.is_none());
    assert_eq!(std::fs::read(&descriptor.file_path).unwrap(), data);
    assert_eq!(store.retrieve(&descriptor).unwrap(), data);
}

#[test]
fn test_flipped_ciphertext_byte_is_storage_error() {
    let (store, _temp) = make_test_store();
    let descriptor = store.store(&payload(4096), "bin", true).unwrap();

    let mut bytes = std::fs::read(&descriptor.file_path).unwrap();
    bytes[100] ^= 0x01;
    std::fs::write(&descriptor.file_path, &bytes).unwrap();

    assert!(matches!(
        store.retrieve(&descriptor),
        Err(StorageError::Decryption(_))
    ));
}

#[test]
fn test_flipped_plain_byte_is_checksum_mismatch() {
    let (store, _temp) = make_test_store();
    let descriptor = store.store(&payload(4096), "bin", false).unwrap();

    let mut bytes = std::fs::read(&descriptor.file_path).unwrap();
    bytes[0] ^= 0x01;
    std::fs::write(&descriptor.file_path, &bytes).unwrap();

    assert!(matches!(
        store.retrieve(&descriptor),
        Err(StorageError::ChecksumMismatch { .. })
    ));
}

#[test]
fn test_tampered_descriptor_checksum_detected() {
    let (store, _temp) = make_test_store();
    let mut descriptor = store.store(&payload(64), "bin", true).unwrap();
    descriptor.checksum = "00".repeat(32);

    assert!(matches!(
        store.retrieve(&descriptor),
        Err(StorageError::ChecksumMismatch { .. })
    ));
}

#[test]
fn test_missing_file_is_not_found() {
    let (store, _temp) = make_test_store();
    let descriptor = store.store(&payload(64), "bin", true).unwrap();
    std::fs::remove_file(&descriptor.file_path).unwrap();

    assert!(matches!(store.retrieve(&descriptor), Err(StorageError::NotFound(_))));
}

#[test]
fn test_other_master_key_cannot_decrypt() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("offchain");

    let writer = FileOffChainStore::open(OffChainConfig::new(&dir)).unwrap();
    let descriptor = writer.store(&payload(64), "bin", true).unwrap();

    let reader =
        FileOffChainStore::open(OffChainConfig::new(&dir).with_master_key(SecretKey::generate()))
            .unwrap();
    assert!(matches!(
        reader.retrieve(&descriptor),
        Err(StorageError::Decryption(_))
    ));
}

#[test]
fn test_master_key_persists_across_reopen() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("offchain");

    let descriptor = {
        let store = FileOffChainStore::open(OffChainConfig::new(&dir)).unwrap();
        store.store(&payload(2048), "bin", true).unwrap()
    };

    let reopened = FileOffChainStore::open(OffChainConfig::new(&dir)).unwrap();
    assert_eq!(reopened.retrieve(&descriptor).unwrap(), payload(2048));
}

#[test]
fn test_delete() {
    let (store, _temp) = make_test_store();
    let descriptor = store.store(&payload(64), "bin", true).unwrap();

    assert!(store.exists(&descriptor));
    assert!(store.delete(&descriptor));
    assert!(!store.exists(&descriptor));
    assert!(!store.delete(&descriptor));
}

#[test]
fn test_quarantine_restore_and_purge() {
    let (store, _temp) = make_test_store();
    let kept = store.store(&payload(64), "bin", true).unwrap();
    let dropped = store.store(&payload(128), "bin", true).unwrap();

    let kept_ticket = store.quarantine(&kept).unwrap();
    let dropped_ticket = store.quarantine(&dropped).unwrap();
    assert!(!store.exists(&kept));
    assert!(!store.exists(&dropped));

    store.restore(&kept_ticket).unwrap();
    store.purge(&dropped_ticket).unwrap();

    assert_eq!(store.retrieve(&kept).unwrap(), payload(64));
    assert!(!store.exists(&dropped));
    assert!(!dropped_ticket.quarantined.unwrap().exists());
}

#[test]
fn test_quarantine_of_missing_file_is_noop_ticket() {
    let (store, _temp) = make_test_store();
    let descriptor = store.store(&payload(64), "bin", true).unwrap();
    store.delete(&descriptor);

    let ticket = store.quarantine(&descriptor).unwrap();
    assert!(ticket.quarantined.is_none());
    store.restore(&ticket).unwrap();
    store.purge(&ticket).unwrap();
}

#[test]
fn test_recover_reconciles_with_references() {
    let (store, _temp) = make_test_store();
    let live = store.store(&payload(10), "bin", true).unwrap();
    let orphan = store.store(&payload(20), "bin", true).unwrap();
    let stranded = store.store(&payload(30), "bin", true).unwrap();
    let abandoned = store.store(&payload(40), "bin", true).unwrap();

    // Crash between quarantine and commit: `stranded` is still referenced.
    store.quarantine(&stranded).unwrap();
    store.quarantine(&abandoned).unwrap();

    let referenced: HashSet<Uuid> = [live.id, stranded.id].into_iter().collect();
    let report = store.recover(&referenced).unwrap();

    assert_eq!(
        report,
        RecoveryReport {
            restored: 1,
            purged: 1,
            orphans_removed: 1,
        }
    );
    assert!(store.exists(&live));
    assert!(store.exists(&stranded));
    assert!(!store.exists(&orphan));
    assert!(!store.exists(&abandoned));
    assert!(store.config().master_key_path().exists());
}

#[test]
fn test_should_store_off_chain_uses_threshold() {
    let temp = TempDir::new().unwrap();
    let store =
        FileOffChainStore::open(OffChainConfig::new(temp.path()).with_threshold(100)).unwrap();

    assert!(!store.should_store_off_chain(100));
    assert!(store.should_store_off_chain(101));
}

#[test]
fn test_store_as_keeps_id_and_refuses_live_file() {
    let (store, _temp) = make_test_store();
    let id = Uuid::new_v4();

    let record = store.store_as(id, b"imported body", "text/plain", true).unwrap();
    assert_eq!(record.id, id);
    assert_eq!(record.checksum, sha256_hex(b"imported body"));
    assert_eq!(store.retrieve(&record).unwrap(), b"imported body");

    assert!(matches!(
        store.store_as(id, b"other body", "text/plain", false),
        Err(StorageError::Corrupted(_))
    ));
    assert_eq!(store.retrieve(&record).unwrap(), b"imported body");
}

#[test]
fn test_recover_survives_undeletable_temp_entry() {
    let (store, _temp) = make_test_store();
    let dir = store.config().dir.clone();
    std::fs::write(dir.join(".stale.dat.tmp"), b"x").unwrap();
    std::fs::create_dir(dir.join("stuck.tmp")).unwrap();

    store.recover(&HashSet::new()).unwrap();

    assert!(!dir.join(".stale.dat.tmp").exists());
    assert!(dir.join("stuck.tmp").is_dir());
}
