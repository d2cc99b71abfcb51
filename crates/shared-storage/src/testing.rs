//! Failure injection for tests.
//!
//! `FaultyKVStore` wraps an in-memory store and fails writes (and
//! optionally reads) on demand. The switch is shared, so a test can arm it after the store has
//! been moved into a service.

use crate::adapters::InMemoryKVStore;
use crate::errors::KVStoreError;
use crate::ports::{BatchOperation, KeyValueStore, ScanResult};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared on/off switch for injected failures.
///
/// `arm` fails writes; `arm_reads` additionally fails reads.
#[derive(Clone, Default)]
pub struct FaultSwitch {
    writes: Arc<AtomicBool>,
    reads: Arc<AtomicBool>,
}

impl FaultSwitch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent writes fail.
    pub fn arm(&self) {
        self.writes.store(true, Ordering::SeqCst);
    }

    /// Make subsequent reads and writes fail.
    pub fn arm_reads(&self) {
        self.arm();
        self.reads.store(true, Ordering::SeqCst);
    }

    /// Let subsequent reads and writes succeed.
    pub fn disarm(&self) {
        self.writes.store(false, Ordering::SeqCst);
        self.reads.store(false, Ordering::SeqCst);
    }

    pub fn is_armed(&self) -> bool {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn reads_armed(&self) -> bool {
        self.reads.load(Ordering::SeqCst)
    }
}

/// Key-value store whose operations fail while its switch is armed.
pub struct FaultyKVStore {
    inner: InMemoryKVStore,
    switch: FaultSwitch,
}

impl FaultyKVStore {
    /// Create a store and the switch controlling it.
    pub fn new() -> (Self, FaultSwitch) {
        let switch = FaultSwitch::new();
        (
            Self {
                inner: InMemoryKVStore::new(),
                switch: switch.clone(),
            },
            switch,
        )
    }

    fn check(&self) -> Result<(), KVStoreError> {
        if self.switch.is_armed() {
            return Err(KVStoreError::IOError {
                message: "injected write failure".into(),
            });
        }
        Ok(())
    }

    fn check_read(&self) -> Result<(), KVStoreError> {
        if self.switch.reads_armed() {
            return Err(KVStoreError::IOError {
                message: "injected read failure".into(),
            });
        }
        Ok(())
    }
}

impl KeyValueStore for FaultyKVStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        self.check_read()?;
        self.inner.get(key)
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError> {
        self.check()?;
        self.inner.put(key, value)
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), KVStoreError> {
        self.check()?;
        self.inner.delete(key)
    }

    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), KVStoreError> {
        self.check()?;
        self.inner.atomic_batch_write(operations)
    }

    fn exists(&self, key: &[u8]) -> Result<bool, KVStoreError> {
        self.check_read()?;
        self.inner.exists(key)
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<ScanResult, KVStoreError> {
        self.check_read()?;
        self.inner.prefix_scan(prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_armed_switch_fails_writes_only() {
        let (mut store, switch) = FaultyKVStore::new();
        store.put(b"a", b"1").unwrap();

        switch.arm();
        assert!(store.put(b"b", b"2").is_err());
        assert!(store
            .atomic_batch_write(vec![BatchOperation::delete(b"a".to_vec())])
            .is_err());
        assert_eq!(store.get(b"a").unwrap(), Some(b"1".to_vec()));

        switch.disarm();
        assert!(store.put(b"b", b"2").is_ok());
    }

    #[test]
    fn test_armed_reads_fail_until_disarmed() {
        let (mut store, switch) = FaultyKVStore::new();
        store.put(b"a", b"1").unwrap();

        switch.arm_reads();
        assert!(store.get(b"a").is_err());
        assert!(store.exists(b"a").is_err());
        assert!(store.prefix_scan(b"").is_err());
        assert!(store.put(b"b", b"2").is_err());

        switch.disarm();
        assert_eq!(store.get(b"a").unwrap(), Some(b"1".to_vec()));
    }
}
