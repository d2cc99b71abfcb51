use super::{apply_batch, scan, Map};
use crate::errors::KVStoreError;
use crate::ports::{BatchOperation, KeyValueStore, ScanResult};

/// In-memory key-value store for unit tests and ephemeral ledgers.
#[derive(Default)]
pub struct InMemoryKVStore {
    data: Map,
}

impl InMemoryKVStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl KeyValueStore for InMemoryKVStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        Ok(self.data.get(key).cloned())
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError> {
        self.data.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), KVStoreError> {
        self.data.remove(key);
        Ok(())
    }

    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), KVStoreError> {
        apply_batch(&mut self.data, operations);
        Ok(())
    }

    fn exists(&self, key: &[u8]) -> Result<bool, KVStoreError> {
        Ok(self.data.contains_key(key))
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<ScanResult, KVStoreError> {
        Ok(scan(&self.data, prefix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_kv_store() {
        let mut store = InMemoryKVStore::new();

        store.put(b"key1", b"value1").unwrap();
        store.put(b"key2", b"value2").unwrap();

        assert_eq!(store.get(b"key1").unwrap(), Some(b"value1".to_vec()));
        assert_eq!(store.get(b"key3").unwrap(), None);

        assert!(store.exists(b"key1").unwrap());
        assert!(!store.exists(b"key3").unwrap());
    }

    #[test]
    fn test_batch_write_mixes_puts_and_deletes() {
        let mut store = InMemoryKVStore::new();
        store.put(b"a", b"1").unwrap();

        store
            .atomic_batch_write(vec![
                BatchOperation::delete(b"a".to_vec()),
                BatchOperation::put(b"b".to_vec(), b"2".to_vec()),
            ])
            .unwrap();

        assert_eq!(store.get(b"a").unwrap(), None);
        assert_eq!(store.get(b"b").unwrap(), Some(b"2".to_vec()));
    }

    #[test]
    fn test_prefix_scan_is_ordered() {
        let mut store = InMemoryKVStore::new();

        store.put(&[b'b', b':', 0, 2], b"two").unwrap();
        store.put(&[b'b', b':', 0, 1], b"one").unwrap();
        store.put(b"m:tail", b"x").unwrap();

        let blocks = store.prefix_scan(b"b:").unwrap();
        let values: Vec<_> = blocks.into_iter().map(|(_, v)| v).collect();
        assert_eq!(values, vec![b"one".to_vec(), b"two".to_vec()]);
    }
}
