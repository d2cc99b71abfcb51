//! # Key Registry Service
//!
//! [`KeyRegistry`] backed by any [`KeyValueStore`]. Owner and public-key
//! entries are written in one atomic batch so the two indexes never
//! disagree.

use crate::error::RegistryError;
use crate::ports::inbound::KeyRegistry;
use chrono::Utc;
use parking_lot::RwLock;
use shared_crypto::Ed25519PublicKey;
use shared_storage::{BatchOperation, InMemoryKVStore, KeyValueStore};
use shared_types::{AuthorizedKey, StorageError};

const OWNER_PREFIX: &str = "k:owner:";
const PUBKEY_PREFIX: &str = "k:pub:";

fn owner_key(owner: &str) -> Vec<u8> {
    format!("{}{}", OWNER_PREFIX, owner).into_bytes()
}

fn pubkey_key(public_key: &str) -> Vec<u8> {
    format!("{}{}", PUBKEY_PREFIX, public_key).into_bytes()
}

/// Key registry persisted through a key-value store.
pub struct KvKeyRegistry {
    store: RwLock<Box<dyn KeyValueStore>>,
}

impl KvKeyRegistry {
    /// Create a registry over `store`.
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self {
            store: RwLock::new(store),
        }
    }

    /// Create a registry with in-memory storage.
    pub fn new_in_memory() -> Self {
        Self::new(Box::new(InMemoryKVStore::new()))
    }

    fn decode(bytes: &[u8]) -> Result<AuthorizedKey, RegistryError> {
        bincode::deserialize(bytes)
            .map_err(|e| RegistryError::Storage(StorageError::Corrupted(e.to_string())))
    }

    fn encode(key: &AuthorizedKey) -> Result<Vec<u8>, RegistryError> {
        bincode::serialize(key)
            .map_err(|e| RegistryError::Storage(StorageError::Corrupted(e.to_string())))
    }

    fn load_owner(store: &dyn KeyValueStore, owner: &str) -> Result<Option<AuthorizedKey>, RegistryError> {
        store
            .get(&owner_key(owner))?
            .map(|bytes| Self::decode(&bytes))
            .transpose()
    }
}

impl KeyRegistry for KvKeyRegistry {
    fn try_add_key(&self, public_key: &str, owner_name: &str) -> Result<AuthorizedKey, RegistryError> {
        let owner_name = owner_name.trim();
        if owner_name.is_empty() {
            return Err(RegistryError::EmptyOwner);
        }
        let public_key = Ed25519PublicKey::from_hex(public_key)
            .map_err(|_| RegistryError::InvalidPublicKey {
                owner: owner_name.to_string(),
            })?
            .to_hex();

        let mut store = self.store.write();
        if store.exists(&pubkey_key(&public_key))? {
            return Err(RegistryError::DuplicatePublicKey(public_key));
        }
        if store.exists(&owner_key(owner_name))? {
            return Err(RegistryError::DuplicateOwner(owner_name.to_string()));
        }

        let record = AuthorizedKey::new(public_key.clone(), owner_name);
        store.atomic_batch_write(vec![
            BatchOperation::put(owner_key(owner_name), Self::encode(&record)?),
            BatchOperation::put(pubkey_key(&public_key), owner_name.as_bytes()),
        ])?;

        tracing::info!("[lg-02] ✅ Authorized key for '{}'", owner_name);
        Ok(record)
    }

    fn find_by_owner(&self, owner_name: &str) -> Result<Option<AuthorizedKey>, RegistryError> {
        let store = self.store.read();
        Self::load_owner(&**store, owner_name.trim())
    }

    fn find_by_public_key(&self, public_key: &str) -> Result<Option<AuthorizedKey>, RegistryError> {
        let store = self.store.read();
        let Some(owner) = store.get(&pubkey_key(&public_key.trim().to_ascii_lowercase()))? else {
            return Ok(None);
        };
        let owner = String::from_utf8(owner)
            .map_err(|e| RegistryError::Storage(StorageError::Corrupted(e.to_string())))?;
        Self::load_owner(&**store, &owner)
    }

    fn list_all(&self) -> Result<Vec<AuthorizedKey>, RegistryError> {
        let store = self.store.read();
        store
            .prefix_scan(OWNER_PREFIX.as_bytes())?
            .iter()
            .map(|(_, value)| Self::decode(value))
            .collect()
    }

    fn try_revoke(&self, owner_name: &str) -> Result<AuthorizedKey, RegistryError> {
        let owner_name = owner_name.trim();
        let mut store = self.store.write();

        let mut record = Self::load_owner(&**store, owner_name)?
            .ok_or_else(|| RegistryError::UnknownOwner(owner_name.to_string()))?;
        if !record.active {
            return Err(RegistryError::AlreadyRevoked(owner_name.to_string()));
        }

        record.active = false;
        record.revoked_at = Some(Utc::now());
        store.put(&owner_key(owner_name), &Self::encode(&record)?)?;

        tracing::warn!("[lg-02] 🚫 Revoked key for '{}'", owner_name);
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_crypto::Ed25519KeyPair;
    use shared_storage::testing::FaultyKVStore;
    use shared_storage::FileBackedKVStore;
    use shared_types::{AuthorizationError, LedgerError};
    use tempfile::TempDir;

    fn new_key() -> String {
        Ed25519KeyPair::generate().public_key().to_hex()
    }

    #[test]
    fn test_add_and_find() {
        let registry = KvKeyRegistry::new_in_memory();
        let pk = new_key();

        assert!(registry.add_key(&pk, "alice"));

        let by_owner = registry.find_by_owner("alice").unwrap().unwrap();
        assert_eq!(by_owner.public_key, pk);
        assert!(by_owner.active);

        let by_key = registry.find_by_public_key(&pk).unwrap().unwrap();
        assert_eq!(by_key.owner_name, "alice");
    }

    #[test]
    fn test_duplicates_rejected() {
        let registry = KvKeyRegistry::new_in_memory();
        let pk = new_key();
        assert!(registry.add_key(&pk, "alice"));

        assert!(matches!(
            registry.try_add_key(&pk, "bob"),
            Err(RegistryError::DuplicatePublicKey(_))
        ));
        assert!(matches!(
            registry.try_add_key(&new_key(), "alice"),
            Err(RegistryError::DuplicateOwner(_))
        ));
        assert_eq!(registry.list_all().unwrap().len(), 1);
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        let registry = KvKeyRegistry::new_in_memory();
        assert!(!registry.add_key("zz-not-hex", "alice"));
        assert!(matches!(
            registry.try_add_key(&new_key(), "   "),
            Err(RegistryError::EmptyOwner)
        ));
    }

    #[test]
    fn test_revoke_keeps_record() {
        let registry = KvKeyRegistry::new_in_memory();
        let pk = new_key();
        registry.add_key(&pk, "alice");

        assert!(registry.revoke("alice"));
        assert!(!registry.revoke("alice"));
        assert!(!registry.revoke("nobody"));

        let record = registry.find_by_owner("alice").unwrap().unwrap();
        assert!(!record.active);
        assert!(record.revoked_at.is_some());
        assert!(!registry.is_active(&pk));
        assert!(registry.list_active().unwrap().is_empty());
        assert_eq!(registry.list_all().unwrap().len(), 1);
    }

    #[test]
    fn test_authorize_distinguishes_unknown_and_revoked() {
        let registry = KvKeyRegistry::new_in_memory();
        let pk = new_key();
        registry.add_key(&pk, "alice");

        assert!(registry.authorize(&pk).is_ok());

        let stranger = new_key();
        assert_eq!(
            registry.authorize(&stranger),
            Err(LedgerError::Authorization(AuthorizationError::UnknownSigner {
                public_key: stranger.clone()
            }))
        );

        registry.revoke("alice");
        assert!(matches!(
            registry.authorize(&pk),
            Err(LedgerError::Authorization(AuthorizationError::RevokedSigner { ref owner, .. }))
                if owner == "alice"
        ));
    }

    #[test]
    fn test_authorize_reports_storage_failure_as_storage() {
        let (kv, switch) = FaultyKVStore::new();
        let registry = KvKeyRegistry::new(Box::new(kv));
        let pk = new_key();
        registry.add_key(&pk, "alice");

        switch.arm_reads();
        assert!(matches!(
            registry.authorize(&pk),
            Err(LedgerError::Storage(StorageError::Database(_)))
        ));
        assert!(!registry.is_active(&pk));
    }

    #[test]
    fn test_list_is_ordered_by_owner() {
        let registry = KvKeyRegistry::new_in_memory();
        registry.add_key(&new_key(), "carol");
        registry.add_key(&new_key(), "alice");
        registry.add_key(&new_key(), "bob");

        let owners: Vec<_> = registry
            .list_all()
            .unwrap()
            .into_iter()
            .map(|k| k.owner_name)
            .collect();
        assert_eq!(owners, vec!["alice", "bob", "carol"]);
    }

    #[test]
    fn test_persists_across_reopen() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("keys.db");
        let pk = new_key();

        {
            let registry = KvKeyRegistry::new(Box::new(FileBackedKVStore::open(&path).unwrap()));
            registry.add_key(&pk, "alice");
            registry.revoke("alice");
        }

        let registry = KvKeyRegistry::new(Box::new(FileBackedKVStore::open(&path).unwrap()));
        let record = registry.find_by_public_key(&pk).unwrap().unwrap();
        assert_eq!(record.owner_name, "alice");
        assert!(!record.active);
    }
}
