//! # Shared Storage
//!
//! Persistence plumbing used by every ledger subsystem.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | `ports` | `KeyValueStore` driven port and `BatchOperation` |
//! | `adapters` | In-memory, log-structured file and (feature `rocksdb`) RocksDB stores |
//! | `atomic` | Write-to-temp, fsync, rename |
//! | `lock` | fs2 process locks (directory and per-file) |
//! | `testing` | Fault-injecting store for failure tests |
//!
//! ## Atomicity
//!
//! Every write path either fully commits or leaves the previous state
//! intact. The file-backed store appends each batch as one checksummed
//! record and applies it to its map only after the record is synced; a
//! torn record is cut off on the next open.

pub mod adapters;
pub mod atomic;
pub mod errors;
pub mod lock;
pub mod ports;
pub mod testing;

pub use adapters::{FileBackedKVStore, InMemoryKVStore, DEFAULT_COMPACTION_BYTES};
#[cfg(feature = "rocksdb")]
pub use adapters::{RocksDbConfig, RocksDbStore};
pub use atomic::{atomic_write, remove_if_exists};
pub use errors::{KVStoreError, LockError};
pub use lock::{DirectoryLock, FileLock};
pub use ports::{BatchOperation, KeyValueStore, ScanResult};
