use crate::atomic::atomic_write;
use crate::errors::KVStoreError;
use crate::ports::{BatchOperation, KeyValueStore, ScanResult};
use super::{scan, Map};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// File header. Anything else at offset 0 is not a ledger log.
const MAGIC: &[u8; 8] = b"LGKVLOG1";

/// Record header: body length (u32 LE) + first 8 bytes of SHA-256(body).
const RECORD_HEADER: usize = 12;

/// Rewrite the log once it exceeds this size and holds more garbage than live data.
pub const DEFAULT_COMPACTION_BYTES: u64 = 64 * 1024 * 1024;

#[derive(Deserialize)]
enum LogOp {
    Put(Vec<u8>, Vec<u8>),
    Delete(Vec<u8>),
}

/// Borrowed twin of [`LogOp`]; same variant order, same bincode layout.
#[derive(Serialize)]
enum LogOpRef<'a> {
    Put(&'a [u8], &'a [u8]),
    Delete(&'a [u8]),
}

/// File-backed key-value store.
///
/// The file is an append-only log of batches:
///
/// ```text
/// MAGIC | len u32 | sha256[..8] | bincode ops | len | sum | ops | ...
/// ```
///
/// A batch is one record written and synced at the end of the log, so a
/// write costs the size of its own operations. The map is updated only
/// after the record is durable. A torn record at the tail (crash mid-write)
/// is cut off on open. When the log grows past the compaction threshold
/// and is more than half garbage, it is replaced by a single snapshot
/// record via write-to-temp and rename.
pub struct FileBackedKVStore {
    data: Map,
    path: PathBuf,
    /// Append handle. `None` after a compaction whose reopen failed.
    file: Option<File>,
    log_len: u64,
    live_bytes: u64,
    compaction_bytes: u64,
}

impl FileBackedKVStore {
    /// Open the store at `path`, creating an empty log if the file is absent.
    ///
    /// # Errors
    ///
    /// Returns `CorruptionError` if the file is not a ledger log or a
    /// checksummed record fails to decode.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, KVStoreError> {
        let path = path.as_ref().to_path_buf();

        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("[storage] 📁 No existing storage file at {}", path.display());
                atomic_write(&path, MAGIC).map_err(|e| io_error(&path, e))?;
                MAGIC.to_vec()
            }
            Err(e) => return Err(io_error(&path, e)),
        };

        let (data, valid_len) = replay(&path, &bytes)?;
        let file = open_append(&path).map_err(|e| io_error(&path, e))?;
        if valid_len < bytes.len() as u64 || bytes.len() < MAGIC.len() {
            tracing::warn!(
                "[storage] Cutting torn tail of {}: {} of {} bytes kept",
                path.display(),
                valid_len,
                bytes.len()
            );
            file.set_len(valid_len).map_err(|e| io_error(&path, e))?;
            if bytes.len() < MAGIC.len() {
                (&file).write_all(MAGIC).map_err(|e| io_error(&path, e))?;
            }
            file.sync_all().map_err(|e| io_error(&path, e))?;
        }

        let live_bytes = data.iter().map(|(k, v)| entry_size(k, v)).sum();
        tracing::info!(
            "[storage] 💾 Loaded {} keys from {} ({} bytes)",
            data.len(),
            path.display(),
            valid_len
        );

        let mut store = Self {
            data,
            path,
            file: Some(file),
            log_len: valid_len.max(MAGIC.len() as u64),
            live_bytes,
            compaction_bytes: DEFAULT_COMPACTION_BYTES,
        };
        store.maybe_compact();
        Ok(store)
    }

    /// Set the log size above which compaction is considered.
    pub fn with_compaction_threshold(mut self, bytes: u64) -> Self {
        self.compaction_bytes = bytes;
        self.maybe_compact();
        self
    }

    /// Path of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current size of the log file in bytes.
    pub fn log_len(&self) -> u64 {
        self.log_len
    }

    /// Replace the log with a single snapshot of the live map.
    pub fn compact(&mut self) -> Result<(), KVStoreError> {
        let ops: Vec<LogOpRef<'_>> = self
            .data
            .iter()
            .map(|(k, v)| LogOpRef::Put(k, v))
            .collect();
        let mut bytes = MAGIC.to_vec();
        bytes.extend(encode_record(&ops)?);
        atomic_write(&self.path, &bytes).map_err(|e| io_error(&self.path, e))?;

        // The old handle points at the replaced file.
        self.file = None;
        self.file = Some(open_append(&self.path).map_err(|e| io_error(&self.path, e))?);
        tracing::debug!(
            "[storage] Compacted {}: {} -> {} bytes",
            self.path.display(),
            self.log_len,
            bytes.len()
        );
        self.log_len = bytes.len() as u64;
        Ok(())
    }

    fn maybe_compact(&mut self) {
        let garbage_heavy = self.log_len > self.live_bytes.saturating_mul(2);
        if self.log_len > self.compaction_bytes && garbage_heavy {
            if let Err(e) = self.compact() {
                tracing::warn!("[storage] Compaction of {} failed: {}", self.path.display(), e);
            }
        }
    }

    fn commit(&mut self, operations: Vec<BatchOperation>) -> Result<(), KVStoreError> {
        let record = {
            let ops: Vec<LogOpRef<'_>> = operations
                .iter()
                .map(|op| match op {
                    BatchOperation::Put { key, value } => LogOpRef::Put(key, value),
                    BatchOperation::Delete { key } => LogOpRef::Delete(key),
                })
                .collect();
            encode_record(&ops)?
        };

        if self.file.is_none() {
            self.file = Some(open_append(&self.path).map_err(|e| io_error(&self.path, e))?);
        }
        let Some(file) = self.file.as_mut() else {
            return Err(io_error(&self.path, std::io::ErrorKind::NotFound.into()));
        };

        let written = file
            .seek(SeekFrom::Start(self.log_len))
            .and_then(|_| file.write_all(&record))
            .and_then(|()| file.sync_data());
        if let Err(e) = written {
            if let Err(cut) = file.set_len(self.log_len) {
                tracing::warn!(
                    "[storage] Could not cut failed record from {}: {}",
                    self.path.display(),
                    cut
                );
            }
            return Err(io_error(&self.path, e));
        }

        self.log_len += record.len() as u64;
        for op in operations {
            match op {
                BatchOperation::Put { key, value } => {
                    self.live_bytes += entry_size(&key, &value);
                    if let Some(old) = self.data.insert(key.clone(), value) {
                        self.live_bytes -= entry_size(&key, &old);
                    }
                }
                BatchOperation::Delete { key } => {
                    if let Some(old) = self.data.remove(&key) {
                        self.live_bytes -= entry_size(&key, &old);
                    }
                }
            }
        }
        self.maybe_compact();
        Ok(())
    }
}

impl KeyValueStore for FileBackedKVStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        Ok(self.data.get(key).cloned())
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError> {
        self.commit(vec![BatchOperation::put(key, value)])
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), KVStoreError> {
        self.commit(vec![BatchOperation::delete(key)])
    }

    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), KVStoreError> {
        self.commit(operations)
    }

    fn exists(&self, key: &[u8]) -> Result<bool, KVStoreError> {
        Ok(self.data.contains_key(key))
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<ScanResult, KVStoreError> {
        Ok(scan(&self.data, prefix))
    }
}

/// Rebuild the map from `bytes`. Returns the map and the length of the
/// valid prefix; anything after it is a torn tail.
fn replay(path: &Path, bytes: &[u8]) -> Result<(Map, u64), KVStoreError> {
    let mut data = Map::new();
    if bytes.len() < MAGIC.len() {
        // Crash while the header itself was being written.
        if MAGIC.starts_with(bytes) {
            return Ok((data, 0));
        }
        return Err(corruption(path, "not a ledger storage file"));
    }
    if &bytes[..MAGIC.len()] != MAGIC {
        return Err(corruption(path, "not a ledger storage file"));
    }

    let mut offset = MAGIC.len();
    while offset < bytes.len() {
        let Some(body) = read_record(&bytes[offset..]) else {
            break;
        };
        let ops: Vec<LogOp> = bincode::deserialize(body)
            .map_err(|e| corruption(path, &format!("record at byte {}: {}", offset, e)))?;
        for op in ops {
            match op {
                LogOp::Put(key, value) => {
                    data.insert(key, value);
                }
                LogOp::Delete(key) => {
                    data.remove(&key);
                }
            }
        }
        offset += RECORD_HEADER + body.len();
    }
    Ok((data, offset as u64))
}

/// Body of the record at the start of `bytes`, or `None` if it is torn.
fn read_record(bytes: &[u8]) -> Option<&[u8]> {
    let header = bytes.get(..RECORD_HEADER)?;
    let len = u32::from_le_bytes(header[..4].try_into().ok()?) as usize;
    let body = bytes.get(RECORD_HEADER..RECORD_HEADER.checked_add(len)?)?;
    (checksum(body) == header[4..]).then_some(body)
}

fn encode_record(ops: &[LogOpRef<'_>]) -> Result<Vec<u8>, KVStoreError> {
    let body = bincode::serialize(ops).map_err(|e| KVStoreError::IOError {
        message: e.to_string(),
    })?;
    let len = u32::try_from(body.len()).map_err(|_| KVStoreError::IOError {
        message: format!("batch of {} bytes exceeds record limit", body.len()),
    })?;

    let mut record = Vec::with_capacity(RECORD_HEADER + body.len());
    record.extend_from_slice(&len.to_le_bytes());
    record.extend_from_slice(&checksum(&body));
    record.extend_from_slice(&body);
    Ok(record)
}

fn checksum(body: &[u8]) -> [u8; 8] {
    let digest = Sha256::digest(body);
    let mut out = [0u8; 8];
    out.copy_from_slice(&digest[..8]);
    out
}

fn entry_size(key: &[u8], value: &[u8]) -> u64 {
    (key.len() + value.len()) as u64
}

fn open_append(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().read(true).write(true).open(path)
}

fn io_error(path: &Path, e: std::io::Error) -> KVStoreError {
    KVStoreError::IOError {
        message: format!("{}: {}", path.display(), e),
    }
}

fn corruption(path: &Path, reason: &str) -> KVStoreError {
    KVStoreError::CorruptionError {
        message: format!("{}: {}", path.display(), reason),
    }
}
