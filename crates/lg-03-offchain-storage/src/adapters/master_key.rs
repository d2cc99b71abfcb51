//! Master key file.

use shared_crypto::SecretKey;
use shared_storage::atomic_write;
use shared_types::StorageError;
use std::io;
use std::path::Path;

/// Load the master key from `path`, creating a random one on first use.
pub fn load_or_create(path: &Path) -> Result<SecretKey, StorageError> {
    match std::fs::read(path) {
        Ok(bytes) => SecretKey::from_slice(&bytes).map_err(|e| {
            StorageError::Corrupted(format!("master key {}: {}", path.display(), e))
        }),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            let key = SecretKey::generate();
            atomic_write(path, key.as_bytes()).map_err(|e| StorageError::io(path, &e))?;
            restrict_permissions(path).map_err(|e| StorageError::io(path, &e))?;
            tracing::info!("[lg-03] 🔑 Created off-chain master key at {}", path.display());
            Ok(key)
        }
        Err(e) => Err(StorageError::io(path, &e)),
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> io::Result<()> {
    Ok(())
}
