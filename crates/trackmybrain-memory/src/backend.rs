//! Key-value backends holding whole-collection snapshots.

use crate::error::StorageError;
use log::{debug, info};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Durable byte storage addressed by key.
///
/// `save` must replace the value atomically: a concurrent `load` observes
/// either the previous bytes or the new ones.
pub trait SnapshotBackend: Send + Sync {
    /// Read the bytes stored under `key`, `None` if nothing was written yet.
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Replace the bytes stored under `key`.
    fn save(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError>;
}

impl<T: SnapshotBackend + ?Sized> SnapshotBackend for Arc<T> {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        (**self).load(key)
    }

    fn save(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError> {
        (**self).save(key, bytes)
    }
}

/// Reject keys that would escape the backend root or collide on disk.
pub fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && key != "."
        && key != ".."
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if valid {
        Ok(())
    } else {
        Err(StorageError::Backend(format!("invalid snapshot key: {key:?}")))
    }
}

/// File-backed snapshots, one `<key>.json` file per key.
#[derive(Debug, Clone)]
pub struct FileSnapshotBackend {
    /// Root directory for snapshot files.
    root: PathBuf,
}

impl FileSnapshotBackend {
    /// Create a backend rooted at `root`, creating the directory if needed.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, StorageError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        info!("initialized file snapshot backend (root={})", root.display());
        Ok(Self { root })
    }

    /// Directory holding the snapshot files.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path to the snapshot file for a key.
    pub fn snapshot_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }

    /// Path to the temporary file a write is staged in.
    fn temp_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json.tmp"))
    }
}

impl SnapshotBackend for FileSnapshotBackend {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        validate_key(key)?;
        match fs::read(self.snapshot_path(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Stage the bytes in a temp file, sync, then rename over the target.
    fn save(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError> {
        validate_key(key)?;
        let path = self.snapshot_path(key);
        let temp_path = self.temp_path(key);
        {
            let mut file = OpenOptions::new()
                .create(true)
                .truncate(true)
                .write(true)
                .open(&temp_path)?;
            file.write_all(bytes)?;
            file.sync_all()?;
        }
        if let Err(err) = fs::rename(&temp_path, &path) {
            let _ = fs::remove_file(&temp_path);
            return Err(err.into());
        }
        debug!(
            "snapshot written (path={}, bytes={})",
            path.display(),
            bytes.len()
        );
        Ok(())
    }
}

/// Process-local snapshots, useful for tests and throwaway stores.
#[derive(Debug, Default)]
pub struct InMemorySnapshotBackend {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemorySnapshotBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a key with raw bytes, bypassing the codec.
    pub fn with_entry(self, key: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.entries.write().insert(key.into(), bytes.into());
        self
    }

    /// Keys currently holding a value, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.read().keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl SnapshotBackend for InMemorySnapshotBackend {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        validate_key(key)?;
        Ok(self.entries.read().get(key).cloned())
    }

    fn save(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError> {
        validate_key(key)?;
        self.entries.write().insert(key.to_string(), bytes.to_vec());
        Ok(())
    }
}
