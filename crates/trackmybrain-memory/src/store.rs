//! Memory store over a single whole-collection snapshot.
//!
//! Every insert is a read-entire / prepend / write-entire cycle against one
//! backend key. The cycle runs under a FIFO writer lock owned by the store
//! instance, so concurrent inserts queue instead of overwriting each other.
//! Readers take no lock and rely on the backend's atomic replace.

use crate::backend::{FileSnapshotBackend, InMemorySnapshotBackend, SnapshotBackend};
use crate::codec;
use crate::error::StorageError;
use crate::model::MemoryRecord;
use async_trait::async_trait;
use chrono::Utc;
use log::{debug, info, warn};
use std::path::Path;
use tokio::sync::Mutex;

/// Snapshot key used when none is configured.
pub const DEFAULT_SNAPSHOT_KEY: &str = "trackmybrain_memories_v1";

#[async_trait]
/// Storage abstraction used by the assistant.
pub trait MemoryStore: Send + Sync {
    /// Prepend a record and persist the updated collection.
    async fn insert_memory(&self, record: MemoryRecord) -> Result<(), StorageError>;

    /// All records, newest `created_at` first. Unreadable state reads as empty.
    async fn get_all(&self) -> Vec<MemoryRecord>;

    /// The first `limit` records of [`MemoryStore::get_all`].
    async fn get_recent(&self, limit: usize) -> Vec<MemoryRecord> {
        if limit == 0 {
            return Vec::new();
        }
        let mut records = self.get_all().await;
        records.truncate(limit);
        records
    }
}

/// Options for a snapshot-backed store.
#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// Backend key holding the collection.
    pub key: String,
    /// Fail inserts whose id is already stored.
    pub reject_duplicate_ids: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            key: DEFAULT_SNAPSHOT_KEY.to_string(),
            reject_duplicate_ids: true,
        }
    }
}

/// Memory store persisting the whole collection under one backend key.
pub struct SnapshotMemoryStore<B> {
    backend: B,
    options: StoreOptions,
    writer: Mutex<()>,
}

impl SnapshotMemoryStore<FileSnapshotBackend> {
    /// Open a file-backed store rooted at `root`.
    pub fn open(root: impl AsRef<Path>, options: StoreOptions) -> Result<Self, StorageError> {
        let backend = FileSnapshotBackend::new(root)?;
        Self::new(backend, options)
    }
}

impl SnapshotMemoryStore<InMemorySnapshotBackend> {
    /// Store that lives only as long as this value.
    pub fn in_memory() -> Self {
        Self {
            backend: InMemorySnapshotBackend::new(),
            options: StoreOptions::default(),
            writer: Mutex::new(()),
        }
    }
}

impl<B: SnapshotBackend> SnapshotMemoryStore<B> {
    /// Wrap a backend; fails if the configured key is unusable.
    pub fn new(backend: B, options: StoreOptions) -> Result<Self, StorageError> {
        crate::backend::validate_key(&options.key)?;
        info!(
            "opened memory store (key={}, reject_duplicate_ids={})",
            options.key, options.reject_duplicate_ids
        );
        Ok(Self {
            backend,
            options,
            writer: Mutex::new(()),
        })
    }

    /// Backend the snapshot lives in.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Options the store was opened with.
    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    /// Current collection for a write cycle. Must be called under the writer lock.
    ///
    /// A snapshot that no longer decodes is copied to a `.corrupt-<ms>` key
    /// before the caller overwrites it.
    fn load_for_write(&self) -> Result<Vec<MemoryRecord>, StorageError> {
        let Some(bytes) = self.backend.load(&self.options.key)? else {
            return Ok(Vec::new());
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        match codec::try_decode(&bytes) {
            Ok(records) => Ok(records),
            Err(err) => {
                let backup_key = format!(
                    "{}.corrupt-{}",
                    self.options.key,
                    Utc::now().timestamp_millis()
                );
                warn!(
                    "memory snapshot unreadable, preserving before rewrite (key={}, backup={}, error={})",
                    self.options.key, backup_key, err
                );
                self.backend.save(&backup_key, &bytes)?;
                Ok(Vec::new())
            }
        }
    }
}

#[async_trait]
impl<B: SnapshotBackend> MemoryStore for SnapshotMemoryStore<B> {
    async fn insert_memory(&self, record: MemoryRecord) -> Result<(), StorageError> {
        let _guard = self.writer.lock().await;
        let mut records = self.load_for_write()?;
        if self.options.reject_duplicate_ids && records.iter().any(|r| r.id == record.id) {
            return Err(StorageError::DuplicateId(record.id));
        }
        let id = record.id.clone();
        let kind = record.kind;
        records.insert(0, record);
        let bytes = codec::encode(&records)?;
        self.backend.save(&self.options.key, &bytes)?;
        debug!(
            "stored memory record (id={}, kind={}, total={})",
            id,
            kind,
            records.len()
        );
        Ok(())
    }

    async fn get_all(&self) -> Vec<MemoryRecord> {
        let bytes = match self.backend.load(&self.options.key) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(
                    "memory snapshot load failed, reading as empty (key={}, error={})",
                    self.options.key, err
                );
                None
            }
        };
        let mut records = codec::decode(bytes.as_deref());
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        records
    }
}
