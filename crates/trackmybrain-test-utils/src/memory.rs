use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use trackmybrain_memory::{MemoryRecord, MemoryStore, SnapshotBackend, StorageError};

/// Store that keeps records in insertion order and returns them verbatim.
#[derive(Clone, Default)]
pub struct StubMemoryStore {
    records: Arc<Mutex<Vec<MemoryRecord>>>,
    fail_inserts: bool,
}

impl StubMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with records already in newest-first order.
    pub fn with_records(records: Vec<MemoryRecord>) -> Self {
        Self {
            records: Arc::new(Mutex::new(records)),
            fail_inserts: false,
        }
    }

    /// Every insert fails with a backend error.
    pub fn failing() -> Self {
        Self {
            records: Arc::default(),
            fail_inserts: true,
        }
    }

    pub fn records(&self) -> Vec<MemoryRecord> {
        self.records.lock().clone()
    }
}

#[async_trait]
impl MemoryStore for StubMemoryStore {
    async fn insert_memory(&self, record: MemoryRecord) -> Result<(), StorageError> {
        if self.fail_inserts {
            return Err(StorageError::Backend("stub store rejects writes".to_string()));
        }
        self.records.lock().insert(0, record);
        Ok(())
    }

    async fn get_all(&self) -> Vec<MemoryRecord> {
        self.records.lock().clone()
    }
}

/// Snapshot backend whose loads and saves always fail.
#[derive(Debug, Clone, Default)]
pub struct FailingBackend;

impl SnapshotBackend for FailingBackend {
    fn load(&self, _key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Err(StorageError::Backend("load refused".to_string()))
    }

    fn save(&self, _key: &str, _bytes: &[u8]) -> Result<(), StorageError> {
        Err(StorageError::Backend("save refused".to_string()))
    }
}
