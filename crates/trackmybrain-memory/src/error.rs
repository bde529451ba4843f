//! Error types for memory operations.

/// Reasons a persisted snapshot could not be read back.
///
/// Never surfaced to read callers: the codec logs it and degrades to an
/// empty collection.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The snapshot parsed, but its top level is not a sequence of records.
    #[error("snapshot is not a record collection (found {0})")]
    NotACollection(&'static str),
    /// The snapshot is empty, truncated, or a record has the wrong shape.
    #[error("malformed snapshot: {0}")]
    Malformed(#[from] serde_json::Error),
    /// A stored embedding component does not fit a finite f32.
    #[error("record {id} has a non-finite embedding value at index {index}")]
    NonFiniteEmbedding { id: String, index: usize },
}

/// Errors returned when a durable write does not complete.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization error.
    #[error("encode error: {0}")]
    Encode(#[from] serde_json::Error),
    /// The record carries an embedding component the snapshot cannot hold.
    #[error("record {id} has a non-finite embedding value at index {index}")]
    NonFiniteEmbedding { id: String, index: usize },
    /// A record with the same id is already stored.
    #[error("duplicate memory id: {0}")]
    DuplicateId(String),
    /// The backing store rejected the request.
    #[error("backend error: {0}")]
    Backend(String),
}
