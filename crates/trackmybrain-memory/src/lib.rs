//! Local memory store with similarity-ranked recall for TrackMyBrain.
//!
//! Records are persisted as one snapshot per store, mutated only through a
//! serialized read-modify-write cycle, and ranked against a query embedding
//! by exact cosine similarity.

pub mod backend;
pub mod codec;
pub mod context;
pub mod error;
pub mod id;
pub mod model;
pub mod similarity;
pub mod store;

/// Snapshot backends.
pub use backend::{FileSnapshotBackend, InMemorySnapshotBackend, SnapshotBackend};
/// Retrieval context builder.
pub use context::{ContextOptions, ContextSource, DEFAULT_TOP_K, RetrievalContext, build_context};
/// Memory error types.
pub use error::{DecodeError, StorageError};
/// Record id generation.
pub use id::IdGenerator;
/// Memory record model.
pub use model::{MemoryKind, MemoryRecord};
/// Similarity scoring and ranking.
pub use similarity::{Ranked, cosine, rank_top_k};
/// Memory store interface and snapshot implementation.
pub use store::{DEFAULT_SNAPSHOT_KEY, MemoryStore, SnapshotMemoryStore, StoreOptions};
