//! Error types for the assistant crate.

use thiserror::Error;
use trackmybrain_memory::StorageError;

/// Failures reported by an embedding or generation backend.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The backend is not ready (model not downloaded, engine not loaded).
    #[error("service unavailable: {0}")]
    Unavailable(String),
    /// The backend accepted the request but failed to produce a result.
    #[error("service request failed: {0}")]
    Request(String),
}

/// Errors returned by [`crate::MemoryAssistant`] operations.
#[derive(Debug, Error)]
pub enum AssistantError {
    /// Both the note text and its summary were blank.
    #[error("note has no text and no summary")]
    EmptyNote,
    /// The question was blank after trimming.
    #[error("question is empty")]
    EmptyQuestion,
    /// A meal analysis was requested without an image URI.
    #[error("image uri is empty")]
    EmptyImageUri,
    /// Persisting the note failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    /// The generation backend failed.
    #[error("service error: {0}")]
    Service(#[from] ServiceError),
}
