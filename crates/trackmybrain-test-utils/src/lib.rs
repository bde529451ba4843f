//! Test helpers shared across TrackMyBrain crates.

pub mod llm;
pub mod memory;

pub use llm::{FailingEmbedder, FailingGenerator, FixedEmbedder, MappedEmbedder, RecordingGenerator};
pub use memory::{FailingBackend, StubMemoryStore};
