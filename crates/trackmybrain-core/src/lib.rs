//! Memory assistant for TrackMyBrain.
//!
//! This crate wires a [`trackmybrain_memory::MemoryStore`] to an embedding
//! and a generation backend: it saves notes with embeddings, answers
//! questions grounded in the most similar stored memories, and stores
//! calorie estimates for meal photos.

pub mod assistant;
pub mod completion;
pub mod error;
pub mod prompt;
pub mod service;

pub use assistant::{Answer, AssistantOptions, MealAnalysis, MemoryAssistant, NewNote};
pub use completion::{clean_completion, parse_estimated_calories};
pub use error::{AssistantError, ServiceError};
pub use service::{ChatMessage, ChatRole, Embedder, Generator};
