use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use trackmybrain_core::{ChatMessage, Embedder, Generator, ServiceError};

/// Embedder that returns the same vector for every input.
#[derive(Debug, Clone)]
pub struct FixedEmbedder {
    embedding: Vec<f32>,
}

impl FixedEmbedder {
    pub fn new(embedding: Vec<f32>) -> Self {
        Self { embedding }
    }
}

#[async_trait]
impl Embedder for FixedEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>, ServiceError> {
        Ok(self.embedding.clone())
    }
}

/// Embedder that looks vectors up by exact text, returning empty otherwise.
#[derive(Debug, Clone, Default)]
pub struct MappedEmbedder {
    vectors: HashMap<String, Vec<f32>>,
    seen: Arc<Mutex<Vec<String>>>,
}

impl MappedEmbedder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, text: impl Into<String>, embedding: Vec<f32>) -> Self {
        self.vectors.insert(text.into(), embedding);
        self
    }

    /// Texts passed to `embed`, in call order.
    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().clone()
    }
}

#[async_trait]
impl Embedder for MappedEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ServiceError> {
        self.seen.lock().push(text.to_string());
        Ok(self.vectors.get(text).cloned().unwrap_or_default())
    }
}

/// Embedder that always fails.
#[derive(Debug, Clone, Default)]
pub struct FailingEmbedder;

#[async_trait]
impl Embedder for FailingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>, ServiceError> {
        Err(ServiceError::Unavailable("model not downloaded".to_string()))
    }
}

/// Generator that returns a fixed completion and records every transcript.
#[derive(Debug, Clone)]
pub struct RecordingGenerator {
    response: String,
    calls: Arc<Mutex<Vec<Vec<ChatMessage>>>>,
}

impl RecordingGenerator {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn calls(&self) -> Vec<Vec<ChatMessage>> {
        self.calls.lock().clone()
    }

    pub fn last_call(&self) -> Option<Vec<ChatMessage>> {
        self.calls.lock().last().cloned()
    }
}

#[async_trait]
impl Generator for RecordingGenerator {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ServiceError> {
        self.calls.lock().push(messages.to_vec());
        Ok(self.response.clone())
    }
}

/// Generator that always fails.
#[derive(Debug, Clone, Default)]
pub struct FailingGenerator;

#[async_trait]
impl Generator for FailingGenerator {
    async fn complete(&self, _messages: &[ChatMessage]) -> Result<String, ServiceError> {
        Err(ServiceError::Request("generation failed".to_string()))
    }
}
