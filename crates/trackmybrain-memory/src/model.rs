//! Memory record model shared by the store, codec and ranking.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of note a record was captured from.
///
/// Decides how the UI treats `media_uri`; retrieval ignores it beyond
/// rendering the label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryKind {
    Text,
    Image,
    Voice,
    Video,
}

impl MemoryKind {
    /// Lowercase label used in the snapshot and in rendered context.
    pub fn as_str(self) -> &'static str {
        match self {
            MemoryKind::Text => "text",
            MemoryKind::Image => "image",
            MemoryKind::Voice => "voice",
            MemoryKind::Video => "video",
        }
    }
}

impl fmt::Display for MemoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MemoryKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(MemoryKind::Text),
            "image" => Ok(MemoryKind::Image),
            "voice" => Ok(MemoryKind::Voice),
            "video" => Ok(MemoryKind::Video),
            other => Err(format!("unknown memory kind: {other}")),
        }
    }
}

/// Persisted memory record.
///
/// Immutable once handed to the store; callers only ever get clones back.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MemoryRecord {
    /// Caller-supplied identifier, conventionally a millisecond timestamp.
    pub id: String,
    /// Note kind. Snapshots written by older builds call this field `type`.
    #[serde(alias = "type")]
    pub kind: MemoryKind,
    /// Original source text, empty for pure-media notes.
    pub raw_text: String,
    /// Short display text, also the fallback retrieval text.
    pub summary: String,
    /// Creation time in unix milliseconds.
    pub created_at: i64,
    /// Embedding computed at insert time, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
    /// Opaque reference to attached image or audio content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_uri: Option<String>,
}

impl MemoryRecord {
    /// Build a record without embedding or media.
    pub fn new(
        id: impl Into<String>,
        kind: MemoryKind,
        raw_text: impl Into<String>,
        summary: impl Into<String>,
        created_at: i64,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            raw_text: raw_text.into(),
            summary: summary.into(),
            created_at,
            embedding: None,
            media_uri: None,
        }
    }

    /// Attach an embedding vector.
    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }

    /// Attach a media reference.
    pub fn with_media_uri(mut self, media_uri: impl Into<String>) -> Self {
        self.media_uri = Some(media_uri.into());
        self
    }

    /// Embedding usable for ranking: present and non-empty.
    pub fn ranking_embedding(&self) -> Option<&[f32]> {
        self.embedding
            .as_deref()
            .filter(|embedding| !embedding.is_empty())
    }

    /// Creation time rendered for humans at the given offset.
    pub fn created_at_display(&self, offset: FixedOffset) -> String {
        match DateTime::<Utc>::from_timestamp_millis(self.created_at) {
            Some(time) => time
                .with_timezone(&offset)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
            None => format!("@{}ms", self.created_at),
        }
    }
}
