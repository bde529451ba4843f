//! Configuration schema for TrackMyBrain.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root config for a TrackMyBrain installation.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TrackMyBrainConfig {
    #[serde(default, rename = "$schema")]
    pub schema: Option<String>,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub assistant: AssistantConfig,
}

impl TrackMyBrainConfig {
    /// Start building a config programmatically with defaults applied.
    pub fn builder() -> TrackMyBrainConfigBuilder {
        TrackMyBrainConfigBuilder::new()
    }
}

/// Builder for assembling a `TrackMyBrainConfig` in code.
#[derive(Debug, Default, Clone)]
pub struct TrackMyBrainConfigBuilder {
    config: TrackMyBrainConfig,
}

impl TrackMyBrainConfigBuilder {
    /// Create a new builder seeded with default config values.
    pub fn new() -> Self {
        Self {
            config: TrackMyBrainConfig::default(),
        }
    }

    /// Replace the storage configuration.
    pub fn storage(mut self, storage: StorageConfig) -> Self {
        self.config.storage = storage;
        self
    }

    /// Replace the retrieval configuration.
    pub fn retrieval(mut self, retrieval: RetrievalConfig) -> Self {
        self.config.retrieval = retrieval;
        self
    }

    /// Replace the assistant configuration.
    pub fn assistant(mut self, assistant: AssistantConfig) -> Self {
        self.config.assistant = assistant;
        self
    }

    /// Finalize and return the built `TrackMyBrainConfig`.
    pub fn build(self) -> TrackMyBrainConfig {
        self.config
    }
}

/// Where and how the memory snapshot is persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the snapshot; platform data dir when unset.
    #[serde(default)]
    pub path: Option<String>,
    /// Snapshot key inside the directory.
    #[serde(default = "default_storage_key")]
    pub key: String,
    #[serde(default = "default_reject_duplicate_ids")]
    pub reject_duplicate_ids: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: None,
            key: default_storage_key(),
            reject_duplicate_ids: default_reject_duplicate_ids(),
        }
    }
}

impl StorageConfig {
    /// Resolve the snapshot directory, falling back to the platform data dir.
    pub fn resolved_path(&self) -> PathBuf {
        if let Some(path) = self.path.as_ref() {
            return PathBuf::from(path);
        }
        ProjectDirs::from("", "", "trackmybrain")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from(".trackmybrain").join("data"))
    }
}

/// Default snapshot key, shared with snapshots written by the mobile app.
fn default_storage_key() -> String {
    "trackmybrain_memories_v1".to_string()
}

fn default_reject_duplicate_ids() -> bool {
    true
}

/// Retrieval tuning for memory-grounded answers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Cap on the rendered context block, in characters.
    #[serde(default)]
    pub max_context_chars: Option<usize>,
    /// Offset applied when rendering creation times.
    #[serde(default)]
    pub utc_offset_minutes: i32,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            max_context_chars: None,
            utc_offset_minutes: 0,
        }
    }
}

/// Default number of memories placed in the context block.
fn default_top_k() -> usize {
    5
}

/// Assistant persona and behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    #[serde(default = "default_assistant_name")]
    pub name: String,
    /// Number of records shown in the recent timeline.
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,
    /// Remove `<think>` reasoning blocks from completions.
    #[serde(default = "default_strip_think_tags")]
    pub strip_think_tags: bool,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            name: default_assistant_name(),
            recent_limit: default_recent_limit(),
            strip_think_tags: default_strip_think_tags(),
        }
    }
}

fn default_assistant_name() -> String {
    "TrackMyBrain".to_string()
}

fn default_recent_limit() -> usize {
    30
}

fn default_strip_think_tags() -> bool {
    true
}
