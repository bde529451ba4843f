//! Memory assistant: save notes, summarize, and answer from memories.

use crate::completion::{clean_completion, parse_estimated_calories};
use crate::error::AssistantError;
use crate::prompt::{answer_messages, meal_analysis_messages, summarize_messages};
use crate::service::{ChatMessage, Embedder, Generator};
use chrono::{FixedOffset, Offset, Utc};
use log::{debug, info, warn};
use std::sync::Arc;
use trackmybrain_config::TrackMyBrainConfig;
use trackmybrain_memory::{
    ContextOptions, ContextSource, IdGenerator, MemoryKind, MemoryRecord, MemoryStore,
    build_context,
};

/// Runtime knobs for [`MemoryAssistant`].
#[derive(Debug, Clone)]
pub struct AssistantOptions {
    /// Persona name used in the grounding prompt.
    pub name: String,
    /// Window used by `recent` and `last_of_kind`.
    pub recent_limit: usize,
    /// Strip `<think>` blocks from completions.
    pub strip_think_tags: bool,
    pub context: ContextOptions,
}

impl Default for AssistantOptions {
    fn default() -> Self {
        Self {
            name: "TrackMyBrain".to_string(),
            recent_limit: 30,
            strip_think_tags: true,
            context: ContextOptions::default(),
        }
    }
}

impl AssistantOptions {
    /// Derive options from a validated config.
    pub fn from_config(config: &TrackMyBrainConfig) -> Self {
        let utc_offset = config
            .retrieval
            .utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| Utc.fix());
        Self {
            name: config.assistant.name.clone(),
            recent_limit: config.assistant.recent_limit,
            strip_think_tags: config.assistant.strip_think_tags,
            context: ContextOptions {
                k: config.retrieval.top_k,
                max_chars: config.retrieval.max_context_chars,
                utc_offset,
            },
        }
    }
}

/// A note to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewNote {
    pub kind: MemoryKind,
    pub raw_text: String,
    pub summary: String,
    pub media_uri: Option<String>,
}

impl NewNote {
    pub fn text(raw_text: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            kind: MemoryKind::Text,
            raw_text: raw_text.into(),
            summary: summary.into(),
            media_uri: None,
        }
    }

    pub fn with_kind(mut self, kind: MemoryKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_media_uri(mut self, media_uri: impl Into<String>) -> Self {
        self.media_uri = Some(media_uri.into());
        self
    }
}

/// Result of [`MemoryAssistant::ask`].
#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    pub text: String,
    /// The question was answered without retrieved memories.
    pub used_fallback: bool,
    /// Memories the answer was grounded on, most similar first.
    pub sources: Vec<ContextSource>,
}

/// Result of [`MemoryAssistant::analyze_meal`].
#[derive(Debug, Clone, PartialEq)]
pub struct MealAnalysis {
    /// The stored image memory; its summary is the generator's analysis.
    pub record: MemoryRecord,
    /// Parsed `Estimated calories:` value, if the analysis had a usable one.
    pub calories: Option<f64>,
}

const MEAL_PHOTO_RAW_TEXT: &str = "Food photo note";

/// Ties a memory store to an embedder and a generator.
pub struct MemoryAssistant {
    store: Arc<dyn MemoryStore>,
    embedder: Arc<dyn Embedder>,
    generator: Arc<dyn Generator>,
    ids: IdGenerator,
    options: AssistantOptions,
}

impl MemoryAssistant {
    pub fn new(
        store: Arc<dyn MemoryStore>,
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn Generator>,
        options: AssistantOptions,
    ) -> Self {
        Self {
            store,
            embedder,
            generator,
            ids: IdGenerator::new(),
            options,
        }
    }

    pub fn options(&self) -> &AssistantOptions {
        &self.options
    }

    pub fn store(&self) -> &Arc<dyn MemoryStore> {
        &self.store
    }

    /// Embed and persist a note, returning the stored record.
    ///
    /// Embedding failures are not fatal: the note is stored without a vector
    /// and is simply never ranked.
    pub async fn save_note(&self, note: NewNote) -> Result<MemoryRecord, AssistantError> {
        let raw_text = note.raw_text.trim().to_string();
        let summary = note.summary.trim().to_string();
        if raw_text.is_empty() && summary.is_empty() {
            return Err(AssistantError::EmptyNote);
        }

        let embed_source = if raw_text.is_empty() { &summary } else { &raw_text };
        let embedding = self.embed_optional(embed_source).await;

        let (id, created_at) = self.ids.next();
        let mut record = MemoryRecord::new(id, note.kind, raw_text, summary, created_at);
        if let Some(embedding) = embedding {
            record = record.with_embedding(embedding);
        }
        if let Some(media_uri) = note.media_uri {
            record = record.with_media_uri(media_uri);
        }

        self.store.insert_memory(record.clone()).await?;
        info!(
            "note saved (id={}, kind={}, embedded={})",
            record.id,
            record.kind,
            record.embedding.is_some()
        );
        Ok(record)
    }

    /// Ask the generator for a summary of `text`.
    pub async fn summarize(&self, text: &str) -> Result<String, AssistantError> {
        let completion = self.generator.complete(&summarize_messages(text)).await?;
        Ok(self.finish(completion))
    }

    /// Answer a question from the most similar memories.
    pub async fn ask(&self, question: &str) -> Result<Answer, AssistantError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AssistantError::EmptyQuestion);
        }

        let query_embedding = self.embed_optional(question).await.unwrap_or_default();
        let records = self.store.get_all().await;
        let context = build_context(question, &query_embedding, &records, &self.options.context);
        debug!(
            "retrieval context built (records={}, sources={}, fallback={})",
            records.len(),
            context.sources.len(),
            context.used_fallback
        );

        let messages: Vec<ChatMessage> = answer_messages(&self.options.name, question, &context);
        let completion = self.generator.complete(&messages).await?;
        Ok(Answer {
            text: self.finish(completion),
            used_fallback: context.used_fallback,
            sources: context.sources,
        })
    }

    /// Estimate a meal photo's nutrition and store the estimate as an image memory.
    ///
    /// The record is stored without an embedding. Later questions about the
    /// day's calories see it through the recent window, not similarity.
    pub async fn analyze_meal(&self, image_uri: &str) -> Result<MealAnalysis, AssistantError> {
        let image_uri = image_uri.trim();
        if image_uri.is_empty() {
            return Err(AssistantError::EmptyImageUri);
        }

        let completion = self
            .generator
            .complete(&meal_analysis_messages(image_uri))
            .await?;
        let analysis = self.finish(completion);
        let calories = parse_estimated_calories(&analysis);
        if calories.is_none() {
            warn!("meal analysis has no usable calorie estimate (uri={image_uri})");
        }

        let (id, created_at) = self.ids.next();
        let record = MemoryRecord::new(
            id,
            MemoryKind::Image,
            MEAL_PHOTO_RAW_TEXT,
            analysis,
            created_at,
        )
        .with_media_uri(image_uri);
        self.store.insert_memory(record.clone()).await?;
        info!("meal photo saved (id={}, calories={calories:?})", record.id);
        Ok(MealAnalysis { record, calories })
    }

    /// Newest records, bounded by the configured window.
    pub async fn recent(&self) -> Vec<MemoryRecord> {
        self.store.get_recent(self.options.recent_limit).await
    }

    /// Newest record of `kind` within the recent window.
    pub async fn last_of_kind(&self, kind: MemoryKind) -> Option<MemoryRecord> {
        self.recent()
            .await
            .into_iter()
            .find(|record| record.kind == kind)
    }

    async fn embed_optional(&self, text: &str) -> Option<Vec<f32>> {
        match self.embedder.embed(text).await {
            Ok(embedding) if embedding.is_empty() => {
                warn!("embedder returned an empty vector (text_len={})", text.len());
                None
            }
            Ok(embedding) => Some(embedding),
            Err(err) => {
                warn!("embedding failed (error={err})");
                None
            }
        }
    }

    fn finish(&self, completion: String) -> String {
        if self.options.strip_think_tags {
            clean_completion(&completion)
        } else {
            completion
        }
    }
}
