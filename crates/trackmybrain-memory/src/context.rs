//! Retrieval context assembly for memory-grounded answers.

use crate::model::MemoryRecord;
use crate::similarity::rank_top_k;
use chrono::{FixedOffset, Offset, Utc};
use log::debug;

/// Number of memories selected when the caller does not say otherwise.
pub const DEFAULT_TOP_K: usize = 5;

/// Separator placed between rendered memories.
const ENTRY_SEPARATOR: &str = "\n\n";

/// Knobs for [`build_context`].
#[derive(Debug, Clone)]
pub struct ContextOptions {
    /// Maximum number of memories to include.
    pub k: usize,
    /// Optional cap on the rendered text, in characters.
    pub max_chars: Option<usize>,
    /// Offset used to render creation times.
    pub utc_offset: FixedOffset,
}

impl Default for ContextOptions {
    fn default() -> Self {
        Self {
            k: DEFAULT_TOP_K,
            max_chars: None,
            utc_offset: Utc.fix(),
        }
    }
}

/// A memory that made it into the context block.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextSource {
    pub id: String,
    pub score: f32,
}

/// Rendered context plus what went into it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RetrievalContext {
    /// Numbered memory block, most similar first. Empty on fallback.
    pub text: String,
    /// No usable embeddings: answer without retrieval.
    pub used_fallback: bool,
    /// Records rendered into `text`, in order.
    pub sources: Vec<ContextSource>,
}

impl RetrievalContext {
    fn fallback() -> Self {
        Self {
            text: String::new(),
            used_fallback: true,
            sources: Vec::new(),
        }
    }
}

/// Select the `k` records closest to `query_embedding` and render them.
///
/// Records without a non-empty embedding are skipped. When none remain, or
/// the query embedding itself is empty, the result is a fallback with empty
/// text.
pub fn build_context(
    query: &str,
    query_embedding: &[f32],
    records: &[MemoryRecord],
    options: &ContextOptions,
) -> RetrievalContext {
    if query_embedding.is_empty() {
        debug!("retrieval fallback: empty query embedding (query_len={})", query.len());
        return RetrievalContext::fallback();
    }
    let candidates: Vec<(&MemoryRecord, &[f32])> = records
        .iter()
        .filter_map(|record| record.ranking_embedding().map(|embedding| (record, embedding)))
        .collect();
    if candidates.is_empty() {
        debug!(
            "retrieval fallback: no embedded memories (records={}, query_len={})",
            records.len(),
            query.len()
        );
        return RetrievalContext::fallback();
    }

    let candidate_count = candidates.len();
    let ranked = rank_top_k(query_embedding, candidates, options.k);
    let mut text = String::new();
    let mut used_chars = 0usize;
    let mut sources = Vec::with_capacity(ranked.len());
    for (index, hit) in ranked.iter().enumerate() {
        let entry = render_entry(index + 1, hit.item, options.utc_offset);
        let separator = if text.is_empty() { "" } else { ENTRY_SEPARATOR };
        let needed = separator.len() + entry.chars().count();
        if let Some(max_chars) = options.max_chars
            && used_chars + needed > max_chars
        {
            if text.is_empty() && max_chars > 0 {
                text = entry.chars().take(max_chars).collect();
                sources.push(ContextSource {
                    id: hit.item.id.clone(),
                    score: hit.score,
                });
            }
            break;
        }
        text.push_str(separator);
        text.push_str(&entry);
        used_chars += needed;
        sources.push(ContextSource {
            id: hit.item.id.clone(),
            score: hit.score,
        });
    }
    debug!(
        "built retrieval context (candidates={}, selected={}, chars={})",
        candidate_count,
        sources.len(),
        text.chars().count()
    );
    RetrievalContext {
        text,
        used_fallback: false,
        sources,
    }
}

/// `N. [kind] time - summary` followed by the raw text on its own line.
///
/// The raw text line is dropped when empty or identical to the summary; an
/// empty summary falls back to the raw text.
fn render_entry(position: usize, record: &MemoryRecord, offset: FixedOffset) -> String {
    let summary = record.summary.trim();
    let raw_text = record.raw_text.trim();
    let headline = if summary.is_empty() { raw_text } else { summary };
    let mut entry = format!(
        "{position}. [{}] {} - {headline}",
        record.kind,
        record.created_at_display(offset)
    );
    if !raw_text.is_empty() && raw_text != headline {
        entry.push('\n');
        entry.push_str(raw_text);
    }
    entry
}
