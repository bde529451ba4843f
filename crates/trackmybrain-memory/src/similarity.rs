//! Exact cosine-similarity scoring and top-k ranking.
//!
//! Ranking is a linear scan over every candidate. Personal corpora are small
//! enough that no index is kept.

use std::cmp::Ordering;

/// A candidate paired with its similarity to the query.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranked<T> {
    pub item: T,
    pub score: f32,
}

/// Cosine similarity of two vectors, in `[-1.0, 1.0]`.
///
/// Returns `0.0` when either vector is empty, the lengths differ, either
/// magnitude is zero, or the inputs contain NaN.
pub fn cosine(a: &[f32], b: &[f32]) -> f32 {
    if a.is_empty() || b.is_empty() || a.len() != b.len() {
        return 0.0;
    }
    // f64 accumulation: squares of large f32 components overflow f32.
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    let score = dot / (norm_a.sqrt() * norm_b.sqrt());
    if score.is_finite() {
        score.clamp(-1.0, 1.0) as f32
    } else {
        0.0
    }
}

/// Score every candidate against `query` and keep the best `k`.
///
/// Sorting is stable, so equal scores keep their input order.
pub fn rank_top_k<'v, T>(
    query: &[f32],
    candidates: impl IntoIterator<Item = (T, &'v [f32])>,
    k: usize,
) -> Vec<Ranked<T>> {
    if k == 0 {
        return Vec::new();
    }
    let mut scored: Vec<Ranked<T>> = candidates
        .into_iter()
        .map(|(item, vector)| Ranked {
            item,
            score: cosine(query, vector),
        })
        .collect();
    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    scored.truncate(k);
    scored
}
