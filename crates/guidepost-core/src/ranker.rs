//! Cosine-similarity ranking over stored chunk vectors

use std::cmp::Ordering;

use crate::error::{SearchError, SearchResult};
use crate::types::{Chunk, SearchHit};

/// Result count used when the caller does not supply a positive limit
pub const DEFAULT_LIMIT: usize = 5;

/// Cosine similarity between two equal-length vectors.
///
/// Accumulates in f64 for numeric stability. A zero-norm input yields a
/// non-finite value; callers decide how to treat it.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> SearchResult<f32> {
    if a.len() != b.len() {
        return Err(SearchError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b.iter()) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    Ok((dot / (norm_a.sqrt() * norm_b.sqrt())) as f32)
}

/// Score every chunk against `query` and return the top `limit` hits,
/// ordered by descending relevance.
///
/// A dimension mismatch between any chunk and the query fails the whole
/// call; no partial results are returned. Chunks whose score is not finite
/// (zero-norm vectors) are excluded from the ranking. `limit == 0` falls
/// back to [`DEFAULT_LIMIT`].
pub fn rank(chunks: &[Chunk], query: &[f32], limit: usize) -> SearchResult<Vec<SearchHit>> {
    let limit = if limit == 0 { DEFAULT_LIMIT } else { limit };

    let mut hits = Vec::with_capacity(chunks.len());
    for chunk in chunks {
        let score = cosine_similarity(&chunk.embedding, query)?;
        if !score.is_finite() {
            log::warn!(
                "chunk {} has a zero-norm embedding, excluded from ranking",
                chunk.id
            );
            continue;
        }
        hits.push(SearchHit {
            content: chunk.content.clone(),
            relevance_score: score,
            metadata: chunk.metadata.clone(),
        });
    }

    // Stable sort keeps snapshot order for equal scores, so repeated
    // queries against an unchanged snapshot return identical ordering
    hits.sort_by(|a, b| {
        b.relevance_score
            .partial_cmp(&a.relevance_score)
            .unwrap_or(Ordering::Equal)
    });
    hits.truncate(limit);
    Ok(hits)
}
