//! Exact top-K ranking by cosine similarity.
//!
//! One query vector against every indexed vector, full linear scan, no
//! approximate indexing and no minimum-score filter. That is intentional:
//! at deployed catalog sizes an exact scan is fast enough, and it keeps
//! the ranking trivially correct and reproducible.
//!
//! Ordering is score-descending with a stable sort, so entries with equal
//! scores keep the index's file-order iteration — the same query against
//! the same loaded index always returns the same ranking.

use index::VectorIndex;
use serde::Serialize;
use thiserror::Error;

/// Default number of results the external contract promises.
pub const DEFAULT_TOP_K: usize = 10;

/// One ranked entry: a product id and its similarity to the query.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RankedResult {
    /// Indexed product id.
    pub id: String,
    /// Cosine similarity in `[-1, 1]`; no clamp is imposed.
    pub score: f32,
}

/// Errors raised by [`rank`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RankError {
    /// `k` must select at least one result.
    #[error("top_k must be greater than zero")]
    InvalidTopK,
    /// The query vector's length differs from the index dimension.
    #[error("query has length {actual}, index dimension is {expected}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Cosine similarity between two equal-length vectors.
///
/// Defined as `0.0` — not an error — when either vector's norm is exactly
/// zero; a zero embedding is degenerate but legal.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (&x, &y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Rank every indexed entry against `query` and keep the top `k`.
///
/// Returns exactly `min(k, index.len())` results. Pure function of its
/// inputs; the index is never touched beyond iteration.
pub fn rank(
    query: &[f32],
    index: &VectorIndex,
    k: usize,
) -> Result<Vec<RankedResult>, RankError> {
    if k == 0 {
        return Err(RankError::InvalidTopK);
    }
    if let Some(expected) = index.dimension() {
        if query.len() != expected {
            return Err(RankError::DimensionMismatch {
                expected,
                actual: query.len(),
            });
        }
    }

    let mut results: Vec<RankedResult> = index
        .entries()
        .map(|(id, vector)| RankedResult {
            id: id.to_string(),
            score: cosine_similarity(query, vector),
        })
        .collect();

    // Vec::sort_by is stable, which preserves index order for equal scores.
    results.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    results.truncate(k);

    Ok(results)
}
