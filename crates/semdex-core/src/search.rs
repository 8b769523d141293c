//! Exact nearest-neighbor ranking over a vector database.
//!
//! Corpus sizes are small enough that a linear scan with exact cosine
//! similarity beats any index structure worth maintaining. Ranking is a
//! stable descending sort, so equal scores keep their original chunk
//! order.

use anyhow::Result;

use crate::models::{DocumentChunk, VectorDatabase};
use crate::similarity::cosine_similarity;

/// A ranked retrieval hit.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub chunk: DocumentChunk,
    pub score: f32,
}

/// Rank every chunk in `db` against `query_vec` and return the top `top_k`.
///
/// Returns fewer than `top_k` results when the database holds fewer
/// chunks. A chunk whose embedding length differs from the query vector
/// is a data-integrity error and aborts the search.
pub fn rank_chunks(
    query_vec: &[f32],
    db: &VectorDatabase,
    top_k: usize,
) -> Result<Vec<SearchResult>> {
    let mut results = Vec::with_capacity(db.chunks.len());
    for chunk in &db.chunks {
        let score = cosine_similarity(query_vec, &chunk.embedding)?;
        results.push(SearchResult {
            chunk: chunk.clone(),
            score,
        });
    }

    results.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    results.truncate(top_k);
    Ok(results)
}
