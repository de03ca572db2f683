//! Cosine top-k search over the feature matrix.

use crate::features::FeatureMatrix;
use data_loader::{AnimeId, AnimeTable};
use rayon::prelude::*;
use thiserror::Error;
use tracing::debug;

/// Similarity queries fail only when the query id is unknown; everything
/// else degrades (zero-norm rows score 0.0, small tables return fewer hits).
#[derive(Error, Debug)]
pub enum SimilarityError {
    #[error("anime {id} is not in the catalog")]
    AnimeNotFound { id: AnimeId },
}

/// Default number of neighbors fetched per query
pub const DEFAULT_K: usize = 100;

/// Forced onto the query's self-similarity so it can never rank first
const SELF_SIMILARITY: f32 = -1.0;

/// One similarity hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub anime_id: AnimeId,
    pub similarity: f32,
}

/// The `k` nearest catalog entries to `anime_id` in feature space.
///
/// Scalers refit on the full table per call (see [`FeatureMatrix`]), so the
/// result is deterministic for a fixed table. The sort is stable descending,
/// ties keep table order, and the query itself is never returned; a table
/// smaller than `k + 1` yields every other row.
pub fn top_k(
    table: &AnimeTable,
    anime_id: AnimeId,
    k: usize,
) -> Result<Vec<Neighbor>, SimilarityError> {
    let query_row = table
        .row_of(anime_id)
        .ok_or(SimilarityError::AnimeNotFound { id: anime_id })?;

    let matrix = FeatureMatrix::build(table);
    let query = matrix.row(query_row).to_vec();
    let mut sims: Vec<f32> = matrix
        .rows()
        .par_iter()
        .map(|row| cosine(&query, row))
        .collect();
    sims[query_row] = SELF_SIMILARITY;

    let mut order: Vec<usize> = (0..sims.len()).collect();
    order.sort_by(|&a, &b| sims[b].partial_cmp(&sims[a]).unwrap_or(std::cmp::Ordering::Equal));
    order.retain(|&row| row != query_row);

    let neighbors: Vec<Neighbor> = order
        .into_iter()
        .take(k)
        .map(|row| Neighbor {
            anime_id: table.row(row).id,
            similarity: sims[row],
        })
        .collect();
    debug!(anime_id, k, found = neighbors.len(), "similarity query done");
    Ok(neighbors)
}

/// Id-only convenience form of [`top_k`].
pub fn top_k_ids(
    table: &AnimeTable,
    anime_id: AnimeId,
    k: usize,
) -> Result<Vec<AnimeId>, SimilarityError> {
    Ok(top_k(table, anime_id, k)?
        .into_iter()
        .map(|n| n.anime_id)
        .collect())
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}
