//! Candidate generation from liked-title neighborhoods.

use crate::index::{self, DEFAULT_K, SimilarityError};
use crate::types::{Candidate, SessionContext};
use data_loader::{AnimeId, AnimeTable};
use std::collections::HashSet;
use tracing::{debug, instrument};

/// Generates candidates by unioning the top-k neighborhoods of every liked
/// session title.
#[derive(Debug, Clone)]
pub struct SimilarAnimeSource {
    /// Neighbors each liked title contributes before deduplication
    depth: usize,
}

impl SimilarAnimeSource {
    pub fn new() -> Self {
        Self { depth: DEFAULT_K }
    }

    /// Configure how many neighbors each liked title contributes (default 100)
    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    /// Union of neighborhoods, deduplicated by first discovery.
    ///
    /// Seeds iterate in ascending id order, so the discovery order (and the
    /// stable tie order downstream) is deterministic. A seed missing from
    /// the table is a precondition violation and propagates as
    /// [`SimilarityError::AnimeNotFound`].
    #[instrument(skip(self, table, context), fields(user_id = context.user_id))]
    pub fn gather(
        &self,
        table: &AnimeTable,
        context: &SessionContext,
    ) -> Result<Vec<Candidate>, SimilarityError> {
        let mut seen: HashSet<AnimeId> = HashSet::new();
        let mut candidates = Vec::new();
        for seed_id in context.liked() {
            for neighbor in index::top_k(table, seed_id, self.depth)? {
                if seen.insert(neighbor.anime_id) {
                    candidates.push(Candidate::new(
                        neighbor.anime_id,
                        seed_id,
                        neighbor.similarity,
                    ));
                }
            }
        }
        debug!(candidates = candidates.len(), "gathered similarity candidates");
        Ok(candidates)
    }
}

impl Default for SimilarAnimeSource {
    fn default() -> Self {
        Self::new()
    }
}
