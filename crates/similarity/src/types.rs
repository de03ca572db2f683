//! Session context and candidate types.

use data_loader::{AnimeId, UserId};
use std::collections::BTreeMap;

/// Session ratings at or above this count as "liked" and seed similarity
/// search. Lower ratings still mark a title as watched.
pub const LIKED_THRESHOLD: u8 = 5;

/// One interactive session's state: the synthetic user id allocated for it
/// and the ratings entered so far. Never written back to the persistent
/// log; the orchestrator merges it into a working copy per request.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub user_id: UserId,
    /// BTreeMap so seed iteration order is deterministic
    pub ratings: BTreeMap<AnimeId, u8>,
}

impl SessionContext {
    pub fn new(user_id: UserId, ratings: BTreeMap<AnimeId, u8>) -> Self {
        Self { user_id, ratings }
    }

    /// Ids rated at or above [`LIKED_THRESHOLD`], ascending
    pub fn liked(&self) -> impl Iterator<Item = AnimeId> + '_ {
        self.ratings
            .iter()
            .filter(|&(_, &rating)| rating >= LIKED_THRESHOLD)
            .map(|(&id, _)| id)
    }

    /// True for every session entry regardless of score
    pub fn has_rated(&self, id: AnimeId) -> bool {
        self.ratings.contains_key(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }
}

/// A recommendation candidate produced by similarity search
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub anime_id: AnimeId,
    /// The liked title whose neighborhood surfaced this candidate
    pub seed_id: AnimeId,
    pub similarity: f32,
}

impl Candidate {
    pub fn new(anime_id: AnimeId, seed_id: AnimeId, similarity: f32) -> Self {
        Self {
            anime_id,
            seed_id,
            similarity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_liked_applies_threshold_in_order() {
        let context = SessionContext::new(
            10,
            BTreeMap::from([(30, 9), (5, 4), (12, 5), (1, 10)]),
        );

        let liked: Vec<AnimeId> = context.liked().collect();
        assert_eq!(liked, vec![1, 12, 30]);
    }

    #[test]
    fn test_low_ratings_still_count_as_rated() {
        let context = SessionContext::new(10, BTreeMap::from([(5, 2)]));
        assert!(context.has_rated(5));
        assert_eq!(context.liked().count(), 0);
    }
}
