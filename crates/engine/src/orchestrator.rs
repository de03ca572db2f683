//! # Recommendation Orchestrator
//!
//! Coordinates one recommendation request end to end:
//! 1. Allocate a synthetic user id for the session
//! 2. Merge the session ratings into a working copy of the ratings log
//! 3. Train a fresh latent-factor model on the working copy
//! 4. Gather candidates from the neighborhoods of every liked title
//! 5. Drop candidates the user already rated
//! 6. Predict the synthetic user's rating per candidate and rank
//!
//! The base tables are immutable snapshots behind `Arc`s and every request
//! gets its own working copy of the ratings, so concurrent `recommend`
//! calls share no mutable state.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use data_loader::{Anime, AnimeId, AnimeTable, RatingTable};
use model::{SvdConfig, SvdModel};
use pipeline::FilterPipeline;
use pipeline::filters::AlreadyRatedFilter;
use similarity::{SessionContext, SimilarAnimeSource};

/// Final recommendation returned to the caller
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub anime_id: AnimeId,
    pub name: String,
    pub year: f32,
    /// Estimated rating on the 1-10 scale for the session user
    pub predicted_rating: f32,
}

/// Main orchestrator combining the similarity index and the latent-factor
/// model over one pair of immutable tables.
pub struct RecommendationEngine {
    anime: Arc<AnimeTable>,
    ratings: Arc<RatingTable>,
    svd_config: SvdConfig,
    source: SimilarAnimeSource,
    filters: FilterPipeline,
}

impl RecommendationEngine {
    pub fn new(anime: Arc<AnimeTable>, ratings: Arc<RatingTable>) -> Self {
        Self {
            anime,
            ratings,
            svd_config: SvdConfig::default(),
            source: SimilarAnimeSource::new(),
            filters: FilterPipeline::new().add_filter(AlreadyRatedFilter),
        }
    }

    /// Override the training hyperparameters (builder pattern)
    pub fn with_svd_config(mut self, config: SvdConfig) -> Self {
        self.svd_config = config;
        self
    }

    /// Override how many neighbors each liked title contributes
    pub fn with_candidate_depth(mut self, depth: usize) -> Self {
        self.source = SimilarAnimeSource::new().with_depth(depth);
        self
    }

    /// Ranked recommendations for one session's ratings.
    ///
    /// Returns the full ranked list; callers typically take a prefix. A
    /// session with no liked title (every rating below the threshold, or no
    /// ratings at all) has an empty candidate set by definition and returns
    /// an empty list without training.
    pub fn recommend(&self, session: &BTreeMap<AnimeId, u8>) -> Result<Vec<Recommendation>> {
        let start = Instant::now();
        let context = SessionContext::new(self.ratings.next_user_id(), session.clone());

        if context.liked().next().is_none() {
            info!(
                user_id = context.user_id,
                rated = context.ratings.len(),
                "session has no liked titles, nothing to recommend"
            );
            return Ok(Vec::new());
        }

        let working = self.ratings.with_session(context.user_id, &context.ratings);
        info!(
            user_id = context.user_id,
            base = self.ratings.len(),
            working = working.len(),
            "merged session ratings into working table"
        );

        let model = SvdModel::train(&working, &self.svd_config)
            .context("Failed to train the latent-factor model")?;
        info!(elapsed = ?start.elapsed(), "trained latent-factor model");

        let candidates = self
            .source
            .gather(&self.anime, &context)
            .context("Candidate generation failed")?;
        let gathered = candidates.len();
        let candidates = self
            .filters
            .apply(candidates, &context)
            .context("Candidate filtering failed")?;
        info!(
            gathered,
            after_filters = candidates.len(),
            "gathered and filtered candidates"
        );

        let mut scored: Vec<(AnimeId, f32)> = candidates
            .iter()
            .map(|c| (c.anime_id, model.predict(context.user_id, c.anime_id)))
            .collect();
        // Stable sort: ties keep candidate discovery order.
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        let recommendations: Vec<Recommendation> = scored
            .into_iter()
            .filter_map(|(anime_id, predicted_rating)| {
                let anime = self.anime.get(anime_id)?;
                Some(Recommendation {
                    anime_id,
                    name: anime.name.clone(),
                    year: anime.year,
                    predicted_rating,
                })
            })
            .collect();

        info!(
            user_id = context.user_id,
            recommendations = recommendations.len(),
            elapsed = ?start.elapsed(),
            "recommendation request done"
        );
        Ok(recommendations)
    }

    /// Case-insensitive substring search over catalog names, most popular
    /// first.
    pub fn search(&self, query: &str) -> Vec<&Anime> {
        let needle = query.to_lowercase();
        let mut hits: Vec<&Anime> = self
            .anime
            .iter()
            .filter(|anime| anime.name.to_lowercase().contains(&needle))
            .collect();
        hits.sort_by(|a, b| b.members.cmp(&a.members));
        hits
    }

    pub fn anime(&self) -> &AnimeTable {
        &self.anime
    }

    pub fn ratings(&self) -> &RatingTable {
        &self.ratings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::{MediaType, Rating};

    fn anime(id: AnimeId, name: &str, rating: f32, members: u32, year: f32) -> Anime {
        Anime {
            id,
            name: name.to_string(),
            genres: vec!["Action".to_string()],
            media_type: MediaType::Tv,
            episodes: Some(24.0),
            still_airing: false,
            rating,
            members,
            year,
        }
    }

    fn test_tables() -> (Arc<AnimeTable>, Arc<RatingTable>) {
        let table = AnimeTable::from_rows(vec![
            anime(1, "Cowboy Bebop", 8.8, 1000, 1998.0),
            anime(2, "Trigun", 8.3, 900, 1998.0),
            anime(3, "Hellsing", 7.9, 800, 2001.0),
            anime(4, "Berserk", 8.8, 700, 1997.0),
        ]);
        let ratings = RatingTable::from_records(vec![
            Rating { user_id: 1, anime_id: 1, rating: 8 },
            Rating { user_id: 1, anime_id: 2, rating: 6 },
            Rating { user_id: 2, anime_id: 1, rating: 7 },
            Rating { user_id: 2, anime_id: 3, rating: 9 },
        ]);
        (Arc::new(table), Arc::new(ratings))
    }

    fn fast_engine() -> RecommendationEngine {
        let (anime, ratings) = test_tables();
        // Small factor count keeps tests quick; semantics are unchanged.
        RecommendationEngine::new(anime, ratings)
            .with_svd_config(SvdConfig::default().with_factors(8).with_epochs(10))
    }

    #[test]
    fn test_empty_session_yields_empty_list() {
        let engine = fast_engine();
        let recommendations = engine.recommend(&BTreeMap::new()).unwrap();
        assert!(recommendations.is_empty());
    }

    #[test]
    fn test_all_ratings_below_threshold_yield_empty_list() {
        let engine = fast_engine();
        let session = BTreeMap::from([(1, 3), (2, 4)]);
        let recommendations = engine.recommend(&session).unwrap();
        assert!(recommendations.is_empty());
    }

    #[test]
    fn test_liked_title_is_never_recommended_back() {
        let engine = fast_engine();
        let session = BTreeMap::from([(1, 9)]);

        let recommendations = engine.recommend(&session).unwrap();
        assert!(!recommendations.is_empty());
        assert!(recommendations.iter().all(|r| r.anime_id != 1));
    }

    #[test]
    fn test_every_session_title_is_excluded_even_disliked_ones() {
        let engine = fast_engine();
        // 2 is watched but disliked: not a seed, still never recommended.
        let session = BTreeMap::from([(1, 9), (2, 2)]);

        let recommendations = engine.recommend(&session).unwrap();
        assert!(recommendations.iter().all(|r| r.anime_id != 1));
        assert!(recommendations.iter().all(|r| r.anime_id != 2));
    }

    #[test]
    fn test_recommendations_are_ranked_descending() {
        let engine = fast_engine();
        let session = BTreeMap::from([(1, 9)]);

        let recommendations = engine.recommend(&session).unwrap();
        for pair in recommendations.windows(2) {
            assert!(pair[0].predicted_rating >= pair[1].predicted_rating);
        }
    }

    #[test]
    fn test_recommend_is_deterministic() {
        let session = BTreeMap::from([(1, 9), (3, 7)]);

        let first: Vec<(AnimeId, f32)> = fast_engine()
            .recommend(&session)
            .unwrap()
            .into_iter()
            .map(|r| (r.anime_id, r.predicted_rating))
            .collect();
        let second: Vec<(AnimeId, f32)> = fast_engine()
            .recommend(&session)
            .unwrap()
            .into_iter()
            .map(|r| (r.anime_id, r.predicted_rating))
            .collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_unknown_session_anime_fails_candidate_generation() {
        let engine = fast_engine();
        let session = BTreeMap::from([(404, 9)]);
        assert!(engine.recommend(&session).is_err());
    }

    #[test]
    fn test_search_is_case_insensitive_and_popularity_ordered() {
        let engine = fast_engine();

        let hits = engine.search("e");
        let names: Vec<&str> = hits.iter().map(|a| a.name.as_str()).collect();
        // Bebop (1000), Hellsing (800), Berserk (700) all contain an 'e'.
        assert_eq!(names, ["Cowboy Bebop", "Hellsing", "Berserk"]);

        assert_eq!(engine.search("TRIGUN").len(), 1);
        assert!(engine.search("zzz").is_empty());
    }
}
