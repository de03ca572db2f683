//! Filter that removes titles the user already rated this session.
//!
//! Runs first in the pipeline. Any session rating counts, even ones below
//! the liked threshold: a title the user scored 3 never seeds similarity
//! search, but it is still something they have watched and must not come
//! back as a recommendation.

use crate::traits::Filter;
use anyhow::Result;
use similarity::{Candidate, SessionContext};

/// Removes candidates present in the session ratings with any score.
pub struct AlreadyRatedFilter;

impl Filter for AlreadyRatedFilter {
    fn name(&self) -> &str {
        "AlreadyRatedFilter"
    }

    fn apply(
        &self,
        candidates: Vec<Candidate>,
        context: &SessionContext,
    ) -> Result<Vec<Candidate>> {
        Ok(candidates
            .into_iter()
            .filter(|candidate| !context.has_rated(candidate.anime_id))
            .collect())
    }
}
