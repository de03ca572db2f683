//! Core trait for the filtering pipeline.

use anyhow::Result;
use similarity::{Candidate, SessionContext};

/// A composable candidate filter.
///
/// Filters take ownership of the candidate vector and return the subset
/// that survives, so a pipeline stage never clones. `Send + Sync` lets a
/// built pipeline be shared across request tasks.
pub trait Filter: Send + Sync {
    /// Name used in per-stage logging
    fn name(&self) -> &str;

    /// Apply this filter against one session's context.
    fn apply(
        &self,
        candidates: Vec<Candidate>,
        context: &SessionContext,
    ) -> Result<Vec<Candidate>>;
}
