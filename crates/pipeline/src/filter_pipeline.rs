//! Chains filters into an ordered pipeline.

use crate::traits::Filter;
use anyhow::Result;
use similarity::{Candidate, SessionContext};
use tracing::debug;

/// Applies a sequence of filters to a candidate set.
///
/// ## Usage
/// ```ignore
/// let pipeline = FilterPipeline::new().add_filter(AlreadyRatedFilter);
/// let filtered = pipeline.apply(candidates, &context)?;
/// ```
pub struct FilterPipeline {
    filters: Vec<Box<dyn Filter>>,
}

impl FilterPipeline {
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// Add a filter to the end of the pipeline (builder pattern).
    pub fn add_filter(mut self, filter: impl Filter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Run every filter in order, logging per-stage counts.
    ///
    /// The first filter to fail aborts the pipeline; there is no partial
    /// result.
    pub fn apply(
        &self,
        candidates: Vec<Candidate>,
        context: &SessionContext,
    ) -> Result<Vec<Candidate>> {
        let mut current = candidates;
        for filter in &self.filters {
            let before = current.len();
            current = filter.apply(current, context)?;
            debug!(
                filter = filter.name(),
                input = before,
                output = current.len(),
                "filter applied"
            );
        }
        Ok(current)
    }
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::AlreadyRatedFilter;
    use std::collections::BTreeMap;

    #[test]
    fn test_empty_pipeline_passes_everything_through() {
        let pipeline = FilterPipeline::new();
        let context = SessionContext::new(1, BTreeMap::new());

        let candidates = vec![Candidate::new(1, 10, 0.9), Candidate::new(2, 10, 0.8)];
        let filtered = pipeline.apply(candidates, &context).unwrap();
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn test_single_filter() {
        let context = SessionContext::new(1, BTreeMap::from([(1, 7)]));
        let pipeline = FilterPipeline::new().add_filter(AlreadyRatedFilter);

        let candidates = vec![Candidate::new(1, 10, 0.9), Candidate::new(2, 10, 0.8)];
        let filtered = pipeline.apply(candidates, &context).unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].anime_id, 2);
    }
}
