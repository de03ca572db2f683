//! Offline holdout evaluation.
//!
//! The production recommendation path always trains on every observed
//! rating; this module exists for the diagnostic question "how far off are
//! the estimates on data the model never saw".

use crate::error::{ModelError, Result};
use crate::svd::{SvdConfig, SvdModel};
use data_loader::RatingTable;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::info;

/// Share of ratings held out when the caller has no opinion
pub const DEFAULT_TEST_FRACTION: f32 = 0.2;

/// Train on a seeded random split and report RMSE on the held-out part.
///
/// The shuffle reuses `config.seed`, so the split (and therefore the
/// reported number) is reproducible for a fixed table and config.
pub fn holdout_rmse(table: &RatingTable, test_fraction: f32, config: &SvdConfig) -> Result<f32> {
    if table.is_empty() {
        return Err(ModelError::EmptyTrainingSet);
    }
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(ModelError::InvalidHoldout {
            fraction: test_fraction,
        });
    }

    let mut records = table.records().to_vec();
    let mut rng = StdRng::seed_from_u64(config.seed);
    records.shuffle(&mut rng);

    let test_len = (records.len() as f32 * test_fraction).round() as usize;
    if test_len == 0 || test_len == records.len() {
        return Err(ModelError::InvalidHoldout {
            fraction: test_fraction,
        });
    }
    let (test, train) = records.split_at(test_len);

    let model = SvdModel::train(&RatingTable::from_records(train.to_vec()), config)?;
    let squared_error: f32 = test
        .iter()
        .map(|r| {
            let err = r.rating as f32 - model.predict(r.user_id, r.anime_id);
            err * err
        })
        .sum();
    let rmse = (squared_error / test.len() as f32).sqrt();
    info!(
        train = train.len(),
        test = test.len(),
        rmse,
        "holdout evaluation done"
    );
    Ok(rmse)
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::Rating;

    fn table() -> RatingTable {
        let mut records = Vec::new();
        // 20 users with consistent tastes over 4 titles.
        for user_id in 1..=20 {
            records.push(Rating { user_id, anime_id: 1, rating: 9 });
            records.push(Rating { user_id, anime_id: 2, rating: 8 });
            records.push(Rating { user_id, anime_id: 3, rating: 3 });
            records.push(Rating { user_id, anime_id: 4, rating: 2 });
        }
        RatingTable::from_records(records)
    }

    #[test]
    fn test_rmse_is_finite_and_small_on_consistent_data() {
        let rmse = holdout_rmse(&table(), DEFAULT_TEST_FRACTION, &SvdConfig::default()).unwrap();
        assert!(rmse.is_finite());
        // Ratings are fully predictable from the item alone, so the model
        // should land well under the rating-scale width.
        assert!(rmse < 4.0);
    }

    #[test]
    fn test_same_seed_reports_the_same_number() {
        let config = SvdConfig::default().with_seed(11);
        let first = holdout_rmse(&table(), 0.25, &config).unwrap();
        let second = holdout_rmse(&table(), 0.25, &config).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_out_of_range_fractions_are_rejected() {
        for fraction in [0.0, 1.0, -0.5, 1.5] {
            let err = holdout_rmse(&table(), fraction, &SvdConfig::default()).unwrap_err();
            assert!(matches!(err, ModelError::InvalidHoldout { .. }));
        }
    }

    #[test]
    fn test_degenerate_split_is_rejected() {
        let tiny = RatingTable::from_records(vec![Rating {
            user_id: 1,
            anime_id: 1,
            rating: 7,
        }]);
        // One record cannot be split into train and test.
        let err = holdout_rmse(&tiny, 0.5, &SvdConfig::default()).unwrap_err();
        assert!(matches!(err, ModelError::InvalidHoldout { .. }));
    }

    #[test]
    fn test_empty_table() {
        let err = holdout_rmse(
            &RatingTable::default(),
            DEFAULT_TEST_FRACTION,
            &SvdConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ModelError::EmptyTrainingSet));
    }
}
