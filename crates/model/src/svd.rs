//! SVD-style matrix factorization trained with stochastic gradient descent.
//!
//! The model learns a global mean plus per-user and per-item biases and
//! latent vectors minimizing squared error on the observed ratings. One
//! model serves one recommendation request: it is retrained from scratch
//! whenever new session ratings arrive and never persisted.

use crate::error::{ModelError, Result};
use data_loader::{AnimeId, RATING_MAX, RATING_MIN, RatingTable, UserId};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use tracing::debug;

/// Training hyperparameters, defaulting to the standard SVD recommender
/// settings: 100 factors, 20 epochs, learning rate 0.005, regularization
/// 0.02.
#[derive(Debug, Clone)]
pub struct SvdConfig {
    pub factors: usize,
    pub epochs: usize,
    pub learning_rate: f32,
    pub regularization: f32,
    /// Factors initialize uniformly in `±init_spread`
    pub init_spread: f32,
    /// Seed for factor initialization; fixed so identical inputs reproduce
    pub seed: u64,
}

impl Default for SvdConfig {
    fn default() -> Self {
        Self {
            factors: 100,
            epochs: 20,
            learning_rate: 0.005,
            regularization: 0.02,
            init_spread: 0.1,
            seed: 7,
        }
    }
}

impl SvdConfig {
    pub fn with_factors(mut self, factors: usize) -> Self {
        self.factors = factors;
        self
    }

    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    pub fn with_learning_rate(mut self, learning_rate: f32) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_regularization(mut self, regularization: f32) -> Self {
        self.regularization = regularization;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// A fitted latent-factor model.
///
/// Factor storage is row-major with a stride of `factors` per entity.
#[derive(Debug, Clone)]
pub struct SvdModel {
    factors: usize,
    global_mean: f32,
    users: HashMap<UserId, usize>,
    items: HashMap<AnimeId, usize>,
    user_bias: Vec<f32>,
    item_bias: Vec<f32>,
    user_factors: Vec<f32>,
    item_factors: Vec<f32>,
}

impl SvdModel {
    /// Fit on every observed rating in `table`.
    ///
    /// Records are visited in table order each epoch and factor
    /// initialization is seeded, so identical inputs yield an identical
    /// model.
    pub fn train(table: &RatingTable, config: &SvdConfig) -> Result<Self> {
        if table.is_empty() {
            return Err(ModelError::EmptyTrainingSet);
        }

        // Index users and items in first-seen order.
        let mut users: HashMap<UserId, usize> = HashMap::new();
        let mut items: HashMap<AnimeId, usize> = HashMap::new();
        for record in table.records() {
            let next = users.len();
            users.entry(record.user_id).or_insert(next);
            let next = items.len();
            items.entry(record.anime_id).or_insert(next);
        }

        let n = table.len() as f32;
        let global_mean = table
            .records()
            .iter()
            .map(|r| r.rating as f32)
            .sum::<f32>()
            / n;

        let mut rng = StdRng::seed_from_u64(config.seed);
        let spread = config.init_spread;
        let mut init = |count: usize| -> Vec<f32> {
            if spread > 0.0 {
                (0..count).map(|_| rng.random_range(-spread..spread)).collect()
            } else {
                vec![0.0; count]
            }
        };
        let k = config.factors;
        let mut user_factors = init(users.len() * k);
        let mut item_factors = init(items.len() * k);
        let mut user_bias = vec![0.0f32; users.len()];
        let mut item_bias = vec![0.0f32; items.len()];

        let lr = config.learning_rate;
        let reg = config.regularization;
        for epoch in 0..config.epochs {
            let mut squared_error = 0.0f32;
            for record in table.records() {
                let u = users[&record.user_id];
                let i = items[&record.anime_id];
                let uf = &mut user_factors[u * k..(u + 1) * k];
                let itf = &mut item_factors[i * k..(i + 1) * k];

                let dot: f32 = uf.iter().zip(itf.iter()).map(|(a, b)| a * b).sum();
                let err =
                    record.rating as f32 - (global_mean + user_bias[u] + item_bias[i] + dot);
                squared_error += err * err;

                user_bias[u] += lr * (err - reg * user_bias[u]);
                item_bias[i] += lr * (err - reg * item_bias[i]);
                for f in 0..k {
                    let pu = uf[f];
                    let qi = itf[f];
                    uf[f] += lr * (err * qi - reg * pu);
                    itf[f] += lr * (err * pu - reg * qi);
                }
            }
            debug!(epoch, rmse = (squared_error / n).sqrt(), "sgd epoch complete");
        }

        Ok(Self {
            factors: k,
            global_mean,
            users,
            items,
            user_bias,
            item_bias,
            user_factors,
            item_factors,
        })
    }

    /// Estimated rating for an arbitrary (user, item) pair.
    ///
    /// Never fails: an unseen user or item degrades to whatever bias terms
    /// are known (the cold estimate). The result is clipped to the rating
    /// scale.
    pub fn predict(&self, user_id: UserId, anime_id: AnimeId) -> f32 {
        let user = self.users.get(&user_id).copied();
        let item = self.items.get(&anime_id).copied();

        let mut estimate = self.global_mean;
        if let Some(u) = user {
            estimate += self.user_bias[u];
        }
        if let Some(i) = item {
            estimate += self.item_bias[i];
        }
        match (user, item) {
            (Some(u), Some(i)) => {
                let uf = &self.user_factors[u * self.factors..(u + 1) * self.factors];
                let itf = &self.item_factors[i * self.factors..(i + 1) * self.factors];
                estimate += uf.iter().zip(itf).map(|(a, b)| a * b).sum::<f32>();
            }
            _ => debug!(user_id, anime_id, "cold estimate, falling back to biases"),
        }
        estimate.clamp(RATING_MIN, RATING_MAX)
    }

    /// Mean of the training ratings
    pub fn global_mean(&self) -> f32 {
        self.global_mean
    }

    pub fn knows_user(&self, user_id: UserId) -> bool {
        self.users.contains_key(&user_id)
    }

    pub fn knows_item(&self, anime_id: AnimeId) -> bool {
        self.items.contains_key(&anime_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::Rating;

    fn rating(user_id: UserId, anime_id: AnimeId, rating: u8) -> Rating {
        Rating {
            user_id,
            anime_id,
            rating,
        }
    }

    /// Every user loves item 1 and dislikes item 2.
    fn polarized_table() -> RatingTable {
        let mut records = Vec::new();
        for user_id in 1..=6 {
            records.push(rating(user_id, 1, 9));
            records.push(rating(user_id, 2, 2));
        }
        RatingTable::from_records(records)
    }

    #[test]
    fn test_empty_table_is_a_typed_failure() {
        let err = SvdModel::train(&RatingTable::default(), &SvdConfig::default()).unwrap_err();
        assert!(matches!(err, ModelError::EmptyTrainingSet));
    }

    #[test]
    fn test_training_learns_item_polarity() {
        let model = SvdModel::train(&polarized_table(), &SvdConfig::default()).unwrap();

        let loved = model.predict(1, 1);
        let disliked = model.predict(1, 2);
        assert!(loved > disliked);
        assert!(loved > model.global_mean());
        assert!(disliked < model.global_mean());
    }

    #[test]
    fn test_predictions_stay_on_the_rating_scale() {
        let model = SvdModel::train(&polarized_table(), &SvdConfig::default()).unwrap();

        for user_id in 0..10 {
            for anime_id in 0..5 {
                let estimate = model.predict(user_id, anime_id);
                assert!((RATING_MIN..=RATING_MAX).contains(&estimate));
            }
        }
    }

    #[test]
    fn test_cold_user_gets_item_bias_estimate() {
        let model = SvdModel::train(&polarized_table(), &SvdConfig::default()).unwrap();
        assert!(!model.knows_user(999));

        // A user the model never saw still inherits the item's reputation.
        assert!(model.predict(999, 1) > model.predict(999, 2));
    }

    #[test]
    fn test_cold_item_falls_back_to_user_view() {
        let model = SvdModel::train(&polarized_table(), &SvdConfig::default()).unwrap();
        assert!(!model.knows_item(999));

        let estimate = model.predict(1, 999);
        assert!((RATING_MIN..=RATING_MAX).contains(&estimate));
    }

    #[test]
    fn test_same_seed_reproduces_the_model() {
        let table = polarized_table();
        let config = SvdConfig::default().with_seed(42);

        let first = SvdModel::train(&table, &config).unwrap();
        let second = SvdModel::train(&table, &config).unwrap();

        for user_id in 1..=6 {
            for anime_id in 1..=2 {
                assert_eq!(first.predict(user_id, anime_id), second.predict(user_id, anime_id));
            }
        }
    }

    #[test]
    fn test_builder_overrides() {
        let config = SvdConfig::default()
            .with_factors(10)
            .with_epochs(5)
            .with_learning_rate(0.01)
            .with_regularization(0.1)
            .with_seed(3);
        assert_eq!(config.factors, 10);
        assert_eq!(config.epochs, 5);
        assert_eq!(config.seed, 3);
    }
}
