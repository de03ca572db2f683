//! Error types for model training and evaluation.

use thiserror::Error;

/// Training and evaluation failures. These are whole-call errors with no
/// partial result; prediction itself never fails (unknown ids degrade to a
/// bias-only estimate).
#[derive(Error, Debug)]
pub enum ModelError {
    /// Training input had no observed ratings
    #[error("cannot train on an empty rating table")]
    EmptyTrainingSet,

    /// Holdout evaluation asked for a split that leaves nothing to train or test
    #[error("holdout fraction {fraction} leaves no usable train/test split")]
    InvalidHoldout { fraction: f32 },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, ModelError>;
