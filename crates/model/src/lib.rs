//! # Model Crate
//!
//! The latent-factor half of the recommendation engine: an SVD-style
//! matrix-factorization model trained on the cleaned ratings log.
//!
//! ## Main Components
//!
//! - **svd**: training (`SvdModel::train`) and prediction (`SvdModel::predict`)
//! - **evaluate**: offline holdout RMSE, a diagnostic the recommendation
//!   path never uses
//! - **error**: error types for training and evaluation
//!
//! ## Example Usage
//!
//! ```ignore
//! use model::{SvdConfig, SvdModel};
//!
//! let model = SvdModel::train(&ratings, &SvdConfig::default())?;
//! let estimate = model.predict(user_id, anime_id);
//! ```

// Public modules
pub mod error;
pub mod evaluate;
pub mod svd;

// Re-export commonly used types
pub use error::{ModelError, Result};
pub use evaluate::{DEFAULT_TEST_FRACTION, holdout_rmse};
pub use svd::{SvdConfig, SvdModel};
