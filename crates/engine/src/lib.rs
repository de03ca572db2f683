//! # Engine Crate
//!
//! The recommendation orchestrator: one `recommend` call merges a session's
//! ratings into a working copy of the log, trains a fresh latent-factor
//! model, gathers candidates from liked-title neighborhoods, filters and
//! ranks them. Also hosts name search and the metadata-provider collaborator
//! interface the presentation layer consumes.
//!
//! ## Example Usage
//!
//! ```ignore
//! use engine::RecommendationEngine;
//! use std::sync::Arc;
//!
//! let engine = RecommendationEngine::new(Arc::new(anime), Arc::new(ratings));
//! let recommendations = engine.recommend(&session_ratings)?;
//! for rec in recommendations.iter().take(10) {
//!     println!("{}: {:.1}", rec.name, rec.predicted_rating);
//! }
//! ```

pub mod metadata;
pub mod orchestrator;

// Re-export main types
pub use metadata::{AnimeMetadata, CallPacer, MetadataError, MetadataProvider, fetch_all};
pub use orchestrator::{Recommendation, RecommendationEngine};
