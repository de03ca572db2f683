//! # Similarity Crate
//!
//! Content-based nearest-neighbor search over the anime catalog, and the
//! candidate generation built on top of it.
//!
//! ## Components
//!
//! - **scaling**: per-column scalers (z-score, quantile-normal) refit on the
//!   full table at every query
//! - **features**: the dense feature matrix (scaled numerics + type,
//!   airing and genre flags)
//! - **index**: cosine top-k search with a typed not-found error
//! - **types**: `SessionContext` (one user's in-session ratings) and
//!   `Candidate`
//! - **candidates**: `SimilarAnimeSource`, the union of top-k neighborhoods
//!   of every liked title
//!
//! ## Example Usage
//!
//! ```ignore
//! use similarity::{SessionContext, SimilarAnimeSource, top_k_ids};
//!
//! // Direct neighborhood query
//! let neighbors = top_k_ids(&anime_table, 1, 10)?;
//!
//! // Candidate generation for a session
//! let context = SessionContext::new(ratings.next_user_id(), session_ratings);
//! let candidates = SimilarAnimeSource::new().gather(&anime_table, &context)?;
//! ```

// Public modules
pub mod candidates;
pub mod features;
pub mod index;
pub mod scaling;
pub mod types;

// Re-export commonly used types
pub use candidates::SimilarAnimeSource;
pub use features::FeatureMatrix;
pub use index::{DEFAULT_K, Neighbor, SimilarityError, top_k, top_k_ids};
pub use types::{Candidate, LIKED_THRESHOLD, SessionContext};
