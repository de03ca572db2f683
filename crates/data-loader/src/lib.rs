//! # Data Loader Crate
//!
//! This crate loads and normalizes the anime dataset.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (Anime, Rating, AnimeTable, RatingTable)
//! - **parser**: Parse the CSV files into raw row structs
//! - **preprocess**: Turn raw rows into clean, typed tables
//! - **text**: HTML entity decoding for catalog names
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::load_dataset;
//! use std::path::Path;
//!
//! let (anime, ratings) = load_dataset(Path::new("data"))?;
//!
//! let cowboy_bebop = anime.get(1).unwrap();
//! println!("{} has {} cleaned ratings", cowboy_bebop.name, ratings.len());
//! ```

// Public modules
pub mod error;
pub mod parser;
pub mod preprocess;
pub mod text;
pub mod types;

// Re-export commonly used types for convenience
pub use error::{DataLoadError, Result};
pub use parser::{Corrections, RawAnimeRecord, RawRatingRecord};
pub use preprocess::{preprocess_anime, preprocess_ratings};
pub use types::{
    // Type aliases
    AnimeId,
    UserId,
    // Core types
    Anime,
    AnimeTable,
    Rating,
    RatingTable,
    // Enums and constants
    MediaType,
    RATING_MAX,
    RATING_MIN,
};

use std::path::Path;
use tracing::info;

/// Load and preprocess a full dataset directory.
///
/// Expects `anime.csv`, `rating.csv` and the three correction files. The
/// five files are parsed in parallel, then both preprocessing passes run.
pub fn load_dataset(dir: &Path) -> Result<(AnimeTable, RatingTable)> {
    let anime_path = dir.join("anime.csv");
    let ratings_path = dir.join("rating.csv");
    let dates_path = dir.join("anime_dates.csv");
    let episodes_path = dir.join("anime_episodes.csv");
    let scores_path = dir.join("anime_scores.csv");

    // Nested joins give three-way parallelism across the file groups.
    let ((raw_anime, corrections), raw_ratings) = rayon::join(
        || {
            rayon::join(
                || parser::parse_anime_csv(&anime_path),
                || parser::parse_corrections(&dates_path, &episodes_path, &scores_path),
            )
        },
        || parser::parse_ratings_csv(&ratings_path),
    );
    let raw_anime = raw_anime?;
    let corrections = corrections?;
    let raw_ratings = raw_ratings?;
    info!(
        anime = raw_anime.len(),
        ratings = raw_ratings.len(),
        "parsed raw dataset"
    );

    let anime = preprocess_anime(raw_anime, &corrections);
    let ratings = preprocess_ratings(raw_ratings, &anime);
    info!(
        anime = anime.len(),
        ratings = ratings.len(),
        "preprocessed dataset"
    );
    Ok((anime, ratings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn sample_anime(id: AnimeId) -> Anime {
        Anime {
            id,
            name: format!("Anime {id}"),
            genres: vec!["Action".to_string()],
            media_type: MediaType::Tv,
            episodes: Some(12.0),
            still_airing: false,
            rating: 7.0,
            members: 100,
            year: 2010.0,
        }
    }

    #[test]
    fn test_table_lookup_and_order() {
        let table = AnimeTable::from_rows(vec![sample_anime(5), sample_anime(2), sample_anime(9)]);

        assert_eq!(table.len(), 3);
        assert_eq!(table.row_of(5), Some(0));
        assert_eq!(table.row_of(9), Some(2));
        assert_eq!(table.get(2).unwrap().id, 2);
        assert!(table.get(404).is_none());
    }

    #[test]
    fn test_duplicate_ids_keep_first_row() {
        let mut second = sample_anime(1);
        second.name = "Duplicate".to_string();
        let table = AnimeTable::from_rows(vec![sample_anime(1), second]);

        assert_eq!(table.len(), 1);
        assert_eq!(table.get(1).unwrap().name, "Anime 1");
    }

    #[test]
    fn test_genre_vocabulary_is_sorted() {
        let mut a = sample_anime(1);
        a.genres = vec!["Drama".to_string(), "Action".to_string()];
        let mut b = sample_anime(2);
        b.genres = vec!["Comedy".to_string(), "Action".to_string()];
        let table = AnimeTable::from_rows(vec![a, b]);

        assert_eq!(table.genres(), ["Action", "Comedy", "Drama"]);
    }

    #[test]
    fn test_with_session_is_copy_on_write() {
        let base = RatingTable::from_records(vec![
            Rating { user_id: 1, anime_id: 20, rating: 8 },
            Rating { user_id: 2, anime_id: 24, rating: 6 },
        ]);
        let session = BTreeMap::from([(30, 9), (20, 5)]);

        let working = base.with_session(base.next_user_id(), &session);

        assert_eq!(base.len(), 2);
        assert_eq!(working.len(), 4);
        assert_eq!(working.max_user_id(), 3);
        // Session records append in ascending anime-id order.
        assert_eq!(working.records()[2].anime_id, 20);
        assert_eq!(working.records()[3].anime_id, 30);
        assert!(working.records()[2..].iter().all(|r| r.user_id == 3));
    }

    #[test]
    fn test_next_user_id_on_empty_table() {
        let table = RatingTable::default();
        assert_eq!(table.next_user_id(), 1);
    }
}
