//! CSV parsing for the raw dataset files.
//!
//! Five files make up a dataset directory:
//! - `anime.csv`: the item catalog (id, name, genre, type, episodes, rating, members)
//! - `rating.csv`: the ratings log (user_id, anime_id, rating)
//! - `anime_dates.csv`, `anime_episodes.csv`, `anime_scores.csv`: per-item
//!   corrections keyed by anime id
//!
//! Row policy: a row that fails to decode is dropped with a warning. Only
//! whole-file problems (missing file, unreadable CSV) are errors.

use crate::error::{DataLoadError, Result};
use crate::types::AnimeId;
use crate::types::UserId;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use tracing::warn;

/// Sentinel in the raw ratings log meaning "watched, no opinion"
pub const NO_OPINION: i16 = -1;

/// Raw catalog row as it appears in `anime.csv`
#[derive(Debug, Clone, Deserialize)]
pub struct RawAnimeRecord {
    pub anime_id: AnimeId,
    pub name: String,
    /// Comma-separated genre tags, possibly empty
    #[serde(default)]
    pub genre: String,
    /// Media kind: "Movie", "TV", "OVA", ...
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Episode count as text: a number or the literal "Unknown"
    #[serde(default)]
    pub episodes: String,
    /// Mean community score; absent for obscure entries
    #[serde(default)]
    pub rating: Option<f32>,
    #[serde(default)]
    pub members: u32,
}

/// Raw ratings-log row as it appears in `rating.csv`
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RawRatingRecord {
    pub user_id: UserId,
    pub anime_id: AnimeId,
    /// 1-10, or [`NO_OPINION`]
    pub rating: i16,
}

#[derive(Debug, Deserialize)]
struct YearRecord {
    anime_id: AnimeId,
    year: f32,
}

#[derive(Debug, Deserialize)]
struct EpisodeRecord {
    anime_id: AnimeId,
    episodes: f32,
}

#[derive(Debug, Deserialize)]
struct ScoreRecord {
    anime_id: AnimeId,
    scores: f32,
}

/// Per-item overrides joined onto the catalog during preprocessing
#[derive(Debug, Clone, Default)]
pub struct Corrections {
    /// Release year per anime id (the catalog itself carries no year)
    pub years: HashMap<AnimeId, f32>,
    /// Episode-count overrides
    pub episodes: HashMap<AnimeId, f32>,
    /// Mean-score overrides
    pub scores: HashMap<AnimeId, f32>,
}

/// Parse the item catalog
pub fn parse_anime_csv(path: &Path) -> Result<Vec<RawAnimeRecord>> {
    collect_rows(path)
}

/// Parse the ratings log
pub fn parse_ratings_csv(path: &Path) -> Result<Vec<RawRatingRecord>> {
    collect_rows(path)
}

/// Parse the three correction tables
pub fn parse_corrections(years: &Path, episodes: &Path, scores: &Path) -> Result<Corrections> {
    Ok(Corrections {
        years: collect_rows::<YearRecord>(years)?
            .into_iter()
            .map(|r| (r.anime_id, r.year))
            .collect(),
        episodes: collect_rows::<EpisodeRecord>(episodes)?
            .into_iter()
            .map(|r| (r.anime_id, r.episodes))
            .collect(),
        scores: collect_rows::<ScoreRecord>(scores)?
            .into_iter()
            .map(|r| (r.anime_id, r.scores))
            .collect(),
    })
}

fn collect_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        return Err(DataLoadError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    let reader = csv::Reader::from_path(path).map_err(|source| DataLoadError::Csv {
        file: path.display().to_string(),
        source,
    })?;
    Ok(collect_reader(reader, &path.display().to_string()))
}

/// Drain a CSV reader into typed rows, dropping the ones that fail to decode.
fn collect_reader<T: DeserializeOwned, R: Read>(mut reader: csv::Reader<R>, file: &str) -> Vec<T> {
    let mut rows = Vec::new();
    for (idx, row) in reader.deserialize::<T>().enumerate() {
        match row {
            Ok(value) => rows.push(value),
            // Header is line 1, so data row `idx` sits on line idx + 2.
            Err(e) => warn!(file, line = idx + 2, error = %e, "dropping malformed row"),
        }
    }
    rows
}
