//! Core domain types for the anime catalog and ratings log.
//!
//! Everything downstream (similarity search, model training, the
//! orchestrator) works against the two table types defined here:
//! - `AnimeTable`: the preprocessed catalog, read-only after loading
//! - `RatingTable`: the cleaned ratings log; session ratings are merged
//!   through `with_session`, which copies instead of mutating

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Unique identifier for an anime title
pub type AnimeId = u32;

/// Unique identifier for a user in the ratings log
pub type UserId = u32;

/// Lower bound of the explicit rating scale
pub const RATING_MIN: f32 = 1.0;

/// Upper bound of the explicit rating scale
pub const RATING_MAX: f32 = 10.0;

/// Catalog kinds retained after preprocessing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaType {
    Movie,
    Tv,
}

impl MediaType {
    /// Parse the raw catalog `type` column. Anything other than the two
    /// retained kinds returns `None` and the row is dropped upstream.
    pub fn from_raw(s: &str) -> Option<Self> {
        match s {
            "Movie" => Some(MediaType::Movie),
            "TV" => Some(MediaType::Tv),
            _ => None,
        }
    }
}

/// A preprocessed catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anime {
    pub id: AnimeId,
    /// Display name with HTML entities already decoded
    pub name: String,
    /// Expanded genre tags; exclusion genres never appear here
    pub genres: Vec<String>,
    pub media_type: MediaType,
    /// `None` means the episode count was unknown at ingest time
    pub episodes: Option<f32>,
    /// True iff the episode count was unknown at ingest time
    pub still_airing: bool,
    /// Mean community score on the 1-10 scale
    pub rating: f32,
    /// Member count, the popularity signal
    pub members: u32,
    /// Release year, joined in from the corrections table
    pub year: f32,
}

impl Anime {
    pub fn has_genre(&self, genre: &str) -> bool {
        self.genres.iter().any(|g| g == genre)
    }
}

/// One cleaned rating.
///
/// The raw log's -1 "no opinion" sentinel never survives preprocessing,
/// so `rating` is always in [1, 10].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
    pub user_id: UserId,
    pub anime_id: AnimeId,
    pub rating: u8,
}

/// The preprocessed catalog.
///
/// Rows are stored contiguously in post-filter insertion order, with an
/// id -> row index for O(1) lookups and the sorted genre vocabulary shared
/// by all rows.
#[derive(Debug, Clone, Default)]
pub struct AnimeTable {
    rows: Vec<Anime>,
    index: HashMap<AnimeId, usize>,
    genres: Vec<String>,
}

impl AnimeTable {
    /// Build a table from preprocessed rows.
    ///
    /// Later duplicates of an id are ignored; the first occurrence wins.
    pub fn from_rows(rows: Vec<Anime>) -> Self {
        let mut table = Self::default();
        let mut vocab: Vec<String> = Vec::new();
        for anime in rows {
            if table.index.contains_key(&anime.id) {
                continue;
            }
            for genre in &anime.genres {
                if !vocab.contains(genre) {
                    vocab.push(genre.clone());
                }
            }
            table.index.insert(anime.id, table.rows.len());
            table.rows.push(anime);
        }
        vocab.sort();
        table.genres = vocab;
        table
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn contains(&self, id: AnimeId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn get(&self, id: AnimeId) -> Option<&Anime> {
        self.index.get(&id).map(|&row| &self.rows[row])
    }

    /// Row position of an id in table order
    pub fn row_of(&self, id: AnimeId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    pub fn row(&self, row: usize) -> &Anime {
        &self.rows[row]
    }

    /// Iterate rows in table order
    pub fn iter(&self) -> impl Iterator<Item = &Anime> {
        self.rows.iter()
    }

    /// Sorted genre vocabulary across all retained rows
    pub fn genres(&self) -> &[String] {
        &self.genres
    }
}

/// The cleaned ratings log.
///
/// The base table is loaded once and treated as read-only for the process
/// lifetime. A session's new ratings join through `with_session`, which
/// returns a private working copy, so concurrent recommendation requests
/// never share mutable state.
#[derive(Debug, Clone, Default)]
pub struct RatingTable {
    records: Vec<Rating>,
    max_user_id: UserId,
}

impl RatingTable {
    pub fn from_records(records: Vec<Rating>) -> Self {
        let max_user_id = records.iter().map(|r| r.user_id).max().unwrap_or(0);
        Self {
            records,
            max_user_id,
        }
    }

    pub fn records(&self) -> &[Rating] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn max_user_id(&self) -> UserId {
        self.max_user_id
    }

    /// Id allocated to the next synthetic session user
    pub fn next_user_id(&self) -> UserId {
        self.max_user_id + 1
    }

    /// Copy-on-write merge of one session's ratings as user `user_id`.
    ///
    /// `self` is untouched; the returned table appends one record per
    /// session entry in ascending anime-id order.
    pub fn with_session(&self, user_id: UserId, session: &BTreeMap<AnimeId, u8>) -> RatingTable {
        let mut records = self.records.clone();
        records.extend(session.iter().map(|(&anime_id, &rating)| Rating {
            user_id,
            anime_id,
            rating,
        }));
        RatingTable {
            records,
            max_user_id: self.max_user_id.max(user_id),
        }
    }
}
