//! Catalog and ratings-log preprocessing.
//!
//! Both passes share one failure policy: malformed or out-of-contract rows
//! are filtered out, never propagated as errors. An empty result is valid
//! output.

use crate::parser::{Corrections, NO_OPINION, RawAnimeRecord, RawRatingRecord};
use crate::text::decode_entities;
use crate::types::{
    Anime, AnimeId, AnimeTable, MediaType, RATING_MAX, RATING_MIN, Rating, RatingTable,
};
use tracing::{debug, warn};

/// Genres whose presence removes a row from the catalog entirely
const EXCLUDED_GENRES: [&str; 3] = ["Hentai", "Ecchi", "Harem"];

/// Episode counts above this are outliers and dropped
const EPISODE_CAP: f32 = 500.0;

/// Sazae-san, the one long-runner kept past the episode cap
const EPISODE_CAP_EXEMPT: AnimeId = 2471;

/// Raw marker for an episode count not known at ingest time
const UNKNOWN_EPISODES: &str = "Unknown";

/// Normalize the raw catalog into a typed [`AnimeTable`].
///
/// Per row: decode HTML entities in the name, expand genres and drop rows
/// carrying an exclusion genre, keep Movie/TV only, join corrections
/// (release year, episode count, mean score) with corrections winning,
/// derive `still_airing`, cap episode counts, and drop rows still missing a
/// mean rating or release year. Rows come out in input order; re-running on
/// already-clean rows is a no-op.
pub fn preprocess_anime(raw: Vec<RawAnimeRecord>, corrections: &Corrections) -> AnimeTable {
    let total = raw.len();
    let rows: Vec<Anime> = raw
        .into_iter()
        .filter_map(|record| clean_record(record, corrections))
        .collect();
    debug!(
        kept = rows.len(),
        dropped = total - rows.len(),
        "catalog preprocessing done"
    );
    AnimeTable::from_rows(rows)
}

fn clean_record(record: RawAnimeRecord, corrections: &Corrections) -> Option<Anime> {
    let genres = split_genres(&record.genre);
    if genres.iter().any(|g| EXCLUDED_GENRES.contains(&g.as_str())) {
        return None;
    }

    let media_type = MediaType::from_raw(record.kind.trim())?;

    // The raw catalog has no year column; it comes solely from corrections.
    let year = corrections.years.get(&record.anime_id).copied()?;

    let (episodes, still_airing) = match corrections.episodes.get(&record.anime_id) {
        Some(&count) => (Some(count), false),
        None => parse_episodes(record.anime_id, record.episodes.trim()),
    };
    if let Some(count) = episodes {
        if count > EPISODE_CAP && record.anime_id != EPISODE_CAP_EXEMPT {
            return None;
        }
    }

    let rating = corrections
        .scores
        .get(&record.anime_id)
        .copied()
        .or(record.rating)?;

    Some(Anime {
        id: record.anime_id,
        name: decode_entities(&record.name),
        genres,
        media_type,
        episodes,
        still_airing,
        rating,
        members: record.members,
        year,
    })
}

fn split_genres(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_episodes(id: AnimeId, raw: &str) -> (Option<f32>, bool) {
    if raw == UNKNOWN_EPISODES {
        return (None, true);
    }
    match raw.parse::<f32>() {
        Ok(count) => (Some(count), false),
        Err(_) => {
            warn!(anime_id = id, episodes = raw, "unparseable episode count, treating as unknown");
            (None, true)
        }
    }
}

/// Clean the raw ratings log against a preprocessed catalog.
///
/// Drops the -1 "no opinion" sentinel, out-of-scale values, and ratings
/// referencing anime ids absent from `table`.
pub fn preprocess_ratings(raw: Vec<RawRatingRecord>, table: &AnimeTable) -> RatingTable {
    let total = raw.len();
    let mut records = Vec::with_capacity(total);
    for record in raw {
        if record.rating == NO_OPINION {
            continue;
        }
        if record.rating < RATING_MIN as i16 || record.rating > RATING_MAX as i16 {
            warn!(
                user_id = record.user_id,
                anime_id = record.anime_id,
                rating = record.rating,
                "rating outside scale, dropping"
            );
            continue;
        }
        if !table.contains(record.anime_id) {
            continue;
        }
        records.push(Rating {
            user_id: record.user_id,
            anime_id: record.anime_id,
            rating: record.rating as u8,
        });
    }
    debug!(
        kept = records.len(),
        dropped = total - records.len(),
        "ratings preprocessing done"
    );
    RatingTable::from_records(records)
}
