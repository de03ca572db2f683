//! Dense numeric feature matrix over the catalog.

use crate::scaling::{QuantileNormalScaler, StandardScaler};
use data_loader::{AnimeTable, MediaType};

/// Per-anime feature rows aligned with table order.
///
/// Columns, in order: z-scored episode count, z-scored mean rating,
/// quantile-normalized member count, z-scored release year, Movie/TV
/// one-hot pair, still-airing flag, then one 0/1 column per genre in
/// vocabulary order. Name and id carry no numeric signal and are excluded.
#[derive(Debug, Clone)]
pub struct FeatureMatrix {
    rows: Vec<Vec<f32>>,
}

impl FeatureMatrix {
    /// Build the matrix, fitting every scaler on the full table.
    pub fn build(table: &AnimeTable) -> Self {
        let episodes: Vec<f32> = table.iter().filter_map(|a| a.episodes).collect();
        let episode_scaler = StandardScaler::fit(&episodes);
        let rating_scaler =
            StandardScaler::fit(&table.iter().map(|a| a.rating).collect::<Vec<_>>());
        let year_scaler = StandardScaler::fit(&table.iter().map(|a| a.year).collect::<Vec<_>>());
        let members_scaler = QuantileNormalScaler::fit(
            &table.iter().map(|a| a.members as f32).collect::<Vec<_>>(),
        );
        let vocab = table.genres();

        let rows = table
            .iter()
            .map(|anime| {
                let mut row = Vec::with_capacity(7 + vocab.len());
                // Unknown episode counts sit at the column mean after scaling.
                row.push(
                    anime
                        .episodes
                        .map(|e| episode_scaler.transform(e))
                        .unwrap_or(0.0),
                );
                row.push(rating_scaler.transform(anime.rating));
                row.push(members_scaler.transform(anime.members as f32));
                row.push(year_scaler.transform(anime.year));
                row.push((anime.media_type == MediaType::Movie) as u8 as f32);
                row.push((anime.media_type == MediaType::Tv) as u8 as f32);
                row.push(anime.still_airing as u8 as f32);
                for genre in vocab {
                    row.push(anime.has_genre(genre) as u8 as f32);
                }
                row
            })
            .collect();
        Self { rows }
    }

    pub fn row(&self, row: usize) -> &[f32] {
        &self.rows[row]
    }

    pub fn rows(&self) -> &[Vec<f32>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::Anime;

    fn anime(id: u32, media_type: MediaType, genres: &[&str]) -> Anime {
        Anime {
            id,
            name: format!("Anime {id}"),
            genres: genres.iter().map(|g| g.to_string()).collect(),
            media_type,
            episodes: Some(12.0 + id as f32),
            still_airing: false,
            rating: 6.0 + id as f32 / 10.0,
            members: 1000 * id,
            year: 2000.0 + id as f32,
        }
    }

    #[test]
    fn test_rows_align_with_table_and_vocab() {
        let table = AnimeTable::from_rows(vec![
            anime(1, MediaType::Tv, &["Action", "Drama"]),
            anime(2, MediaType::Movie, &["Comedy"]),
        ]);
        let matrix = FeatureMatrix::build(&table);

        assert_eq!(matrix.len(), 2);
        // 7 fixed columns + 3 vocabulary genres
        assert_eq!(matrix.row(0).len(), 10);

        // Vocab order is Action, Comedy, Drama.
        assert_eq!(&matrix.row(0)[7..], &[1.0, 0.0, 1.0]);
        assert_eq!(&matrix.row(1)[7..], &[0.0, 1.0, 0.0]);

        // Movie/TV one-hot pair.
        assert_eq!(&matrix.row(0)[4..6], &[0.0, 1.0]);
        assert_eq!(&matrix.row(1)[4..6], &[1.0, 0.0]);
    }

    #[test]
    fn test_unknown_episodes_map_to_column_mean() {
        let mut airing = anime(1, MediaType::Tv, &["Action"]);
        airing.episodes = None;
        airing.still_airing = true;
        let table = AnimeTable::from_rows(vec![
            airing,
            anime(2, MediaType::Tv, &["Action"]),
            anime(3, MediaType::Tv, &["Action"]),
        ]);
        let matrix = FeatureMatrix::build(&table);

        assert_eq!(matrix.row(0)[0], 0.0);
        assert_eq!(matrix.row(0)[6], 1.0);
        // Known counts straddle their mean.
        assert!(matrix.row(1)[0] < 0.0);
        assert!(matrix.row(2)[0] > 0.0);
    }

    #[test]
    fn test_empty_table() {
        let matrix = FeatureMatrix::build(&AnimeTable::from_rows(vec![]));
        assert!(matrix.is_empty());
    }
}
