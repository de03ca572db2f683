use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use data_loader::{AnimeId, AnimeTable, RATING_MAX, RATING_MIN, RatingTable, load_dataset};
use engine::RecommendationEngine;
use model::{DEFAULT_TEST_FRACTION, SvdConfig, holdout_rmse};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// AniRecs - Anime Recommendation Engine
#[derive(Parser)]
#[command(name = "ani-recs")]
#[command(about = "Anime recommendations from collaborative filtering and feature similarity", long_about = None)]
struct Cli {
    /// Path to the dataset directory (anime.csv, rating.csv, correction files)
    #[arg(short, long, default_value = "data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search the catalog by name
    Search {
        /// Name to search for (case-insensitive substring match)
        #[arg(long)]
        name: String,

        /// Number of results to display
        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// Show the titles most similar to a given one
    Similar {
        /// Query anime id
        #[arg(long)]
        anime_id: AnimeId,

        /// Number of neighbors to display
        #[arg(long, default_value = "10")]
        k: usize,
    },

    /// Recommend titles from this session's ratings
    Recommend {
        /// A session rating as ID=SCORE (repeatable), e.g. --rating 1=9
        #[arg(long = "rating", value_parser = parse_session_rating, required = true)]
        ratings: Vec<(AnimeId, u8)>,

        /// Number of recommendations to display
        #[arg(long, default_value = "10")]
        limit: usize,

        /// Emit the full ranked list as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Train on a split of the ratings log and report holdout RMSE
    Evaluate {
        /// Share of ratings to hold out for testing
        #[arg(long, default_value_t = DEFAULT_TEST_FRACTION)]
        test_fraction: f32,
    },
}

/// Parse an `ID=SCORE` session rating argument.
fn parse_session_rating(s: &str) -> Result<(AnimeId, u8), String> {
    let (id, score) = s
        .split_once('=')
        .ok_or_else(|| format!("expected ID=SCORE, got '{s}'"))?;
    let id: AnimeId = id
        .trim()
        .parse()
        .map_err(|_| format!("'{id}' is not a valid anime id"))?;
    let score: u8 = score
        .trim()
        .parse()
        .map_err(|_| format!("'{score}' is not a valid rating"))?;
    if !(RATING_MIN as u8..=RATING_MAX as u8).contains(&score) {
        return Err(format!(
            "rating {score} is outside the {}-{} scale",
            RATING_MIN as u8, RATING_MAX as u8
        ));
    }
    Ok((id, score))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    println!("Loading anime dataset from {}...", cli.data_dir.display());
    let start = Instant::now();
    let data_dir = cli.data_dir.clone();
    let (anime, ratings) = tokio::task::spawn_blocking(move || load_dataset(&data_dir))
        .await
        .context("Dataset load task panicked")?
        .context("Failed to load the anime dataset")?;
    println!(
        "{} Loaded {} anime and {} ratings in {:?}",
        "✓".green(),
        anime.len(),
        ratings.len(),
        start.elapsed()
    );

    let anime = Arc::new(anime);
    let ratings = Arc::new(ratings);

    match cli.command {
        Commands::Search { name, limit } => handle_search(anime, ratings, &name, limit),
        Commands::Similar { anime_id, k } => handle_similar(anime, anime_id, k).await?,
        Commands::Recommend {
            ratings: session,
            limit,
            json,
        } => handle_recommend(anime, ratings, session, limit, json).await?,
        Commands::Evaluate { test_fraction } => handle_evaluate(ratings, test_fraction).await?,
    }

    Ok(())
}

/// Handle the 'search' command
fn handle_search(anime: Arc<AnimeTable>, ratings: Arc<RatingTable>, name: &str, limit: usize) {
    let engine = RecommendationEngine::new(anime, ratings);
    let hits = engine.search(name);

    println!("{}", format!("Search results for '{name}':").bold().blue());
    if hits.is_empty() {
        println!("No titles match.");
        return;
    }
    for hit in hits.iter().take(limit) {
        println!(
            "{}: {} [{}] avg {:.2} ({} members)",
            hit.id,
            hit.name,
            hit.genres.join(", "),
            hit.rating,
            hit.members
        );
    }
}

/// Handle the 'similar' command
async fn handle_similar(anime: Arc<AnimeTable>, anime_id: AnimeId, k: usize) -> Result<()> {
    let query = anime
        .get(anime_id)
        .with_context(|| format!("Anime {anime_id} is not in the catalog"))?
        .name
        .clone();

    let table = anime.clone();
    let neighbors = tokio::task::spawn_blocking(move || similarity::top_k(&table, anime_id, k))
        .await
        .context("Similarity task panicked")??;

    println!("{}", format!("Titles most similar to '{query}':").bold().blue());
    for (rank, neighbor) in neighbors.iter().enumerate() {
        // Neighbors come from the same table, so the lookup always hits.
        let name = anime
            .get(neighbor.anime_id)
            .map(|a| a.name.as_str())
            .unwrap_or("?");
        println!(
            "{}. {} (id {}, similarity {:.3})",
            (rank + 1).to_string().green(),
            name,
            neighbor.anime_id,
            neighbor.similarity
        );
    }
    Ok(())
}

/// Handle the 'recommend' command
async fn handle_recommend(
    anime: Arc<AnimeTable>,
    ratings: Arc<RatingTable>,
    session: Vec<(AnimeId, u8)>,
    limit: usize,
    json: bool,
) -> Result<()> {
    let session: BTreeMap<AnimeId, u8> = session.into_iter().collect();
    for &anime_id in session.keys() {
        if !anime.contains(anime_id) {
            anyhow::bail!("Anime {anime_id} is not in the catalog");
        }
    }

    let recommendations = tokio::task::spawn_blocking(move || {
        RecommendationEngine::new(anime, ratings).recommend(&session)
    })
    .await
    .context("Recommendation task panicked")??;

    if json {
        println!("{}", serde_json::to_string_pretty(&recommendations)?);
        return Ok(());
    }

    println!("{}", "Recommendations:".bold().blue());
    if recommendations.is_empty() {
        println!("Nothing to recommend yet. Rate something 5 or higher first.");
        return Ok(());
    }
    for (rank, rec) in recommendations.iter().take(limit).enumerate() {
        println!(
            "{}. {} ({:.0}) - estimated rating {:.2}",
            (rank + 1).to_string().green(),
            rec.name,
            rec.year,
            rec.predicted_rating
        );
    }
    Ok(())
}

/// Handle the 'evaluate' command
async fn handle_evaluate(ratings: Arc<RatingTable>, test_fraction: f32) -> Result<()> {
    println!(
        "Evaluating on a {:.0}% holdout...",
        test_fraction * 100.0
    );
    let start = Instant::now();
    let rmse = tokio::task::spawn_blocking(move || {
        holdout_rmse(&ratings, test_fraction, &SvdConfig::default())
    })
    .await
    .context("Evaluation task panicked")??;

    println!(
        "{} Holdout RMSE: {:.4} (computed in {:?})",
        "✓".green(),
        rmse,
        start.elapsed()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_session_rating() {
        assert_eq!(parse_session_rating("20=8").unwrap(), (20, 8));
        assert_eq!(parse_session_rating(" 1 = 10 ").unwrap(), (1, 10));

        assert!(parse_session_rating("20").is_err());
        assert!(parse_session_rating("x=8").is_err());
        assert!(parse_session_rating("20=eight").is_err());
        assert!(parse_session_rating("20=0").is_err());
        assert!(parse_session_rating("20=11").is_err());
    }
}
