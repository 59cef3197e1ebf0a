//! Sync command implementation.

use super::build_engine;
use crate::core::sync::{SyncOutcome, SyncSummary};
use crate::models::config::Config;
use crate::services::radarr::RadarrClient;
use crate::services::MediaManager;
use crate::Result;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

/// Colored one-line rendering of an outcome.
pub fn describe(result: &Result<SyncOutcome>) -> String {
    match result {
        Ok(outcome @ SyncOutcome::Updated { .. }) => outcome.to_string().green().to_string(),
        Ok(outcome @ SyncOutcome::AlreadyCurrent) => outcome.to_string().dimmed().to_string(),
        Ok(outcome @ SyncOutcome::NoTrailerAvailable) => outcome.to_string().yellow().to_string(),
        Ok(outcome @ SyncOutcome::AmbiguousLocalState) => outcome.to_string().yellow().to_string(),
        Ok(outcome) => outcome.to_string().red().to_string(),
        Err(e) => e.to_string().red().to_string(),
    }
}

/// Synchronize one movie looked up in Radarr.
pub async fn sync_movie(config: &Config, tmdb_id: u64) -> Result<SyncOutcome> {
    let radarr = RadarrClient::from_config(&config.radarr)?;
    let Some(movie) = radarr.get_movie(tmdb_id).await? else {
        return Err(crate::Error::MediaManager(format!(
            "no downloaded movie with tmdb id {}",
            tmdb_id
        )));
    };

    let engine = build_engine(config)?;
    let result = engine.process_movie(&movie).await;
    engine.clear_scratch();

    println!("{} {}", movie.to_string().bold(), describe(&result));
    result
}

/// Synchronize every movie Radarr has a file for.
pub async fn sync_all(config: &Config) -> Result<SyncSummary> {
    let radarr = RadarrClient::from_config(&config.radarr)?;
    let movies = radarr.list_managed_movies().await?;
    let engine = build_engine(config)?;

    println!(
        "{} {} movies",
        "[SYNC]".bold().cyan(),
        movies.len()
    );

    let pb = ProgressBar::new(movies.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("=>-"),
    );

    let summary = engine
        .process_all(&movies, |movie, result| {
            pb.println(format!("{} {}", movie.to_string().bold(), describe(result)));
            pb.set_message(movie.title.clone());
            pb.inc(1);
        })
        .await;
    pb.finish_and_clear();

    println!();
    println!("{}", "Summary".bold());
    println!("  Updated:            {}", summary.updated.to_string().green());
    println!("  Already current:    {}", summary.current);
    println!("  No trailer:         {}", summary.unavailable.to_string().yellow());
    println!("  Multiple trailers:  {}", summary.ambiguous.to_string().yellow());
    println!("  Failed:             {}", summary.failed.to_string().red());

    Ok(summary)
}
