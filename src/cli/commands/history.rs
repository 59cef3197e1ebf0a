//! History command implementation.

use super::open_store;
use crate::core::quality;
use crate::models::config::Config;
use crate::models::trailer::TrailerRecord;
use crate::Result;
use colored::Colorize;

/// List a movie's downloaded trailers, best first.
pub fn list(config: &Config, tmdb_id: u64) -> Result<()> {
    let store = open_store(config)?;
    let mut records = store.by_tmdb_id(tmdb_id)?;

    if records.is_empty() {
        println!("No trailers downloaded for tmdb {}.", tmdb_id);
        return Ok(());
    }

    records.sort_by(quality::compare);

    println!(
        "{:<3} {:<10} {:<8} {:<6} {:<6} {:<9} {}",
        "".bold(),
        "Score".bold(),
        "Size".bold(),
        "Codec".bold(),
        "FPS".bold(),
        "Duration".bold(),
        "Trailer".bold()
    );
    println!("{}", "-".repeat(80));

    for record in &records {
        let marker = if record.forced {
            "*".green().bold().to_string()
        } else if record.details.broken {
            "x".red().to_string()
        } else {
            " ".to_string()
        };
        let size = match (record.details.width, record.details.height) {
            (Some(w), Some(h)) => format!("{}x{}", w, h),
            _ => "?".to_string(),
        };
        let duration = record
            .details
            .duration
            .map(|d| format!("{:.0}s", d))
            .unwrap_or_else(|| "?".to_string());
        let fps = fps_column(record);

        println!(
            "{:<3} {:<10.4} {:<8} {:<6} {:<6} {:<9} {}",
            marker,
            quality::quality_score(record),
            size,
            record.details.codec.as_deref().unwrap_or("?"),
            fps,
            duration,
            record
        );
    }

    println!();
    println!("* forced   x broken");
    Ok(())
}

fn fps_column(record: &TrailerRecord) -> String {
    match quality::frame_rate(record) {
        r if r > 0.0 => format!("{:.2}", r),
        _ => "?".to_string(),
    }
}

/// Force one trailer for a movie.
pub fn force(config: &Config, tmdb_id: u64, url: &str) -> Result<()> {
    let store = open_store(config)?;
    if !store.set_forced(tmdb_id, url)? {
        return Err(crate::Error::other(format!(
            "No downloaded trailer {} for tmdb {}",
            url, tmdb_id
        )));
    }
    tracing::info!("Forced {} for tmdb {}", url, tmdb_id);
    println!("{} {} is now forced for tmdb {}", "[OK]".green(), url, tmdb_id);
    Ok(())
}

/// Clear the forced flag of a movie's trailers.
pub fn unforce(config: &Config, tmdb_id: u64) -> Result<()> {
    open_store(config)?.clear_forced(tmdb_id)?;
    println!("{} tmdb {} uses quality ranking again", "[OK]".green(), tmdb_id);
    Ok(())
}

/// Drop a movie's history.
pub fn forget(config: &Config, tmdb_id: u64) -> Result<()> {
    let removed = open_store(config)?.delete(tmdb_id)?;
    println!("{} Removed {} records for tmdb {}", "[OK]".green(), removed, tmdb_id);
    Ok(())
}
