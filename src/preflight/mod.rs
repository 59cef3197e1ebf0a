//! Preflight checks module.
//!
//! Everything a hook run depends on, checked up front. Radarr runs these
//! when the user presses "Test" on the custom script connection.

mod ffprobe;
mod kodi;
mod radarr;
mod storage;
mod tmdb;
mod ytdlp;

use crate::models::config::Config;
use colored::Colorize;

/// Result of a preflight check.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub success: bool,
    pub message: String,
    pub hint: Option<String>,
}

impl CheckResult {
    pub fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            success: true,
            message: message.to_string(),
            hint: None,
        }
    }

    pub fn fail(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            success: false,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }
}

/// Run all preflight checks.
pub async fn run_preflight_checks(config: &Config) -> Vec<CheckResult> {
    let mut results = vec![
        storage::check_scratch(&config.general.scratch_dir),
        storage::check_database(&config.general.database),
        ytdlp::check(),
        ffprobe::check(),
        radarr::check(&config.radarr).await,
        tmdb::check(&config.tmdb).await,
    ];

    // Kodi is optional
    if config.kodi.enabled {
        results.push(kodi::check(&config.kodi).await);
    }

    for result in &results {
        if result.success {
            tracing::info!("{}: {}", result.name, result.message);
        } else {
            tracing::error!("{}: {}", result.name, result.message);
        }
    }

    results
}

/// Print preflight check results.
pub fn print_results(results: &[CheckResult]) {
    for result in results {
        if result.success {
            println!(
                "{} {}: {}",
                "[OK]".green(),
                result.name.bold(),
                result.message
            );
        } else {
            println!(
                "{} {}: {}",
                "[FAIL]".red(),
                result.name.bold(),
                result.message
            );
            if let Some(ref hint) = result.hint {
                println!("  {} {}", "->".yellow(), hint);
            }
        }
    }
}

/// Check if all preflight checks passed.
pub fn all_passed(results: &[CheckResult]) -> bool {
    results.iter().all(|r| r.success)
}
