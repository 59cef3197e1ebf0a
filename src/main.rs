//! Trailarr CLI
//!
//! Keeps the best available trailer next to every movie Radarr manages and
//! points Kodi at it. Runs as a Radarr custom script or by hand.

use clap::Parser;
use std::path::Path;
use trailarr::cli::{
    args::{Cli, Commands, HistoryAction},
    commands::{check, history, hook, sync},
};
use trailarr::models::config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    let config = config::load_config(cli.config.as_deref())?;

    // Initialize logging; the guard flushes the log file on exit
    let _guard = init_logging(cli.verbose, &config.general.log_dir);

    match cli.command {
        None => {
            hook::run(&config).await?;
        }

        Some(Commands::Sync { tmdb, all }) => match (tmdb, all) {
            (Some(tmdb_id), _) => {
                sync::sync_movie(&config, tmdb_id).await?;
            }
            (None, true) => {
                sync::sync_all(&config).await?;
            }
            (None, false) => anyhow::bail!("Pass --tmdb <ID> or --all"),
        },

        Some(Commands::Check) => {
            if !check::check(&config).await? {
                anyhow::bail!("Preflight checks failed");
            }
        }

        Some(Commands::History { action }) => match action {
            HistoryAction::List { tmdb } => history::list(&config, tmdb)?,
            HistoryAction::Force { tmdb, url } => history::force(&config, tmdb, &url)?,
            HistoryAction::Unforce { tmdb } => history::unforce(&config, tmdb)?,
            HistoryAction::Forget { tmdb } => history::forget(&config, tmdb)?,
        },
    }

    Ok(())
}

/// Initialize the logging system.
///
/// Console output plus a daily rolling file, since hook runs have no
/// terminal. Falls back to console only when the log directory is unusable.
fn init_logging(
    verbose: bool,
    log_dir: &Path,
) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("trailarr=debug")
    } else {
        EnvFilter::new("trailarr=info")
    };

    let console = fmt::layer().with_target(false).without_time();

    match std::fs::create_dir_all(log_dir) {
        Ok(()) => {
            let appender = tracing_appender::rolling::daily(log_dir, "trailarr.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(console)
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .with(filter)
                .init();
            Some(guard)
        }
        Err(e) => {
            tracing_subscriber::registry().with(console).with(filter).init();
            tracing::warn!("Logging to console only, cannot create {:?}: {}", log_dir, e);
            None
        }
    }
}
