//! Radarr custom-script mode.
//!
//! Radarr runs trailarr without arguments and describes the event in the
//! environment. Download and Rename sync the movie, deletions drop its
//! history, Test runs the preflight checks.

use super::{build_engine, check, open_store};
use crate::models::config::Config;
use crate::models::hook::{HookEnvironment, HookEvent};
use crate::services::radarr::RadarrClient;
use crate::services::MediaManager;
use crate::Result;

/// Handle the event described by the process environment.
pub async fn run(config: &Config) -> Result<()> {
    let env = HookEnvironment::from_env()?;
    handle_event(config, &env).await
}

/// Handle one Radarr event.
pub async fn handle_event(config: &Config, env: &HookEnvironment) -> Result<()> {
    let Some(event) = &env.event else {
        return Err(crate::Error::Config(
            "radarr_eventtype is not set. Run from Radarr or use a subcommand (see --help)"
                .to_string(),
        ));
    };
    tracing::info!("Called from Radarr: {}", event);

    match event {
        HookEvent::Download => {
            let movie = env.movie()?;
            sync(config, movie).await
        }
        HookEvent::Rename => {
            let tmdb_id = env.require_tmdb_id()?;
            let radarr = RadarrClient::from_config(&config.radarr)?;
            match radarr.get_movie(tmdb_id).await? {
                Some(movie) => sync(config, movie).await,
                None => {
                    tracing::warn!("Radarr has no downloaded movie with tmdb {}", tmdb_id);
                    Ok(())
                }
            }
        }
        HookEvent::MovieFileDelete if env.is_upgrade_delete() => {
            tracing::info!("Movie file replaced by an upgrade, keeping history");
            Ok(())
        }
        HookEvent::MovieFileDelete | HookEvent::MovieDelete => {
            let tmdb_id = env.require_tmdb_id()?;
            tracing::info!("Removing unused trailers for tmdb {}", tmdb_id);
            open_store(config)?.delete(tmdb_id)?;
            Ok(())
        }
        HookEvent::Test => {
            if check::check(config).await? {
                Ok(())
            } else {
                Err(crate::Error::other("Preflight checks failed"))
            }
        }
        other => Err(crate::Error::other(format!(
            "Unsupported event type '{}'. Allowed events: Download, Rename, MovieFileDelete, MovieDelete, Test",
            other
        ))),
    }
}

async fn sync(config: &Config, movie: crate::models::media::Movie) -> Result<()> {
    let engine = build_engine(config)?;
    let result = engine.process_movie(&movie).await;
    engine.clear_scratch();

    let outcome = result?;
    tracing::info!("{}: {}", movie, outcome);
    Ok(())
}
