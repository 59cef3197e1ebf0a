//! Integration tests for Radarr custom-script events.

mod common;

use common::source;
use tempfile::TempDir;
use trailarr::cli::commands::hook::handle_event;
use trailarr::core::history::HistoryStore;
use trailarr::models::config::Config;
use trailarr::models::hook::HookEnvironment;
use trailarr::models::media::MediaDetails;
use trailarr::models::trailer::TrailerRecord;

fn config(dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.general.database = dir.path().join("trailarr.db");
    config.general.scratch_dir = dir.path().join("temp");
    config.general.log_dir = dir.path().join("logs");
    config
}

fn seed(config: &Config, tmdb_id: u64) {
    let store = HistoryStore::open(&config.general.database).unwrap();
    let details = MediaDetails {
        hash: "h".to_string(),
        ..MediaDetails::default()
    };
    store
        .upsert(&TrailerRecord::new(source(tmdb_id, "https://vimeo.com/1"), details))
        .unwrap();
}

fn records(config: &Config, tmdb_id: u64) -> usize {
    HistoryStore::open(&config.general.database)
        .unwrap()
        .by_tmdb_id(tmdb_id)
        .unwrap()
        .len()
}

fn env(vars: &[(&str, &str)]) -> HookEnvironment {
    HookEnvironment::from_vars(vars.iter().copied()).unwrap()
}

#[tokio::test]
async fn test_movie_delete_forgets_history() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);
    seed(&config, 550);

    let env = env(&[("radarr_eventtype", "MovieDelete"), ("radarr_movie_tmdbid", "550")]);
    handle_event(&config, &env).await.unwrap();
    assert_eq!(records(&config, 550), 0);
}

#[tokio::test]
async fn test_file_delete_forgets_unless_upgrade() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);
    seed(&config, 550);

    let upgrade = env(&[
        ("radarr_eventtype", "MovieFileDelete"),
        ("radarr_movie_tmdbid", "550"),
        ("radarr_moviefile_deletereason", "Upgrade"),
    ]);
    handle_event(&config, &upgrade).await.unwrap();
    assert_eq!(records(&config, 550), 1);

    let manual = env(&[
        ("radarr_eventtype", "MovieFileDelete"),
        ("radarr_movie_tmdbid", "550"),
        ("radarr_moviefile_deletereason", "Manual"),
    ]);
    handle_event(&config, &manual).await.unwrap();
    assert_eq!(records(&config, 550), 0);
}

#[tokio::test]
async fn test_unsupported_event() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);

    let grab = env(&[("radarr_eventtype", "Grab"), ("radarr_movie_tmdbid", "550")]);
    assert!(handle_event(&config, &grab).await.is_err());

    let odd = env(&[("radarr_eventtype", "Teleport")]);
    assert!(handle_event(&config, &odd).await.is_err());
}

#[tokio::test]
async fn test_missing_event_or_movie() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);

    assert!(handle_event(&config, &HookEnvironment::default()).await.is_err());

    // Download without the movie paths
    let download = env(&[("radarr_eventtype", "Download"), ("radarr_movie_tmdbid", "550")]);
    assert!(matches!(
        handle_event(&config, &download).await,
        Err(trailarr::Error::Config(_))
    ));

    let delete = env(&[("radarr_eventtype", "MovieDelete")]);
    assert!(handle_event(&config, &delete).await.is_err());
}
