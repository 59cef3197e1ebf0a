//! CLI command implementations.

pub mod check;
pub mod history;
pub mod hook;
pub mod sync;

use crate::core::history::HistoryStore;
use crate::core::path_map::PathRewrite;
use crate::core::sync::{HostRegistration, TrailerSync};
use crate::models::config::Config;
use crate::services::ffprobe::FfprobeProber;
use crate::services::kodi::KodiClient;
use crate::services::tmdb::TmdbClient;
use crate::services::ytdlp::YtDlp;
use crate::Result;
use std::sync::Arc;

/// Open the download history configured in `config`.
pub fn open_store(config: &Config) -> Result<HistoryStore> {
    tracing::debug!("Opening history at {:?}", config.general.database);
    HistoryStore::open(&config.general.database)
}

/// Wire the sync engine to the production collaborators.
pub fn build_engine(config: &Config) -> Result<TrailerSync> {
    let scratch_dir = config.general.scratch_dir.clone();
    std::fs::create_dir_all(&scratch_dir)?;

    let engine = TrailerSync::new(
        open_store(config)?,
        Arc::new(TmdbClient::new(&config.tmdb)?),
        Arc::new(YtDlp::new(scratch_dir.clone())),
        Arc::new(FfprobeProber::new()),
        scratch_dir,
    );

    if !config.kodi.enabled {
        tracing::debug!("Kodi is not configured, trailers will not be registered");
        return Ok(engine);
    }

    let kodi = &config.kodi;
    Ok(engine.with_host(HostRegistration {
        host: Arc::new(KodiClient::new(kodi)?),
        path_maps: kodi.path_maps.iter().map(PathRewrite::from).collect(),
        strict: kodi.strict_path_maps,
        notify: kodi.notify,
    }))
}
