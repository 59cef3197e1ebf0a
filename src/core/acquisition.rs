//! Trailer acquisition.
//!
//! Downloads catalog trailers that are not in the history yet, probes them
//! and records them right away, so a crash halfway through a movie never
//! costs a second download.

use crate::core::history::HistoryStore;
use crate::models::media::Movie;
use crate::models::trailer::{Candidate, SourceVideo, TrailerRecord};
use crate::services::{Catalog, Downloader, Prober};
use crate::utils::fs as fs_utils;
use crate::Result;

/// Download and probe pipeline for one run.
pub struct Acquisition<'a> {
    store: &'a HistoryStore,
    catalog: &'a dyn Catalog,
    downloader: &'a dyn Downloader,
    prober: &'a dyn Prober,
}

impl<'a> Acquisition<'a> {
    pub fn new(
        store: &'a HistoryStore,
        catalog: &'a dyn Catalog,
        downloader: &'a dyn Downloader,
        prober: &'a dyn Prober,
    ) -> Self {
        Self {
            store,
            catalog,
            downloader,
            prober,
        }
    }

    /// Fetch every catalog trailer of `movie` not downloaded before.
    ///
    /// A candidate that fails to download or probe is logged and skipped.
    /// Only a catalog failure is returned as an error.
    pub async fn new_trailers(&self, movie: &Movie) -> Result<Vec<Candidate>> {
        tracing::info!("Checking for new trailers for {}", movie);
        let sources = self.catalog.list_trailers(movie.tmdb_id).await?;
        tracing::debug!("Catalog lists {} trailers for {}", sources.len(), movie);

        let mut candidates = Vec::new();
        for source in sources {
            if source.url.is_empty() {
                tracing::debug!("Skipping {} (unsupported site)", source.name);
                continue;
            }

            match self.store.contains(source.tmdb_id, &source.url) {
                Ok(true) => {
                    tracing::debug!("Already downloaded {}", source.url);
                    continue;
                }
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!("History lookup failed for {}: {}", source.url, e);
                    continue;
                }
            }

            match self.acquire(source).await {
                Ok(candidate) => {
                    if let Err(e) = self.store.upsert(&candidate.record) {
                        tracing::warn!("Failed to record {}: {}", candidate.record, e);
                    }
                    candidates.push(candidate);
                }
                Err(e) => tracing::warn!("Skipping trailer: {}", e),
            }
        }

        tracing::info!("Acquired {} new trailers for {}", candidates.len(), movie);
        Ok(candidates)
    }

    /// Download and probe a single source video. Nothing is recorded.
    pub async fn acquire(&self, source: SourceVideo) -> Result<Candidate> {
        tracing::info!("Downloading {}", source.url);
        let path = self.downloader.fetch(&source.url).await?;
        if !fs_utils::is_video_file(&path) {
            return Err(crate::Error::Download(format!(
                "{}: {:?} is not a video file",
                source.url, path
            )));
        }

        tracing::debug!("Probing {:?}", path);
        let details = self.prober.probe(&path, None).await?;

        Ok(Candidate {
            record: TrailerRecord::new(source, details),
            path,
        })
    }
}
