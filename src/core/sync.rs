//! Trailer synchronization.
//!
//! Drives one movie at a time from whatever is on disk to exactly one best
//! trailer, correctly named and registered with the library host:
//!
//! 1. Inspect the movie directory (stop on ambiguity).
//! 2. Acquire catalog trailers not downloaded before.
//! 3. Select the best cached trailer.
//! 4. Keep, rename or replace the local trailer.
//! 5. Point the library host at the result.

use crate::core::acquisition::Acquisition;
use crate::core::history::HistoryStore;
use crate::core::inspector::{self, LocalTrailer, LocalTrailerState};
use crate::core::path_map::{PathMapper, PathRewrite};
use crate::core::selector;
use crate::models::media::Movie;
use crate::models::trailer::Candidate;
use crate::services::{Catalog, Downloader, LibraryHost, Prober};
use crate::utils::fs as fs_utils;
use crate::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// How a movie ended up after [`TrailerSync::process_movie`].
#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    /// Nothing usable in the catalog or the history.
    NoTrailerAvailable,
    /// The best trailer is already in place under the right name.
    AlreadyCurrent,
    /// A trailer was placed or renamed.
    Updated {
        path: PathBuf,
        /// The library host now points at the trailer.
        registered: bool,
    },
    /// The best trailer could not be fetched again.
    DownloadFailed,
    /// The trailer could not be moved into the movie directory.
    MoveFailed,
    /// More than one trailer file in the movie directory; left untouched.
    AmbiguousLocalState,
}

impl std::fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncOutcome::NoTrailerAvailable => write!(f, "no trailer available"),
            SyncOutcome::AlreadyCurrent => write!(f, "already current"),
            SyncOutcome::Updated { path, registered } => {
                write!(f, "updated {}", path.display())?;
                if *registered {
                    write!(f, " (registered)")?;
                }
                Ok(())
            }
            SyncOutcome::DownloadFailed => write!(f, "download failed"),
            SyncOutcome::MoveFailed => write!(f, "move failed"),
            SyncOutcome::AmbiguousLocalState => write!(f, "multiple local trailers"),
        }
    }
}

/// Counts of outcomes over a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub updated: usize,
    pub current: usize,
    pub unavailable: usize,
    pub ambiguous: usize,
    pub failed: usize,
}

impl SyncSummary {
    pub fn record(&mut self, result: &Result<SyncOutcome>) {
        match result {
            Ok(SyncOutcome::Updated { .. }) => self.updated += 1,
            Ok(SyncOutcome::AlreadyCurrent) => self.current += 1,
            Ok(SyncOutcome::NoTrailerAvailable) => self.unavailable += 1,
            Ok(SyncOutcome::AmbiguousLocalState) => self.ambiguous += 1,
            Ok(SyncOutcome::DownloadFailed) | Ok(SyncOutcome::MoveFailed) | Err(_) => {
                self.failed += 1
            }
        }
    }

    pub fn total(&self) -> usize {
        self.updated + self.current + self.unavailable + self.ambiguous + self.failed
    }
}

/// Library host registration settings.
pub struct HostRegistration {
    pub host: Arc<dyn LibraryHost>,
    pub path_maps: Vec<PathRewrite>,
    /// Refuse to register paths no rewrite matches.
    pub strict: bool,
    /// Show a notification after registering.
    pub notify: bool,
}

/// Per-movie synchronization engine.
pub struct TrailerSync {
    store: HistoryStore,
    catalog: Arc<dyn Catalog>,
    downloader: Arc<dyn Downloader>,
    prober: Arc<dyn Prober>,
    host: Option<HostRegistration>,
    scratch_dir: PathBuf,
}

impl TrailerSync {
    pub fn new(
        store: HistoryStore,
        catalog: Arc<dyn Catalog>,
        downloader: Arc<dyn Downloader>,
        prober: Arc<dyn Prober>,
        scratch_dir: PathBuf,
    ) -> Self {
        Self {
            store,
            catalog,
            downloader,
            prober,
            host: None,
            scratch_dir,
        }
    }

    /// Register trailers with a library host.
    pub fn with_host(mut self, registration: HostRegistration) -> Self {
        self.host = Some(registration);
        self
    }

    pub fn store(&self) -> &HistoryStore {
        &self.store
    }

    fn acquisition(&self) -> Acquisition<'_> {
        Acquisition::new(
            &self.store,
            self.catalog.as_ref(),
            self.downloader.as_ref(),
            self.prober.as_ref(),
        )
    }

    /// Bring one movie's trailer up to date.
    pub async fn process_movie(&self, movie: &Movie) -> Result<SyncOutcome> {
        tracing::info!("Processing movie: {}", movie);

        let local = match inspector::local_trailer(&self.store, self.prober.as_ref(), movie).await? {
            LocalTrailerState::Ambiguous(_) => {
                tracing::warn!("Skipping {}: remove the extra trailer files first", movie);
                return Ok(SyncOutcome::AmbiguousLocalState);
            }
            LocalTrailerState::Absent => None,
            LocalTrailerState::Found(trailer) => Some(trailer),
        };

        let acquisition = self.acquisition();
        let fresh = match acquisition.new_trailers(movie).await {
            Ok(candidates) => candidates,
            Err(e) => {
                tracing::warn!("Could not list trailers for {}: {}", movie, e);
                Vec::new()
            }
        };

        let Some(mut best) = selector::best_trailer(&self.store, movie.tmdb_id)? else {
            tracing::warn!("No trailers listed for {}", movie);
            return Ok(SyncOutcome::NoTrailerAvailable);
        };
        tracing::info!("Best trailer: {}", best);

        if let Some(local) = local.as_ref().filter(|l| l.hash == best.hash()) {
            tracing::info!("Best trailer is already in place for {}", movie);
            return Ok(self.ensure_name(movie, local).await);
        }

        let candidate = match fresh.into_iter().find(|c| c.record.same_content(&best)) {
            Some(candidate) => candidate,
            None => {
                tracing::info!("Downloading best trailer again: {}", best.url());
                let mut candidate = match acquisition.acquire(best.source.clone()).await {
                    Ok(candidate) => candidate,
                    Err(e) => {
                        tracing::warn!("Failed to download best trailer for {}: {}", movie, e);
                        return Ok(SyncOutcome::DownloadFailed);
                    }
                };
                candidate.record.forced = best.forced;
                if let Err(e) = self.store.upsert(&candidate.record) {
                    tracing::warn!("Failed to record {}: {}", candidate.record, e);
                }
                best = candidate.record.clone();
                candidate
            }
        };
        tracing::debug!("Placing {} from {:?}", best, candidate.path);

        Ok(self.replace(movie, local.as_ref(), candidate).await)
    }

    /// Rename a local trailer that already holds the best content.
    async fn ensure_name(&self, movie: &Movie, local: &LocalTrailer) -> SyncOutcome {
        let target = trailer_target(movie, &local.path);
        if target == local.path {
            return SyncOutcome::AlreadyCurrent;
        }

        tracing::info!("Renaming {:?} to {:?}", local.path, target);
        if let Err(e) = fs_utils::move_file(&local.path, &target) {
            tracing::error!("Failed to rename {:?}: {}", local.path, e);
            return SyncOutcome::MoveFailed;
        }

        let registered = self.register(movie, &target).await;
        SyncOutcome::Updated {
            path: target,
            registered,
        }
    }

    /// Swap the local trailer (if any) for a candidate.
    async fn replace(
        &self,
        movie: &Movie,
        local: Option<&LocalTrailer>,
        candidate: Candidate,
    ) -> SyncOutcome {
        if let Some(old) = local {
            tracing::info!("Deleting old trailer: {:?}", old.path);
            if let Err(e) = std::fs::remove_file(&old.path) {
                tracing::error!("Failed to delete {:?}: {}", old.path, e);
                return SyncOutcome::MoveFailed;
            }
        }

        let target = trailer_target(movie, &candidate.path);
        tracing::info!("Moving trailer to {:?}", target);
        if let Err(e) = fs_utils::move_file(&candidate.path, &target) {
            tracing::error!("Failed to move {:?}: {}", candidate.path, e);
            return SyncOutcome::MoveFailed;
        }

        let registered = self.register(movie, &target).await;
        SyncOutcome::Updated {
            path: target,
            registered,
        }
    }

    /// Point the library host at `trailer`. Failures are logged, never raised.
    async fn register(&self, movie: &Movie, trailer: &Path) -> bool {
        let Some(registration) = &self.host else {
            tracing::debug!("No library host configured, skipping registration");
            return false;
        };

        match register_with(registration, movie, trailer).await {
            Ok(registered) => registered,
            Err(e) => {
                tracing::warn!("Failed to register trailer for {}: {}", movie, e);
                false
            }
        }
    }

    /// Process movies one after another. The scratch directory is emptied
    /// after each movie and one movie's error never stops the batch.
    pub async fn process_all<F>(&self, movies: &[Movie], mut on_done: F) -> SyncSummary
    where
        F: FnMut(&Movie, &Result<SyncOutcome>),
    {
        let mut summary = SyncSummary::default();

        for movie in movies {
            let result = self.process_movie(movie).await;
            match &result {
                Ok(outcome) => tracing::info!("{}: {}", movie, outcome),
                Err(e) => tracing::error!("{}: {}", movie, e),
            }
            summary.record(&result);
            on_done(movie, &result);
            self.clear_scratch();
        }

        tracing::info!(
            "Processed {} movies: {} updated, {} current, {} without trailers, {} ambiguous, {} failed",
            summary.total(),
            summary.updated,
            summary.current,
            summary.unavailable,
            summary.ambiguous,
            summary.failed
        );
        summary
    }

    /// Remove leftover downloads from the scratch directory.
    pub fn clear_scratch(&self) {
        match fs_utils::clear_directory(&self.scratch_dir) {
            Ok(0) => {}
            Ok(n) => tracing::debug!("Removed {} files from {:?}", n, self.scratch_dir),
            Err(e) => tracing::warn!("Failed to clean {:?}: {}", self.scratch_dir, e),
        }
    }

    /// Drop every history record of a movie.
    pub fn forget(&self, tmdb_id: u64) -> Result<usize> {
        tracing::info!("Removing unused trailers for tmdb {}", tmdb_id);
        self.store.delete(tmdb_id)
    }
}

/// Where a trailer file belongs: `<movie-stem>-trailer<ext>` in the movie
/// directory, keeping the extension of `source`.
fn trailer_target(movie: &Movie, source: &Path) -> PathBuf {
    let ext = source.extension().and_then(|e| e.to_str());
    movie.directory.join(movie.trailer_file_name(ext))
}

async fn register_with(
    registration: &HostRegistration,
    movie: &Movie,
    trailer: &Path,
) -> Result<bool> {
    let host = registration.host.as_ref();
    let mapper = PathMapper::new(registration.path_maps.clone(), host.path_syntax().await)
        .strict(registration.strict);

    let remote_file = mapper.to_remote_checked(&movie.file_path)?;
    let Some(host_movie) = host.find_movie_by_file(&remote_file).await? else {
        tracing::warn!("Library host does not have {} ({})", movie, remote_file);
        return Ok(false);
    };

    let remote_trailer = mapper.to_remote_checked(trailer)?;
    host.set_trailer_path(host_movie.movie_id, &remote_trailer).await?;
    tracing::info!("Registered {} for {}", remote_trailer, host_movie.title);

    if registration.notify {
        if let Err(e) = host.notify("New Trailer Added", &movie.to_string()).await {
            tracing::warn!("Failed to send notification: {}", e);
        }
    }

    Ok(true)
}
