//! Local trailer inspection.
//!
//! Looks for the trailer already sitting next to a movie and works out what
//! it is: a file trailarr downloaded before (matched by hash), a file that
//! arrived some other way (probed now), or a file that could not be probed.

use crate::core::history::HistoryStore;
use crate::models::media::{MediaDetails, Movie};
use crate::models::trailer::TrailerRecord;
use crate::services::Prober;
use crate::utils::{fs as fs_utils, hash};
use crate::Result;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Case-insensitive marker in a trailer's file name.
const TRAILER_MARKER: &str = "-trailer";

/// What is known about an on-disk trailer.
#[derive(Debug, Clone, PartialEq)]
pub enum LocalIdentity {
    /// Its hash matches a record in the download history.
    Downloaded(TrailerRecord),
    /// Unknown to the history; probed just now.
    FoundLocally(MediaDetails),
    /// Unknown to the history and the probe failed.
    Unidentified,
}

/// A single trailer found in a movie directory.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalTrailer {
    pub path: PathBuf,
    pub hash: String,
    pub identity: LocalIdentity,
}

/// Trailer state of a movie directory.
#[derive(Debug, Clone, PartialEq)]
pub enum LocalTrailerState {
    /// No trailer file.
    Absent,
    /// More than one trailer file; needs manual cleanup.
    Ambiguous(Vec<PathBuf>),
    /// Exactly one trailer file.
    Found(LocalTrailer),
}

/// Whether `path` looks like a trailer belonging to `movie`.
fn is_trailer_file(path: &Path, movie: &Movie) -> bool {
    if path == movie.file_path {
        return false;
    }
    if !fs_utils::is_video_file(path) {
        return false;
    }
    path.file_name()
        .map(|n| n.to_string_lossy().to_lowercase().contains(TRAILER_MARKER))
        .unwrap_or(false)
}

/// List trailer files directly inside the movie directory, sorted by path.
pub fn find_trailer_files(movie: &Movie) -> Result<Vec<PathBuf>> {
    fs_utils::ensure_directory(&movie.directory)?;

    let mut found: Vec<PathBuf> = WalkDir::new(&movie.directory)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| is_trailer_file(p, movie))
        .collect();

    found.sort();
    Ok(found)
}

/// Resolve the trailer state of a movie directory.
pub async fn local_trailer(
    store: &HistoryStore,
    prober: &dyn Prober,
    movie: &Movie,
) -> Result<LocalTrailerState> {
    tracing::info!("Checking for local trailers in {:?}", movie.directory);
    let mut trailers = find_trailer_files(movie)?;

    if trailers.len() > 1 {
        let names: Vec<String> = trailers
            .iter()
            .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().to_string()))
            .collect();
        tracing::warn!(
            "Found more than one trailer file in {:?}: [{}]",
            movie.directory,
            names.join(", ")
        );
        return Ok(LocalTrailerState::Ambiguous(trailers));
    }

    let Some(path) = trailers.pop() else {
        tracing::info!("No local trailers found in {:?}", movie.directory);
        return Ok(LocalTrailerState::Absent);
    };

    tracing::info!("Found local trailer: {:?}", path);
    let owned = path.clone();
    let file_hash = tokio::task::spawn_blocking(move || hash::sha256_file(&owned))
        .await
        .map_err(|e| crate::Error::other(format!("Hash task failed: {}", e)))??;

    let identity = match store.by_hash(&file_hash) {
        Ok(Some(record)) => {
            tracing::info!("{:?} was downloaded previously", path);
            LocalIdentity::Downloaded(record)
        }
        Ok(None) => probe_unknown(prober, &path, &file_hash).await,
        Err(e) => {
            tracing::warn!("History lookup failed for {:?}: {}", path, e);
            probe_unknown(prober, &path, &file_hash).await
        }
    };

    Ok(LocalTrailerState::Found(LocalTrailer {
        path,
        hash: file_hash,
        identity,
    }))
}

async fn probe_unknown(prober: &dyn Prober, path: &Path, file_hash: &str) -> LocalIdentity {
    match prober.probe(path, Some(file_hash)).await {
        Ok(details) => LocalIdentity::FoundLocally(details),
        Err(e) => {
            tracing::error!("Failed to get details for {:?}: {}", path, e);
            LocalIdentity::Unidentified
        }
    }
}
