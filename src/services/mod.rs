//! External collaborators.
//!
//! The sync engine only talks to these traits. Each submodule provides the
//! production implementation backed by the real tool or API.

pub mod ffprobe;
pub mod kodi;
pub mod radarr;
pub mod tmdb;
pub mod ytdlp;

use crate::core::path_map::PathSyntax;
use crate::models::media::{HostMovie, MediaDetails, Movie};
use crate::models::trailer::SourceVideo;
use crate::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Source of candidate trailer videos.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// All trailer-type videos listed for a movie.
    async fn list_trailers(&self, tmdb_id: u64) -> Result<Vec<SourceVideo>>;
}

/// Owner of the authoritative movie list.
#[async_trait]
pub trait MediaManager: Send + Sync {
    /// Every movie that has a media file on disk.
    async fn list_managed_movies(&self) -> Result<Vec<Movie>>;

    /// Look up one movie by TMDB ID.
    async fn get_movie(&self, tmdb_id: u64) -> Result<Option<Movie>>;
}

/// Fetches a video URL into a local file.
#[async_trait]
pub trait Downloader: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<PathBuf>;
}

/// Extracts technical metadata from a video file.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Probe `path`. When the content hash is already known it is reused
    /// instead of hashing the file again.
    async fn probe(&self, path: &Path, known_hash: Option<&str>) -> Result<MediaDetails>;
}

/// Media library that must point at the trailer.
#[async_trait]
pub trait LibraryHost: Send + Sync {
    /// Path convention of the host. Implementations query it once and cache it.
    async fn path_syntax(&self) -> PathSyntax;

    /// Find the library entry whose media file is `remote_path`.
    async fn find_movie_by_file(&self, remote_path: &str) -> Result<Option<HostMovie>>;

    /// Point a library entry at a trailer.
    async fn set_trailer_path(&self, movie_id: u64, remote_path: &str) -> Result<()>;

    /// Show a notification in the host's UI.
    async fn notify(&self, title: &str, message: &str) -> Result<()>;
}
