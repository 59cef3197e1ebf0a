//! Media-related data models.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A movie tracked by Radarr.
///
/// Rebuilt on every run from Radarr or from the hook environment; never
/// persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    /// TMDB ID.
    pub tmdb_id: u64,
    /// Movie title.
    pub title: String,
    /// Release year.
    pub year: Option<u16>,
    /// Movie directory inside the library.
    pub directory: PathBuf,
    /// Path to the movie's own media file.
    pub file_path: PathBuf,
}

impl Movie {
    /// File stem of the media file, used to derive the trailer name.
    pub fn file_stem(&self) -> String {
        self.file_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| self.title.clone())
    }

    /// Name the trailer must carry: `<movie-stem>-trailer<ext>`.
    pub fn trailer_file_name(&self, extension: Option<&str>) -> String {
        match extension {
            Some(ext) if !ext.is_empty() => format!("{}-trailer.{}", self.file_stem(), ext),
            _ => format!("{}-trailer", self.file_stem()),
        }
    }
}

impl std::fmt::Display for Movie {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.year {
            Some(year) => write!(f, "{} ({})", self.title, year),
            None => write!(f, "{}", self.title),
        }
    }
}

/// Technical metadata extracted from a video file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaDetails {
    /// Missing an audio or a video stream.
    pub broken: bool,
    /// Content hash (hex SHA-256).
    pub hash: String,
    pub height: Option<u32>,
    pub width: Option<u32>,
    /// Duration in seconds.
    pub duration: Option<f64>,
    /// Frame count of the first video stream.
    pub frames: Option<u64>,
    /// Overall bitrate in bits per second.
    pub bitrate: Option<u64>,
    /// Codec of the first video stream (e.g., "h264", "vp9").
    pub codec: Option<String>,
}

/// A movie as Kodi's video library knows it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostMovie {
    /// Kodi's library ID.
    pub movie_id: u64,
    pub title: String,
    pub year: Option<u16>,
    /// Media file path in Kodi's view.
    pub file: String,
    /// Trailer path in Kodi's view, if any is set.
    pub trailer: Option<String>,
}

impl std::fmt::Display for HostMovie {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.year {
            Some(year) => write!(f, "{} ({})", self.title, year),
            None => write!(f, "{}", self.title),
        }
    }
}
