//! Trailer data models.

use super::media::MediaDetails;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A video listed by TMDB for a movie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceVideo {
    /// TMDB ID of the movie this video belongs to.
    pub tmdb_id: u64,
    /// Playable URL (YouTube or Vimeo).
    pub url: String,
    /// ISO 639-1 language code.
    pub language: String,
    /// ISO 3166-1 region code.
    pub region: String,
    /// Display name.
    pub name: String,
    /// Video kind as TMDB reports it (e.g., "Trailer", "Teaser").
    pub kind: String,
    /// Published by the studio.
    pub official: bool,
}

/// One row of the download history.
///
/// Persisted under `(tmdb_id, url)`; two records hold the same content when
/// their hashes match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrailerRecord {
    pub source: SourceVideo,
    pub details: MediaDetails,
    /// Manual override, always preferred over score-based ranking.
    pub forced: bool,
}

impl TrailerRecord {
    /// Create a non-forced record.
    pub fn new(source: SourceVideo, details: MediaDetails) -> Self {
        Self {
            source,
            details,
            forced: false,
        }
    }

    pub fn tmdb_id(&self) -> u64 {
        self.source.tmdb_id
    }

    pub fn url(&self) -> &str {
        &self.source.url
    }

    pub fn hash(&self) -> &str {
        &self.details.hash
    }

    /// Whether both records hold the same file content.
    pub fn same_content(&self, other: &TrailerRecord) -> bool {
        !self.details.hash.is_empty() && self.details.hash == other.details.hash
    }
}

impl std::fmt::Display for TrailerRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.source.name, self.source.url)
    }
}

/// A freshly downloaded trailer waiting in the scratch directory.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub record: TrailerRecord,
    /// Location of the downloaded file.
    pub path: PathBuf,
}
