//! Error types for trailarr.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for trailarr.
#[derive(Error, Debug)]
pub enum Error {
    // Preflight errors
    #[error("ffprobe not found. Install FFmpeg: sudo apt install ffmpeg")]
    FfprobeNotFound,

    #[error("yt-dlp not found. Install with: pip install yt-dlp")]
    YtDlpNotFound,

    #[error("TMDB API key not configured. Set TMDB_API_KEY environment variable")]
    TmdbApiKeyMissing,

    #[error("Radarr connection not configured: {0}")]
    RadarrNotConfigured(String),

    // File system errors
    #[error("Path not found: {0}")]
    PathNotFound(String),

    #[error("Not a directory: {0}")]
    NotADirectory(String),

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    Config(String),

    // Catalog errors
    #[error("Catalog request timed out: {0}")]
    TransientNetwork(String),

    #[error("Catalog request failed: {0}")]
    Catalog(String),

    #[error("Radarr request failed: {0}")]
    MediaManager(String),

    // Tool failures
    #[error("Download failed: {0}")]
    Download(String),

    #[error("Probe failed: {0}")]
    Probe(String),

    // Library host errors
    #[error("Kodi request failed: {0}")]
    HostRpc(String),

    #[error("No path mapping matches: {0}")]
    UnmappedPath(String),

    // Persistence errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // HTTP errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Generic errors
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a generic error from a string.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }
}
