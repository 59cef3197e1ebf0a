//! Configuration model.
//!
//! Loaded from `<config_dir>/trailarr/config.toml` unless a path is given.
//! Unknown keys and malformed values are rejected rather than defaulted.

use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Paths and logging.
    pub general: GeneralConfig,
    /// TMDB configuration.
    pub tmdb: TmdbConfig,
    /// Radarr configuration.
    pub radarr: RadarrConfig,
    /// Kodi configuration.
    pub kodi: KodiConfig,
}

/// Paths and logging.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneralConfig {
    /// Directory for the rolling log file.
    pub log_dir: PathBuf,
    /// Download history database.
    pub database: PathBuf,
    /// Where candidates are downloaded before being moved.
    pub scratch_dir: PathBuf,
}

/// TMDB configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TmdbConfig {
    /// API key or Bearer token.
    pub api_key: Option<String>,
    /// Restrict listed videos to one language (ISO 639-1).
    pub language: Option<String>,
    /// Request timeout in seconds.
    pub timeout: u64,
}

/// Radarr configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RadarrConfig {
    /// Base URL, e.g. `http://127.0.0.1:7878`.
    pub url: Option<String>,
    /// API key.
    pub api_key: Option<String>,
    /// Radarr's own `config.xml`, read when `url` or `api_key` is missing.
    pub config_xml: Option<PathBuf>,
    /// Request timeout in seconds.
    pub timeout: u64,
}

/// Kodi configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KodiConfig {
    /// Register trailers with Kodi.
    pub enabled: bool,
    /// Friendly host name used in logs.
    pub name: String,
    /// Kodi host.
    pub host: String,
    /// Kodi web server port.
    pub port: u16,
    pub user: Option<String>,
    pub password: Option<String>,
    /// Show a GUI notification after a trailer changes.
    pub notify: bool,
    /// Fail registration instead of passing unmapped paths through.
    pub strict_path_maps: bool,
    /// Ordered prefix rewrites from local paths to Kodi paths.
    pub path_maps: Vec<PathMapConfig>,
    /// Request timeout in seconds.
    pub timeout: u64,
}

/// One prefix rewrite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PathMapConfig {
    /// Prefix as trailarr sees it.
    pub from: String,
    /// Prefix as Kodi sees it.
    pub to: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        let data_dir = dirs_data_path();
        Self {
            log_dir: data_dir.join("logs"),
            database: data_dir.join("trailarr.db"),
            scratch_dir: data_dir.join("temp"),
        }
    }
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            language: None,
            timeout: 5,
        }
    }
}

impl Default for RadarrConfig {
    fn default() -> Self {
        Self {
            url: None,
            api_key: None,
            config_xml: Some(PathBuf::from("/config/config.xml")),
            timeout: 10,
        }
    }
}

impl Default for KodiConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            name: "kodi".to_string(),
            host: "127.0.0.1".to_string(),
            port: 8080,
            user: None,
            password: None,
            notify: false,
            strict_path_maps: false,
            path_maps: Vec::new(),
            timeout: 5,
        }
    }
}

impl Config {
    /// Apply environment overrides.
    ///
    /// `TMDB_API_KEY` replaces the configured key when set and non-empty.
    pub fn apply_env(&mut self) {
        if let Ok(key) = std::env::var("TMDB_API_KEY") {
            let key = key.trim();
            if !key.is_empty() {
                self.tmdb.api_key = Some(key.to_string());
            }
        }
    }
}

/// Get the configuration directory path.
pub fn dirs_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("trailarr")
}

/// Get the data directory path.
fn dirs_data_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("trailarr")
}

/// Parse configuration from TOML text.
pub fn parse_config(content: &str) -> Result<Config> {
    toml::from_str(content).map_err(|e| crate::Error::Config(e.to_string()))
}

/// Load configuration from file.
///
/// A missing file yields defaults; an unreadable or malformed file is an
/// error.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let config_path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| dirs_config_path().join("config.toml"));

    let mut config = if config_path.exists() {
        let content = std::fs::read_to_string(&config_path)?;
        parse_config(&content).map_err(|e| {
            crate::Error::Config(format!("{}: {}", config_path.display(), e))
        })?
    } else {
        tracing::debug!("No config file at {:?}, using defaults", config_path);
        Config::default()
    };

    config.apply_env();
    Ok(config)
}
