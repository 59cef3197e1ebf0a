//! Radarr API client.

use crate::models::config::RadarrConfig;
use crate::models::media::Movie;
use crate::services::MediaManager;
use crate::Result;
use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_PORT: &str = "7878";

/// Connection details for a Radarr instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RadarrConnection {
    /// Base URL without the `/api/v3` suffix.
    pub url: String,
    pub api_key: String,
}

/// Read the port, URL base and API key out of Radarr's `config.xml`.
///
/// The URL points at localhost since trailarr runs next to Radarr.
pub fn parse_config_xml(content: &str) -> Result<RadarrConnection> {
    let field = |name: &str| -> Option<String> {
        let re = Regex::new(&format!(r"<{0}>\s*([^<]*?)\s*</{0}>", name)).ok()?;
        re.captures(content)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
    };

    let api_key = field("ApiKey")
        .filter(|k| !k.is_empty())
        .ok_or_else(|| crate::Error::RadarrNotConfigured("ApiKey missing from config.xml".into()))?;
    let port = field("Port")
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| DEFAULT_PORT.to_string());
    let url_base = field("UrlBase")
        .map(|b| b.trim_matches('/').to_string())
        .filter(|b| !b.is_empty())
        .map(|b| format!("/{}", b))
        .unwrap_or_default();

    Ok(RadarrConnection {
        url: format!("http://127.0.0.1:{}{}", port, url_base),
        api_key,
    })
}

/// Resolve connection details from the config, falling back to `config.xml`.
pub fn resolve_connection(config: &RadarrConfig) -> Result<RadarrConnection> {
    if let (Some(url), Some(api_key)) = (&config.url, &config.api_key) {
        return Ok(RadarrConnection {
            url: url.trim_end_matches('/').to_string(),
            api_key: api_key.clone(),
        });
    }

    let Some(xml_path) = &config.config_xml else {
        return Err(crate::Error::RadarrNotConfigured(
            "set radarr.url and radarr.api_key".to_string(),
        ));
    };
    read_config_xml(xml_path)
}

fn read_config_xml(path: &Path) -> Result<RadarrConnection> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        crate::Error::RadarrNotConfigured(format!("{}: {}", path.display(), e))
    })?;
    parse_config_xml(&content)
}

/// Radarr API client.
pub struct RadarrClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

/// Movie as returned by `/api/v3/movie`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RadarrMovie {
    #[serde(default)]
    tmdb_id: u64,
    #[serde(default)]
    title: String,
    year: Option<u16>,
    path: Option<String>,
    folder_name: Option<String>,
    #[serde(default)]
    has_file: bool,
    movie_file: Option<RadarrMovieFile>,
}

#[derive(Debug, Deserialize)]
struct RadarrMovieFile {
    path: Option<String>,
}

/// `/api/v3/system/status`.
#[derive(Debug, Deserialize)]
struct SystemStatus {
    version: Option<String>,
}

impl RadarrMovie {
    /// Only movies with a file on disk can get a trailer.
    fn into_movie(self) -> Option<Movie> {
        if !self.has_file {
            return None;
        }
        let file_path = PathBuf::from(self.movie_file?.path?);
        let directory = self
            .path
            .or(self.folder_name)
            .map(PathBuf::from)
            .or_else(|| file_path.parent().map(Path::to_path_buf))?;
        let year = self.year.filter(|y| *y > 0);

        Some(Movie {
            tmdb_id: self.tmdb_id,
            title: self.title,
            year,
            directory,
            file_path,
        })
    }
}

impl RadarrClient {
    pub fn new(connection: RadarrConnection, timeout: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout))
            .build()?;
        Ok(Self {
            base_url: format!("{}/api/v3", connection.url.trim_end_matches('/')),
            api_key: connection.api_key,
            client,
        })
    }

    /// Create a client from configuration.
    pub fn from_config(config: &RadarrConfig) -> Result<Self> {
        Self::new(resolve_connection(config)?, config.timeout)
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let resp = self
            .client
            .get(&url)
            .header("X-Api-Key", &self.api_key)
            .header("Accept", "application/json")
            .query(query)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| crate::Error::MediaManager(format!("{}: {}", endpoint, e)))?;

        resp.json()
            .await
            .map_err(|e| crate::Error::MediaManager(format!("{}: {}", endpoint, e)))
    }

    /// Radarr version, used to check the connection.
    pub async fn version(&self) -> Result<String> {
        let status: SystemStatus = self.get("system/status", &[]).await?;
        Ok(status.version.unwrap_or_else(|| "unknown".to_string()))
    }
}

#[async_trait]
impl MediaManager for RadarrClient {
    async fn list_managed_movies(&self) -> Result<Vec<Movie>> {
        let movies: Vec<RadarrMovie> = self.get("movie", &[]).await?;
        let total = movies.len();
        let downloaded: Vec<Movie> = movies.into_iter().filter_map(RadarrMovie::into_movie).collect();
        tracing::info!("Radarr has {} movies, {} with files", total, downloaded.len());
        Ok(downloaded)
    }

    async fn get_movie(&self, tmdb_id: u64) -> Result<Option<Movie>> {
        let mut movies: Vec<RadarrMovie> = self
            .get("movie", &[("tmdbId", tmdb_id.to_string())])
            .await?;
        if movies.len() != 1 {
            tracing::warn!("Radarr returned {} movies for tmdb {}", movies.len(), tmdb_id);
            return Ok(None);
        }
        Ok(movies.pop().and_then(RadarrMovie::into_movie))
    }
}
