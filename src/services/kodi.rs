//! Kodi JSON-RPC client.

use crate::core::path_map::PathSyntax;
use crate::models::config::KodiConfig;
use crate::models::media::HostMovie;
use crate::services::LibraryHost;
use crate::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::OnceCell;

const MOVIE_PROPERTIES: &[&str] = &["file", "title", "year", "trailer"];

/// Platform booleans Kodi answers through `XBMC.GetInfoBooleans`.
const PLATFORMS: &[&str] = &[
    "System.Platform.Android",
    "System.Platform.Darwin",
    "System.Platform.IOS",
    "System.Platform.Linux",
    "System.Platform.OSX",
    "System.Platform.TVOS",
    "System.Platform.UWP",
    "System.Platform.Windows",
];

const WINDOWS_PLATFORMS: &[&str] = &["System.Platform.Windows", "System.Platform.UWP"];

/// How long notifications stay on screen, in milliseconds.
const NOTIFICATION_TIME: u32 = 5000;

/// JSON-RPC response envelope.
#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<Value>,
    error: Option<Value>,
}

/// Movie entry from `VideoLibrary.GetMovies`.
#[derive(Debug, Deserialize)]
struct KodiMovie {
    movieid: u64,
    #[serde(default)]
    title: String,
    year: Option<u16>,
    #[serde(default)]
    file: String,
    trailer: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MovieList {
    #[serde(default)]
    movies: Vec<KodiMovie>,
}

impl From<KodiMovie> for HostMovie {
    fn from(movie: KodiMovie) -> Self {
        HostMovie {
            movie_id: movie.movieid,
            title: movie.title,
            year: movie.year.filter(|y| *y > 0),
            file: movie.file,
            trailer: movie.trailer.filter(|t| !t.is_empty()),
        }
    }
}

/// Kodi JSON-RPC client.
pub struct KodiClient {
    name: String,
    url: String,
    user: Option<String>,
    password: Option<String>,
    client: reqwest::Client,
    req_id: AtomicU64,
    syntax: OnceCell<PathSyntax>,
}

impl KodiClient {
    pub fn new(config: &KodiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()?;
        Ok(Self {
            name: config.name.clone(),
            url: format!("http://{}:{}/jsonrpc", config.host, config.port),
            user: config.user.clone(),
            password: config.password.clone(),
            client,
            req_id: AtomicU64::new(0),
            syntax: OnceCell::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Send one JSON-RPC request and return its `result`.
    async fn request(&self, method: &str, params: Option<Value>) -> Result<Value> {
        let id = self.req_id.fetch_add(1, Ordering::Relaxed);
        let mut body = json!({ "jsonrpc": "2.0", "id": id, "method": method });
        if let Some(params) = params {
            body["params"] = params;
        }

        let mut request = self.client.post(&self.url).json(&body);
        if let (Some(user), Some(password)) = (&self.user, &self.password) {
            request = request.basic_auth(user, Some(password));
        }

        let resp = request
            .send()
            .await
            .map_err(|e| crate::Error::HostRpc(format!("{} {}: {}", self.name, method, e)))?;

        if resp.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(crate::Error::HostRpc(format!(
                "{}: unauthorized, check credentials",
                self.name
            )));
        }

        let resp: RpcResponse = resp
            .error_for_status()
            .map_err(|e| crate::Error::HostRpc(format!("{} {}: {}", self.name, method, e)))?
            .json()
            .await
            .map_err(|e| crate::Error::HostRpc(format!("{} {}: {}", self.name, method, e)))?;

        if let Some(error) = resp.error {
            return Err(crate::Error::HostRpc(format!("{} {}: {}", self.name, method, error)));
        }
        Ok(resp.result.unwrap_or(Value::Null))
    }

    /// Whether the host answers `JSONRPC.Ping`.
    pub async fn ping(&self) -> Result<bool> {
        let result = self.request("JSONRPC.Ping", None).await?;
        Ok(result.as_str() == Some("pong"))
    }

    async fn query_syntax(&self) -> PathSyntax {
        let params = json!({ "booleans": PLATFORMS });
        match self.request("XBMC.GetInfoBooleans", Some(params)).await {
            Ok(result) => {
                let syntax = platform_syntax(&result);
                tracing::debug!("{} uses {:?} paths", self.name, syntax);
                syntax
            }
            Err(e) => {
                tracing::warn!("Failed to get platform info: {}", e);
                PathSyntax::default()
            }
        }
    }
}

/// Windows hosts use windows paths; everything else is posix.
fn platform_syntax(result: &Value) -> PathSyntax {
    let is_windows = WINDOWS_PLATFORMS
        .iter()
        .any(|p| result.get(*p).and_then(Value::as_bool).unwrap_or(false));
    if is_windows {
        PathSyntax::Windows
    } else {
        PathSyntax::Posix
    }
}

/// `VideoLibrary.GetMovies` parameters selecting one media file.
fn movie_filter(syntax: PathSyntax, remote_path: &str) -> Value {
    let dir = syntax.parent(remote_path);
    let file_name = syntax.file_name(remote_path);
    json!({
        "properties": MOVIE_PROPERTIES,
        "filter": {
            "and": [
                { "operator": "startswith", "field": "path", "value": dir },
                { "operator": "is", "field": "filename", "value": file_name },
            ]
        }
    })
}

#[async_trait]
impl LibraryHost for KodiClient {
    async fn path_syntax(&self) -> PathSyntax {
        *self.syntax.get_or_init(|| self.query_syntax()).await
    }

    async fn find_movie_by_file(&self, remote_path: &str) -> Result<Option<HostMovie>> {
        let syntax = self.path_syntax().await;
        let params = movie_filter(syntax, remote_path);
        let result = self.request("VideoLibrary.GetMovies", Some(params)).await?;
        let mut list: MovieList = serde_json::from_value(result)?;

        if list.movies.len() != 1 {
            tracing::warn!(
                "Found {} movies for file '{}' on {}, expected 1",
                list.movies.len(),
                remote_path,
                self.name
            );
            return Ok(None);
        }
        Ok(list.movies.pop().map(HostMovie::from))
    }

    async fn set_trailer_path(&self, movie_id: u64, remote_path: &str) -> Result<()> {
        tracing::debug!("Setting trailer path for movie {} to {}", movie_id, remote_path);
        let params = json!({ "movieid": movie_id, "trailer": remote_path });
        let result = self
            .request("VideoLibrary.SetMovieDetails", Some(params))
            .await?;
        if result.as_str() != Some("OK") {
            return Err(crate::Error::HostRpc(format!(
                "{}: unexpected SetMovieDetails result {}",
                self.name, result
            )));
        }
        Ok(())
    }

    async fn notify(&self, title: &str, message: &str) -> Result<()> {
        tracing::info!("Sending notification to {}: {} - {}", self.name, title, message);
        let params = json!({
            "title": title,
            "message": message,
            "displaytime": NOTIFICATION_TIME,
        });
        self.request("GUI.ShowNotification", Some(params)).await?;
        Ok(())
    }
}
