//! TMDB API client.

use crate::models::config::TmdbConfig;
use crate::models::trailer::SourceVideo;
use crate::services::Catalog;
use crate::Result;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

const TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";
const TMDB_PAGE_URL: &str = "https://www.themoviedb.org/movie";
const YOUTUBE_BASE_URL: &str = "https://www.youtube.com/watch?v=";
const VIMEO_BASE_URL: &str = "https://vimeo.com/";

/// Attempts per request when TMDB times out.
const RETRIES: u32 = 3;

/// TMDB API client.
pub struct TmdbClient {
    base_url: String,
    /// API key or Bearer token (JWT)
    api_key: String,
    language: Option<String>,
    /// Whether to use Bearer token authentication (API v4 style)
    use_bearer: bool,
    client: reqwest::Client,
}

/// Videos attached to a movie.
#[derive(Debug, Deserialize)]
struct VideoList {
    #[serde(default)]
    results: Vec<VideoItem>,
}

/// One video as TMDB lists it.
#[derive(Debug, Deserialize)]
struct VideoItem {
    #[serde(default)]
    iso_639_1: String,
    #[serde(default)]
    iso_3166_1: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    key: String,
    #[serde(default)]
    site: String,
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    official: bool,
}

impl VideoItem {
    /// Playable URL, empty for sites yt-dlp is not pointed at.
    fn url(&self) -> String {
        match self.site.as_str() {
            "YouTube" => format!("{}{}", YOUTUBE_BASE_URL, self.key),
            "Vimeo" => format!("{}{}", VIMEO_BASE_URL, self.key),
            _ => String::new(),
        }
    }

    fn into_source(self, tmdb_id: u64) -> SourceVideo {
        SourceVideo {
            tmdb_id,
            url: self.url(),
            language: self.iso_639_1,
            region: self.iso_3166_1,
            name: self.name,
            kind: self.kind,
            official: self.official,
        }
    }
}

impl TmdbClient {
    /// Create a new TMDB client.
    pub fn new(config: &TmdbConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or(crate::Error::TmdbApiKeyMissing)?;

        // Bearer tokens start with "eyJ" (base64 encoded JWT header)
        let use_bearer = api_key.starts_with("eyJ");

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()?;

        Ok(Self {
            base_url: TMDB_BASE_URL.to_string(),
            api_key,
            language: config.language.clone(),
            use_bearer,
            client,
        })
    }

    /// Point the client at another API root.
    #[cfg(test)]
    pub(crate) fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Build a request with proper authentication.
    fn build_request(&self, url: &str) -> reqwest::RequestBuilder {
        let request = self.client.get(url);
        if self.use_bearer {
            request.header("Authorization", format!("Bearer {}", self.api_key))
        } else {
            request.query(&[("api_key", self.api_key.as_str())])
        }
    }

    /// GET a TMDB endpoint, retrying immediately on timeouts.
    async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}/{}", self.base_url, path);

        for attempt in 1..=RETRIES {
            let mut request = self.build_request(&url);
            if let Some(language) = &self.language {
                request = request.query(&[("language", language.as_str())]);
            }

            match request.send().await.and_then(|r| r.error_for_status()) {
                Ok(resp) => {
                    return resp
                        .json()
                        .await
                        .map_err(|e| crate::Error::Catalog(format!("{}: {}", path, e)));
                }
                Err(e) if e.is_timeout() => {
                    tracing::warn!(
                        "Request to {} timed out ({}/{})",
                        path,
                        attempt,
                        RETRIES
                    );
                }
                Err(e) => return Err(crate::Error::Catalog(format!("{}: {}", path, e))),
            }
        }

        Err(crate::Error::TransientNetwork(format!(
            "{} timed out after {} attempts",
            path, RETRIES
        )))
    }

    /// Verify API key is valid.
    pub async fn verify_api_key(&self) -> Result<bool> {
        let url = format!("{}/authentication", self.base_url);

        match self.build_request(&url).send().await {
            Ok(resp) => Ok(resp.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    /// Every video TMDB lists for a movie.
    pub async fn get_videos(&self, tmdb_id: u64) -> Result<Vec<SourceVideo>> {
        let list: VideoList = self.get(&format!("movie/{}/videos", tmdb_id)).await?;
        if list.results.is_empty() {
            tracing::warn!("No videos found for movie: {}", tmdb_id);
        }
        Ok(list
            .results
            .into_iter()
            .map(|v| v.into_source(tmdb_id))
            .collect())
    }
}

/// TMDB page listing a movie's trailers.
pub fn page_url(tmdb_id: u64) -> String {
    format!("{}/{}/videos?active_nav_item=Trailers", TMDB_PAGE_URL, tmdb_id)
}

#[async_trait]
impl Catalog for TmdbClient {
    async fn list_trailers(&self, tmdb_id: u64) -> Result<Vec<SourceVideo>> {
        tracing::debug!("Getting trailers for movie: {}", tmdb_id);
        let trailers: Vec<SourceVideo> = self
            .get_videos(tmdb_id)
            .await?
            .into_iter()
            .filter(|v| v.kind == "Trailer")
            .collect();

        if trailers.is_empty() {
            tracing::info!("Add some trailers! {}", page_url(tmdb_id));
        }
        Ok(trailers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "id": 550,
        "results": [
            {"iso_639_1": "en", "iso_3166_1": "US", "name": "Official Trailer",
             "key": "SUXWAEX2jlg", "site": "YouTube", "type": "Trailer", "official": true},
            {"iso_639_1": "en", "iso_3166_1": "US", "name": "Teaser",
             "key": "123456", "site": "Vimeo", "type": "Teaser", "official": false},
            {"iso_639_1": "en", "iso_3166_1": "US", "name": "Elsewhere",
             "key": "zzz", "site": "Dailymotion", "type": "Trailer"}
        ]
    }"#;

    fn parse() -> Vec<SourceVideo> {
        let list: VideoList = serde_json::from_str(SAMPLE).unwrap();
        list.results.into_iter().map(|v| v.into_source(550)).collect()
    }

    #[test]
    fn test_video_urls() {
        let videos = parse();
        assert_eq!(videos[0].url, "https://www.youtube.com/watch?v=SUXWAEX2jlg");
        assert_eq!(videos[1].url, "https://vimeo.com/123456");
        assert_eq!(videos[2].url, "");
    }

    #[test]
    fn test_video_fields() {
        let videos = parse();
        assert_eq!(videos[0].tmdb_id, 550);
        assert_eq!(videos[0].language, "en");
        assert_eq!(videos[0].region, "US");
        assert_eq!(videos[0].kind, "Trailer");
        assert!(videos[0].official);
        assert!(!videos[2].official);
    }

    #[test]
    fn test_missing_key() {
        assert!(matches!(
            TmdbClient::new(&TmdbConfig::default()),
            Err(crate::Error::TmdbApiKeyMissing)
        ));
    }

    fn local_client(addr: std::net::SocketAddr) -> TmdbClient {
        let config = TmdbConfig {
            api_key: Some("key".to_string()),
            language: None,
            timeout: 1,
        };
        TmdbClient::new(&config)
            .unwrap()
            .with_base_url(format!("http://{}/3", addr))
    }

    #[tokio::test]
    async fn test_timeouts_are_retried() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let accepted = Arc::new(AtomicUsize::new(0));

        // Accept and hold every connection without answering
        let counter = accepted.clone();
        let server = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                counter.fetch_add(1, Ordering::SeqCst);
                held.push(socket);
            }
        });

        let result = local_client(addr).get_videos(550).await;
        server.abort();

        assert!(matches!(result, Err(crate::Error::TransientNetwork(_))));
        assert_eq!(accepted.load(Ordering::SeqCst), RETRIES as usize);
    }

    #[tokio::test]
    async fn test_connection_error_is_not_retried() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result = local_client(addr).get_videos(550).await;
        assert!(matches!(result, Err(crate::Error::Catalog(_))));
    }

    #[test]
    fn test_page_url() {
        assert_eq!(
            page_url(550),
            "https://www.themoviedb.org/movie/550/videos?active_nav_item=Trailers"
        );
    }
}
