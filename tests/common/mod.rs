//! Fake collaborators and fixtures shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use trailarr::core::history::HistoryStore;
use trailarr::core::path_map::{PathRewrite, PathSyntax};
use trailarr::core::sync::{HostRegistration, TrailerSync};
use trailarr::models::media::{HostMovie, MediaDetails, Movie};
use trailarr::models::trailer::SourceVideo;
use trailarr::services::{Catalog, Downloader, LibraryHost, Prober};
use trailarr::utils::hash;
use trailarr::{Error, Result};

pub const DEFAULT_BITRATE: u64 = 1_000_000;

pub fn source(tmdb_id: u64, url: &str) -> SourceVideo {
    SourceVideo {
        tmdb_id,
        url: url.to_string(),
        language: "en".to_string(),
        region: "US".to_string(),
        name: format!("Trailer {}", url),
        kind: "Trailer".to_string(),
        official: true,
    }
}

/// Catalog serving a fixed list per movie.
#[derive(Default)]
pub struct FakeCatalog {
    videos: Mutex<HashMap<u64, Vec<SourceVideo>>>,
    pub calls: AtomicUsize,
    pub offline: Mutex<bool>,
}

impl FakeCatalog {
    pub fn set(&self, tmdb_id: u64, urls: &[&str]) {
        let videos = urls.iter().map(|u| source(tmdb_id, u)).collect();
        self.videos.lock().unwrap().insert(tmdb_id, videos);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Catalog for FakeCatalog {
    async fn list_trailers(&self, tmdb_id: u64) -> Result<Vec<SourceVideo>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if *self.offline.lock().unwrap() {
            return Err(Error::TransientNetwork("offline".to_string()));
        }
        Ok(self
            .videos
            .lock()
            .unwrap()
            .get(&tmdb_id)
            .cloned()
            .unwrap_or_default())
    }
}

/// Downloader writing known content for each URL into the scratch directory.
pub struct FakeDownloader {
    scratch: PathBuf,
    content: Mutex<HashMap<String, String>>,
    failing: Mutex<HashSet<String>>,
    bare: Mutex<HashSet<String>>,
    pub fetched: Mutex<Vec<String>>,
    counter: AtomicUsize,
}

impl FakeDownloader {
    pub fn new(scratch: PathBuf) -> Self {
        Self {
            scratch,
            content: Mutex::new(HashMap::new()),
            failing: Mutex::new(HashSet::new()),
            bare: Mutex::new(HashSet::new()),
            fetched: Mutex::new(Vec::new()),
            counter: AtomicUsize::new(0),
        }
    }

    /// Serve `content` for `url`.
    pub fn serve(&self, url: &str, content: &str) {
        self.content
            .lock()
            .unwrap()
            .insert(url.to_string(), content.to_string());
    }

    pub fn fail(&self, url: &str) {
        self.failing.lock().unwrap().insert(url.to_string());
    }

    /// Write the download for `url` without a file extension.
    pub fn without_extension(&self, url: &str) {
        self.bare.lock().unwrap().insert(url.to_string());
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl Downloader for FakeDownloader {
    async fn fetch(&self, url: &str) -> Result<PathBuf> {
        self.fetched.lock().unwrap().push(url.to_string());
        if self.failing.lock().unwrap().contains(url) {
            return Err(Error::Download(format!("{}: refused", url)));
        }
        let content = self
            .content
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| Error::Download(format!("{}: unknown", url)))?;

        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        let name = if self.bare.lock().unwrap().contains(url) {
            format!("video{}-{}", n, n)
        } else {
            format!("video{}-{}.mp4", n, n)
        };
        let path = self.scratch.join(name);
        std::fs::write(&path, content)?;
        Ok(path)
    }
}

/// Prober deriving details from file content: bitrate from a table keyed by
/// content, broken when the content starts with "broken".
#[derive(Default)]
pub struct FakeProber {
    bitrates: Mutex<HashMap<String, u64>>,
    failing: Mutex<HashSet<String>>,
    pub probes: AtomicUsize,
}

impl FakeProber {
    pub fn bitrate(&self, content: &str, bitrate: u64) {
        self.bitrates
            .lock()
            .unwrap()
            .insert(content.to_string(), bitrate);
    }

    pub fn fail(&self, content: &str) {
        self.failing.lock().unwrap().insert(content.to_string());
    }
}

#[async_trait]
impl Prober for FakeProber {
    async fn probe(&self, path: &Path, known_hash: Option<&str>) -> Result<MediaDetails> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        let content = std::fs::read_to_string(path)?;
        if self.failing.lock().unwrap().contains(&content) {
            return Err(Error::Probe(format!("{:?}: unreadable", path)));
        }
        let hash = match known_hash {
            Some(h) => h.to_string(),
            None => hash::sha256_file(path)?,
        };
        let bitrate = self
            .bitrates
            .lock()
            .unwrap()
            .get(&content)
            .copied()
            .unwrap_or(DEFAULT_BITRATE);

        Ok(MediaDetails {
            broken: content.starts_with("broken"),
            hash,
            height: Some(1080),
            width: Some(1920),
            duration: Some(120.0),
            frames: Some(2880),
            bitrate: Some(bitrate),
            codec: Some("h264".to_string()),
        })
    }
}

/// Library host recording every call.
pub struct FakeHost {
    syntax: PathSyntax,
    movies: Mutex<HashMap<String, HostMovie>>,
    pub syntax_queries: AtomicUsize,
    pub trailers_set: Mutex<Vec<(u64, String)>>,
    pub notifications: Mutex<Vec<(String, String)>>,
    reject_updates: AtomicBool,
}

impl FakeHost {
    pub fn new(syntax: PathSyntax) -> Self {
        Self {
            syntax,
            movies: Mutex::new(HashMap::new()),
            syntax_queries: AtomicUsize::new(0),
            trailers_set: Mutex::new(Vec::new()),
            notifications: Mutex::new(Vec::new()),
            reject_updates: AtomicBool::new(false),
        }
    }

    /// Make every `set_trailer_path` call fail.
    pub fn reject_updates(&self) {
        self.reject_updates.store(true, Ordering::SeqCst);
    }

    /// Make the host know a movie under `remote_file`.
    pub fn add_movie(&self, movie_id: u64, remote_file: &str) {
        self.movies.lock().unwrap().insert(
            remote_file.to_string(),
            HostMovie {
                movie_id,
                title: format!("movie {}", movie_id),
                year: None,
                file: remote_file.to_string(),
                trailer: None,
            },
        );
    }

    pub fn trailers_set(&self) -> Vec<(u64, String)> {
        self.trailers_set.lock().unwrap().clone()
    }
}

#[async_trait]
impl LibraryHost for FakeHost {
    async fn path_syntax(&self) -> PathSyntax {
        self.syntax_queries.fetch_add(1, Ordering::SeqCst);
        self.syntax
    }

    async fn find_movie_by_file(&self, remote_path: &str) -> Result<Option<HostMovie>> {
        Ok(self.movies.lock().unwrap().get(remote_path).cloned())
    }

    async fn set_trailer_path(&self, movie_id: u64, remote_path: &str) -> Result<()> {
        if self.reject_updates.load(Ordering::SeqCst) {
            return Err(Error::HostRpc(format!("movie {}: rejected", movie_id)));
        }
        self.trailers_set
            .lock()
            .unwrap()
            .push((movie_id, remote_path.to_string()));
        Ok(())
    }

    async fn notify(&self, title: &str, message: &str) -> Result<()> {
        self.notifications
            .lock()
            .unwrap()
            .push((title.to_string(), message.to_string()));
        Ok(())
    }
}

/// A temporary library with one scratch directory and fakes wired together.
pub struct Fixture {
    pub root: TempDir,
    pub library: PathBuf,
    pub scratch: PathBuf,
    pub catalog: Arc<FakeCatalog>,
    pub downloader: Arc<FakeDownloader>,
    pub prober: Arc<FakeProber>,
    pub host: Arc<FakeHost>,
}

impl Fixture {
    pub fn new() -> Self {
        let root = TempDir::new().unwrap();
        let library = root.path().join("movies");
        let scratch = root.path().join("scratch");
        std::fs::create_dir_all(&library).unwrap();
        std::fs::create_dir_all(&scratch).unwrap();

        Self {
            downloader: Arc::new(FakeDownloader::new(scratch.clone())),
            catalog: Arc::new(FakeCatalog::default()),
            prober: Arc::new(FakeProber::default()),
            host: Arc::new(FakeHost::new(PathSyntax::Windows)),
            root,
            library,
            scratch,
        }
    }

    /// Create a movie directory holding a media file.
    pub fn movie(&self, tmdb_id: u64, title: &str) -> Movie {
        let directory = self.library.join(title);
        std::fs::create_dir_all(&directory).unwrap();
        let file_path = directory.join(format!("{}.mkv", title));
        std::fs::write(&file_path, "movie").unwrap();

        Movie {
            tmdb_id,
            title: title.to_string(),
            year: Some(2000),
            directory,
            file_path,
        }
    }

    /// Kodi's view of a local path under the library: `M:\<rest>`.
    pub fn remote(&self, path: &Path) -> String {
        let rest = path.strip_prefix(&self.library).unwrap();
        let rest: Vec<String> = rest
            .components()
            .map(|c| c.as_os_str().to_string_lossy().to_string())
            .collect();
        format!("M:\\{}", rest.join("\\"))
    }

    pub fn rules(&self) -> Vec<PathRewrite> {
        vec![PathRewrite::new(self.library.to_string_lossy(), "M:\\")]
    }

    /// Engine without a library host.
    pub fn engine(&self) -> TrailerSync {
        TrailerSync::new(
            HistoryStore::open_in_memory().unwrap(),
            self.catalog.clone(),
            self.downloader.clone(),
            self.prober.clone(),
            self.scratch.clone(),
        )
    }

    /// Engine registering with the fake host through the library mapping.
    pub fn engine_with_host(&self, strict: bool) -> TrailerSync {
        self.engine().with_host(HostRegistration {
            host: self.host.clone(),
            path_maps: self.rules(),
            strict,
            notify: true,
        })
    }
}

/// Every trailer file in a movie directory, sorted.
pub fn trailer_files(movie: &Movie) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(&movie.directory)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.to_string_lossy().to_lowercase().contains("-trailer"))
        .collect();
    files.sort();
    files
}

pub fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
}
