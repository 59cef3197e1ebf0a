//! Radarr custom-script environment.
//!
//! Radarr invokes connected scripts with `radarr_*` environment variables.
//! Only the variables listed here are read, and each is parsed with a fixed
//! rule. A value that does not parse is an error.

use super::media::Movie;
use crate::Result;
use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;

const VAR_EVENT_TYPE: &str = "radarr_eventtype";
const VAR_MOVIE_TITLE: &str = "radarr_movie_title";
const VAR_MOVIE_YEAR: &str = "radarr_movie_year";
const VAR_MOVIE_TMDB_ID: &str = "radarr_movie_tmdbid";
const VAR_MOVIE_PATH: &str = "radarr_movie_path";
const VAR_MOVIE_FILE_PATH: &str = "radarr_moviefile_path";
const VAR_DELETE_REASON: &str = "radarr_moviefile_deletereason";

/// Radarr event types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookEvent {
    Grab,
    Download,
    Rename,
    MovieAdded,
    MovieDelete,
    MovieFileDelete,
    HealthIssue,
    HealthRestored,
    ApplicationUpdate,
    ManualInteractionRequired,
    Test,
    Unknown(String),
}

impl FromStr for HookEvent {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let event = match s.trim().to_lowercase().as_str() {
            "grab" => HookEvent::Grab,
            "download" => HookEvent::Download,
            "rename" => HookEvent::Rename,
            "movieadded" => HookEvent::MovieAdded,
            "moviedelete" => HookEvent::MovieDelete,
            "moviefiledelete" => HookEvent::MovieFileDelete,
            "healthissue" => HookEvent::HealthIssue,
            "healthrestored" => HookEvent::HealthRestored,
            "applicationupdate" => HookEvent::ApplicationUpdate,
            "manualinteractionrequired" => HookEvent::ManualInteractionRequired,
            "test" => HookEvent::Test,
            _ => HookEvent::Unknown(s.trim().to_string()),
        };
        Ok(event)
    }
}

impl std::fmt::Display for HookEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HookEvent::Grab => write!(f, "Grab"),
            HookEvent::Download => write!(f, "Download"),
            HookEvent::Rename => write!(f, "Rename"),
            HookEvent::MovieAdded => write!(f, "MovieAdded"),
            HookEvent::MovieDelete => write!(f, "MovieDelete"),
            HookEvent::MovieFileDelete => write!(f, "MovieFileDelete"),
            HookEvent::HealthIssue => write!(f, "HealthIssue"),
            HookEvent::HealthRestored => write!(f, "HealthRestored"),
            HookEvent::ApplicationUpdate => write!(f, "ApplicationUpdate"),
            HookEvent::ManualInteractionRequired => write!(f, "ManualInteractionRequired"),
            HookEvent::Test => write!(f, "Test"),
            HookEvent::Unknown(raw) => write!(f, "{}", raw),
        }
    }
}

/// Typed view of the variables Radarr passes to a custom script.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HookEnvironment {
    pub event: Option<HookEvent>,
    pub movie_title: Option<String>,
    pub movie_year: Option<u16>,
    pub tmdb_id: Option<u64>,
    pub movie_dir: Option<PathBuf>,
    pub movie_file: Option<PathBuf>,
    pub delete_reason: Option<String>,
}

impl HookEnvironment {
    /// Read the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(std::env::vars())
    }

    /// Build from arbitrary key/value pairs. Keys match case-insensitively;
    /// empty values count as unset.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let vars: HashMap<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.as_ref().trim().to_lowercase(), v.as_ref().trim().to_string()))
            .filter(|(k, v)| k.starts_with("radarr_") && !v.is_empty())
            .collect();

        let text = |name: &str| vars.get(name).cloned();

        Ok(Self {
            event: vars
                .get(VAR_EVENT_TYPE)
                .map(|v| v.parse().unwrap_or(HookEvent::Unknown(v.clone()))),
            movie_title: text(VAR_MOVIE_TITLE),
            movie_year: parse_number(&vars, VAR_MOVIE_YEAR)?,
            tmdb_id: parse_number(&vars, VAR_MOVIE_TMDB_ID)?,
            movie_dir: text(VAR_MOVIE_PATH).map(PathBuf::from),
            movie_file: text(VAR_MOVIE_FILE_PATH).map(PathBuf::from),
            delete_reason: text(VAR_DELETE_REASON),
        })
    }

    /// TMDB ID, required by every event that touches a movie.
    pub fn require_tmdb_id(&self) -> Result<u64> {
        self.tmdb_id
            .ok_or_else(|| crate::Error::Config(format!("{} is not set", VAR_MOVIE_TMDB_ID)))
    }

    /// Build the movie described by a Download event.
    pub fn movie(&self) -> Result<Movie> {
        let tmdb_id = self.require_tmdb_id()?;
        let directory = self
            .movie_dir
            .clone()
            .ok_or_else(|| crate::Error::Config(format!("{} is not set", VAR_MOVIE_PATH)))?;
        let file_path = self
            .movie_file
            .clone()
            .ok_or_else(|| crate::Error::Config(format!("{} is not set", VAR_MOVIE_FILE_PATH)))?;

        Ok(Movie {
            tmdb_id,
            title: self
                .movie_title
                .clone()
                .unwrap_or_else(|| format!("tmdb:{}", tmdb_id)),
            year: self.movie_year,
            directory,
            file_path,
        })
    }

    /// A file deletion Radarr performs while upgrading keeps the history.
    pub fn is_upgrade_delete(&self) -> bool {
        self.delete_reason
            .as_deref()
            .map(|r| r.eq_ignore_ascii_case("upgrade"))
            .unwrap_or(false)
    }
}

fn parse_number<T: FromStr>(vars: &HashMap<String, String>, name: &str) -> Result<Option<T>> {
    match vars.get(name) {
        None => Ok(None),
        Some(raw) => raw.parse::<T>().map(Some).map_err(|_| {
            crate::Error::Config(format!("{}: '{}' is not a valid number", name, raw))
        }),
    }
}
