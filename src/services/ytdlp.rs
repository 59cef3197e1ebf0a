//! yt-dlp downloader.

use crate::services::Downloader;
use crate::Result;
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Command;

/// Output template inside the scratch directory.
const OUTPUT_TEMPLATE: &str = "%(id)s-%(epoch)s.%(ext)s";

/// Check if yt-dlp is installed.
pub fn is_installed() -> bool {
    Command::new("yt-dlp")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Get yt-dlp version.
pub fn get_version() -> Result<String> {
    let output = Command::new("yt-dlp").arg("--version").output()?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Downloads trailers into a scratch directory with yt-dlp.
#[derive(Debug, Clone)]
pub struct YtDlp {
    scratch_dir: PathBuf,
}

impl YtDlp {
    pub fn new(scratch_dir: PathBuf) -> Self {
        Self { scratch_dir }
    }

    fn args(&self, url: &str) -> Vec<String> {
        [
            "--quiet",
            "--no-simulate",
            "-N",
            "5",
            "-S",
            "res:1080",
            "--remux-video",
            "mp4",
            "-O",
            "after_move:filepath",
            "-P",
        ]
        .iter()
        .map(|s| s.to_string())
        .chain([
            self.scratch_dir.to_string_lossy().to_string(),
            "-o".to_string(),
            OUTPUT_TEMPLATE.to_string(),
            url.to_string(),
        ])
        .collect()
    }
}

#[async_trait]
impl Downloader for YtDlp {
    async fn fetch(&self, url: &str) -> Result<PathBuf> {
        tracing::info!("Downloading video from {}", url);
        std::fs::create_dir_all(&self.scratch_dir)?;

        let output = tokio::process::Command::new("yt-dlp")
            .args(self.args(url))
            .output()
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => crate::Error::YtDlpNotFound,
                _ => crate::Error::Download(format!("{}: {}", url, e)),
            })?;

        if !output.status.success() {
            return Err(crate::Error::Download(format!(
                "{}: {}",
                url,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        // The final path is the last line yt-dlp prints
        let stdout = String::from_utf8_lossy(&output.stdout);
        let path = stdout
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .last()
            .map(PathBuf::from)
            .ok_or_else(|| crate::Error::Download(format!("{}: no file reported", url)))?;

        if !path.is_file() {
            return Err(crate::Error::Download(format!(
                "{}: reported file {:?} does not exist",
                url, path
            )));
        }

        tracing::debug!("Downloaded {} to {:?}", url, path);
        Ok(path)
    }
}
