//! FFprobe service for extracting trailer metadata.

use crate::models::media::MediaDetails;
use crate::services::Prober;
use crate::utils::hash;
use crate::Result;
use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use std::process::Command;

/// FFprobe output format.
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    streams: Vec<FfprobeStream>,
    format: Option<FfprobeFormat>,
}

/// FFprobe stream information.
#[derive(Debug, Deserialize)]
struct FfprobeStream {
    #[serde(default)]
    codec_type: String,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    nb_frames: Option<String>,
    duration: Option<String>,
}

/// FFprobe format information.
#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
    bit_rate: Option<String>,
}

/// Check if ffprobe is installed.
pub fn is_installed() -> bool {
    Command::new("ffprobe")
        .arg("-version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Get ffprobe version.
pub fn get_version() -> Result<String> {
    let output = Command::new("ffprobe").arg("-version").output()?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let first_line = stdout.lines().next().unwrap_or("unknown");

    Ok(first_line.to_string())
}

/// Prober backed by the `ffprobe` binary.
#[derive(Debug, Clone, Default)]
pub struct FfprobeProber;

impl FfprobeProber {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Prober for FfprobeProber {
    async fn probe(&self, path: &Path, known_hash: Option<&str>) -> Result<MediaDetails> {
        tracing::debug!("Getting video details for: {:?}", path);
        let output = tokio::process::Command::new("ffprobe")
            .args([
                "-v",
                "fatal",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
                "-show_error",
            ])
            .arg(path)
            .output()
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => crate::Error::FfprobeNotFound,
                _ => crate::Error::Probe(format!("{:?}: {}", path, e)),
            })?;

        if !output.status.success() {
            return Err(crate::Error::Probe(format!(
                "ffprobe failed for {:?}: {}",
                path,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let file_hash = match known_hash {
            Some(h) => h.to_string(),
            None => {
                let owned = path.to_path_buf();
                tokio::task::spawn_blocking(move || hash::sha256_file(&owned))
                    .await
                    .map_err(|e| crate::Error::other(format!("Hash task failed: {}", e)))??
            }
        };

        parse_details(&output.stdout, file_hash)
    }
}

/// Build [`MediaDetails`] from ffprobe's JSON output.
fn parse_details(stdout: &[u8], file_hash: String) -> Result<MediaDetails> {
    let ffprobe: FfprobeOutput = serde_json::from_slice(stdout)
        .map_err(|e| crate::Error::Probe(format!("Unreadable ffprobe output: {}", e)))?;

    let Some(format) = ffprobe.format else {
        return Err(crate::Error::Probe("ffprobe reported no format".to_string()));
    };

    let video: Vec<&FfprobeStream> = ffprobe
        .streams
        .iter()
        .filter(|s| s.codec_type.eq_ignore_ascii_case("video"))
        .collect();
    let has_audio = ffprobe
        .streams
        .iter()
        .any(|s| s.codec_type.eq_ignore_ascii_case("audio"));

    // Format duration first, then the first video stream that reports one
    let duration = parse_number::<f64>(format.duration.as_deref()).or_else(|| {
        video
            .iter()
            .find_map(|s| parse_number::<f64>(s.duration.as_deref()))
    });

    Ok(MediaDetails {
        broken: video.is_empty() || !has_audio,
        hash: file_hash,
        height: video.iter().find_map(|s| s.height),
        width: video.iter().find_map(|s| s.width),
        duration,
        frames: video
            .iter()
            .find_map(|s| parse_number::<u64>(s.nb_frames.as_deref())),
        bitrate: parse_number::<u64>(format.bit_rate.as_deref()),
        codec: video.first().and_then(|s| s.codec_name.clone()),
    })
}

fn parse_number<T: std::str::FromStr>(value: Option<&str>) -> Option<T> {
    value.and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "streams": [
            {"codec_type": "video", "codec_name": "vp9", "width": 1920, "height": 1080, "nb_frames": "3600"},
            {"codec_type": "audio", "codec_name": "opus"}
        ],
        "format": {"duration": "150.150000", "bit_rate": "2500000"}
    }"#;

    #[test]
    fn test_parse_details() {
        let details = parse_details(SAMPLE.as_bytes(), "abc".to_string()).unwrap();
        assert!(!details.broken);
        assert_eq!(details.hash, "abc");
        assert_eq!(details.width, Some(1920));
        assert_eq!(details.height, Some(1080));
        assert_eq!(details.frames, Some(3600));
        assert_eq!(details.bitrate, Some(2_500_000));
        assert_eq!(details.codec.as_deref(), Some("vp9"));
        assert!((details.duration.unwrap() - 150.15).abs() < 1e-9);
    }

    #[test]
    fn test_missing_audio_is_broken() {
        let json = r#"{
            "streams": [{"codec_type": "video", "codec_name": "h264", "duration": "12.5"}],
            "format": {}
        }"#;
        let details = parse_details(json.as_bytes(), "h".to_string()).unwrap();
        assert!(details.broken);
        assert_eq!(details.duration, Some(12.5));
        assert_eq!(details.bitrate, None);
        assert_eq!(details.height, None);
    }

    #[test]
    fn test_no_format_is_error() {
        assert!(parse_details(br#"{"streams": []}"#, "h".to_string()).is_err());
        assert!(parse_details(b"not json", "h".to_string()).is_err());
    }
}
