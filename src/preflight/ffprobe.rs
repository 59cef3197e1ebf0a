//! FFprobe preflight check.

use super::CheckResult;
use crate::services::ffprobe;

/// Trailers are probed with ffprobe after every download.
pub fn check() -> CheckResult {
    if !ffprobe::is_installed() {
        return CheckResult::fail(
            "ffprobe",
            "not found",
            "Install FFmpeg (ffprobe must be on PATH)",
        );
    }

    let version = ffprobe::get_version().unwrap_or_else(|_| "unknown version".to_string());
    CheckResult::ok("ffprobe", &version)
}
