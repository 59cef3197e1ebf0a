//! yt-dlp preflight check.

use super::CheckResult;
use crate::services::ytdlp;

/// Check if yt-dlp is installed.
pub fn check() -> CheckResult {
    if ytdlp::is_installed() {
        match ytdlp::get_version() {
            Ok(version) => CheckResult::ok("yt-dlp", &format!("installed ({})", version)),
            Err(_) => CheckResult::ok("yt-dlp", "installed"),
        }
    } else {
        CheckResult::fail("yt-dlp", "not found", "Install with: pip install yt-dlp")
    }
}
