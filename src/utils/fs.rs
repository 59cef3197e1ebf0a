//! File system utilities.

use crate::Result;
use std::path::Path;

/// Extensions recognized as video files.
const VIDEO_EXTENSIONS: &[&str] = &[
    "mkv", "iso", "wmv", "avi", "mp4", "m4v", "img", "divx", "mov", "flv", "m2ts", "ts", "webm",
];

/// Check if a path exists and is a directory.
pub fn ensure_directory(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(crate::Error::PathNotFound(path.display().to_string()));
    }
    if !path.is_dir() {
        return Err(crate::Error::NotADirectory(path.display().to_string()));
    }
    Ok(())
}

/// Move a file from one location to another.
pub fn move_file(from: &Path, to: &Path) -> Result<()> {
    // Try rename first (fast, same filesystem)
    if std::fs::rename(from, to).is_ok() {
        return Ok(());
    }

    // Fall back to copy + delete (cross filesystem)
    std::fs::copy(from, to)?;
    std::fs::remove_file(from)?;
    Ok(())
}

/// Remove every regular file directly inside `dir`. Returns how many were
/// removed.
pub fn clear_directory(dir: &Path) -> Result<usize> {
    if !dir.is_dir() {
        return Ok(0);
    }

    let mut removed = 0;
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() {
            tracing::debug!("Deleting: {:?}", path);
            std::fs::remove_file(&path)?;
            removed += 1;
        }
    }
    Ok(removed)
}

/// Check that a directory accepts new files.
pub fn is_writable(dir: &Path) -> bool {
    if !dir.is_dir() {
        return false;
    }
    let probe = dir.join(".trailarr-write-test");
    let ok = std::fs::write(&probe, b"").is_ok();
    let _ = std::fs::remove_file(&probe);
    ok
}

/// Get file extension in lowercase.
pub fn get_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}

/// Check if a file is a video file based on extension.
pub fn is_video_file(path: &Path) -> bool {
    get_extension(path)
        .map(|ext| VIDEO_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}
