//! Scratch directory and database checks.

use super::CheckResult;
use crate::core::history::HistoryStore;
use crate::utils::fs as fs_utils;
use std::path::Path;

/// The scratch directory must exist (or be creatable) and be writable.
pub fn check_scratch(dir: &Path) -> CheckResult {
    if let Err(e) = std::fs::create_dir_all(dir) {
        return CheckResult::fail(
            "Scratch directory",
            &format!("{}: {}", dir.display(), e),
            "Set general.scratch_dir to a writable directory",
        );
    }

    if fs_utils::is_writable(dir) {
        CheckResult::ok("Scratch directory", &format!("{} is writable", dir.display()))
    } else {
        CheckResult::fail(
            "Scratch directory",
            &format!("{} is not writable", dir.display()),
            "Fix the directory permissions",
        )
    }
}

/// The history database must open and answer queries.
pub fn check_database(path: &Path) -> CheckResult {
    match HistoryStore::open(path).and_then(|store| store.ping()) {
        Ok(()) => CheckResult::ok("Database", &format!("{} ok", path.display())),
        Err(e) => CheckResult::fail(
            "Database",
            &e.to_string(),
            "Set general.database to a writable location",
        ),
    }
}
