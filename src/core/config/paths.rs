use std::ffi::OsString;
use std::path::{Path, PathBuf};

use super::HISTORY_FILE;

/// Picks the history file: the flag value, then the environment, then
/// `visitedPaths.txt` in the directory the shell started in. Relative
/// choices are anchored at the starting directory.
pub fn history_path(flag: Option<&str>, env: Option<OsString>, starting_dir: &Path) -> PathBuf {
    let chosen = flag
        .filter(|f| !f.is_empty())
        .map(PathBuf::from)
        .or_else(|| env.filter(|e| !e.is_empty()).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(HISTORY_FILE));

    starting_dir.join(chosen)
}
