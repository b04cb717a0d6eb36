//! Location of the job state snapshot file.

use std::path::{Path, PathBuf};

/// Environment variable naming the directory that holds the snapshot.
pub const SNAPSHOT_DIR_ENV: &str = "LSF_BAK_PATH";

pub const SNAPSHOT_FILE_NAME: &str = "job.states.snapshot";

/// Resolve the snapshot path from an optional base directory and the running
/// executable's path. An empty base directory counts as unset; with neither
/// available the bare file name is returned (relative to the working dir).
pub fn resolve_snapshot_path(base_dir: Option<&str>, exe: Option<&Path>) -> PathBuf {
    if let Some(base) = base_dir.filter(|b| !b.is_empty()) {
        return Path::new(base).join(SNAPSHOT_FILE_NAME);
    }
    match exe.and_then(Path::parent) {
        Some(dir) => dir.join(SNAPSHOT_FILE_NAME),
        None => PathBuf::from(SNAPSHOT_FILE_NAME),
    }
}

/// Snapshot path for this process: `$LSF_BAK_PATH/job.states.snapshot`, or
/// next to the executable.
pub fn default_snapshot_path() -> PathBuf {
    let base = std::env::var(SNAPSHOT_DIR_ENV).ok();
    let exe = std::env::current_exe().ok();
    resolve_snapshot_path(base.as_deref(), exe.as_deref())
}
