use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use walkdir::WalkDir;

/// `session_<id>/`: latest recovered copy of each file the session touched.
pub const SESSION_DIR_PREFIX: &str = "session_";

/// `session_all_versions_<id>/`: versioned snapshots.
pub const VERSIONS_DIR_PREFIX: &str = "session_all_versions_";

static SNAPSHOT_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.+?)_v(\d+)_line_(\d+)\.txt$").expect("snapshot name regex is valid")
});

static SNAPSHOT_TAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^_v(\d+)_line_(\d+)\.txt$").expect("snapshot tail regex is valid")
});

/// A per-session directory under the recovery root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDir {
    pub session_id: String,
    pub path: PathBuf,
}

/// Every `session_all_versions_<id>/` directory, sorted by name.
pub fn list_version_dirs(recovery_dir: &Path) -> Vec<SessionDir> {
    list_dirs(recovery_dir, |name| name.strip_prefix(VERSIONS_DIR_PREFIX))
}

/// Every `session_<id>/` directory that is not a versions directory, sorted by name.
pub fn list_recovered_dirs(recovery_dir: &Path) -> Vec<SessionDir> {
    list_dirs(recovery_dir, |name| {
        if name.starts_with(VERSIONS_DIR_PREFIX) {
            return None;
        }
        name.strip_prefix(SESSION_DIR_PREFIX)
    })
}

fn list_dirs<F>(recovery_dir: &Path, session_id_of: F) -> Vec<SessionDir>
where
    F: Fn(&str) -> Option<&str>,
{
    if !recovery_dir.is_dir() {
        tracing::debug!(dir = %recovery_dir.display(), "recovery directory does not exist");
        return Vec::new();
    }

    let mut dirs = Vec::new();
    for entry in WalkDir::new(recovery_dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(
                    dir = %recovery_dir.display(),
                    error = %e,
                    "skipping unreadable entry"
                );
                continue;
            }
        };
        if !entry.file_type().is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if let Some(session_id) = session_id_of(&name)
            && !session_id.is_empty()
        {
            dirs.push(SessionDir { session_id: session_id.to_string(), path: entry.into_path() });
        }
    }
    dirs
}

/// Regular files directly inside `dir`, sorted by name. Unreadable directories yield nothing.
pub fn list_files(dir: &Path) -> Vec<(String, PathBuf)> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "skipping unreadable entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| (entry.file_name().to_string_lossy().into_owned(), entry.into_path()))
        .collect()
}

/// Split `<filename>_v<version>_line_<count>.txt` into its parts.
pub fn parse_snapshot_name(name: &str) -> Option<(&str, u32, u32)> {
    let caps = SNAPSHOT_NAME.captures(name)?;
    let filename = caps.get(1)?.as_str();
    let version = caps[2].parse().ok()?;
    let line_count = caps[3].parse().ok()?;
    Some((filename, version, line_count))
}

/// Version and line count of `name` if it is a snapshot of exactly `filename`.
pub fn parse_snapshot_of(name: &str, filename: &str) -> Option<(u32, u32)> {
    let tail = name.strip_prefix(filename)?;
    let caps = SNAPSHOT_TAIL.captures(tail)?;
    Some((caps[1].parse().ok()?, caps[2].parse().ok()?))
}
