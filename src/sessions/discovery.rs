use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use rayon::prelude::*;

use crate::models::EventRecord;
use crate::parsers::scan_log;

const LOG_EXTENSION: &str = "jsonl";

/// One session log on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionLog {
    /// Raw project directory name, e.g. `-Users-alice-proj1`.
    pub project_dir: String,
    /// File stem of the log.
    pub session_id: String,
    pub path: PathBuf,
}

/// Discover every `*.jsonl` log under `projects_dir/<project>/`.
///
/// `project_filter` keeps only projects whose directory name contains it, ignoring case.
/// Results are sorted by project then file name. A missing `projects_dir` yields an empty
/// list; unreadable project directories are logged and skipped.
pub fn discover_session_logs(projects_dir: &Path, project_filter: Option<&str>) -> Vec<SessionLog> {
    let entries = match fs::read_dir(projects_dir) {
        Ok(entries) => entries,
        Err(e) => {
            if projects_dir.exists() {
                tracing::warn!(
                    dir = %projects_dir.display(),
                    error = %e,
                    "failed to read projects directory"
                );
            } else {
                tracing::debug!(dir = %projects_dir.display(), "projects directory does not exist");
            }
            return Vec::new();
        }
    };

    let filter = project_filter.filter(|f| !f.is_empty()).map(str::to_lowercase);
    let mut logs = Vec::new();

    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }

        let project_dir = entry.file_name().to_string_lossy().into_owned();
        if let Some(filter) = &filter
            && !project_dir.to_lowercase().contains(filter.as_str())
        {
            continue;
        }

        let files = match fs::read_dir(&path) {
            Ok(files) => files,
            Err(e) => {
                tracing::warn!(
                    dir = %path.display(),
                    error = %e,
                    "failed to read project directory"
                );
                continue;
            }
        };

        for file in files.flatten() {
            let file_path = file.path();
            if file_path.extension().and_then(|ext| ext.to_str()) != Some(LOG_EXTENSION)
                || !file_path.is_file()
            {
                continue;
            }
            let Some(session_id) = file_path.file_stem().map(|s| s.to_string_lossy().into_owned())
            else {
                continue;
            };
            logs.push(SessionLog { project_dir: project_dir.clone(), session_id, path: file_path });
        }
    }

    logs.sort_by(|a, b| a.project_dir.cmp(&b.project_dir).then_with(|| a.path.cmp(&b.path)));
    logs
}

/// Logs whose session id starts with `prefix`, newest modification time first.
pub fn find_session_logs(projects_dir: &Path, prefix: &str) -> Vec<SessionLog> {
    let mut matches: Vec<(SystemTime, SessionLog)> = discover_session_logs(projects_dir, None)
        .into_iter()
        .filter(|log| log.session_id.starts_with(prefix))
        .map(|log| {
            let mtime = fs::metadata(&log.path)
                .and_then(|meta| meta.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            (mtime, log)
        })
        .collect();

    matches.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.path.cmp(&b.1.path)));
    matches.into_iter().map(|(_, log)| log).collect()
}

/// Stream one log, degrading an unreadable file to a warning.
pub(crate) fn scan_or_skip<P, F>(log: &SessionLog, prefilter: P, visit: F)
where
    P: Fn(&str) -> bool,
    F: FnMut(EventRecord),
{
    if let Err(e) = scan_log(&log.path, prefilter, visit) {
        tracing::warn!(log = %log.path.display(), error = %e, "skipping unreadable session log");
    }
}

/// Run `scan` once per log in parallel and concatenate the rows in log order.
pub(crate) fn scan_logs<T, F>(logs: &[SessionLog], scan: F) -> Vec<T>
where
    T: Send,
    F: Fn(&SessionLog) -> Vec<T> + Sync,
{
    let per_log: Vec<Vec<T>> = logs.par_iter().map(|log| scan(log)).collect();
    per_log.into_iter().flatten().collect()
}
