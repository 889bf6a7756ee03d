use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::PoisonError;

use super::SnapshotStore;
use super::layout::list_files;
use crate::error::Result;
use crate::filters::{FilterSpec, matches_file};
use crate::models::RecoveredFile;
use crate::pattern::compile_pattern;
use crate::utils::paths::{FILE_TIME_FORMAT, format_system_time};
use crate::utils::file_type_of;

impl SnapshotStore {
    /// Recovered files whose name matches `pattern` and that pass `filter`, most edited first.
    ///
    /// Each filename is reported once even if several sessions recovered it. Session
    /// directories excluded by the filter are not read at all.
    ///
    /// # Errors
    ///
    /// [`crate::RecoveryError::InvalidPattern`] before any directory is read.
    pub fn search(&self, pattern: &str, filter: &FilterSpec) -> Result<Vec<RecoveredFile>> {
        let matcher = compile_pattern(pattern)?;
        let needs_stat = filter.has_size_filter() || filter.has_datetime_filter();

        let mut seen: HashSet<String> = HashSet::new();
        let mut results = Vec::new();

        for dir in self.recovered_dirs() {
            if !filter.matches_session(&dir.session_id) {
                continue;
            }
            for (name, path) in list_files(&dir.path) {
                if !matcher.is_match(&name) || seen.contains(&name) {
                    continue;
                }
                if !filter.matches_extension(&file_type_of(&name)) {
                    continue;
                }
                if needs_stat && !passes_stat_filter(&path, filter) {
                    continue;
                }
                let Some(info) = self.file_info(&name, &path, &dir.session_id) else {
                    continue;
                };
                if matches_file(filter, &info) {
                    seen.insert(name);
                    results.push(info);
                }
            }
        }

        tracing::debug!(pattern, matches = results.len(), "file search finished");
        results.sort_by(|a, b| b.edits.cmp(&a.edits));
        Ok(results)
    }

    /// [`RecoveredFile`] for the copy at `path`, memoized per path.
    fn file_info(&self, name: &str, path: &Path, session_id: &str) -> Option<RecoveredFile> {
        if let Some(cached) =
            self.file_cache.lock().unwrap_or_else(PoisonError::into_inner).get(path)
        {
            return Some(cached.clone());
        }

        let meta = match fs::metadata(path) {
            Ok(meta) => meta,
            Err(e) => {
                tracing::debug!(
                    file = %path.display(),
                    error = %e,
                    "skipping unreadable recovered file"
                );
                return None;
            }
        };
        let versions = self.versions(name);
        let mut sessions: Vec<String> = versions.iter().map(|v| v.session_id.clone()).collect();
        sessions.push(session_id.to_string());
        sessions.sort();
        sessions.dedup();

        let info = RecoveredFile {
            name: name.to_string(),
            location: path.to_path_buf(),
            file_type: file_type_of(name),
            size_bytes: meta.len(),
            created: meta.created().ok().map(|t| format_system_time(t, FILE_TIME_FORMAT)),
            last_modified: meta.modified().ok().map(|t| format_system_time(t, FILE_TIME_FORMAT)),
            edits: versions.len(),
            sessions,
        };

        Some(
            self.file_cache
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .entry(path.to_path_buf())
                .or_insert(info)
                .clone(),
        )
    }
}

/// Size and modification time checked straight from `stat`, before the version index is built.
fn passes_stat_filter(path: &Path, filter: &FilterSpec) -> bool {
    let Ok(meta) = fs::metadata(path) else {
        return false;
    };
    let modified = meta.modified().ok().map(|t| format_system_time(t, FILE_TIME_FORMAT));
    filter.matches_size(Some(meta.len())) && filter.matches_datetime(modified.as_deref())
}
