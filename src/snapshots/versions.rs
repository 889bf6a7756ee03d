use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use super::layout::{SessionDir, list_files, parse_snapshot_of};
use crate::error::{RecoveryError, Result};
use crate::models::{FileVersion, RecoveredContent};
use crate::utils::paths::{CAPTURE_TIME_FORMAT, format_system_time, is_bare_file_name};

/// Every snapshot of `filename` across all version directories, ascending by version.
///
/// The result does not depend on directory iteration order.
pub fn scan_versions(version_dirs: &[SessionDir], filename: &str) -> Vec<FileVersion> {
    let mut versions = Vec::new();

    for dir in version_dirs {
        for (name, path) in list_files(&dir.path) {
            let Some((version, line_count)) = parse_snapshot_of(&name, filename) else {
                continue;
            };
            let timestamp = fs::metadata(&path)
                .and_then(|meta| meta.modified())
                .map(|mtime| format_system_time(mtime, CAPTURE_TIME_FORMAT))
                .unwrap_or_default();
            versions.push(FileVersion {
                filename: filename.to_string(),
                version,
                line_count,
                session_id: dir.session_id.clone(),
                timestamp,
                path,
            });
        }
    }

    versions.sort();
    versions
}

/// Highest version number; line count plays no part.
pub fn latest(versions: &[FileVersion]) -> Option<&FileVersion> {
    versions.iter().max_by_key(|v| v.version)
}

/// Read the content behind an indexed version.
///
/// # Errors
///
/// [`RecoveryError::MissingSnapshot`] if the snapshot has vanished since it was indexed,
/// [`RecoveryError::Io`] for any other read failure.
pub fn read_version(version: &FileVersion) -> Result<RecoveredContent> {
    let bytes = fs::read(&version.path).map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            RecoveryError::MissingSnapshot {
                filename: version.filename.clone(),
                version: version.version,
                path: version.path.clone(),
            }
        } else {
            RecoveryError::io(format!("failed to read snapshot {}", version.path.display()), e)
        }
    })?;

    Ok(RecoveredContent {
        filename: version.filename.clone(),
        version: Some(version.version),
        line_count: Some(version.line_count),
        session_id: version.session_id.clone(),
        source: version.path.clone(),
        content: String::from_utf8_lossy(&bytes).into_owned(),
    })
}

/// Read the first plain recovered copy of `filename`, in session directory order.
pub fn read_recovered_copy(
    recovered_dirs: &[SessionDir],
    filename: &str,
) -> Result<Option<RecoveredContent>> {
    if !is_bare_file_name(filename) {
        tracing::debug!(filename, "refusing a recovered copy outside its session directory");
        return Ok(None);
    }
    let Some(dir) = recovered_dirs.iter().find(|dir| dir.path.join(filename).is_file()) else {
        return Ok(None);
    };
    let source = dir.path.join(filename);
    let content = read_lossy(&source)?;
    Ok(Some(RecoveredContent {
        filename: filename.to_string(),
        version: None,
        line_count: None,
        session_id: dir.session_id.clone(),
        source,
        content,
    }))
}

fn read_lossy(path: &Path) -> Result<String> {
    let bytes = fs::read(path)
        .map_err(|e| RecoveryError::io(format!("failed to read {}", path.display()), e))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
