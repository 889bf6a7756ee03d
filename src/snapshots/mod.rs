//! Recovered file snapshots under the recovery directory.
//!
//! [`SnapshotStore`] owns the directory listing and two memo caches: the version index
//! (filename to every [`FileVersion`]) and the [`RecoveredFile`] built during search for
//! each recovered copy, keyed by the copy's path. Both live as long as the store and are
//! never invalidated; a new store sees new data.

pub mod layout;
pub mod search;
pub mod statistics;
pub mod versions;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock, PoisonError};

use crate::error::{RecoveryError, Result};
use crate::models::{FileVersion, RecoveredContent, RecoveredFile};
pub use layout::{SessionDir, list_recovered_dirs, list_version_dirs, parse_snapshot_name};
pub use versions::{latest, read_version};

pub struct SnapshotStore {
    recovery_dir: PathBuf,
    version_dirs: OnceLock<Vec<SessionDir>>,
    recovered_dirs: OnceLock<Vec<SessionDir>>,
    version_cache: Mutex<HashMap<String, Vec<FileVersion>>>,
    file_cache: Mutex<HashMap<PathBuf, RecoveredFile>>,
}

impl SnapshotStore {
    pub fn new(recovery_dir: impl Into<PathBuf>) -> Self {
        Self {
            recovery_dir: recovery_dir.into(),
            version_dirs: OnceLock::new(),
            recovered_dirs: OnceLock::new(),
            version_cache: Mutex::new(HashMap::new()),
            file_cache: Mutex::new(HashMap::new()),
        }
    }

    pub(crate) fn version_dirs(&self) -> &[SessionDir] {
        self.version_dirs.get_or_init(|| list_version_dirs(&self.recovery_dir))
    }

    pub(crate) fn recovered_dirs(&self) -> &[SessionDir] {
        self.recovered_dirs.get_or_init(|| list_recovered_dirs(&self.recovery_dir))
    }

    /// Every snapshot of `filename`, ascending by version. Memoized per filename.
    pub fn versions(&self, filename: &str) -> Vec<FileVersion> {
        if let Some(cached) =
            self.version_cache.lock().unwrap_or_else(PoisonError::into_inner).get(filename)
        {
            return cached.clone();
        }

        let scanned = versions::scan_versions(self.version_dirs(), filename);
        self.version_cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(filename.to_string())
            .or_insert(scanned)
            .clone()
    }

    /// Content of the highest version of `filename`.
    ///
    /// Falls back to the first plain recovered copy when no snapshot exists.
    ///
    /// # Errors
    ///
    /// [`RecoveryError::NotFound`] when there is neither a snapshot nor a copy, and
    /// [`RecoveryError::MissingSnapshot`] when the indexed newest snapshot is gone.
    pub fn extract_final(&self, filename: &str) -> Result<RecoveredContent> {
        let versions = self.versions(filename);
        if let Some(newest) = latest(&versions) {
            return read_version(newest);
        }
        self.recovered_copy(filename)
    }

    /// Content of every version of `filename`, oldest first.
    ///
    /// Without snapshots, the single recovered copy is returned on its own.
    pub fn extract_all(&self, filename: &str) -> Result<Vec<RecoveredContent>> {
        let versions = self.versions(filename);
        if versions.is_empty() {
            return Ok(vec![self.recovered_copy(filename)?]);
        }
        versions.iter().map(read_version).collect()
    }

    fn recovered_copy(&self, filename: &str) -> Result<RecoveredContent> {
        versions::read_recovered_copy(self.recovered_dirs(), filename)?
            .ok_or_else(|| RecoveryError::not_found(format!("no recovered copy of {}", filename)))
    }
}
