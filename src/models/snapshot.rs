use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One captured version of a file, parsed from `<filename>_v<NNNNNN>_line_<count>.txt`.
///
/// Versions order by `version` alone; line count never takes part in ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileVersion {
    pub filename: String,
    pub version: u32,
    pub line_count: u32,
    pub session_id: String,
    /// Capture time of the snapshot file (`YYYY-MM-DD HH:MM`, UTC); empty when unknown.
    pub timestamp: String,
    pub path: PathBuf,
}

impl PartialOrd for FileVersion {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FileVersion {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.version
            .cmp(&other.version)
            .then_with(|| self.session_id.cmp(&other.session_id))
            .then_with(|| self.path.cmp(&other.path))
    }
}

/// A recovered filename aggregated across every session that touched it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveredFile {
    pub name: String,
    /// Representative copy: the first `session_<id>/` copy that passed the search filter.
    pub location: PathBuf,
    /// Extension without the leading dot, or `unknown`.
    pub file_type: String,
    pub size_bytes: u64,
    /// `YYYY-MM-DDTHH:MM:SS`, UTC.
    pub created: Option<String>,
    /// `YYYY-MM-DDTHH:MM:SS`, UTC.
    pub last_modified: Option<String>,
    /// Number of snapshot versions across all sessions.
    pub edits: usize,
    /// Sorted, de-duplicated ids of the sessions that touched the file.
    pub sessions: Vec<String>,
}

/// Content of one recovered version, ready to be written out by a caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveredContent {
    pub filename: String,
    /// `None` when the content came from a plain recovered copy rather than a snapshot.
    pub version: Option<u32>,
    pub line_count: Option<u32>,
    pub session_id: String,
    pub source: PathBuf,
    pub content: String,
}

impl RecoveredContent {
    /// Name used when extracting a full version history.
    pub fn history_name(&self) -> String {
        match (self.version, self.line_count) {
            (Some(version), Some(lines)) => format!("v{:06}_line_{}.txt", version, lines),
            _ => "v000001_final.txt".to_string(),
        }
    }
}

/// Totals gathered in one pass over the recovery directory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecoveryStatistics {
    pub total_sessions: usize,
    pub total_files: usize,
    pub total_versions: usize,
    pub total_size_bytes: u64,
    pub largest_file: Option<String>,
    pub largest_file_edits: usize,
    pub avg_versions_per_file: f64,
}
