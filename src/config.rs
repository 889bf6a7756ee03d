use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::utils::environment::{PROJECTS_DIR_ENV, RECOVERY_DIR_ENV, dir_from_env};

/// Where the engine reads from. Both roots are treated as read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// One sub-directory per project, each holding `<session-id>.jsonl` logs.
    pub projects_dir: PathBuf,
    /// `session_<id>/` copies and `session_all_versions_<id>/` snapshots.
    pub recovery_dir: PathBuf,
}

impl EngineConfig {
    pub fn new(projects_dir: impl Into<PathBuf>, recovery_dir: impl Into<PathBuf>) -> Self {
        Self { projects_dir: projects_dir.into(), recovery_dir: recovery_dir.into() }
    }

    /// Resolve both roots from the environment, defaulting under `~/.claude`.
    ///
    /// Only the binary calls this; library callers pass directories explicitly.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            projects_dir: dir_from_env(PROJECTS_DIR_ENV, "projects")?,
            recovery_dir: dir_from_env(RECOVERY_DIR_ENV, "recovery")?,
        })
    }

    pub fn with_projects_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.projects_dir = dir.into();
        self
    }

    pub fn with_recovery_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.recovery_dir = dir.into();
        self
    }
}
