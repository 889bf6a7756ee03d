use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RecoveryError>;

/// Errors surfaced to callers of the recovery engine.
///
/// Malformed log lines never show up here: scans skip them and keep going.
#[derive(Debug, Error)]
pub enum RecoveryError {
    #[error("invalid search pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },
    #[error("invalid filter: {0}")]
    InvalidFilter(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error(
        "snapshot for {filename} v{version:06} is indexed but missing on disk: {}",
        path.display()
    )]
    MissingSnapshot { filename: String, version: u32, path: PathBuf },
    #[error(
        "ambiguous session id {prefix:?} matches {} sessions: {}",
        candidates.len(),
        candidates.join(", ")
    )]
    AmbiguousSession { prefix: String, candidates: Vec<String> },
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl RecoveryError {
    pub fn invalid_pattern(pattern: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidPattern { pattern: pattern.into(), reason: reason.to_string() }
    }

    pub fn invalid_filter(message: impl Into<String>) -> Self {
        Self::InvalidFilter(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io { context: context.into(), source }
    }
}
