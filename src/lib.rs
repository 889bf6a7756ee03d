//! AI History Recovery - recover edited files and mine AI coding session logs
//!
//! This library reads two local, read-only data sources:
//!
//! - Session logs: `<projects_dir>/<project>/<session-id>.jsonl`, one JSON record per line
//! - Snapshots: `<recovery_dir>/session_all_versions_<id>/<file>_v<NNNNNN>_line_<n>.txt`,
//!   plus the latest copy of each file in `<recovery_dir>/session_<id>/`
//!
//! It supports:
//!
//! - Searching recovered files by glob or regex with composable filters
//! - Listing and extracting every version of a file, newest by version number
//! - Searching messages, tool invocations, corrections and slash-command usage
//! - Per-session listing, analysis, timelines and markdown export
//!
//! # Example
//!
//! ```no_run
//! use ai_history_recovery::{EngineConfig, FilterSpec, RecoveryEngine};
//!
//! let engine = RecoveryEngine::new(EngineConfig::new(
//!     "/Users/alice/.claude/projects",
//!     "/Users/alice/.claude/recovery",
//! ));
//! let files = engine.search("*.py", &FilterSpec::new().with_edit_range(Some(2), None))?;
//! for file in files {
//!     println!("{} ({} edits)", file.name, file.edits);
//! }
//! # Ok::<(), ai_history_recovery::RecoveryError>(())
//! ```

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod filters;
pub mod models;
pub mod parsers;
pub mod pattern;
pub mod sessions;
pub mod snapshots;
pub mod utils;

// Re-export commonly used types
pub use config::EngineConfig;
pub use engine::RecoveryEngine;
pub use error::{RecoveryError, Result};
pub use filters::{FilterSpec, parse_filter};
pub use models::{
    FileVersion, MessageType, RecoveredContent, RecoveredFile, RecoveryStatistics, SessionMessage,
};
pub use sessions::{CorrectionQuery, CrossRefQuery, MessageQuery, PlanningQuery};
