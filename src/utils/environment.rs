use std::env;
use std::path::PathBuf;

use crate::error::{RecoveryError, Result};

/// Overrides the session log root (`~/.claude/projects`).
pub const PROJECTS_DIR_ENV: &str = "AI_HISTORY_RECOVERY_PROJECTS";

/// Overrides the snapshot root (`~/.claude/recovery`).
pub const RECOVERY_DIR_ENV: &str = "AI_HISTORY_RECOVERY_DIR";

/// Log filter directive for the binary, e.g. `debug` or `ai_history_recovery=trace`.
pub const LOG_FILTER_ENV: &str = "AI_HISTORY_RECOVERY_LOG";

/// Get the Claude directory path (`~/.claude`)
pub fn get_claude_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| {
        RecoveryError::not_found("home directory (set HOME or pass explicit directories)")
    })?;
    Ok(home.join(".claude"))
}

/// Directory named by `var`, or `<claude dir>/<default_subdir>` when unset or empty.
pub fn dir_from_env(var: &str, default_subdir: &str) -> Result<PathBuf> {
    match env::var_os(var) {
        Some(value) if !value.is_empty() => Ok(PathBuf::from(value)),
        _ => Ok(get_claude_dir()?.join(default_subdir)),
    }
}
