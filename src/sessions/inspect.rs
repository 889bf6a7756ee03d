use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use super::discovery::{
    SessionLog, discover_session_logs, find_session_logs, scan_logs, scan_or_skip,
};
use crate::error::{RecoveryError, Result};
use crate::filters::timestamp_in_bounds;
use crate::models::{EventRecord, SessionAnalysis, SessionInfo, TimelineEvent};
use crate::parsers::read_log;
use crate::utils::truncate_chars;

const UNKNOWN_BRANCH: &str = "unknown";

/// Harness text that is never rendered in an export.
const EXPORT_NOISE: &[&str] = &["[Request interrupted", "<task-notification>", "<system-reminder>"];

pub const DEFAULT_PREVIEW_CHARS: usize = 150;

/// First/last timestamp plus the first `cwd` and branch seen in a log.
#[derive(Debug, Default)]
struct SessionHeader {
    cwd: String,
    git_branch: Option<String>,
    first: String,
    last: String,
}

impl SessionHeader {
    fn observe(&mut self, record: &EventRecord) {
        if !record.timestamp.is_empty() {
            if self.first.is_empty() {
                self.first = record.timestamp.clone();
            }
            self.last = record.timestamp.clone();
        }
        if self.cwd.is_empty() && !record.cwd.is_empty() {
            self.cwd = record.cwd.clone();
        }
        if self.git_branch.is_none() && !record.git_branch.is_empty() {
            self.git_branch = Some(record.git_branch.clone());
        }
    }

    fn branch(&self) -> String {
        self.git_branch.clone().unwrap_or_else(|| UNKNOWN_BRANCH.to_string())
    }
}

fn summarize(log: &SessionLog) -> SessionInfo {
    let mut header = SessionHeader::default();
    let mut message_count = 0;
    let mut has_compact_summary = false;

    scan_or_skip(log, |_| true, |record| {
        header.observe(&record);
        has_compact_summary |= record.is_compact_summary();
        if record.is_conversation() {
            message_count += 1;
        }
    });

    SessionInfo {
        session_id: log.session_id.clone(),
        project_dir: log.project_dir.clone(),
        git_branch: header.branch(),
        cwd: header.cwd,
        timestamp_first: header.first,
        timestamp_last: header.last,
        message_count,
        has_compact_summary,
    }
}

/// One row per session log, newest first by first timestamp.
///
/// `after`/`before` bound the first timestamp; sessions without one are kept.
pub fn get_sessions(
    projects_dir: &Path,
    project_filter: Option<&str>,
    after: Option<&str>,
    before: Option<&str>,
) -> Vec<SessionInfo> {
    let logs = discover_session_logs(projects_dir, project_filter);
    let mut sessions: Vec<SessionInfo> = scan_logs(&logs, |log| vec![summarize(log)])
        .into_iter()
        .filter(|info| timestamp_in_bounds(&info.timestamp_first, after, before))
        .collect();
    sessions.sort_by(|a, b| b.timestamp_first.cmp(&a.timestamp_first));
    sessions
}

/// The single log a prefix names.
///
/// # Errors
///
/// [`RecoveryError::NotFound`] when nothing matches, [`RecoveryError::AmbiguousSession`]
/// when more than one log does.
pub fn resolve_unique_session(projects_dir: &Path, prefix: &str) -> Result<SessionLog> {
    let mut matches = find_session_logs(projects_dir, prefix);
    match matches.len() {
        0 => Err(RecoveryError::not_found(format!("no session matching {:?}", prefix))),
        1 => Ok(matches.remove(0)),
        _ => Err(RecoveryError::AmbiguousSession {
            prefix: prefix.to_string(),
            candidates: matches.into_iter().map(|log| log.session_id).collect(),
        }),
    }
}

fn is_export_noise(content: &str) -> bool {
    EXPORT_NOISE.iter().any(|noise| content.contains(noise))
}

/// Render one session as markdown: a metadata header, then one section per message.
pub fn export_session_markdown(projects_dir: &Path, session_prefix: &str) -> Result<String> {
    let log = resolve_unique_session(projects_dir, session_prefix)?;
    let records = read_log(&log.path)?;

    let mut header = SessionHeader::default();
    let mut sections = Vec::new();
    for record in &records {
        header.observe(record);
        if !record.is_conversation() {
            continue;
        }
        let content = record.text();
        if content.trim().is_empty() || is_export_noise(&content) {
            continue;
        }
        if record.is_compact_summary() {
            sections.push(format!("## Session Summary\n\n{}\n\n---\n", content));
        } else {
            let when = if record.timestamp.is_empty() {
                "-".to_string()
            } else {
                truncate_chars(&record.timestamp, 16).replace('T', " ")
            };
            sections.push(format!("## [{}] {}\n\n{}\n\n---\n", record.record_type, when, content));
        }
    }

    let mut out = format!(
        "# Session {}\n\n**Date**: {}\n**Branch**: {}\n**Directory**: {}\n**Messages**: {}\n\n---\n\n",
        truncate_chars(&log.session_id, 8),
        header.first,
        header.branch(),
        header.cwd,
        sections.len()
    );
    out.push_str(&sections.join("\n"));
    Ok(out)
}

/// Counts, tool usage and touched files for the newest log matching `session_prefix`.
pub fn analyze_session(
    projects_dir: &Path,
    session_prefix: &str,
) -> Result<Option<SessionAnalysis>> {
    let Some(log) = find_session_logs(projects_dir, session_prefix).into_iter().next() else {
        return Ok(None);
    };
    let records = read_log(&log.path)?;

    let mut header = SessionHeader::default();
    let mut user_count = 0;
    let mut assistant_count = 0;
    let mut tool_uses_by_name: BTreeMap<String, usize> = BTreeMap::new();
    let mut files_touched = BTreeSet::new();

    for record in &records {
        header.observe(record);
        if record.is_user() {
            user_count += 1;
        } else if record.is_assistant() {
            assistant_count += 1;
            for invocation in record.tool_invocations() {
                let name = if invocation.name.is_empty() { "unknown" } else { invocation.name };
                *tool_uses_by_name.entry(name.to_string()).or_default() += 1;
                if let Some(path) = invocation.input_str("file_path").filter(|p| !p.is_empty()) {
                    files_touched.insert(path.to_string());
                }
            }
        }
    }

    Ok(Some(SessionAnalysis {
        session_id: log.session_id,
        project_dir: log.project_dir,
        total_lines: records.len(),
        user_count,
        assistant_count,
        tool_uses_by_name,
        files_touched: files_touched.into_iter().collect(),
        timestamp_first: header.first,
        timestamp_last: header.last,
    }))
}

/// User and assistant events of the newest matching log, in log order.
pub fn timeline_session(
    projects_dir: &Path,
    session_prefix: &str,
    preview_chars: usize,
) -> Result<Vec<TimelineEvent>> {
    let Some(log) = find_session_logs(projects_dir, session_prefix).into_iter().next() else {
        return Ok(Vec::new());
    };

    Ok(read_log(&log.path)?
        .iter()
        .filter(|record| record.is_conversation())
        .map(|record| TimelineEvent {
            message_type: record.message_type(),
            timestamp: record.timestamp.clone(),
            content_preview: truncate_chars(&record.text(), preview_chars).to_string(),
            tool_count: if record.is_assistant() { record.tool_invocations().count() } else { 0 },
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;
    use crate::models::MessageType;

    fn write_log(root: &Path, project: &str, session: &str, lines: &[&str]) {
        let dir = root.join(project);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(format!("{}.jsonl", session)), lines.join("\n")).unwrap();
    }

    const USER: &str = r#"{"type":"user","sessionId":"abc123","timestamp":"2026-01-24T10:00:00Z","cwd":"/w/proj","gitBranch":"main","message":{"role":"user","content":"please fix the parser"}}"#;
    const ASSISTANT: &str = r#"{"type":"assistant","sessionId":"abc123","timestamp":"2026-01-24T10:05:00Z","message":{"content":[{"type":"text","text":"Fixed it."},{"type":"tool_use","id":"t1","name":"Edit","input":{"file_path":"/w/proj/parser.rs","old_string":"a","new_string":"b"}},{"type":"tool_use","id":"t2","name":"Bash","input":{"command":"cargo test"}}]}}"#;
    const NOISE: &str = r#"{"type":"user","sessionId":"abc123","timestamp":"2026-01-24T10:06:00Z","message":{"content":"<system-reminder>ignore</system-reminder>"}}"#;
    const SUMMARY: &str = r#"{"type":"user","sessionId":"abc123","timestamp":"2026-01-24T10:07:00Z","isCompactSummary":true,"message":{"content":"Summary of prior work"}}"#;
    const META: &str = r#"{"type":"file-history-snapshot","messageId":"m1"}"#;

    #[test]
    fn test_get_sessions_row() {
        let root = TempDir::new().unwrap();
        write_log(root.path(), "-w-proj", "abc123", &[META, USER, ASSISTANT, SUMMARY]);

        let sessions = get_sessions(root.path(), None, None, None);
        assert_eq!(sessions.len(), 1);
        let s = &sessions[0];
        assert_eq!(s.session_id, "abc123");
        assert_eq!(s.project_dir, "-w-proj");
        assert_eq!(s.cwd, "/w/proj");
        assert_eq!(s.git_branch, "main");
        assert_eq!(s.timestamp_first, "2026-01-24T10:00:00Z");
        assert_eq!(s.timestamp_last, "2026-01-24T10:07:00Z");
        assert_eq!(s.message_count, 3);
        assert!(s.has_compact_summary);
    }

    #[test]
    fn test_get_sessions_bounds_and_order() {
        let root = TempDir::new().unwrap();
        let old = r#"{"type":"user","timestamp":"2025-12-01T00:00:00Z"}"#;
        let new = r#"{"type":"user","timestamp":"2026-02-01T00:00:00Z"}"#;
        write_log(root.path(), "p", "old", &[old]);
        write_log(root.path(), "p", "new", &[new]);
        write_log(root.path(), "p", "empty", &[META]);

        let all = get_sessions(root.path(), None, None, None);
        let ids: Vec<_> = all.iter().map(|s| s.session_id.as_str()).collect();
        assert_eq!(ids, vec!["new", "old", "empty"]);
        assert_eq!(all[2].git_branch, "unknown");

        let recent = get_sessions(root.path(), None, Some("2026-01"), None);
        let ids: Vec<_> = recent.iter().map(|s| s.session_id.as_str()).collect();
        assert_eq!(ids, vec!["new", "empty"]);
    }

    #[test]
    fn test_export_markdown() {
        let root = TempDir::new().unwrap();
        write_log(root.path(), "p", "abc123", &[USER, ASSISTANT, NOISE, SUMMARY]);

        let md = export_session_markdown(root.path(), "abc").unwrap();
        assert!(md.starts_with("# Session abc123\n"));
        assert!(md.contains("**Branch**: main"));
        assert!(md.contains("**Messages**: 3"));
        assert!(md.contains("## [user] 2026-01-24 10:00\n\nplease fix the parser"));
        assert!(md.contains("## [assistant] 2026-01-24 10:05\n\nFixed it."));
        assert!(md.contains("## Session Summary\n\nSummary of prior work"));
        assert!(!md.contains("system-reminder"));
    }

    #[test]
    fn test_export_requires_unique_match() {
        let root = TempDir::new().unwrap();
        write_log(root.path(), "p", "ab01", &[USER]);
        write_log(root.path(), "p", "ab02", &[USER]);

        let err = export_session_markdown(root.path(), "ab").unwrap_err();
        match err {
            RecoveryError::AmbiguousSession { candidates, .. } => assert_eq!(candidates.len(), 2),
            other => panic!("unexpected error: {other}"),
        }
        let err = export_session_markdown(root.path(), "zz").unwrap_err();
        assert!(matches!(err, RecoveryError::NotFound(_)));
    }

    #[test]
    fn test_analyze_session() {
        let root = TempDir::new().unwrap();
        write_log(root.path(), "p", "abc123", &[META, USER, ASSISTANT, "garbage"]);

        let analysis = analyze_session(root.path(), "abc").unwrap().unwrap();
        assert_eq!(analysis.session_id, "abc123");
        assert_eq!(analysis.total_lines, 3);
        assert_eq!(analysis.user_count, 1);
        assert_eq!(analysis.assistant_count, 1);
        assert_eq!(analysis.tool_uses_by_name.get("Edit"), Some(&1));
        assert_eq!(analysis.tool_uses_by_name.get("Bash"), Some(&1));
        assert_eq!(analysis.files_touched, vec!["/w/proj/parser.rs".to_string()]);

        assert!(analyze_session(root.path(), "zz").unwrap().is_none());
    }

    #[test]
    fn test_timeline_session() {
        let root = TempDir::new().unwrap();
        write_log(root.path(), "p", "abc123", &[META, USER, ASSISTANT]);

        let events = timeline_session(root.path(), "abc", 10).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].message_type, MessageType::User);
        assert_eq!(events[0].content_preview, "please fix");
        assert_eq!(events[0].tool_count, 0);
        assert_eq!(events[1].tool_count, 2);
    }
}
