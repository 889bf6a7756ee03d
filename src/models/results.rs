use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::record::MessageType;

/// A user, assistant or system message pulled out of a session log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMessage {
    pub message_type: MessageType,
    pub timestamp: String,
    /// Message text, or the serialized tool input for tool searches.
    pub content: String,
    pub session_id: String,
}

/// A matching message with its neighbours from the same log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextMatch {
    pub matched: SessionMessage,
    pub context_before: Vec<SessionMessage>,
    pub context_after: Vec<SessionMessage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionMatch {
    pub session_id: String,
    pub project_dir: String,
    pub timestamp: String,
    pub content: String,
    pub category: String,
    pub matched_pattern: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanningCommandCount {
    pub command: String,
    pub count: usize,
    pub unique_sessions: usize,
    pub unique_projects: usize,
    pub session_ids: Vec<String>,
    pub project_dirs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub session_id: String,
    pub project_dir: String,
    pub cwd: String,
    pub git_branch: String,
    pub timestamp_first: String,
    pub timestamp_last: String,
    pub message_count: usize,
    pub has_compact_summary: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionAnalysis {
    pub session_id: String,
    pub project_dir: String,
    pub total_lines: usize,
    pub user_count: usize,
    pub assistant_count: usize,
    pub tool_uses_by_name: BTreeMap<String, usize>,
    pub files_touched: Vec<String>,
    pub timestamp_first: String,
    pub timestamp_last: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub message_type: MessageType,
    pub timestamp: String,
    pub content_preview: String,
    pub tool_count: usize,
}

/// A Write/Edit invocation on a file, checked against the file's current content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossReference {
    pub session_id: String,
    pub project_dir: String,
    pub timestamp: String,
    pub tool: String,
    pub file_path: String,
    pub content_snippet: String,
    pub found_in_current: bool,
}
