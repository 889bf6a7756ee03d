use std::path::Path;

use super::discovery::{discover_session_logs, scan_logs, scan_or_skip};
use crate::models::{CONTENT_WRITING_TOOLS, CrossReference, PATH_RECORDING_TOOLS};
use crate::pattern::raw_line_may_contain;
use crate::utils::{basename_matches, path_ends_with, truncate_chars};

pub const DEFAULT_SNIPPET_CHARS: usize = 200;

/// Options for [`cross_reference_session`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossRefQuery {
    /// Only records whose session id starts with this prefix.
    pub session_prefix: Option<String>,
    pub snippet_chars: usize,
}

impl Default for CrossRefQuery {
    fn default() -> Self {
        Self { session_prefix: None, snippet_chars: DEFAULT_SNIPPET_CHARS }
    }
}

fn is_assistant_line(line: &str) -> bool {
    line.contains(r#""type":"assistant""#) || line.contains(r#""type": "assistant""#)
}

/// Write/Edit invocations on `filename`, oldest first, each checked against `current_content`.
///
/// A snippet counts as present only when it is non-empty and occurs verbatim.
pub fn cross_reference_session(
    projects_dir: &Path,
    filename: &str,
    current_content: &str,
    query: &CrossRefQuery,
) -> Vec<CrossReference> {
    let logs = discover_session_logs(projects_dir, None);

    let mut refs = scan_logs(&logs, |log| {
        let mut rows = Vec::new();
        scan_or_skip(log, is_assistant_line, |record| {
            if !record.is_assistant() {
                return;
            }
            if let Some(prefix) = &query.session_prefix
                && !record.session_id.starts_with(prefix.as_str())
            {
                return;
            }
            for invocation in record.tool_invocations() {
                if !invocation.is_one_of(CONTENT_WRITING_TOOLS) {
                    continue;
                }
                let Some(file_path) = invocation.input_str("file_path") else {
                    continue;
                };
                if !path_ends_with(file_path, filename) {
                    continue;
                }
                let written = invocation
                    .input_str("new_string")
                    .filter(|s| !s.is_empty())
                    .or_else(|| invocation.input_str("content"))
                    .unwrap_or_default();
                let snippet = truncate_chars(written, query.snippet_chars);
                rows.push(CrossReference {
                    session_id: record.session_id.clone(),
                    project_dir: log.project_dir.clone(),
                    timestamp: record.timestamp.clone(),
                    tool: invocation.name.to_string(),
                    file_path: file_path.to_string(),
                    content_snippet: snippet.to_string(),
                    found_in_current: !snippet.is_empty() && current_content.contains(snippet),
                });
            }
        });
        rows
    });

    refs.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
    refs
}

/// Raw needle for a filename, when it survives JSON string encoding unchanged.
fn raw_needle(filename: &str) -> Option<String> {
    (filename.is_ascii() && !filename.contains(['"', '\\'])).then(|| filename.to_ascii_lowercase())
}

/// Last absolute path any session recorded for `filename`.
///
/// Tool-result confirmations take precedence over tool inputs within one record. Across
/// records the latest timestamp wins, and on equal timestamps the later record does.
/// Conflicting paths are settled by timestamp, never by the order logs are scanned in.
pub fn get_original_path(projects_dir: &Path, filename: &str) -> Option<String> {
    if filename.is_empty() {
        return None;
    }
    let needle = raw_needle(filename);
    let logs = discover_session_logs(projects_dir, None);

    let candidates: Vec<(String, String)> = scan_logs(&logs, |log| {
        let mut found = Vec::new();
        let prefilter =
            |line: &str| needle.as_deref().is_none_or(|n| raw_line_may_contain(line, n));
        scan_or_skip(log, prefilter, |record| {
            if let Some(path) = record.confirmed_file_path()
                && basename_matches(path, filename)
            {
                found.push((record.timestamp.clone(), path.to_string()));
                return;
            }
            let recorded = record
                .tool_invocations()
                .filter(|invocation| invocation.is_one_of(PATH_RECORDING_TOOLS))
                .filter_map(|invocation| invocation.target_path())
                .filter(|path| basename_matches(path, filename))
                .last();
            if let Some(path) = recorded {
                found.push((record.timestamp.clone(), path.to_string()));
            }
        });
        found
    });

    candidates
        .into_iter()
        .enumerate()
        .max_by(|(i, a), (j, b)| a.0.cmp(&b.0).then(i.cmp(j)))
        .map(|(_, (_, path))| path)
}
