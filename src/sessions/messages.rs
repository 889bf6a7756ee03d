use std::path::Path;

use super::discovery::{SessionLog, discover_session_logs, scan_logs, scan_or_skip};
use crate::error::Result;
use crate::models::{ContextMatch, EventRecord, MessageType, SessionMessage};
use crate::pattern::{QueryMatcher, raw_line_may_contain};

/// Parameters of a message search.
///
/// An empty `query` matches every message. Setting `tool` switches the search to
/// tool invocations of that name and matches `query` against their serialized input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageQuery {
    pub query: String,
    pub message_type: Option<MessageType>,
    pub tool: Option<String>,
}

impl MessageQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self { query: query.into(), ..Self::default() }
    }

    pub fn with_type(mut self, message_type: Option<MessageType>) -> Self {
        self.message_type = message_type;
        self
    }

    pub fn with_tool(mut self, tool: Option<impl Into<String>>) -> Self {
        self.tool = tool.map(Into::into);
        self
    }

    /// Tool searches only ever see assistant records unless told otherwise.
    pub fn effective_type(&self) -> Option<MessageType> {
        match (&self.tool, self.message_type) {
            (Some(_), None) => Some(MessageType::Assistant),
            (_, message_type) => message_type,
        }
    }
}

/// A [`MessageQuery`] with its pattern compiled and raw-line hints prepared.
struct CompiledQuery {
    matcher: Option<QueryMatcher>,
    message_type: Option<MessageType>,
    tool: Option<String>,
    type_hint: Option<String>,
    tool_hint: Option<String>,
}

impl CompiledQuery {
    fn compile(query: &MessageQuery) -> Result<Self> {
        let matcher =
            if query.query.is_empty() { None } else { Some(QueryMatcher::compile(&query.query)?) };
        let message_type = query.effective_type();
        let tool = query.tool.clone().filter(|t| !t.is_empty());
        let tool_hint = tool
            .as_deref()
            .filter(|t| t.is_ascii() && !t.contains(['"', '\\']))
            .map(|t| format!("\"{}\"", t.to_ascii_lowercase()));

        Ok(Self {
            matcher,
            message_type,
            type_hint: message_type.map(|t| format!("\"{}\"", t.as_str())),
            tool,
            tool_hint,
        })
    }

    /// Raw-line checks. None of them can reject a line the parsed check would accept.
    fn may_match_raw(&self, line: &str, check_query: bool) -> bool {
        if let Some(hint) = &self.type_hint
            && !raw_line_may_contain(line, hint)
        {
            return false;
        }
        if let Some(hint) = &self.tool_hint
            && !raw_line_may_contain(line, hint)
        {
            return false;
        }
        // serialized tool input is re-rendered, so only prose can use the literal skip
        match (&self.matcher, check_query && self.tool.is_none()) {
            (Some(matcher), true) => matcher.may_match_raw(line),
            _ => true,
        }
    }

    fn is_match(&self, text: &str) -> bool {
        self.matcher.as_ref().is_none_or(|m| m.is_match(text))
    }

    fn type_matches(&self, record: &EventRecord) -> bool {
        self.message_type.is_none_or(|t| record.has_type(t))
    }

    /// The matching message a record yields, if any.
    fn matching_message(&self, record: &EventRecord) -> Option<SessionMessage> {
        if !self.type_matches(record) {
            return None;
        }
        let content = match &self.tool {
            Some(tool) => record
                .tool_invocations()
                .filter(|invocation| invocation.name.eq_ignore_ascii_case(tool))
                .map(|invocation| invocation.serialized_input())
                .find(|input| self.is_match(input))?,
            None => {
                let text = record.text();
                if text.is_empty() || !self.is_match(&text) {
                    return None;
                }
                text
            }
        };
        Some(message_from(record, content))
    }

    /// The message a record contributes to a context buffer, before matching.
    fn candidate_message(&self, record: &EventRecord) -> Option<SessionMessage> {
        if !self.type_matches(record) {
            return None;
        }
        let content = match &self.tool {
            Some(tool) => record.find_tool(tool)?.serialized_input(),
            None => Some(record.text()).filter(|text| !text.is_empty())?,
        };
        Some(message_from(record, content))
    }
}

fn message_from(record: &EventRecord, content: String) -> SessionMessage {
    SessionMessage {
        message_type: record.message_type(),
        timestamp: record.timestamp.clone(),
        content,
        session_id: record.session_id.clone(),
    }
}

fn is_known_type(record: &EventRecord) -> bool {
    [MessageType::User, MessageType::Assistant, MessageType::System]
        .into_iter()
        .any(|t| record.has_type(t))
}

/// Messages of one session, matched by exact id or id prefix.
///
/// Only logs whose file stem starts with `session_prefix` are opened. Messages without
/// text are skipped.
pub fn get_messages(
    projects_dir: &Path,
    session_prefix: &str,
    message_type: Option<MessageType>,
) -> Vec<SessionMessage> {
    let logs: Vec<SessionLog> = discover_session_logs(projects_dir, None)
        .into_iter()
        .filter(|log| log.session_id.starts_with(session_prefix))
        .collect();

    scan_logs(&logs, |log| {
        let mut rows = Vec::new();
        scan_or_skip(
            log,
            |line| line.contains(session_prefix),
            |record| {
                if !record.session_id.starts_with(session_prefix) {
                    return;
                }
                if message_type.is_some_and(|t| !record.has_type(t)) {
                    return;
                }
                let text = record.text();
                if !text.is_empty() {
                    rows.push(message_from(&record, text));
                }
            },
        );
        rows
    })
}

/// Full scan of every log for messages matching `query`.
///
/// # Errors
///
/// Returns [`crate::RecoveryError::InvalidPattern`] before any log is opened if the
/// query does not compile.
pub fn search_messages(projects_dir: &Path, query: &MessageQuery) -> Result<Vec<SessionMessage>> {
    let compiled = CompiledQuery::compile(query)?;
    let logs = discover_session_logs(projects_dir, None);

    Ok(scan_logs(&logs, |log| {
        let mut rows = Vec::new();
        scan_or_skip(
            log,
            |line| compiled.may_match_raw(line, true),
            |record| rows.extend(compiled.matching_message(&record)),
        );
        rows
    }))
}

/// Matches with up to `window` neighbouring messages on each side from the same log.
///
/// Each log is buffered in full; only user, assistant and system records take part.
pub fn search_messages_with_context(
    projects_dir: &Path,
    query: &MessageQuery,
    window: usize,
) -> Result<Vec<ContextMatch>> {
    let compiled = CompiledQuery::compile(query)?;
    let logs = discover_session_logs(projects_dir, None);

    Ok(scan_logs(&logs, |log| {
        let mut buffer = Vec::new();
        scan_or_skip(
            log,
            |line| compiled.may_match_raw(line, false),
            |record| {
                if is_known_type(&record) {
                    buffer.extend(compiled.candidate_message(&record));
                }
            },
        );
        context_windows(&buffer, window, |message| compiled.is_match(&message.content))
    }))
}

/// Slice a window around every message accepted by `is_match`.
pub(crate) fn context_windows<F>(
    messages: &[SessionMessage],
    window: usize,
    is_match: F,
) -> Vec<ContextMatch>
where
    F: Fn(&SessionMessage) -> bool,
{
    messages
        .iter()
        .enumerate()
        .filter(|(_, message)| is_match(message))
        .map(|(i, message)| ContextMatch {
            matched: message.clone(),
            context_before: messages[i.saturating_sub(window)..i].to_vec(),
            context_after: messages[i + 1..messages.len().min(i + 1 + window)].to_vec(),
        })
        .collect()
}
