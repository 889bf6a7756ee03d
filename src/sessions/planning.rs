use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

use super::corrections::is_user_line;
use super::discovery::{discover_session_logs, scan_logs, scan_or_skip};
use crate::error::{RecoveryError, Result};
use crate::filters::timestamp_in_bounds;
use crate::models::PlanningCommandCount;

static SLASH_COMMAND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/(\w[\w:.-]*)").expect("slash command regex is valid"));

/// Planning commands tracked when a caller asks for the default pattern list.
pub fn default_planning_commands() -> Vec<String> {
    [
        "/ar:plannew",
        "/ar:pn",
        "/ar:planrefine",
        "/ar:pr",
        "/ar:planupdate",
        "/ar:pu",
        "/ar:planprocess",
        "/ar:pp",
        "/plannew",
        "/planrefine",
        "/planupdate",
        "/planprocess",
    ]
    .into_iter()
    .map(|command| format!(r"{}\b", command))
    .collect()
}

/// Options for [`analyze_planning_usage`].
///
/// `commands: None` is discovery mode: every slash command that opens a user message
/// is counted. `Some(patterns)` counts only those regex patterns, in any record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanningQuery {
    pub commands: Option<Vec<String>>,
    pub project_filter: Option<String>,
    pub after: Option<String>,
    pub before: Option<String>,
}

/// One command occurrence found in a record.
struct Hit {
    command: String,
    session_id: String,
    project_dir: String,
}

#[derive(Default)]
struct Tally {
    count: usize,
    sessions: BTreeSet<String>,
    projects: BTreeSet<String>,
}

impl Tally {
    fn into_row(self, command: String) -> PlanningCommandCount {
        PlanningCommandCount {
            command,
            count: self.count,
            unique_sessions: self.sessions.len(),
            unique_projects: self.projects.len(),
            session_ids: self.sessions.into_iter().collect(),
            project_dirs: self.projects.into_iter().collect(),
        }
    }
}

/// Reported name of a pattern: a trailing `\b` is dropped.
fn display_name(pattern: &str) -> String {
    pattern.strip_suffix(r"\b").unwrap_or(pattern).to_string()
}

/// Count slash-command usage, most frequent first.
///
/// In pattern mode, commands with no occurrences are omitted and ties keep the order
/// the patterns were supplied in.
pub fn analyze_planning_usage(
    projects_dir: &Path,
    query: &PlanningQuery,
) -> Result<Vec<PlanningCommandCount>> {
    let compiled: Option<Vec<(String, Regex)>> = match &query.commands {
        Some(commands) => Some(
            commands
                .iter()
                .map(|command| {
                    RegexBuilder::new(command)
                        .case_insensitive(true)
                        .build()
                        .map(|regex| (command.clone(), regex))
                        .map_err(|e| RecoveryError::invalid_pattern(command.clone(), e))
                })
                .collect::<Result<_>>()?,
        ),
        None => None,
    };
    let discovery = compiled.is_none();
    let logs = discover_session_logs(projects_dir, query.project_filter.as_deref());

    let hits = scan_logs(&logs, |log| {
        let mut hits = Vec::new();
        scan_or_skip(
            log,
            |line| !discovery || is_user_line(line),
            |record| {
                if discovery && !record.is_user() {
                    return;
                }
                if !timestamp_in_bounds(
                    &record.timestamp,
                    query.after.as_deref(),
                    query.before.as_deref(),
                ) {
                    return;
                }
                let content = record.text();
                if content.is_empty() {
                    return;
                }
                let mut push = |command: String| {
                    hits.push(Hit {
                        command,
                        session_id: record.session_id.clone(),
                        project_dir: log.project_dir.clone(),
                    })
                };
                match &compiled {
                    None => {
                        if let Some(m) = SLASH_COMMAND.find(content.trim_start()) {
                            push(m.as_str().to_string());
                        }
                    }
                    Some(patterns) => {
                        for (command, regex) in patterns {
                            if regex.is_match(&content) {
                                push(command.clone());
                            }
                        }
                    }
                }
            },
        );
        hits
    });

    let mut tallies: BTreeMap<String, Tally> = BTreeMap::new();
    for hit in hits {
        let tally = tallies.entry(hit.command).or_default();
        tally.count += 1;
        tally.sessions.insert(hit.session_id);
        tally.projects.insert(hit.project_dir);
    }

    let mut rows: Vec<PlanningCommandCount> = match &query.commands {
        None => tallies.into_iter().map(|(command, tally)| tally.into_row(command)).collect(),
        Some(commands) => {
            let mut seen = BTreeSet::new();
            commands
                .iter()
                .filter(|command| seen.insert(command.as_str()))
                .filter_map(|command| {
                    tallies.remove(command).map(|tally| tally.into_row(display_name(command)))
                })
                .collect()
        }
    };

    // stable: ties stay alphabetical in discovery mode, in supplied order otherwise
    rows.sort_by(|a, b| b.count.cmp(&a.count));
    Ok(rows)
}
