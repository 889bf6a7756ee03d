use std::path::Path;

use regex::{Regex, RegexBuilder};

use super::discovery::{discover_session_logs, scan_logs, scan_or_skip};
use crate::error::{RecoveryError, Result};
use crate::filters::timestamp_in_bounds;
use crate::models::CorrectionMatch;

pub const DEFAULT_CORRECTION_LIMIT: usize = 50;

/// A named group of phrase patterns; the group matches when any phrase does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrectionCategory {
    pub name: String,
    pub patterns: Vec<String>,
}

impl CorrectionCategory {
    pub fn new<I, S>(name: impl Into<String>, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { name: name.into(), patterns: patterns.into_iter().map(Into::into).collect() }
    }
}

/// Built-in categories, checked in this order.
pub fn default_correction_categories() -> Vec<CorrectionCategory> {
    vec![
        CorrectionCategory::new(
            "regression",
            [
                r"\byou deleted\b",
                r"\byou removed\b",
                r"\blost\b",
                r"\bregressed\b",
                r"\brollback\b",
                r"\brevert\b",
            ],
        ),
        CorrectionCategory::new(
            "skip_step",
            [
                r"\byou forgot\b",
                r"\byou missed\b",
                r"\byou skipped\b",
                r"\bdon't forget\b",
                r"\bmissing step\b",
            ],
        ),
        CorrectionCategory::new(
            "misunderstanding",
            [
                r"\bwrong\b",
                r"\bincorrect\b",
                r"\bmistake\b",
                r"\bnono\b",
                r"\bno,\s",
                r"\bthat's not correct\b",
            ],
        ),
        CorrectionCategory::new(
            "incomplete",
            [
                r"\balso need\b",
                r"\bmust also\b",
                r"\bnot done\b",
                r"\bnot finished\b",
                r"\bstill need\b",
            ],
        ),
    ]
}

/// Options for [`find_corrections`]. `categories: None` uses the defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrectionQuery {
    pub categories: Option<Vec<CorrectionCategory>>,
    pub project_filter: Option<String>,
    pub after: Option<String>,
    pub before: Option<String>,
    pub limit: usize,
}

impl Default for CorrectionQuery {
    fn default() -> Self {
        Self {
            categories: None,
            project_filter: None,
            after: None,
            before: None,
            limit: DEFAULT_CORRECTION_LIMIT,
        }
    }
}

struct CompiledCategory {
    name: String,
    regex: Regex,
}

fn compile_categories(categories: &[CorrectionCategory]) -> Result<Vec<CompiledCategory>> {
    categories
        .iter()
        .filter(|category| !category.patterns.is_empty())
        .map(|category| {
            let source = category.patterns.join("|");
            let regex = RegexBuilder::new(&source)
                .case_insensitive(true)
                .build()
                .map_err(|e| RecoveryError::invalid_pattern(source.clone(), e))?;
            Ok(CompiledCategory { name: category.name.clone(), regex })
        })
        .collect()
}

/// Raw check for a user record, tolerant of either JSON spacing style.
pub(crate) fn is_user_line(line: &str) -> bool {
    line.contains(r#""type":"user""#) || line.contains(r#""type": "user""#)
}

/// User messages that look like corrections of earlier assistant output.
///
/// Each message reports only its first matching category. Results are newest first and
/// capped at `query.limit`.
pub fn find_corrections(
    projects_dir: &Path,
    query: &CorrectionQuery,
) -> Result<Vec<CorrectionMatch>> {
    let defaults;
    let categories = match &query.categories {
        Some(categories) => categories.as_slice(),
        None => {
            defaults = default_correction_categories();
            defaults.as_slice()
        }
    };
    let compiled = compile_categories(categories)?;
    let logs = discover_session_logs(projects_dir, query.project_filter.as_deref());

    let mut results = scan_logs(&logs, |log| {
        let mut rows = Vec::new();
        scan_or_skip(log, is_user_line, |record| {
            if !record.is_user()
                || !timestamp_in_bounds(
                    &record.timestamp,
                    query.after.as_deref(),
                    query.before.as_deref(),
                )
            {
                return;
            }
            let content = record.text();
            if content.is_empty() {
                return;
            }
            let hit = compiled.iter().find_map(|category| {
                let m = category.regex.find(&content)?;
                Some((category.name.clone(), m.as_str().to_string()))
            });
            if let Some((category, matched_pattern)) = hit {
                rows.push(CorrectionMatch {
                    session_id: record.session_id.clone(),
                    project_dir: log.project_dir.clone(),
                    timestamp: record.timestamp.clone(),
                    content,
                    category,
                    matched_pattern,
                });
            }
        });
        rows
    });

    results.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    results.truncate(query.limit);
    Ok(results)
}
