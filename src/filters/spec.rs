use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Composable predicate bundle evaluated against recovered files.
///
/// Every bound is an `Option`: `None` is the only permissive value. An explicit
/// `Some(0)` still constrains, so `max_edits: Some(0)` admits only unedited files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub include_extensions: BTreeSet<String>,
    pub exclude_extensions: BTreeSet<String>,
    pub min_edits: Option<usize>,
    pub max_edits: Option<usize>,
    pub min_size: Option<u64>,
    pub max_size: Option<u64>,
    /// Inclusive lower bound, any ISO-8601 precision (`2026-02-22`, `2026-02-22T14:30`).
    pub after: Option<String>,
    /// Inclusive upper bound, any ISO-8601 precision.
    pub before: Option<String>,
    pub include_sessions: BTreeSet<String>,
    pub exclude_sessions: BTreeSet<String>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_extensions<I, E>(mut self, include: I, exclude: E) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
        E: IntoIterator,
        E::Item: AsRef<str>,
    {
        self.include_extensions
            .extend(include.into_iter().map(|e| normalize_extension(e.as_ref())));
        self.exclude_extensions
            .extend(exclude.into_iter().map(|e| normalize_extension(e.as_ref())));
        self
    }

    pub fn with_edit_range(mut self, min: Option<usize>, max: Option<usize>) -> Self {
        self.min_edits = min;
        self.max_edits = max;
        self
    }

    pub fn with_size_range(mut self, min: Option<u64>, max: Option<u64>) -> Self {
        self.min_size = min;
        self.max_size = max;
        self
    }

    pub fn with_datetime_range(mut self, after: Option<&str>, before: Option<&str>) -> Self {
        self.after = after.map(str::to_string);
        self.before = before.map(str::to_string);
        self
    }

    pub fn with_sessions<I, E>(mut self, include: I, exclude: E) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
        E: IntoIterator,
        E::Item: Into<String>,
    {
        self.include_sessions.extend(include.into_iter().map(Into::into));
        self.exclude_sessions.extend(exclude.into_iter().map(Into::into));
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn has_size_filter(&self) -> bool {
        self.min_size.is_some() || self.max_size.is_some()
    }

    pub fn has_datetime_filter(&self) -> bool {
        self.after.is_some() || self.before.is_some()
    }

    pub fn has_session_filter(&self) -> bool {
        !self.include_sessions.is_empty() || !self.exclude_sessions.is_empty()
    }

    /// Extension with or without its leading dot.
    pub fn matches_extension(&self, extension: &str) -> bool {
        let ext = normalize_extension(extension);
        if !self.include_extensions.is_empty() && !self.include_extensions.contains(&ext) {
            return false;
        }
        !self.exclude_extensions.contains(&ext)
    }

    pub fn matches_edits(&self, edits: usize) -> bool {
        in_range(edits, self.min_edits, self.max_edits)
    }

    /// An unknown size passes only when no size bound is set.
    pub fn matches_size(&self, size_bytes: Option<u64>) -> bool {
        match size_bytes {
            Some(size) => in_range(size, self.min_size, self.max_size),
            None => !self.has_size_filter(),
        }
    }

    /// An unknown or empty datetime passes only when no datetime bound is set.
    pub fn matches_datetime(&self, datetime: Option<&str>) -> bool {
        match datetime.filter(|dt| !dt.is_empty()) {
            Some(dt) => iso_within(dt, self.after.as_deref(), self.before.as_deref()),
            None => !self.has_datetime_filter(),
        }
    }

    /// A single session against the allow and deny sets.
    pub fn matches_session(&self, session_id: &str) -> bool {
        if !self.include_sessions.is_empty() && !self.include_sessions.contains(session_id) {
            return false;
        }
        !self.exclude_sessions.contains(session_id)
    }

    /// Passes when any touching session passes.
    ///
    /// A file with no known sessions passes only when there is no session filter.
    pub fn matches_sessions<S: AsRef<str>>(&self, sessions: &[S]) -> bool {
        if sessions.is_empty() {
            return !self.has_session_filter();
        }
        sessions.iter().any(|s| self.matches_session(s.as_ref()))
    }
}

fn in_range<T: PartialOrd>(value: T, min: Option<T>, max: Option<T>) -> bool {
    if let Some(min) = min
        && value < min
    {
        return false;
    }
    if let Some(max) = max
        && value > max
    {
        return false;
    }
    true
}

pub(crate) fn normalize_extension(extension: &str) -> String {
    extension.trim_start_matches('.').to_ascii_lowercase()
}

/// Compare two ISO-8601 strings of possibly different precision.
///
/// `T` and space separators are treated alike, and only the common prefix is compared,
/// so `2026-02-22` equals every timestamp on that day.
pub fn compare_iso_prefix(a: &str, b: &str) -> Ordering {
    let a = a.as_bytes();
    let b = b.as_bytes();
    let len = a.len().min(b.len());
    let norm = |c: u8| if c == b' ' { b'T' } else { c };
    a[..len].iter().map(|&c| norm(c)).cmp(b[..len].iter().map(|&c| norm(c)))
}

/// Inclusive range check on ISO-8601 strings using [`compare_iso_prefix`].
pub fn iso_within(value: &str, after: Option<&str>, before: Option<&str>) -> bool {
    if let Some(after) = after
        && compare_iso_prefix(value, after) == Ordering::Less
    {
        return false;
    }
    if let Some(before) = before
        && compare_iso_prefix(value, before) == Ordering::Greater
    {
        return false;
    }
    true
}

/// Record-level timestamp bound: records without a timestamp are kept.
pub fn timestamp_in_bounds(timestamp: &str, after: Option<&str>, before: Option<&str>) -> bool {
    timestamp.is_empty() || iso_within(timestamp, after, before)
}
