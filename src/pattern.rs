//! Query pattern compilation.
//!
//! A query containing `*` or `?` is a shell glob matched against the whole text; anything
//! else is compiled as a regex that may match anywhere. Matching is always case-insensitive.
//!
//! Plain alphanumeric queries also get a literal pre-filter that runs on the raw,
//! unparsed log line. The pre-filter may pass lines the matcher rejects, but never the
//! other way round, so it is safe as a skip-ahead before JSON parsing.

use glob::{MatchOptions, Pattern};
use regex::{Regex, RegexBuilder};

use crate::error::{RecoveryError, Result};

const REGEX_META: &[char] =
    &['\\', '.', '+', '*', '?', '(', ')', '|', '[', ']', '{', '}', '^', '$', '#', '&', '-', '~'];

/// Characters that may serialize differently in raw JSON than in the parsed text.
const JSON_SENSITIVE: &[char] = &['"', ':', ','];

const GLOB_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// A compiled glob or regex query.
#[derive(Debug, Clone)]
pub enum NameMatcher {
    /// Anchored: the glob must cover the whole text.
    Glob(Pattern),
    /// Unanchored, case-insensitive.
    Regex(Regex),
}

impl NameMatcher {
    pub fn is_match(&self, text: &str) -> bool {
        match self {
            Self::Glob(pattern) => pattern.matches_with(text, GLOB_OPTIONS),
            Self::Regex(regex) => regex.is_match(text),
        }
    }
}

/// Compile a glob or regex query into a case-insensitive matcher.
///
/// `*` matches any run of characters, `?` one character, `[...]` a class (`[!...]`
/// negates).
///
/// # Errors
///
/// Returns [`RecoveryError::InvalidPattern`] if the query is not a valid glob or regex.
pub fn compile_pattern(pattern: &str) -> Result<NameMatcher> {
    if is_glob(pattern) {
        return Pattern::new(pattern)
            .map(NameMatcher::Glob)
            .map_err(|e| RecoveryError::invalid_pattern(pattern, e));
    }
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map(NameMatcher::Regex)
        .map_err(|e| RecoveryError::invalid_pattern(pattern, e))
}

pub fn is_glob(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?')
}

/// Lower-cased literal for the raw-line pre-filter, when the query is safe to use as one.
///
/// Only non-empty ASCII queries without regex metacharacters, whitespace, or characters
/// that JSON may render differently qualify.
pub fn literal_prefilter(query: &str) -> Option<String> {
    let safe = !query.is_empty()
        && query.chars().all(|c| {
            c.is_ascii_graphic() && !REGEX_META.contains(&c) && !JSON_SENSITIVE.contains(&c)
        });
    safe.then(|| query.to_ascii_lowercase())
}

/// Case-insensitive containment test on a raw log line.
///
/// Lines with escapes or non-ASCII text are always passed through: their parsed text
/// can differ from the raw bytes, and the full matcher decides.
pub fn raw_line_may_contain(line: &str, needle_lower: &str) -> bool {
    if !line.is_ascii() || line.contains('\\') {
        return true;
    }
    line.to_ascii_lowercase().contains(needle_lower)
}

/// A compiled query plus its optional literal pre-filter.
#[derive(Debug, Clone)]
pub struct QueryMatcher {
    matcher: NameMatcher,
    literal: Option<String>,
}

impl QueryMatcher {
    pub fn compile(query: &str) -> Result<Self> {
        let matcher = compile_pattern(query)?;
        Ok(Self { matcher, literal: literal_prefilter(query) })
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.matcher.is_match(text)
    }

    /// Cheap check on a raw line; `false` means the parsed record cannot match.
    pub fn may_match_raw(&self, line: &str) -> bool {
        match &self.literal {
            Some(literal) => raw_line_may_contain(line, literal),
            None => true,
        }
    }

    pub fn has_literal_prefilter(&self) -> bool {
        self.literal.is_some()
    }
}
