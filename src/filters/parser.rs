//! Filter query parser for recovered-file searches.
//!
//! Parses a whitespace-separated list of `field:value` tokens into a [`FilterSpec`].
//! Every token narrows the result (implicit AND across fields); repeated set fields
//! such as `ext:` union their values.
//!
//! # Syntax
//!
//! ```text
//! filter   := token*
//! token    := ["-"] field ":" value | ["-"] field ":" "\"" quoted value "\""
//! range    := N | N.. | ..M | N..M
//! ```
//!
//! # Supported Fields
//!
//! - `ext:py` / `-ext:tmp` - include or exclude an extension
//! - `edits:range` - snapshot count
//! - `size:range` - size of the representative copy in bytes
//! - `after:ISO` / `before:ISO` - inclusive modification-time bounds, any precision
//! - `session:ID` / `-session:ID` - allow or deny a session id
//!
//! # Examples
//!
//! ```rust
//! # use ai_history_recovery::filters::parse_filter;
//! let spec = parse_filter("ext:py -ext:pyc edits:2..10").unwrap();
//! assert!(spec.matches_extension("py"));
//! assert!(!spec.matches_edits(1));
//!
//! let spec = parse_filter("after:2026-02-01 before:\"2026-02-22 14:30\"").unwrap();
//! assert!(spec.matches_datetime(Some("2026-02-10T09:00:00")));
//! ```

use std::str::FromStr;

use super::spec::{FilterSpec, normalize_extension};
use crate::error::{RecoveryError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Token {
    negated: bool,
    field: String,
    value: String,
}

/// Tokenize filter input into `field:value` tokens.
///
/// Supports a leading `-` for negation and double-quoted values containing spaces.
fn tokenize(input: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&ch) = chars.peek() {
        if ch.is_whitespace() {
            chars.next();
            continue;
        }

        let word = read_word(&mut chars);
        let (negated, word) = match word.strip_prefix('-') {
            Some(rest) => (true, rest.to_string()),
            None => (false, word),
        };

        let Some(colon_pos) = word.find(':') else {
            return Err(RecoveryError::invalid_filter(format!(
                "invalid token '{}' (expected field:value)",
                word
            )));
        };

        let field = word[..colon_pos].to_string();
        let mut value = word[colon_pos + 1..].to_string();
        if value.starts_with('"') {
            value = read_quoted_value(&mut chars, &value)?;
        }

        if field.is_empty() || value.is_empty() {
            return Err(RecoveryError::invalid_filter(format!(
                "invalid field:value format: {}",
                word
            )));
        }

        tokens.push(Token { negated, field, value });
    }

    Ok(tokens)
}

/// Read a word (until whitespace or end)
fn read_word(chars: &mut std::iter::Peekable<std::str::Chars>) -> String {
    let mut word = String::new();

    while let Some(&ch) = chars.peek() {
        if ch.is_whitespace() {
            break;
        }
        word.push(ch);
        chars.next();
    }

    word
}

/// Read a quoted value; `initial` already holds the opening quote and any text after it.
///
/// The closing quote must end the token.
fn read_quoted_value(
    chars: &mut std::iter::Peekable<std::str::Chars>,
    initial: &str,
) -> Result<String> {
    let mut value = initial[1..].to_string();

    if let Some(quote_pos) = value.find('"') {
        let trailing = &value[quote_pos + 1..];
        if !trailing.is_empty() {
            return Err(trailing_after_quote(trailing));
        }
        value.truncate(quote_pos);
        return Ok(value);
    }

    while let Some(ch) = chars.next() {
        if ch == '"' {
            let trailing = read_word(chars);
            if !trailing.is_empty() {
                return Err(trailing_after_quote(&trailing));
            }
            return Ok(value);
        }
        value.push(ch);
    }

    Err(RecoveryError::invalid_filter("unterminated quoted string"))
}

fn trailing_after_quote(trailing: &str) -> RecoveryError {
    RecoveryError::invalid_filter(format!("unexpected text '{}' after closing quote", trailing))
}

/// Parse `N`, `N..`, `..M` or `N..M`.
fn parse_range<T>(field: &str, value: &str) -> Result<(Option<T>, Option<T>)>
where
    T: FromStr + PartialOrd + Clone,
{
    let bound = |raw: &str| -> Result<Option<T>> {
        if raw.is_empty() {
            return Ok(None);
        }
        raw.parse::<T>().map(Some).map_err(|_| {
            RecoveryError::invalid_filter(format!("invalid {} value: '{}'", field, value))
        })
    };

    let (min, max) = match value.split_once("..") {
        Some((lo, hi)) => (bound(lo)?, bound(hi)?),
        None => {
            let exact = bound(value)?;
            (exact.clone(), exact)
        }
    };

    if min.is_none() && max.is_none() {
        return Err(RecoveryError::invalid_filter(format!("empty {} range", field)));
    }
    if let (Some(lo), Some(hi)) = (&min, &max)
        && lo > hi
    {
        return Err(RecoveryError::invalid_filter(format!(
            "{} range '{}' is reversed",
            field, value
        )));
    }
    Ok((min, max))
}

/// Accepts `YYYY`, `YYYY-MM`, `YYYY-MM-DD` and longer ISO-8601 prefixes.
fn validate_datetime(field: &str, value: &str) -> Result<()> {
    let bytes = value.as_bytes();
    let year_ok = bytes.len() >= 4 && bytes[..4].iter().all(u8::is_ascii_digit);
    if !year_ok {
        return Err(RecoveryError::invalid_filter(format!(
            "invalid {} datetime: '{}' (expected ISO-8601)",
            field, value
        )));
    }
    Ok(())
}

/// Parse a filter query into a [`FilterSpec`].
///
/// An empty query yields the permissive default.
///
/// # Errors
///
/// Returns [`RecoveryError::InvalidFilter`] for unknown fields, malformed ranges,
/// negation on a field that has no exclusion form, or unterminated quotes.
pub fn parse_filter(input: &str) -> Result<FilterSpec> {
    let mut spec = FilterSpec::new();
    if input.trim().is_empty() {
        return Ok(spec);
    }

    for Token { negated, field, value } in tokenize(input)? {
        let field_lower = field.to_lowercase();
        match (field_lower.as_str(), negated) {
            ("ext", false) => {
                spec.include_extensions.insert(normalize_extension(&value));
            }
            ("ext", true) => {
                spec.exclude_extensions.insert(normalize_extension(&value));
            }
            ("session", false) => {
                spec.include_sessions.insert(value);
            }
            ("session", true) => {
                spec.exclude_sessions.insert(value);
            }
            ("edits", false) => {
                let (min, max) = parse_range::<usize>("edits", &value)?;
                spec.min_edits = min;
                spec.max_edits = max;
            }
            ("size", false) => {
                let (min, max) = parse_range::<u64>("size", &value)?;
                spec.min_size = min;
                spec.max_size = max;
            }
            ("after", false) => {
                validate_datetime("after", &value)?;
                spec.after = Some(value);
            }
            ("before", false) => {
                validate_datetime("before", &value)?;
                spec.before = Some(value);
            }
            ("edits" | "size" | "after" | "before", true) => {
                return Err(RecoveryError::invalid_filter(format!(
                    "field '{}' cannot be negated",
                    field
                )));
            }
            _ => {
                return Err(RecoveryError::invalid_filter(format!(
                    "unknown field: '{}' (valid fields: ext, edits, size, after, before, session)",
                    field
                )));
            }
        }
    }

    Ok(spec)
}
