//! JSONL parsing for session logs
//!
//! # Error Handling Strategy
//!
//! Session logs are appended by an external process and may contain partial or corrupt
//! lines. Parsing follows a **skip and continue** approach:
//!
//! - **Individual line failures**: a line that is not a JSON object, or whose fields have
//!   the wrong shape, becomes a [`MalformedRecord`]. It is counted, traced, and skipped.
//!   There is no failure-rate threshold: a corrupt line never aborts a scan.
//!
//! - **Raw pre-filtering**: callers pass a cheap predicate over the raw line so most lines
//!   are rejected before `serde_json` runs.
//!
//! - **File-level failures**: only opening or reading the file produces an error, and the
//!   engine decides whether that degrades to an empty result or surfaces to the caller.

pub mod deserializers;
pub mod log;

pub use log::{MalformedRecord, ScanSummary, parse_record, read_log, scan_log};
