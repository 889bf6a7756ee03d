use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{RecoveryError, Result};
use crate::models::EventRecord;

/// A log line that could not be parsed into an [`EventRecord`].
///
/// Scans count and skip these; they are never returned to callers of the engine.
#[derive(Debug)]
pub struct MalformedRecord {
    pub line_number: usize,
    pub source: serde_json::Error,
}

impl std::fmt::Display for MalformedRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}", self.line_number, self.source)
    }
}

/// Parse a single log line. Only JSON objects are records.
pub fn parse_record(
    line: &str,
    line_number: usize,
) -> std::result::Result<EventRecord, MalformedRecord> {
    if !line.trim_start().starts_with('{') {
        let source = <serde_json::Error as serde::de::Error>::custom("record is not a JSON object");
        return Err(MalformedRecord { line_number, source });
    }
    serde_json::from_str::<EventRecord>(line)
        .map_err(|source| MalformedRecord { line_number, source })
}

/// Line counts from one pass over a log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub lines: usize,
    pub filtered: usize,
    pub parsed: usize,
    pub malformed: usize,
}

/// Stream the records of one session log.
///
/// `prefilter` sees the raw line first and may reject it before any JSON parsing.
/// Malformed lines are counted and skipped, so one bad line never aborts the scan.
/// Invalid UTF-8 is replaced rather than treated as an error.
///
/// # Errors
///
/// Returns an error only if the file cannot be opened or read.
pub fn scan_log<P, F>(path: &Path, prefilter: P, mut visit: F) -> Result<ScanSummary>
where
    P: Fn(&str) -> bool,
    F: FnMut(EventRecord),
{
    let file = File::open(path).map_err(|e| {
        RecoveryError::io(format!("failed to open session log {}", path.display()), e)
    })?;
    let mut reader = BufReader::new(file);
    let mut summary = ScanSummary::default();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let read = reader.read_until(b'\n', &mut buf).map_err(|e| {
            RecoveryError::io(format!("failed to read session log {}", path.display()), e)
        })?;
        if read == 0 {
            break;
        }

        let line = String::from_utf8_lossy(&buf);
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        summary.lines += 1;

        if !prefilter(line) {
            summary.filtered += 1;
            continue;
        }

        match parse_record(line, summary.lines) {
            Ok(record) => {
                summary.parsed += 1;
                visit(record);
            }
            Err(malformed) => {
                summary.malformed += 1;
                tracing::trace!(log = %path.display(), %malformed, "skipping malformed record");
            }
        }
    }

    if summary.malformed > 0 {
        tracing::debug!(
            log = %path.display(),
            parsed = summary.parsed,
            malformed = summary.malformed,
            "skipped malformed records"
        );
    }

    Ok(summary)
}

/// Read every parseable record of a log.
pub fn read_log(path: &Path) -> Result<Vec<EventRecord>> {
    let mut records = Vec::new();
    scan_log(path, |_| true, |record| records.push(record))?;
    Ok(records)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    fn create_test_file(content: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content).expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    #[test]
    fn test_malformed_line_is_skipped() {
        let content = br#"{"type":"user","sessionId":"s1","message":{"content":"first"}}
{"type":"user", this is not json
{"type":"assistant","sessionId":"s1","message":{"content":[{"type":"text","text":"second"}]}}"#;
        let file = create_test_file(content);

        let records = read_log(file.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].text(), "first");
        assert_eq!(records[1].text(), "second");
    }

    #[test]
    fn test_mostly_malformed_log_still_scans() {
        let mut content = String::new();
        for i in 0..200 {
            content.push_str(&format!("garbage {}\n", i));
        }
        content.push_str(r#"{"type":"user","message":"survivor"}"#);
        let file = create_test_file(content.as_bytes());

        let mut seen = Vec::new();
        let summary = scan_log(file.path(), |_| true, |r| seen.push(r.text())).unwrap();
        assert_eq!(seen, vec!["survivor".to_string()]);
        assert_eq!(summary.malformed, 200);
        assert_eq!(summary.parsed, 1);
    }

    #[test]
    fn test_prefilter_skips_before_parsing() {
        let content = b"not json but filtered\n{\"type\":\"user\",\"message\":\"keep\"}\n";
        let file = create_test_file(content);

        let summary = scan_log(file.path(), |line| line.contains("keep"), |_| {}).unwrap();
        assert_eq!(summary.filtered, 1);
        assert_eq!(summary.malformed, 0);
        assert_eq!(summary.parsed, 1);
    }

    #[test]
    fn test_blank_lines_and_crlf() {
        let content =
            b"\r\n{\"type\":\"user\",\"message\":\"a\"}\r\n\n   \n{\"type\":\"user\",\"message\":\"b\"}";
        let file = create_test_file(content);

        let records = read_log(file.path()).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let mut content = b"{\"type\":\"user\",\"message\":\"caf".to_vec();
        content.push(0xff);
        content.extend_from_slice(b"\"}\n");
        let file = create_test_file(&content);

        let records = read_log(file.path()).unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].text().starts_with("caf"));
    }

    #[test]
    fn test_non_object_lines_are_malformed() {
        let content = b"[1,2,3]\n\"just a string\"\n{\"type\":\"user\"}\n";
        let file = create_test_file(content);

        let summary = scan_log(file.path(), |_| true, |_| {}).unwrap();
        assert_eq!(summary.parsed, 1);
        assert_eq!(summary.malformed, 2);
    }

    #[test]
    fn test_missing_log_is_an_io_error() {
        let result = read_log(Path::new("/nonexistent/session.jsonl"));
        assert!(matches!(result, Err(RecoveryError::Io { .. })));
    }
}
