use std::borrow::Cow;
use std::path::Path;
use std::time::SystemTime;

use chrono::{DateTime, Utc};

/// `mtime` rendering used for snapshot capture times.
pub const CAPTURE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// `mtime`/`ctime` rendering used for recovered file metadata.
pub const FILE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Extension without the leading dot, or `unknown` when there is none.
pub fn file_type_of(name: &str) -> String {
    Path::new(name)
        .extension()
        .map(|ext| ext.to_string_lossy().into_owned())
        .filter(|ext| !ext.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

/// True if the last component of a recorded path (either separator) is `filename`.
pub fn basename_matches(recorded: &str, filename: &str) -> bool {
    recorded.rsplit(['/', '\\']).next() == Some(filename)
}

/// True if `recorded` ends with `filename` on a path component boundary.
///
/// `filename` may itself contain separators, e.g. `src/cli.py`.
pub fn path_ends_with(recorded: &str, filename: &str) -> bool {
    if filename.is_empty() {
        return false;
    }
    recorded
        .strip_suffix(filename)
        .is_some_and(|rest| rest.is_empty() || rest.ends_with(['/', '\\']))
}

/// True if `name` is a single, non-empty path component.
pub fn is_bare_file_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\', '\0'])
}

/// Prefix of `text` holding at most `max_chars` characters.
///
/// Never splits a multi-byte character.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Render a file time in UTC with the given `strftime` format.
pub fn format_system_time(time: SystemTime, format: &str) -> String {
    DateTime::<Utc>::from(time).format(format).to_string()
}

/// Formats a path with `~` substitution for the home directory.
pub fn format_path_with_tilde(path: &Path) -> String {
    format_path_with_tilde_internal(path, dirs::home_dir().as_deref())
}

pub(crate) fn format_path_with_tilde_internal(path: &Path, home: Option<&Path>) -> String {
    if let Some(home) = home
        && let Ok(rest) = path.strip_prefix(home)
    {
        if rest.as_os_str().is_empty() {
            return "~".to_string();
        }
        return format!("~/{}", rest.to_string_lossy());
    }

    match path.to_string_lossy() {
        Cow::Borrowed(s) => s.to_string(),
        Cow::Owned(s) => s,
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::time::{Duration, UNIX_EPOCH};

    use super::*;

    #[test]
    fn test_file_type_of() {
        assert_eq!(file_type_of("cli.py"), "py");
        assert_eq!(file_type_of("archive.tar.gz"), "gz");
        assert_eq!(file_type_of("Makefile"), "unknown");
        assert_eq!(file_type_of(".bashrc"), "unknown");
    }

    #[test]
    fn test_basename_matches() {
        assert!(basename_matches("/home/u/proj/cli.py", "cli.py"));
        assert!(basename_matches("C:\\proj\\cli.py", "cli.py"));
        assert!(basename_matches("cli.py", "cli.py"));
        assert!(!basename_matches("/home/u/proj/mycli.py", "cli.py"));
    }

    #[test]
    fn test_path_ends_with() {
        assert!(path_ends_with("/home/u/proj/src/cli.py", "cli.py"));
        assert!(path_ends_with("/home/u/proj/src/cli.py", "src/cli.py"));
        assert!(path_ends_with("cli.py", "cli.py"));
        assert!(!path_ends_with("/home/u/proj/mycli.py", "cli.py"));
        assert!(!path_ends_with("/home/u/proj/cli.py", ""));
    }

    #[test]
    fn test_is_bare_file_name() {
        assert!(is_bare_file_name("cli.py"));
        assert!(is_bare_file_name(".env"));
        assert!(!is_bare_file_name(""));
        assert!(!is_bare_file_name(".."));
        assert!(!is_bare_file_name("../secret.txt"));
        assert!(!is_bare_file_name("src\\cli.py"));
    }

    #[test]
    fn test_truncate_chars_is_char_safe() {
        assert_eq!(truncate_chars("hello", 3), "hel");
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("héllo wörld", 7), "héllo w");
        assert_eq!(truncate_chars("日本語テキスト", 3), "日本語");
        assert_eq!(truncate_chars("", 5), "");
    }

    #[test]
    fn test_format_system_time_is_utc() {
        let t = UNIX_EPOCH + Duration::from_secs(1_771_770_600);
        assert_eq!(format_system_time(t, CAPTURE_TIME_FORMAT), "2026-02-22 14:30");
        assert_eq!(format_system_time(t, FILE_TIME_FORMAT), "2026-02-22T14:30:00");
    }

    #[test]
    fn test_format_path_with_tilde() {
        let home = PathBuf::from("/Users/testuser");
        let path = PathBuf::from("/Users/testuser/Documents/project");
        assert_eq!(format_path_with_tilde_internal(&path, Some(&home)), "~/Documents/project");
        assert_eq!(format_path_with_tilde_internal(&home, Some(&home)), "~");

        let other = PathBuf::from("/opt/local/bin");
        assert_eq!(format_path_with_tilde_internal(&other, Some(&home)), "/opt/local/bin");
        assert_eq!(format_path_with_tilde_internal(&other, None), "/opt/local/bin");
    }
}
