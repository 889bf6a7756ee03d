use super::spec::FilterSpec;
use crate::models::RecoveredFile;

/// Evaluate every predicate of `filter` against one file.
///
/// Checks run cheapest first: extension, size, modification time, session
/// membership, then edit count.
pub fn matches_file(filter: &FilterSpec, file: &RecoveredFile) -> bool {
    filter.matches_extension(&file.file_type)
        && filter.matches_size(Some(file.size_bytes))
        && filter.matches_datetime(file.last_modified.as_deref())
        && filter.matches_sessions(&file.sessions)
        && filter.matches_edits(file.edits)
}

/// Keep the files that pass `filter`, preserving order.
pub fn apply_filters(files: Vec<RecoveredFile>, filter: &FilterSpec) -> Vec<RecoveredFile> {
    if filter.is_empty() {
        return files;
    }
    files.into_iter().filter(|file| matches_file(filter, file)).collect()
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::filters::parse_filter;

    fn file(
        name: &str,
        edits: usize,
        size: u64,
        modified: Option<&str>,
        sessions: &[&str],
    ) -> RecoveredFile {
        RecoveredFile {
            name: name.to_string(),
            location: PathBuf::from(format!("/recovery/session_x/{}", name)),
            file_type: crate::utils::file_type_of(name),
            size_bytes: size,
            created: modified.map(str::to_string),
            last_modified: modified.map(str::to_string),
            edits,
            sessions: sessions.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn sample() -> Vec<RecoveredFile> {
        vec![
            file("cli.py", 12, 4_000, Some("2026-02-20T09:00:00"), &["s1", "s2"]),
            file("engine.py", 0, 90_000, Some("2026-01-05T12:00:00"), &["s2"]),
            file("README.md", 3, 800, None, &[]),
            file("build.tmp", 1, 10, Some("2026-02-22T14:30:00"), &["s3"]),
        ]
    }

    fn names(files: &[RecoveredFile]) -> Vec<&str> {
        files.iter().map(|f| f.name.as_str()).collect()
    }

    #[test]
    fn test_empty_filter_keeps_everything() {
        let files = apply_filters(sample(), &FilterSpec::new());
        assert_eq!(files.len(), 4);
    }

    #[test]
    fn test_extension_filters() {
        let spec = parse_filter("-ext:tmp").unwrap();
        assert_eq!(
            names(&apply_filters(sample(), &spec)),
            vec!["cli.py", "engine.py", "README.md"]
        );

        let spec = parse_filter("ext:MD").unwrap();
        assert_eq!(names(&apply_filters(sample(), &spec)), vec!["README.md"]);
    }

    #[test]
    fn test_zero_max_edits_constrains() {
        let spec = parse_filter("edits:..0").unwrap();
        assert_eq!(names(&apply_filters(sample(), &spec)), vec!["engine.py"]);
    }

    #[test]
    fn test_datetime_excludes_unknown_when_active() {
        let spec = parse_filter("after:2026-02-01").unwrap();
        assert_eq!(names(&apply_filters(sample(), &spec)), vec!["cli.py", "build.tmp"]);

        let spec = parse_filter("before:2026-02-20").unwrap();
        assert_eq!(names(&apply_filters(sample(), &spec)), vec!["cli.py", "engine.py"]);
    }

    #[test]
    fn test_session_membership() {
        let spec = parse_filter("session:s2").unwrap();
        assert_eq!(names(&apply_filters(sample(), &spec)), vec!["cli.py", "engine.py"]);

        // a file passes when any of its sessions is allowed
        let spec = parse_filter("-session:s2").unwrap();
        assert_eq!(names(&apply_filters(sample(), &spec)), vec!["cli.py", "build.tmp"]);
    }

    #[test]
    fn test_combined_filter() {
        let spec = parse_filter("ext:py size:1000.. edits:1..").unwrap();
        assert_eq!(names(&apply_filters(sample(), &spec)), vec!["cli.py"]);
    }
}
