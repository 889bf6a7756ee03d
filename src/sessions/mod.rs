//! Read-only queries over session logs under `~/.claude/projects/<project>/<session>.jsonl`.
//!
//! Every multi-log query discovers logs once, scans them in parallel with rayon and
//! concatenates per-log results in discovery order before any final sort, so output
//! never depends on thread scheduling. Unreadable logs are logged and skipped.

pub mod corrections;
pub mod crossref;
pub mod discovery;
pub mod inspect;
pub mod messages;
pub mod planning;

pub use corrections::{
    CorrectionCategory, CorrectionQuery, DEFAULT_CORRECTION_LIMIT, default_correction_categories,
    find_corrections,
};
pub use crossref::{
    CrossRefQuery, DEFAULT_SNIPPET_CHARS, cross_reference_session, get_original_path,
};
pub use discovery::{SessionLog, discover_session_logs, find_session_logs};
pub use inspect::{
    DEFAULT_PREVIEW_CHARS, analyze_session, export_session_markdown, get_sessions,
    resolve_unique_session, timeline_session,
};
pub use messages::{MessageQuery, get_messages, search_messages, search_messages_with_context};
pub use planning::{PlanningQuery, analyze_planning_usage, default_planning_commands};
