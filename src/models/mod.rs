//! Data models for recovered session history.
//!
//! - [`EventRecord`] - one parsed session log line, with its content blocks
//! - [`FileVersion`] / [`RecoveredFile`] - snapshot history of edited files
//! - [`SessionMessage`], [`CorrectionMatch`], [`SessionInfo`] and friends - read-only result rows
//!
//! Log records are deserialized leniently through the helpers in
//! [`crate::parsers::deserializers`]; result rows only serialize.

pub mod record;
pub mod results;
pub mod snapshot;

pub use record::{
    CONTENT_WRITING_TOOLS, ContentBlock, EventRecord, MessageBody, MessageContent, MessageType,
    PATH_RECORDING_TOOLS, ToolInvocation,
};
pub use results::{
    ContextMatch, CorrectionMatch, CrossReference, PlanningCommandCount, SessionAnalysis,
    SessionInfo, SessionMessage, TimelineEvent,
};
pub use snapshot::{FileVersion, RecoveredContent, RecoveredFile, RecoveryStatistics};
