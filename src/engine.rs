//! The query facade handed to presentation code.
//!
//! [`RecoveryEngine`] holds an [`EngineConfig`] and the snapshot memo caches. Every
//! method returns plain, serializable data; formatting is left to the caller.

use std::path::Path;

use crate::config::EngineConfig;
use crate::error::Result;
use crate::filters::FilterSpec;
use crate::models::{
    ContextMatch, CorrectionMatch, CrossReference, FileVersion, MessageType, PlanningCommandCount,
    RecoveredContent, RecoveredFile, RecoveryStatistics, SessionAnalysis, SessionInfo,
    SessionMessage, TimelineEvent,
};
use crate::sessions::{self, CorrectionQuery, CrossRefQuery, MessageQuery, PlanningQuery};
use crate::snapshots::SnapshotStore;

pub struct RecoveryEngine {
    config: EngineConfig,
    snapshots: SnapshotStore,
}

impl RecoveryEngine {
    pub fn new(config: EngineConfig) -> Self {
        let snapshots = SnapshotStore::new(config.recovery_dir.clone());
        Self { config, snapshots }
    }

    fn projects_dir(&self) -> &Path {
        &self.config.projects_dir
    }

    pub fn search(&self, pattern: &str, filter: &FilterSpec) -> Result<Vec<RecoveredFile>> {
        self.snapshots.search(pattern, filter)
    }

    pub fn get_versions(&self, filename: &str) -> Vec<FileVersion> {
        self.snapshots.versions(filename)
    }

    pub fn extract_final(&self, filename: &str) -> Result<RecoveredContent> {
        self.snapshots.extract_final(filename)
    }

    pub fn extract_all(&self, filename: &str) -> Result<Vec<RecoveredContent>> {
        self.snapshots.extract_all(filename)
    }

    pub fn get_statistics(&self) -> RecoveryStatistics {
        self.snapshots.statistics()
    }

    pub fn get_messages(
        &self,
        session_prefix: &str,
        message_type: Option<MessageType>,
    ) -> Vec<SessionMessage> {
        sessions::get_messages(self.projects_dir(), session_prefix, message_type)
    }

    pub fn search_messages(&self, query: &MessageQuery) -> Result<Vec<SessionMessage>> {
        sessions::search_messages(self.projects_dir(), query)
    }

    pub fn search_messages_with_context(
        &self,
        query: &MessageQuery,
        window: usize,
    ) -> Result<Vec<ContextMatch>> {
        sessions::search_messages_with_context(self.projects_dir(), query, window)
    }

    pub fn get_sessions(
        &self,
        project_filter: Option<&str>,
        after: Option<&str>,
        before: Option<&str>,
    ) -> Vec<SessionInfo> {
        sessions::get_sessions(self.projects_dir(), project_filter, after, before)
    }

    pub fn find_corrections(&self, query: &CorrectionQuery) -> Result<Vec<CorrectionMatch>> {
        sessions::find_corrections(self.projects_dir(), query)
    }

    pub fn analyze_planning_usage(
        &self,
        query: &PlanningQuery,
    ) -> Result<Vec<PlanningCommandCount>> {
        sessions::analyze_planning_usage(self.projects_dir(), query)
    }

    pub fn cross_reference_session(
        &self,
        filename: &str,
        current_content: &str,
        query: &CrossRefQuery,
    ) -> Vec<CrossReference> {
        sessions::cross_reference_session(self.projects_dir(), filename, current_content, query)
    }

    pub fn export_session_markdown(&self, session_prefix: &str) -> Result<String> {
        sessions::export_session_markdown(self.projects_dir(), session_prefix)
    }

    pub fn analyze_session(&self, session_prefix: &str) -> Result<Option<SessionAnalysis>> {
        sessions::analyze_session(self.projects_dir(), session_prefix)
    }

    pub fn timeline_session(
        &self,
        session_prefix: &str,
        preview_chars: usize,
    ) -> Result<Vec<TimelineEvent>> {
        sessions::timeline_session(self.projects_dir(), session_prefix, preview_chars)
    }

    pub fn get_original_path(&self, filename: &str) -> Option<String> {
        sessions::get_original_path(self.projects_dir(), filename)
    }
}
