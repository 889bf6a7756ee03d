//! Shared test utilities for integration tests
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use ai_history_recovery::{EngineConfig, RecoveryEngine};
use serde_json::{Value, json};
use tempfile::TempDir;

/// Builder for a `.claude`-style tree with `projects/` and `recovery/` roots
pub struct ClaudeDirBuilder {
    temp_dir: TempDir,
}

impl ClaudeDirBuilder {
    /// Create a new builder with empty `projects/` and `recovery/` directories
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        fs::create_dir_all(temp_dir.path().join("projects"))
            .expect("Failed to create projects dir");
        fs::create_dir_all(temp_dir.path().join("recovery"))
            .expect("Failed to create recovery dir");
        Self { temp_dir }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Add a session log built from records
    pub fn with_session_log(
        self,
        project: &str,
        session_id: &str,
        records: &[RecordBuilder],
    ) -> Self {
        let content = records.iter().map(RecordBuilder::to_json).collect::<Vec<_>>().join("\n");
        self.with_raw_log(project, session_id, &content)
    }

    /// Add a session log with verbatim content
    pub fn with_raw_log(self, project: &str, session_id: &str, content: &str) -> Self {
        let project_dir = self.temp_dir.path().join("projects").join(project);
        fs::create_dir_all(&project_dir).expect("Failed to create project dir");
        fs::write(project_dir.join(format!("{}.jsonl", session_id)), content)
            .expect("Failed to write session log");
        self
    }

    /// Add the latest recovered copy of a file under `session_<id>/`
    pub fn with_recovered_file(self, session_id: &str, filename: &str, content: &str) -> Self {
        let dir = self.temp_dir.path().join("recovery").join(format!("session_{}", session_id));
        fs::create_dir_all(&dir).expect("Failed to create session dir");
        fs::write(dir.join(filename), content).expect("Failed to write recovered file");
        self
    }

    /// Add a snapshot under `session_all_versions_<id>/`; the line count is taken from `content`
    pub fn with_snapshot(
        self,
        session_id: &str,
        filename: &str,
        version: u32,
        content: &str,
    ) -> Self {
        let dir = self
            .temp_dir
            .path()
            .join("recovery")
            .join(format!("session_all_versions_{}", session_id));
        fs::create_dir_all(&dir).expect("Failed to create versions dir");
        let name = format!("{}_v{:06}_line_{}.txt", filename, version, content.lines().count());
        fs::write(dir.join(name), content).expect("Failed to write snapshot");
        self
    }

    /// Build and return the temp directory (consumes self)
    pub fn build(self) -> TempDir {
        self.temp_dir
    }
}

impl Default for ClaudeDirBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn projects_dir(root: &TempDir) -> PathBuf {
    root.path().join("projects")
}

pub fn recovery_dir(root: &TempDir) -> PathBuf {
    root.path().join("recovery")
}

pub fn engine_for(root: &TempDir) -> RecoveryEngine {
    RecoveryEngine::new(EngineConfig::new(projects_dir(root), recovery_dir(root)))
}

/// Builder for one session log record
pub struct RecordBuilder {
    record_type: String,
    session_id: String,
    timestamp: Option<String>,
    content: Value,
    cwd: Option<String>,
    git_branch: Option<String>,
    compact_summary: bool,
    confirmed_path: Option<String>,
}

impl RecordBuilder {
    fn of_type(record_type: &str) -> Self {
        Self {
            record_type: record_type.to_string(),
            session_id: "550e8400-e29b-41d4-a716-446655440000".to_string(),
            timestamp: Some("2026-01-24T10:00:00Z".to_string()),
            content: Value::String("Test message".to_string()),
            cwd: None,
            git_branch: None,
            compact_summary: false,
            confirmed_path: None,
        }
    }

    pub fn user() -> Self {
        Self::of_type("user")
    }

    pub fn assistant() -> Self {
        Self::of_type("assistant").text("Test response")
    }

    /// Any other record type, e.g. `progress` or `file-history-snapshot`
    pub fn other(record_type: &str) -> Self {
        Self::of_type(record_type)
    }

    pub fn text(mut self, text: &str) -> Self {
        self.content = Value::String(text.to_string());
        self
    }

    /// Replace the content with blocks built by [`text_block`] / [`tool_use_block`]
    pub fn content_blocks(mut self, blocks: Vec<Value>) -> Self {
        self.content = Value::Array(blocks);
        self
    }

    pub fn timestamp(mut self, timestamp: &str) -> Self {
        self.timestamp = Some(timestamp.to_string());
        self
    }

    pub fn no_timestamp(mut self) -> Self {
        self.timestamp = None;
        self
    }

    pub fn session_id(mut self, session_id: &str) -> Self {
        self.session_id = session_id.to_string();
        self
    }

    pub fn cwd(mut self, cwd: &str) -> Self {
        self.cwd = Some(cwd.to_string());
        self
    }

    pub fn git_branch(mut self, branch: &str) -> Self {
        self.git_branch = Some(branch.to_string());
        self
    }

    pub fn compact_summary(mut self) -> Self {
        self.compact_summary = true;
        self
    }

    /// Attach `toolUseResult.filePath`
    pub fn confirmed_path(mut self, path: &str) -> Self {
        self.confirmed_path = Some(path.to_string());
        self
    }

    pub fn to_json(&self) -> String {
        let mut record = json!({
            "type": self.record_type,
            "sessionId": self.session_id,
            "message": { "role": self.record_type, "content": self.content },
        });
        if let Some(ts) = &self.timestamp {
            record["timestamp"] = json!(ts);
        }
        if let Some(cwd) = &self.cwd {
            record["cwd"] = json!(cwd);
        }
        if let Some(branch) = &self.git_branch {
            record["gitBranch"] = json!(branch);
        }
        if self.compact_summary {
            record["isCompactSummary"] = json!(true);
        }
        if let Some(path) = &self.confirmed_path {
            record["toolUseResult"] = json!({ "filePath": path });
        }
        record.to_string()
    }
}

pub fn text_block(text: &str) -> Value {
    json!({ "type": "text", "text": text })
}

pub fn tool_use_block(id: &str, name: &str, input: Value) -> Value {
    json!({ "type": "tool_use", "id": id, "name": name, "input": input })
}

const SESSION_A: &str = "aaaa1111-0000-0000-0000-000000000001";
const SESSION_B: &str = "bbbb2222-0000-0000-0000-000000000002";
const LOGIN_V1: &str = "def login():\n    pass\n";
const LOGIN_V2: &str = "def login():\n    return check(user)\n";

/// A realistic tree: two projects, three sessions, snapshots across two sessions
pub fn realistic_claude_dir() -> TempDir {
    ClaudeDirBuilder::new()
        .with_session_log(
            "-Users-alice-webapp",
            "aaaa1111-0000-0000-0000-000000000001",
            &[
                RecordBuilder::user()
                    .session_id("aaaa1111-0000-0000-0000-000000000001")
                    .timestamp("2026-01-20T09:00:00Z")
                    .cwd("/Users/alice/webapp")
                    .git_branch("main")
                    .text("/ar:plannew add login form"),
                RecordBuilder::assistant()
                    .session_id("aaaa1111-0000-0000-0000-000000000001")
                    .timestamp("2026-01-20T09:01:00Z")
                    .content_blocks(vec![
                        text_block("Creating the form."),
                        tool_use_block(
                            "t1",
                            "Write",
                            json!({
                                "file_path": "/Users/alice/webapp/login.py",
                                "content": "def login():\n    pass\n"
                            }),
                        ),
                    ]),
                RecordBuilder::user()
                    .session_id("aaaa1111-0000-0000-0000-000000000001")
                    .timestamp("2026-01-20T09:05:00Z")
                    .text("you forgot to add the test"),
            ],
        )
        .with_session_log(
            "-Users-alice-webapp",
            "bbbb2222-0000-0000-0000-000000000002",
            &[
                RecordBuilder::user()
                    .session_id("bbbb2222-0000-0000-0000-000000000002")
                    .timestamp("2026-01-22T14:00:00Z")
                    .text("Refactor the Parser please"),
                RecordBuilder::assistant()
                    .session_id("bbbb2222-0000-0000-0000-000000000002")
                    .timestamp("2026-01-22T14:02:00Z")
                    .content_blocks(vec![
                        text_block("Done."),
                        tool_use_block(
                            "t2",
                            "Edit",
                            json!({
                                "file_path": "/Users/alice/webapp/login.py",
                                "old_string": "pass",
                                "new_string": "return check(user)"
                            }),
                        ),
                        tool_use_block("t3", "Bash", json!({ "command": "pytest -q" })),
                    ]),
            ],
        )
        .with_session_log(
            "-Users-alice-cli",
            "cccc3333-0000-0000-0000-000000000003",
            &[RecordBuilder::user()
                .session_id("cccc3333-0000-0000-0000-000000000003")
                .timestamp("2026-01-25T08:00:00Z")
                .text("/commit")],
        )
        .with_recovered_file(SESSION_A, "login.py", LOGIN_V2)
        .with_recovered_file(SESSION_B, "login.py", "stale copy\n")
        .with_recovered_file(SESSION_B, "notes.md", "# notes\n")
        .with_snapshot(SESSION_A, "login.py", 1, LOGIN_V1)
        .with_snapshot(SESSION_B, "login.py", 2, LOGIN_V2)
        .build()
}
