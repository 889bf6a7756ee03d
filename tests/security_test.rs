/// Security-focused integration tests
///
/// These tests verify that recovery never reads or writes outside its roots
mod common;

use std::fs;
use std::process::Command;

use ai_history_recovery::RecoveryError;
use assert_cmd::prelude::*;
use common::{ClaudeDirBuilder, engine_for, projects_dir, recovery_dir};
use tempfile::TempDir;

#[test]
fn test_security_extract_rejects_path_traversal() {
    let root = ClaudeDirBuilder::new().with_recovered_file("s1", "cli.py", "ok\n").build();
    // a file one level above the session directory
    fs::write(recovery_dir(&root).join("secret.txt"), "top secret").unwrap();

    let engine = engine_for(&root);
    assert!(matches!(engine.extract_final("../secret.txt"), Err(RecoveryError::NotFound(_))));
    assert!(matches!(engine.extract_all("../secret.txt"), Err(RecoveryError::NotFound(_))));
    assert!(engine.get_versions("../secret.txt").is_empty());
}

#[test]
fn test_security_cli_extract_traversal_writes_nothing() {
    let root = ClaudeDirBuilder::new().build();
    fs::write(recovery_dir(&root).join("secret.txt"), "top secret").unwrap();
    let out = TempDir::new().unwrap();

    Command::new(env!("CARGO_BIN_EXE_ai-history-recovery"))
        .arg("--projects-dir")
        .arg(projects_dir(&root))
        .arg("--recovery-dir")
        .arg(recovery_dir(&root))
        .args(["extract", "../secret.txt", "--output"])
        .arg(out.path().join("nested"))
        .assert()
        .failure();

    assert!(!out.path().join("secret.txt").exists());
    assert!(!out.path().join("nested").exists());
}

#[test]
fn test_security_search_pattern_cannot_escape_session_dirs() {
    let root = ClaudeDirBuilder::new().with_recovered_file("s1", "cli.py", "ok\n").build();
    fs::write(recovery_dir(&root).join("stray.py"), "not in a session").unwrap();

    let names: Vec<String> = engine_for(&root)
        .search("*.py", &Default::default())
        .unwrap()
        .into_iter()
        .map(|f| f.name)
        .collect();
    assert_eq!(names, vec!["cli.py"]);
}

#[test]
fn test_security_huge_line_is_handled() {
    // 5MB message in a single record
    let big = "x".repeat(5 * 1024 * 1024);
    let line = format!(r#"{{"type":"user","sessionId":"s1","message":"{}"}}"#, big);
    let root = ClaudeDirBuilder::new().with_raw_log("p", "s1", &line).build();

    let messages = engine_for(&root).get_messages("s1", None);
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].content.len(), big.len());
}
