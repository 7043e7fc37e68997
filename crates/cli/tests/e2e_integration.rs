//! End-to-end integration tests for the Workbench tool layer.
//!
//! These tests drive the full registry the way an agent session would:
//! read a task file, edit a line range, verify the edit, and fold tool
//! results into threaded workflow state.

use workbench_config::ShellConfig;
use workbench_core::error::{FileAccessError, ToolError};
use workbench_core::tool::{ToolCall, ToolRegistry};
use workbench_security::{PathResolver, WorkspaceRoot};
use workbench_tools::{WorkflowSession, default_registry, session_registry};
use workbench_workflow::{
    ApprovalStatus, AuditState, SecurityReport, Severity, WorkflowState, run_steps,
};

const TASK_FILE: &str = "stages/stage1/activity/code_task.py";

const TASK_SOURCE: &str = r#"from typing import Iterable


def format_stage_report(stage_name: str, highlights: Iterable[str]) -> str:
    # TODO: implement with the write.file tool
    raise NotImplementedError(
        "Use the write.file tool to implement format_stage_report."
    )


if __name__ == "__main__":
    print(format_stage_report("Stage 1", ["custom bash tool"]))
"#;

// ── Fixtures ─────────────────────────────────────────────────────────────

fn workspace() -> (tempfile::TempDir, ToolRegistry) {
    let dir = tempfile::tempdir().unwrap();
    let task = dir.path().join(TASK_FILE);
    std::fs::create_dir_all(task.parent().unwrap()).unwrap();
    std::fs::write(&task, TASK_SOURCE).unwrap();

    let resolver = PathResolver::new(WorkspaceRoot::new(dir.path()).unwrap());
    let shell = ShellConfig {
        allowed_commands: vec!["ls".into(), "cat".into()],
        ..ShellConfig::default()
    };
    (dir, default_registry(resolver, &shell))
}

fn call(name: &str, arguments: serde_json::Value) -> ToolCall {
    ToolCall {
        id: format!("call_{name}"),
        name: name.into(),
        arguments,
    }
}

// ── Read → edit → verify ─────────────────────────────────────────────────

#[tokio::test]
async fn agent_edits_function_body_by_line_range() {
    let (_dir, registry) = workspace();

    let head = registry
        .execute(&call(
            "read.file",
            serde_json::json!({"path": TASK_FILE, "start_line": 4, "end_line": 8}),
        ))
        .await
        .unwrap();
    assert!(head.output.starts_with("def format_stage_report"));
    assert_eq!(head.data.as_ref().unwrap()["total_lines"], 12);
    assert_eq!(head.call_id, "call_read.file");

    let body = concat!(
        "def format_stage_report(stage_name: str, highlights: Iterable[str]) -> str:\n",
        "    bullets = [f\"- {h.strip()}\" for h in highlights] or [\"- (none yet)\"]\n",
        "    return \"\\n\".join([f\"Stage: {stage_name}\", \"Highlights:\", *bullets])\n",
    );
    let edit = registry
        .execute(&call(
            "write.file",
            serde_json::json!({
                "path": TASK_FILE,
                "content": body,
                "start_line": 4,
                "end_line": 8
            }),
        ))
        .await
        .unwrap();
    assert!(edit.success);
    assert!(edit.output.contains("replaced lines 4-8 of 12 with 3 new lines"));
    assert_eq!(edit.data.as_ref().unwrap()["lines_after"], 10);

    let after = registry
        .execute(&call("read.file", serde_json::json!({"path": TASK_FILE})))
        .await
        .unwrap();
    let lines: Vec<&str> = after.output.lines().collect();
    assert_eq!(lines[0], "from typing import Iterable");
    assert!(lines[4].contains("bullets = "));
    assert_eq!(lines.len(), 10);
    assert_eq!(lines[8], "if __name__ == \"__main__\":");
    assert!(!after.output.contains("NotImplementedError"));
}

#[tokio::test]
async fn appended_notes_accumulate() {
    let (_dir, registry) = workspace();

    for note in ["first\n", "second\n"] {
        registry
            .execute(&call(
                "write.file",
                serde_json::json!({"path": "notes/log.md", "content": note, "mode": "append"}),
            ))
            .await
            .unwrap();
    }

    let read = registry
        .execute(&call("read.file", serde_json::json!({"path": "notes/log.md"})))
        .await
        .unwrap();
    assert_eq!(read.output, "first\nsecond\n");
}

// ── Confinement ──────────────────────────────────────────────────────────

#[tokio::test]
async fn escapes_are_refused_by_every_file_tool() {
    let (_dir, registry) = workspace();

    let attempts = [
        call("read.file", serde_json::json!({"path": "../../etc/passwd"})),
        call(
            "write.file",
            serde_json::json!({"path": "../escaped.txt", "content": "x"}),
        ),
        call(
            "workflow.capture_todos",
            serde_json::json!({"relative_path": "/etc/hosts"}),
        ),
    ];

    for attempt in &attempts {
        let err = registry.execute(attempt).await.unwrap_err();
        assert!(
            matches!(err, ToolError::FileAccess(FileAccessError::PathEscape { .. })),
            "{} should be blocked, got {err}",
            attempt.name
        );
    }
}

#[tokio::test]
async fn directories_are_not_file_targets() {
    let (_dir, registry) = workspace();
    let err = registry
        .execute(&call("read.file", serde_json::json!({"path": "stages"})))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ToolError::FileAccess(FileAccessError::InvalidTarget { .. })
    ));
}

#[cfg(unix)]
#[tokio::test]
async fn shell_runs_in_root_and_respects_allowlist() {
    let (_dir, registry) = workspace();

    let ls = registry
        .execute(&call("bash.run", serde_json::json!({"command": "ls"})))
        .await
        .unwrap();
    assert!(ls.output.contains("stages"));

    let err = registry
        .execute(&call("bash.run", serde_json::json!({"command": "rm -rf stages"})))
        .await
        .unwrap_err();
    assert!(matches!(err, ToolError::PermissionDenied { .. }));
}

// ── Threaded workflow state ──────────────────────────────────────────────

#[tokio::test]
async fn todo_capture_feeds_research_then_plan() {
    let (_dir, registry) = workspace();

    let capture = registry
        .execute(&call(
            "workflow.capture_todos",
            serde_json::json!({"relative_path": TASK_FILE, "limit": 5}),
        ))
        .await
        .unwrap();
    assert!(capture.output.contains("L5: # TODO: implement with the write.file tool"));

    let note = capture.data.unwrap()["research_note"]
        .as_str()
        .unwrap()
        .to_string();

    let steps: Vec<Box<dyn FnOnce(WorkflowState) -> WorkflowState>> = vec![
        Box::new(move |s| s.with_research_note(note)),
        Box::new(|s| s.with_action_items(["Implement format_stage_report", "Re-read the file"])),
    ];
    let state = run_steps(WorkflowState::new(), steps);

    assert_eq!(state.research_notes.len(), 1);
    assert!(state.research_notes[0].starts_with("Found 1 TODO markers"));
    assert_eq!(state.action_items.len(), 2);
}

#[test]
fn audit_rounds_end_in_approval() {
    let mut resolved = Vec::new();

    let (state, _) = AuditState::new().submit_config(
        r#"{"port": 80, "debug_mode": true, "admin_user": "admin"}"#,
        "initial draft",
    );
    let state = state
        .report_vulnerability(Severity::High, "Debug mode enabled")
        .report_vulnerability(Severity::Critical, "Default admin credentials");
    assert!(SecurityReport::evaluate(&state, &resolved, 3).is_none());
    resolved.extend(state.vulnerabilities.iter().cloned());

    let (state, receipt) = state.submit_config(
        r#"{"port": 443, "debug_mode": false, "admin_user": "ops-7f3a"}"#,
        "disable debug, rotate admin",
    );
    assert_eq!(receipt.cleared_vulnerabilities, 2);

    let report = SecurityReport::evaluate(&state, &resolved, 3).unwrap();
    assert_eq!(report.approval_status, ApprovalStatus::Approved);
    assert_eq!(report.total_iterations, 2);
    assert_eq!(report.resolved_issues.len(), 2);
}

#[test]
fn tool_definitions_are_listed_in_name_order() {
    let (_dir, registry) = workspace();
    let names: Vec<String> = registry.definitions().into_iter().map(|d| d.name).collect();
    assert_eq!(
        names,
        [
            "audit.report_vulnerability",
            "audit.submit_config",
            "bash.run",
            "read.file",
            "recommend_outfit",
            "workflow.capture_todos",
            "workflow.save_plan",
            "write.file"
        ]
    );
}

#[tokio::test]
async fn audit_tools_drive_the_session_to_a_verdict() {
    let dir = tempfile::tempdir().unwrap();
    let resolver = PathResolver::new(WorkspaceRoot::new(dir.path()).unwrap());
    let session = WorkflowSession::new();
    let registry = session_registry(resolver, &ShellConfig::default(), &session);

    registry
        .execute(&call(
            "audit.submit_config",
            serde_json::json!({"config_json": "{\"port\": 80}", "comment": "draft"}),
        ))
        .await
        .unwrap();
    registry
        .execute(&call(
            "audit.report_vulnerability",
            serde_json::json!({"severity": "medium", "description": "Port 80 instead of 443"}),
        ))
        .await
        .unwrap();

    let open = session.audit().await;
    assert!(SecurityReport::evaluate(&open, &[], 3).is_none());
    let resolved = open.vulnerabilities.clone();

    registry
        .execute(&call(
            "audit.submit_config",
            serde_json::json!({"config_json": "{\"port\": 443}", "comment": "TLS only"}),
        ))
        .await
        .unwrap();
    let plan = registry
        .execute(&call(
            "workflow.save_plan",
            serde_json::json!({"steps": ["roll out port 443"]}),
        ))
        .await
        .unwrap();
    assert_eq!(plan.output, "Stored 1 workflow steps.");

    let report = SecurityReport::evaluate(&session.audit().await, &resolved, 3).unwrap();
    assert_eq!(report.approval_status, ApprovalStatus::Approved);
    assert_eq!(report.resolved_issues, vec!["[MEDIUM] Port 80 instead of 443"]);
    assert_eq!(session.workflow().await.action_items.len(), 1);
}
