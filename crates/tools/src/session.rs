//! Session-scoped workflow tools — `workflow.save_plan`, `audit.submit_config`
//! and `audit.report_vulnerability`.
//!
//! The tools share one [`WorkflowSession`]. Each call takes the current state
//! out of its lock, applies the matching `workbench_workflow` step, and stores
//! the returned value.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;
use workbench_core::error::ToolError;
use workbench_core::tool::{Tool, ToolResult};
use workbench_workflow::{AuditState, Severity, WorkflowState};

/// Workflow and audit state shared by the tools of one session.
#[derive(Debug, Clone, Default)]
pub struct WorkflowSession {
    workflow: Arc<RwLock<WorkflowState>>,
    audit: Arc<RwLock<AuditState>>,
}

impl WorkflowSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn workflow(&self) -> WorkflowState {
        self.workflow.read().await.clone()
    }

    pub async fn audit(&self) -> AuditState {
        self.audit.read().await.clone()
    }
}

fn string_arg<'a>(arguments: &'a serde_json::Value, key: &str) -> Result<&'a str, ToolError> {
    arguments[key]
        .as_str()
        .ok_or_else(|| ToolError::InvalidArguments(format!("Missing '{key}' argument")))
}

fn text_result(output: String, data: serde_json::Value) -> ToolResult {
    ToolResult {
        call_id: String::new(),
        success: true,
        output,
        data: Some(data),
    }
}

// ── workflow.save_plan ───────────────────────────────────────────────────

pub struct SavePlanTool {
    session: WorkflowSession,
}

impl SavePlanTool {
    pub fn new(session: WorkflowSession) -> Self {
        Self { session }
    }
}

#[async_trait]
impl Tool for SavePlanTool {
    fn name(&self) -> &str {
        "workflow.save_plan"
    }

    fn description(&self) -> &str {
        "Persist the ordered plan for the current workflow. Replaces any earlier plan."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "steps": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Ordered plan steps"
                }
            },
            "required": ["steps"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let steps = arguments["steps"]
            .as_array()
            .ok_or_else(|| ToolError::InvalidArguments("'steps' must be an array of strings".into()))?
            .iter()
            .map(|s| s.as_str().map(str::to_string))
            .collect::<Option<Vec<String>>>()
            .ok_or_else(|| ToolError::InvalidArguments("'steps' must be an array of strings".into()))?;

        let mut guard = self.session.workflow.write().await;
        let state = std::mem::take(&mut *guard).with_action_items(steps);
        let stored = state.action_items.len();
        *guard = state;

        Ok(text_result(
            format!("Stored {stored} workflow steps."),
            serde_json::json!({ "stored": stored }),
        ))
    }
}

// ── audit.submit_config ──────────────────────────────────────────────────

pub struct SubmitConfigTool {
    session: WorkflowSession,
}

impl SubmitConfigTool {
    pub fn new(session: WorkflowSession) -> Self {
        Self { session }
    }
}

#[async_trait]
impl Tool for SubmitConfigTool {
    fn name(&self) -> &str {
        "audit.submit_config"
    }

    fn description(&self) -> &str {
        "Propose or update the configuration under audit. Starts a new iteration and clears the previous findings."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "config_json": {
                    "type": "string",
                    "description": "The full configuration as a JSON string"
                },
                "comment": {
                    "type": "string",
                    "description": "What changed and why"
                }
            },
            "required": ["config_json", "comment"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let config = string_arg(&arguments, "config_json")?;
        let comment = string_arg(&arguments, "comment")?;

        let mut guard = self.session.audit.write().await;
        let (state, receipt) = std::mem::take(&mut *guard).submit_config(config, comment);
        *guard = state;
        info!(iteration = receipt.iteration, cleared = receipt.cleared_vulnerabilities, "Config submitted");

        Ok(text_result(
            receipt.to_string(),
            serde_json::json!({
                "iteration": receipt.iteration,
                "cleared_vulnerabilities": receipt.cleared_vulnerabilities,
            }),
        ))
    }
}

// ── audit.report_vulnerability ───────────────────────────────────────────

pub struct ReportVulnerabilityTool {
    session: WorkflowSession,
}

impl ReportVulnerabilityTool {
    pub fn new(session: WorkflowSession) -> Self {
        Self { session }
    }
}

#[async_trait]
impl Tool for ReportVulnerabilityTool {
    fn name(&self) -> &str {
        "audit.report_vulnerability"
    }

    fn description(&self) -> &str {
        "Log a flaw found in the current configuration."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "severity": {
                    "type": "string",
                    "enum": ["low", "medium", "high", "critical"]
                },
                "description": {
                    "type": "string",
                    "description": "What is wrong with the configuration"
                }
            },
            "required": ["severity", "description"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let severity: Severity = string_arg(&arguments, "severity")?
            .parse()
            .map_err(ToolError::InvalidArguments)?;
        let description = string_arg(&arguments, "description")?;

        let mut guard = self.session.audit.write().await;
        let state = std::mem::take(&mut *guard).report_vulnerability(severity, description);
        let entry = state.vulnerabilities.last().cloned().unwrap_or_default();
        let open = state.vulnerabilities.len();
        *guard = state;

        Ok(text_result(
            format!("Vulnerability logged: {entry}"),
            serde_json::json!({ "open_vulnerabilities": open }),
        ))
    }
}
