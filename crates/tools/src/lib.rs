//! Built-in tool implementations for Workbench.
//!
//! Tools give an agent the ability to work inside its workspace:
//! read and edit files (confined to the workspace root), run shell
//! commands, capture TODO markers, keep a plan and audit findings for the
//! session, and suggest an outfit for a forecast.
//!
//! The file tools are thin wrappers around [`FileReader`] and
//! [`FileWriter`], which can also be used directly.

pub mod file_read;
pub mod file_write;
pub mod outfit;
pub mod session;
pub mod shell;
pub mod todo_scan;

use workbench_config::ShellConfig;
use workbench_core::error::{FileAccessError, ToolError};
use workbench_core::tool::ToolRegistry;
use workbench_security::PathResolver;

pub use file_read::{FileReader, ReadFileTool};
pub use file_write::{FileWriter, StagedWrite, WriteFileTool};
pub use outfit::{RecommendOutfitTool, recommend_outfit};
pub use session::{ReportVulnerabilityTool, SavePlanTool, SubmitConfigTool, WorkflowSession};
pub use shell::ShellTool;
pub use todo_scan::{CaptureTodosTool, TodoCapture, TodoMarker, capture_todos};

/// Create a tool registry with all built-in tools confined to `resolver`'s root.
///
/// The workflow and audit tools get a fresh [`WorkflowSession`]; use
/// [`session_registry`] to inspect it afterwards.
pub fn default_registry(resolver: PathResolver, shell: &ShellConfig) -> ToolRegistry {
    session_registry(resolver, shell, &WorkflowSession::new())
}

/// Like [`default_registry`], with the stateful tools bound to `session`.
pub fn session_registry(resolver: PathResolver, shell: &ShellConfig, session: &WorkflowSession) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(shell::ShellTool::new(resolver.root(), shell)));
    registry.register(Box::new(file_read::ReadFileTool::new(resolver.clone())));
    registry.register(Box::new(file_write::WriteFileTool::new(resolver.clone())));
    registry.register(Box::new(todo_scan::CaptureTodosTool::new(resolver)));
    registry.register(Box::new(session::SavePlanTool::new(session.clone())));
    registry.register(Box::new(session::SubmitConfigTool::new(session.clone())));
    registry.register(Box::new(session::ReportVulnerabilityTool::new(session.clone())));
    registry.register(Box::new(outfit::RecommendOutfitTool));
    registry
}

/// Parse an optional 1-indexed line argument.
pub(crate) fn line_arg(arguments: &serde_json::Value, key: &str) -> Result<Option<usize>, ToolError> {
    match arguments.get(key) {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(value) => value
            .as_u64()
            .map(|n| Some(n as usize))
            .ok_or_else(|| ToolError::InvalidArguments(format!("'{key}' must be a non-negative integer"))),
    }
}

/// Run blocking file work on the tokio blocking pool.
pub(crate) async fn run_blocking<T, F>(tool_name: &str, work: F) -> Result<T, ToolError>
where
    F: FnOnce() -> Result<T, FileAccessError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ToolError::ExecutionFailed {
            tool_name: tool_name.into(),
            reason: e.to_string(),
        })?
        .map_err(ToolError::from)
}
