//! Shell tool (`bash.run`) — execute commands from the workspace root.
//!
//! Supports base-command allowlisting, a timeout, and output truncation.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};
use workbench_config::ShellConfig;
use workbench_core::error::ToolError;
use workbench_core::tool::{Tool, ToolResult};
use workbench_security::WorkspaceRoot;

/// Execute shell commands with safety constraints.
pub struct ShellTool {
    /// If non-empty, only these base commands are allowed.
    allowed_commands: Vec<String>,
    /// Working directory for every command.
    cwd: PathBuf,
    timeout: Duration,
    max_output_bytes: usize,
}

impl ShellTool {
    pub fn new(root: &WorkspaceRoot, config: &ShellConfig) -> Self {
        Self {
            allowed_commands: config.allowed_commands.clone(),
            cwd: root.path().to_path_buf(),
            timeout: Duration::from_secs(config.timeout_secs),
            max_output_bytes: config.max_output_bytes,
        }
    }

    /// Check every command in a pipeline or sequence against the allowlist.
    ///
    /// Returns the first offending base command.
    fn disallowed_command<'a>(&self, command: &'a str) -> Option<&'a str> {
        if self.allowed_commands.is_empty() {
            return None; // No allowlist = all commands allowed
        }

        // Substitutions can run anything; refuse them outright.
        if command.contains('`') || command.contains("$(") {
            return Some("command substitution");
        }

        command
            .split(['|', ';', '&', '\n'])
            .filter_map(|segment| segment.split_whitespace().next())
            .find(|base| !self.allowed_commands.iter().any(|a| a == base))
    }
}

fn truncate_output(mut text: String, max_bytes: usize) -> String {
    if text.len() <= max_bytes {
        return text;
    }
    let mut cut = max_bytes;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    let omitted = text.len() - cut;
    text.truncate(cut);
    text.push_str(&format!("\n[output truncated: {omitted} bytes omitted]"));
    text
}

#[async_trait]
impl Tool for ShellTool {
    fn name(&self) -> &str { "bash.run" }

    fn description(&self) -> &str {
        "Execute a shell command in the workspace root and return stdout/stderr. Use this for inspecting the repository: ls, pwd, cat, head, tail, stat, and similar."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "command": {
                    "type": "string",
                    "description": "The shell command to execute"
                }
            },
            "required": ["command"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let command = arguments["command"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'command' argument".into()))?;

        if let Some(base) = self.disallowed_command(command) {
            return Err(ToolError::PermissionDenied {
                tool_name: "bash.run".into(),
                reason: format!("'{base}' is not in the command allowlist"),
            });
        }

        debug!(command = %command, cwd = %self.cwd.display(), "Executing shell command");

        let mut cmd = if cfg!(target_os = "windows") {
            let mut c = Command::new("cmd");
            c.args(["/C", command]);
            c
        } else {
            let mut c = Command::new("sh");
            c.args(["-c", command]);
            c
        };
        cmd.current_dir(&self.cwd).kill_on_drop(true);

        let output = match tokio::time::timeout(self.timeout, cmd.output()).await {
            Ok(output) => output,
            Err(_) => {
                warn!(command = %command, timeout_secs = self.timeout.as_secs(), "Command timed out");
                return Err(ToolError::Timeout {
                    tool_name: "bash.run".into(),
                    timeout_secs: self.timeout.as_secs(),
                });
            }
        };

        match output {
            Ok(output) => {
                let stdout = String::from_utf8_lossy(&output.stdout).to_string();
                let stderr = String::from_utf8_lossy(&output.stderr).to_string();
                let success = output.status.success();
                let code = output.status.code().unwrap_or(-1);

                let result_text = if success {
                    if stderr.is_empty() {
                        stdout
                    } else {
                        format!("{stdout}\n[stderr]: {stderr}")
                    }
                } else {
                    warn!(command = %command, exit_code = code, "Command failed");
                    format!("[exit code: {code}]\n{stdout}\n{stderr}")
                };

                Ok(ToolResult {
                    call_id: String::new(),
                    success,
                    output: truncate_output(result_text.trim().to_string(), self.max_output_bytes),
                    data: Some(serde_json::json!({ "exit_code": code })),
                })
            }
            Err(e) => Err(ToolError::ExecutionFailed {
                tool_name: "bash.run".into(),
                reason: e.to_string(),
            }),
        }
    }
}
