//! TODO capture tool (`workflow.capture_todos`) — collect TODO/FIXME markers
//! from a workspace file as research notes.

use std::io::{BufRead, BufReader};

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;
use workbench_core::error::{FileAccessError, ToolError};
use workbench_core::tool::{Tool, ToolResult};
use workbench_security::PathResolver;

use crate::file_read::open_for_read;
use crate::run_blocking;

const DEFAULT_LIMIT: usize = 5;
const MARKERS: [&str; 2] = ["TODO", "FIXME"];

/// One marker line found in a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TodoMarker {
    pub line: usize,
    pub text: String,
}

/// Markers captured from a single file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TodoCapture {
    pub path: String,
    pub markers: Vec<TodoMarker>,
}

impl TodoCapture {
    /// A note suitable for workflow research bookkeeping, if anything was found.
    pub fn research_note(&self) -> Option<String> {
        if self.markers.is_empty() {
            return None;
        }
        let lines: Vec<String> = self
            .markers
            .iter()
            .map(|m| format!("L{}: {}", m.line, m.text))
            .collect();
        Some(format!(
            "Found {} TODO markers in {}:\n{}",
            self.markers.len(),
            self.path,
            lines.join("\n")
        ))
    }

    /// The text handed back to the caller.
    pub fn display(&self) -> String {
        if self.markers.is_empty() {
            return format!("No TODO markers in {}", self.path);
        }
        let bullets: Vec<String> = self
            .markers
            .iter()
            .map(|m| format!("- L{}: {}", m.line, m.text))
            .collect();
        format!("TODO summary for {}:\n{}", self.path, bullets.join("\n"))
    }
}

/// Scan `relative_path` for TODO/FIXME lines, stopping after `limit` matches.
pub fn capture_todos(
    resolver: &PathResolver,
    relative_path: &str,
    limit: usize,
) -> Result<TodoCapture, FileAccessError> {
    let resolved = resolver.resolve(relative_path, false)?;
    let file = open_for_read(resolved.as_path())?;
    let limit = limit.max(1);

    let mut markers = Vec::new();
    for (idx, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|e| match e.kind() {
            std::io::ErrorKind::InvalidData => FileAccessError::Decode {
                path: resolved.as_path().to_path_buf(),
                line: Some(idx + 1),
            },
            _ => FileAccessError::io(resolved.as_path(), e),
        })?;

        if MARKERS.iter().any(|m| line.contains(m)) {
            markers.push(TodoMarker {
                line: idx + 1,
                text: line.trim().to_string(),
            });
            if markers.len() >= limit {
                break;
            }
        }
    }

    debug!(path = %resolved, found = markers.len(), "Captured TODO markers");
    Ok(TodoCapture {
        path: relative_path.to_string(),
        markers,
    })
}

pub struct CaptureTodosTool {
    resolver: PathResolver,
}

impl CaptureTodosTool {
    pub fn new(resolver: PathResolver) -> Self {
        Self { resolver }
    }
}

#[async_trait]
impl Tool for CaptureTodosTool {
    fn name(&self) -> &str {
        "workflow.capture_todos"
    }

    fn description(&self) -> &str {
        "Record TODO/FIXME markers from a workspace file and return a formatted snippet with line numbers."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "relative_path": {
                    "type": "string",
                    "description": "File path relative to the workspace root"
                },
                "limit": {
                    "type": "integer",
                    "minimum": 1,
                    "description": "Maximum number of matches to include (default: 5)",
                    "default": DEFAULT_LIMIT
                }
            },
            "required": ["relative_path"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let path = arguments["relative_path"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'relative_path' argument".into()))?
            .to_string();
        let limit = match arguments.get("limit") {
            None | Some(serde_json::Value::Null) => DEFAULT_LIMIT,
            Some(v) => v
                .as_u64()
                .map(|n| n as usize)
                .ok_or_else(|| ToolError::InvalidArguments("'limit' must be a positive integer".into()))?,
        };

        let resolver = self.resolver.clone();
        let capture = run_blocking(self.name(), move || capture_todos(&resolver, &path, limit)).await?;

        Ok(ToolResult {
            call_id: String::new(),
            success: true,
            output: capture.display(),
            data: Some(serde_json::json!({
                "markers": capture.markers,
                "research_note": capture.research_note(),
            })),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use workbench_security::WorkspaceRoot;

    fn workspace(files: &[(&str, &str)]) -> (tempfile::TempDir, PathResolver) {
        let dir = tempfile::tempdir().unwrap();
        for (name, content) in files {
            std::fs::write(dir.path().join(name), content).unwrap();
        }
        let resolver = PathResolver::new(WorkspaceRoot::new(dir.path()).unwrap());
        (dir, resolver)
    }

    #[test]
    fn finds_markers_with_line_numbers() {
        let (_dir, resolver) = workspace(&[(
            "app.py",
            "import os\n# TODO: wire config\nx = 1\n    # FIXME handle errors  \n",
        )]);
        let capture = capture_todos(&resolver, "app.py", 5).unwrap();
        assert_eq!(
            capture.markers,
            vec![
                TodoMarker { line: 2, text: "# TODO: wire config".into() },
                TodoMarker { line: 4, text: "# FIXME handle errors".into() },
            ]
        );
        assert_eq!(
            capture.display(),
            "TODO summary for app.py:\n- L2: # TODO: wire config\n- L4: # FIXME handle errors"
        );
        assert!(capture.research_note().unwrap().starts_with("Found 2 TODO markers in app.py"));
    }

    #[test]
    fn stops_at_limit() {
        let body: String = (0..10).map(|i| format!("TODO {i}\n")).collect();
        let (_dir, resolver) = workspace(&[("many.txt", &body)]);
        let capture = capture_todos(&resolver, "many.txt", 3).unwrap();
        assert_eq!(capture.markers.len(), 3);
        assert_eq!(capture.markers[2].line, 3);
    }

    #[test]
    fn no_markers_is_reported_plainly() {
        let (_dir, resolver) = workspace(&[("clean.rs", "fn main() {}\n")]);
        let capture = capture_todos(&resolver, "clean.rs", 5).unwrap();
        assert!(capture.markers.is_empty());
        assert_eq!(capture.display(), "No TODO markers in clean.rs");
        assert!(capture.research_note().is_none());
    }

    #[test]
    fn escapes_and_missing_files_are_errors() {
        let (_dir, resolver) = workspace(&[]);
        assert!(matches!(
            capture_todos(&resolver, "../outside.py", 5),
            Err(FileAccessError::PathEscape { .. })
        ));
        assert!(matches!(
            capture_todos(&resolver, "missing.py", 5),
            Err(FileAccessError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn tool_returns_markers_and_note() {
        let (_dir, resolver) = workspace(&[("notes.md", "TODO: write stage 3\n")]);
        let tool = CaptureTodosTool::new(resolver);
        let result = tool
            .execute(serde_json::json!({"relative_path": "notes.md"}))
            .await
            .unwrap();

        assert!(result.success);
        assert!(result.output.contains("L1: TODO: write stage 3"));
        let data = result.data.unwrap();
        assert_eq!(data["markers"][0]["line"], 1);
        assert!(data["research_note"].as_str().unwrap().contains("Found 1 TODO markers"));
    }
}
