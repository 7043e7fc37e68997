//! Error types for the Workbench domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum; the top-level [`Error`]
//! wraps them for callers that span several contexts (the CLI).

use std::path::PathBuf;
use thiserror::Error;

/// The top-level error type for all Workbench operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- File access errors ---
    #[error("File access error: {0}")]
    FileAccess(#[from] FileAccessError),

    // --- Tool errors ---
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Failures of the scoped file access layer.
///
/// Every variant carries the path (or offending value) so the caller can act
/// on it. None of these are retried or downgraded by the layer itself.
#[derive(Debug, Error)]
pub enum FileAccessError {
    /// The resolved path would leave the workspace root.
    #[error("Path escape blocked for '{path}': stay inside {}", root.display())]
    PathEscape { path: String, root: PathBuf },

    /// The target is a directory where a file is required.
    #[error("'{path}' is a directory; file tools operate on files only")]
    InvalidTarget { path: String },

    /// The read (or replace) target does not exist or cannot be opened.
    #[error("File not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// The file bytes are not valid UTF-8.
    #[error("{} is not valid UTF-8 text{}", path.display(), line.map(|l| format!(" (line {l})")).unwrap_or_default())]
    Decode { path: PathBuf, line: Option<usize> },

    /// The supplied line range is structurally invalid.
    #[error("Invalid line range: {0}")]
    Range(String),

    /// An underlying filesystem operation failed.
    #[error("I/O failure on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FileAccessError {
    /// Wrap an I/O error for `path`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Tool execution failed: {tool_name}: {reason}")]
    ExecutionFailed { tool_name: String, reason: String },

    #[error("Tool timed out: {tool_name} after {timeout_secs}s")]
    Timeout { tool_name: String, timeout_secs: u64 },

    #[error("Permission denied: {tool_name}: {reason}")]
    PermissionDenied { tool_name: String, reason: String },

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),

    #[error(transparent)]
    FileAccess(#[from] FileAccessError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_escape_displays_path_and_root() {
        let err = FileAccessError::PathEscape {
            path: "../secret".into(),
            root: PathBuf::from("/workspace"),
        };
        let msg = err.to_string();
        assert!(msg.contains("../secret"));
        assert!(msg.contains("/workspace"));
    }

    #[test]
    fn decode_error_mentions_line_when_known() {
        let err = FileAccessError::Decode {
            path: PathBuf::from("/w/a.txt"),
            line: Some(7),
        };
        assert!(err.to_string().contains("line 7"));

        let err = FileAccessError::Decode {
            path: PathBuf::from("/w/a.txt"),
            line: None,
        };
        assert!(!err.to_string().contains("line"));
    }

    #[test]
    fn file_access_error_converts_into_tool_error() {
        let err: ToolError = FileAccessError::Range("start_line 0 is below 1".into()).into();
        assert!(matches!(err, ToolError::FileAccess(FileAccessError::Range(_))));
        assert!(err.to_string().contains("start_line 0"));
    }

    #[test]
    fn tool_error_displays_correctly() {
        let err = Error::Tool(ToolError::PermissionDenied {
            tool_name: "bash.run".into(),
            reason: "command not in allowlist".into(),
        });
        assert!(err.to_string().contains("bash.run"));
        assert!(err.to_string().contains("allowlist"));
    }
}
