//! File read tool — read a workspace file, optionally a 1-indexed line range.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

use async_trait::async_trait;
use tracing::debug;
use workbench_core::error::{FileAccessError, ToolError};
use workbench_core::fs::{LineRange, ReadOutput, count_lines};
use workbench_core::tool::{Tool, ToolResult};
use workbench_security::{PathResolver, ResolvedPath};

use crate::{line_arg, run_blocking};

/// Reads resolved workspace files.
pub struct FileReader;

impl FileReader {
    /// Read `path`, or only the lines of `range` when one is given.
    ///
    /// A ranged read decodes and keeps only the requested lines; the rest of
    /// the file is scanned just to count lines. An end past EOF clamps, a start
    /// past EOF yields empty content.
    pub fn read(path: &ResolvedPath, range: Option<LineRange>) -> Result<ReadOutput, FileAccessError> {
        let file = open_for_read(path.as_path())?;
        let output = match range {
            None => read_whole(path.as_path(), file)?,
            Some(range) => read_range(path.as_path(), file, range)?,
        };
        debug!(
            path = %path,
            range = ?output.range,
            total_lines = output.total_lines,
            "Read file"
        );
        Ok(output)
    }
}

/// Open a file for reading; missing or unreadable files are `NotFound`.
pub(crate) fn open_for_read(path: &Path) -> Result<File, FileAccessError> {
    File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => FileAccessError::NotFound {
            path: path.to_path_buf(),
        },
        _ => FileAccessError::io(path, e),
    })
}

fn read_whole(path: &Path, mut file: File) -> Result<ReadOutput, FileAccessError> {
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .map_err(|e| FileAccessError::io(path, e))?;
    let total_lines = count_lines(&bytes);

    let content = String::from_utf8(bytes).map_err(|e| {
        let valid = &e.as_bytes()[..e.utf8_error().valid_up_to()];
        FileAccessError::Decode {
            path: path.to_path_buf(),
            line: Some(valid.iter().filter(|&&b| b == b'\n').count() + 1),
        }
    })?;

    Ok(ReadOutput {
        content,
        total_lines,
        range: None,
    })
}

fn read_range(path: &Path, file: File, range: LineRange) -> Result<ReadOutput, FileAccessError> {
    let mut reader = BufReader::new(file);
    let mut buf = Vec::new();
    let mut content = String::new();
    let mut line_no = 0;

    loop {
        buf.clear();
        let n = reader
            .read_until(b'\n', &mut buf)
            .map_err(|e| FileAccessError::io(path, e))?;
        if n == 0 {
            break;
        }
        line_no += 1;

        if range.contains(line_no) {
            let text = std::str::from_utf8(&buf).map_err(|_| FileAccessError::Decode {
                path: path.to_path_buf(),
                line: Some(line_no),
            })?;
            content.push_str(text);
        }
    }

    Ok(ReadOutput {
        content,
        total_lines: line_no,
        range: Some(range),
    })
}

/// `read.file`: exposes [`FileReader`] to agents.
pub struct ReadFileTool {
    resolver: PathResolver,
}

impl ReadFileTool {
    pub fn new(resolver: PathResolver) -> Self {
        Self { resolver }
    }
}

#[async_trait]
impl Tool for ReadFileTool {
    fn name(&self) -> &str {
        "read.file"
    }

    fn description(&self) -> &str {
        "Read a text file inside the workspace. Pass start_line/end_line (1-indexed, inclusive) to read only part of it; the total line count is always reported."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "File path, relative to the workspace root"
                },
                "start_line": {
                    "type": "integer",
                    "minimum": 1,
                    "description": "First line to read (1-indexed, default: 1)"
                },
                "end_line": {
                    "type": "integer",
                    "minimum": 1,
                    "description": "Last line to read, inclusive (default: end of file)"
                }
            },
            "required": ["path"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let path = arguments["path"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'path' argument".into()))?
            .to_string();
        let range = LineRange::from_bounds(
            line_arg(&arguments, "start_line")?,
            line_arg(&arguments, "end_line")?,
        )?;

        let resolver = self.resolver.clone();
        let output = run_blocking(self.name(), move || {
            let resolved = resolver.resolve(&path, false)?;
            FileReader::read(&resolved, range)
        })
        .await?;

        Ok(ToolResult {
            call_id: String::new(),
            success: true,
            data: Some(serde_json::json!({
                "total_lines": output.total_lines,
                "range": output.range,
            })),
            output: output.content,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use workbench_security::WorkspaceRoot;

    fn setup(content: &[u8]) -> (tempfile::TempDir, PathResolver, ResolvedPath) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("sample.txt"), content).unwrap();
        let resolver = PathResolver::new(WorkspaceRoot::new(dir.path()).unwrap());
        let resolved = resolver.resolve("sample.txt", false).unwrap();
        (dir, resolver, resolved)
    }

    #[test]
    fn whole_file_read() {
        let (_dir, _resolver, path) = setup(b"alpha\nbeta\ngamma\n");
        let output = FileReader::read(&path, None).unwrap();
        assert_eq!(output.content, "alpha\nbeta\ngamma\n");
        assert_eq!(output.total_lines, 3);
        assert!(output.range.is_none());
    }

    #[test]
    fn ranged_read_matches_sliced_full_read() {
        let text = "one\ntwo\r\nthree\nfour\nfive";
        let (_dir, _resolver, path) = setup(text.as_bytes());
        let lines: Vec<&str> = text.split_inclusive('\n').collect();

        for start in 1..=5 {
            for end in start..=5 {
                let range = LineRange::new(start, end).unwrap();
                let output = FileReader::read(&path, Some(range)).unwrap();
                assert_eq!(output.content, lines[start - 1..end].concat(), "range {range}");
                assert_eq!(output.total_lines, 5);
            }
        }
    }

    #[test]
    fn end_past_eof_clamps() {
        let (_dir, _resolver, path) = setup(b"a\nb\nc\n");
        let output = FileReader::read(&path, Some(LineRange::new(2, 99).unwrap())).unwrap();
        assert_eq!(output.content, "b\nc\n");
        assert_eq!(output.total_lines, 3);
    }

    #[test]
    fn start_past_eof_is_empty_not_an_error() {
        let (_dir, _resolver, path) = setup(b"1\n2\n3\n4\n5\n");
        let output = FileReader::read(&path, Some(LineRange::new(10, 100).unwrap())).unwrap();
        assert_eq!(output.content, "");
        assert_eq!(output.total_lines, 5);
    }

    #[test]
    fn missing_file_is_not_found() {
        let (_dir, resolver, _path) = setup(b"");
        let missing = resolver.resolve("nope.txt", false).unwrap();
        let err = FileReader::read(&missing, None).unwrap_err();
        assert!(matches!(err, FileAccessError::NotFound { .. }));
    }

    #[test]
    fn invalid_utf8_is_a_decode_error() {
        let (_dir, _resolver, path) = setup(b"fine\n\xff\xfe broken\n");
        let err = FileReader::read(&path, None).unwrap_err();
        assert!(matches!(err, FileAccessError::Decode { line: Some(2), .. }));

        // Only the requested region has to decode.
        let output = FileReader::read(&path, Some(LineRange::new(1, 1).unwrap())).unwrap();
        assert_eq!(output.content, "fine\n");
        assert_eq!(output.total_lines, 2);

        let err = FileReader::read(&path, Some(LineRange::from_line(2).unwrap())).unwrap_err();
        assert!(matches!(err, FileAccessError::Decode { line: Some(2), .. }));
    }

    #[test]
    fn tool_definition() {
        let (_dir, resolver, _path) = setup(b"");
        let tool = ReadFileTool::new(resolver);
        assert_eq!(tool.name(), "read.file");
        let schema = tool.parameters_schema();
        assert_eq!(schema["required"], serde_json::json!(["path"]));
        assert!(schema["properties"]["start_line"].is_object());
    }

    #[tokio::test]
    async fn tool_reads_range() {
        let (_dir, resolver, _path) = setup(b"a\nb\nc\nd\n");
        let tool = ReadFileTool::new(resolver);
        let result = tool
            .execute(serde_json::json!({"path": "sample.txt", "start_line": 2, "end_line": 3}))
            .await
            .unwrap();

        assert!(result.success);
        assert_eq!(result.output, "b\nc\n");
        let data = result.data.unwrap();
        assert_eq!(data["total_lines"], 4);
        assert_eq!(data["range"]["start"], 2);
        assert_eq!(data["range"]["end"], 3);
    }

    #[tokio::test]
    async fn tool_missing_path_argument() {
        let (_dir, resolver, _path) = setup(b"");
        let tool = ReadFileTool::new(resolver);
        let result = tool.execute(serde_json::json!({})).await;
        assert!(matches!(result, Err(ToolError::InvalidArguments(_))));
    }

    #[tokio::test]
    async fn tool_rejects_inverted_range() {
        let (_dir, resolver, _path) = setup(b"a\nb\n");
        let tool = ReadFileTool::new(resolver);
        let result = tool
            .execute(serde_json::json!({"path": "sample.txt", "start_line": 2, "end_line": 1}))
            .await;
        assert!(matches!(
            result,
            Err(ToolError::FileAccess(FileAccessError::Range(_)))
        ));
    }

    #[tokio::test]
    async fn tool_blocks_traversal() {
        let (_dir, resolver, _path) = setup(b"");
        let tool = ReadFileTool::new(resolver);
        let result = tool
            .execute(serde_json::json!({"path": "../../../etc/passwd"}))
            .await;
        assert!(matches!(
            result,
            Err(ToolError::FileAccess(FileAccessError::PathEscape { .. }))
        ));
    }
}
