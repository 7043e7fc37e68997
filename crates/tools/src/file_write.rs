//! File write tool — atomic overwrite, append, and line-range replacement.
//!
//! Every write is staged into a temporary file next to the target and renamed
//! over it on commit, so readers only ever see the old or the new content.

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tracing::{debug, info};
use workbench_core::error::{FileAccessError, ToolError};
use workbench_core::fs::{LineRange, WriteMode, WriteResult, count_lines};
use workbench_core::tool::{Tool, ToolResult};
use workbench_security::{PathResolver, ResolvedPath};

use crate::{line_arg, run_blocking};

/// Writes resolved workspace files atomically.
pub struct FileWriter;

impl FileWriter {
    /// Apply `content` to `path` according to `mode` and commit it.
    ///
    /// `range` is required for [`WriteMode::ReplaceRange`] and ignored otherwise.
    /// A range starting past EOF inserts `content` after the last line, adding
    /// a newline first if the file does not end with one. The target's parent
    /// directory must already exist.
    pub fn write(
        path: &ResolvedPath,
        content: &str,
        range: Option<LineRange>,
        mode: WriteMode,
    ) -> Result<WriteResult, FileAccessError> {
        Self::stage(path, content, range, mode)?.commit()
    }

    /// Build the new file content in a temporary file without touching the target.
    ///
    /// Dropping the returned [`StagedWrite`] discards it.
    pub fn stage(
        path: &ResolvedPath,
        content: &str,
        range: Option<LineRange>,
        mode: WriteMode,
    ) -> Result<StagedWrite, FileAccessError> {
        let target = path.as_path();
        let range = match (mode, range) {
            (WriteMode::ReplaceRange, None) => {
                return Err(FileAccessError::Range(
                    "replace_range requires start_line and end_line".into(),
                ));
            }
            (WriteMode::ReplaceRange, Some(range)) => Some(range),
            _ => None,
        };

        let existing = match File::open(target) {
            Ok(file) => Some(file),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => return Err(FileAccessError::io(target, e)),
        };
        if mode == WriteMode::ReplaceRange && existing.is_none() {
            return Err(FileAccessError::NotFound {
                path: target.to_path_buf(),
            });
        }

        // Parent directories are created by the resolver when asked for.
        let dir = path.parent();
        let mut temp = temp_file_for(target, dir).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => FileAccessError::NotFound {
                path: dir.to_path_buf(),
            },
            _ => FileAccessError::io(dir, e),
        })?;

        let permissions = match &existing {
            Some(file) => Some(
                file.metadata()
                    .map_err(|e| FileAccessError::io(target, e))?
                    .permissions(),
            ),
            None => None,
        };

        let counts = fill(temp.as_file_mut(), existing, content, range, mode)
            .map_err(|e| FileAccessError::io(target, e))?;

        finish_temp(&temp, permissions).map_err(|e| FileAccessError::io(temp.path(), e))?;

        let result = WriteResult {
            path: target.to_path_buf(),
            mode,
            lines_before: counts.before,
            lines_after: counts.after,
            summary: summarize(mode, range, &counts, count_lines(content.as_bytes())),
        };
        debug!(path = %path, mode = %mode, temp = %temp.path().display(), "Staged write");

        Ok(StagedWrite {
            temp,
            target: target.to_path_buf(),
            result,
        })
    }
}

/// New file content waiting in a temporary file beside its target.
pub struct StagedWrite {
    temp: NamedTempFile,
    target: PathBuf,
    result: WriteResult,
}

impl StagedWrite {
    /// What the write will report once committed.
    pub fn result(&self) -> &WriteResult {
        &self.result
    }

    /// Rename the staged file over the target.
    pub fn commit(self) -> Result<WriteResult, FileAccessError> {
        self.temp
            .persist(&self.target)
            .map_err(|e| FileAccessError::io(&self.target, e.error))?;
        sync_parent_dir(&self.target);

        info!(
            path = %self.target.display(),
            mode = %self.result.mode,
            lines_before = self.result.lines_before,
            lines_after = self.result.lines_after,
            "Wrote file"
        );
        Ok(self.result)
    }
}

fn temp_file_for(target: &Path, dir: &Path) -> io::Result<NamedTempFile> {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    tempfile::Builder::new()
        .prefix(&format!(".{name}."))
        .suffix(".tmp")
        .tempfile_in(dir)
}

fn finish_temp(temp: &NamedTempFile, permissions: Option<fs::Permissions>) -> io::Result<()> {
    match permissions {
        Some(permissions) => temp.as_file().set_permissions(permissions)?,
        None => {
            // NamedTempFile is created 0600; new files get ordinary permissions.
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                temp.as_file().set_permissions(fs::Permissions::from_mode(0o644))?;
            }
        }
    }
    temp.as_file().sync_all()
}

#[cfg(unix)]
fn sync_parent_dir(target: &Path) {
    if let Some(dir) = target.parent()
        && let Err(e) = File::open(dir).and_then(|d| d.sync_all())
    {
        debug!(dir = %dir.display(), error = %e, "Could not sync directory after rename");
    }
}

#[cfg(not(unix))]
fn sync_parent_dir(_target: &Path) {}

struct LineCounts {
    before: usize,
    after: usize,
    /// Lines actually removed by a range replacement.
    replaced: usize,
}

/// Write the new content into `out`, streaming from the existing file.
fn fill(
    out: &mut File,
    existing: Option<File>,
    content: &str,
    range: Option<LineRange>,
    mode: WriteMode,
) -> io::Result<LineCounts> {
    let mut out = LineCounter::new(BufWriter::new(out));
    let mut replaced = 0;

    let before = match (mode, existing, range) {
        (WriteMode::ReplaceRange, Some(file), Some(range)) => {
            let mut reader = BufReader::new(file);
            let mut buf = Vec::new();
            let mut line_no = 0;
            let mut inserted = false;
            let mut terminated = true;
            loop {
                buf.clear();
                if reader.read_until(b'\n', &mut buf)? == 0 {
                    break;
                }
                line_no += 1;
                terminated = buf.ends_with(b"\n");
                if range.contains(line_no) {
                    if !inserted {
                        out.write_all(content.as_bytes())?;
                        inserted = true;
                    }
                    replaced += 1;
                } else {
                    out.write_all(&buf)?;
                }
            }
            if !inserted {
                // Inserted lines start on their own line.
                if !terminated {
                    out.write_all(b"\n")?;
                }
                out.write_all(content.as_bytes())?;
            }
            line_no
        }
        (WriteMode::Append, Some(mut file), _) => {
            let mut old = LineCounter::new(&mut out);
            io::copy(&mut file, &mut old)?;
            let before = old.lines();
            out.write_all(content.as_bytes())?;
            before
        }
        (WriteMode::Overwrite, Some(mut file), _) => {
            let mut old = LineCounter::new(io::sink());
            io::copy(&mut file, &mut old)?;
            out.write_all(content.as_bytes())?;
            old.lines()
        }
        (_, _, _) => {
            out.write_all(content.as_bytes())?;
            0
        }
    };

    out.flush()?;
    Ok(LineCounts {
        before,
        after: out.lines(),
        replaced,
    })
}

fn summarize(mode: WriteMode, range: Option<LineRange>, counts: &LineCounts, new_lines: usize) -> String {
    match (mode, range) {
        (WriteMode::ReplaceRange, Some(range)) if counts.replaced > 0 => format!(
            "replaced lines {}-{} of {} with {}",
            range.start(),
            range.start() + counts.replaced - 1,
            counts.before,
            plural(new_lines, "new line"),
        ),
        (WriteMode::ReplaceRange, _) => format!(
            "inserted {} after line {} (range starts past end of file)",
            plural(new_lines, "new line"),
            counts.before,
        ),
        (WriteMode::Overwrite, _) if counts.before == 0 => {
            format!("wrote {}", plural(counts.after, "line"))
        }
        (WriteMode::Overwrite, _) => format!(
            "overwrote {} with {}",
            plural(counts.before, "line"),
            plural(counts.after, "line"),
        ),
        (WriteMode::Append, _) => format!(
            "appended {}; file now has {}",
            plural(new_lines, "line"),
            plural(counts.after, "line"),
        ),
    }
}

fn plural(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("{n} {noun}")
    } else {
        format!("{n} {noun}s")
    }
}

/// A writer that counts lines (same rule as [`count_lines`]) as bytes pass through.
struct LineCounter<W> {
    inner: W,
    newlines: usize,
    last: Option<u8>,
}

impl<W: Write> LineCounter<W> {
    fn new(inner: W) -> Self {
        Self {
            inner,
            newlines: 0,
            last: None,
        }
    }

    fn lines(&self) -> usize {
        match self.last {
            Some(b'\n') | None => self.newlines,
            Some(_) => self.newlines + 1,
        }
    }
}

impl<W: Write> Write for LineCounter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        let written = &buf[..n];
        self.newlines += written.iter().filter(|&&b| b == b'\n').count();
        if let Some(&b) = written.last() {
            self.last = Some(b);
        }
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// `write.file`: exposes [`FileWriter`] to agents.
pub struct WriteFileTool {
    resolver: PathResolver,
}

impl WriteFileTool {
    pub fn new(resolver: PathResolver) -> Self {
        Self { resolver }
    }
}

#[async_trait]
impl Tool for WriteFileTool {
    fn name(&self) -> &str {
        "write.file"
    }

    fn description(&self) -> &str {
        "Write a text file inside the workspace. With start_line/end_line (1-indexed, inclusive) the lines in that range are replaced by content; otherwise the file is overwritten. mode=append adds content to the end. Include a trailing newline in content when it should stay separate from the next line."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "File path, relative to the workspace root"
                },
                "content": {
                    "type": "string",
                    "description": "The text to write, inserted as-is"
                },
                "start_line": {
                    "type": "integer",
                    "minimum": 1,
                    "description": "First line to replace (1-indexed)"
                },
                "end_line": {
                    "type": "integer",
                    "minimum": 1,
                    "description": "Last line to replace, inclusive (default: end of file)"
                },
                "mode": {
                    "type": "string",
                    "enum": ["replace_range", "overwrite", "append"],
                    "description": "Defaults to replace_range when a line is given, overwrite otherwise"
                }
            },
            "required": ["path", "content"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let path = arguments["path"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'path' argument".into()))?
            .to_string();

        let content = arguments["content"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'content' argument".into()))?
            .to_string();

        let range = LineRange::from_bounds(
            line_arg(&arguments, "start_line")?,
            line_arg(&arguments, "end_line")?,
        )?;

        let mode = match arguments.get("mode").and_then(|m| m.as_str()) {
            Some(m) => m.parse::<WriteMode>().map_err(ToolError::InvalidArguments)?,
            None if range.is_some() => WriteMode::ReplaceRange,
            None => WriteMode::Overwrite,
        };
        if mode != WriteMode::ReplaceRange && range.is_some() {
            return Err(ToolError::InvalidArguments(format!(
                "start_line/end_line only apply to replace_range, not {mode}"
            )));
        }

        let resolver = self.resolver.clone();
        let result = run_blocking(self.name(), move || {
            let resolved = resolver.resolve(&path, mode != WriteMode::ReplaceRange)?;
            FileWriter::write(&resolved, &content, range, mode)
        })
        .await?;

        Ok(ToolResult {
            call_id: String::new(),
            success: true,
            output: format!("{}: {}", result.path.display(), result.summary),
            data: serde_json::to_value(&result).ok(),
        })
    }
}
