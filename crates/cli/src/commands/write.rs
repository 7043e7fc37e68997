//! `workbench write` — Overwrite, append to, or replace lines of a workspace file.

use std::io::Read;
use std::path::PathBuf;

use workbench_core::error::{Error, Result};
use workbench_core::fs::{LineRange, WriteMode};
use workbench_tools::FileWriter;

use super::Context;

/// Pick the content source: `--content`, `--from-file`, or stdin.
pub fn content_from(content: Option<String>, from_file: Option<PathBuf>) -> Result<String> {
    if let Some(content) = content {
        return Ok(content);
    }
    if let Some(file) = from_file {
        return std::fs::read_to_string(&file)
            .map_err(|e| Error::Internal(format!("Failed to read {}: {e}", file.display())));
    }
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .map_err(|e| Error::Internal(format!("Failed to read stdin: {e}")))?;
    Ok(buf)
}

pub fn run(
    ctx: &Context,
    path: &str,
    content: &str,
    start: Option<usize>,
    end: Option<usize>,
    mode: Option<WriteMode>,
) -> Result<()> {
    let range = LineRange::from_bounds(start, end)?;
    let mode = mode.unwrap_or(if range.is_some() {
        WriteMode::ReplaceRange
    } else {
        WriteMode::Overwrite
    });
    if mode != WriteMode::ReplaceRange && range.is_some() {
        return Err(Error::Internal(format!(
            "--start/--end only apply to replace_range, not {mode}"
        )));
    }

    let resolved = ctx.resolver.resolve(path, mode != WriteMode::ReplaceRange)?;
    let result = FileWriter::write(&resolved, content, range, mode)?;

    println!("✅ {}: {}", result.path.display(), result.summary);
    Ok(())
}
