//! File access domain types: line ranges, write modes, and result records.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::FileAccessError;

/// A 1-indexed, inclusive region of a text file.
///
/// `end == None` means "through the end of the file". Construction enforces
/// `1 <= start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LineRange {
    start: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    end: Option<usize>,
}

impl LineRange {
    /// A closed range `[start, end]`.
    pub fn new(start: usize, end: usize) -> Result<Self, FileAccessError> {
        Self::validated(start, Some(end))
    }

    /// A range from `start` through the end of the file.
    pub fn from_line(start: usize) -> Result<Self, FileAccessError> {
        Self::validated(start, None)
    }

    /// Build a range from optional tool/CLI bounds.
    ///
    /// Both absent means "whole file" and yields `None`. A missing start
    /// defaults to line 1; a missing end leaves the range open.
    pub fn from_bounds(
        start: Option<usize>,
        end: Option<usize>,
    ) -> Result<Option<Self>, FileAccessError> {
        match (start, end) {
            (None, None) => Ok(None),
            (start, end) => Self::validated(start.unwrap_or(1), end).map(Some),
        }
    }

    fn validated(start: usize, end: Option<usize>) -> Result<Self, FileAccessError> {
        if start < 1 {
            return Err(FileAccessError::Range(format!(
                "start_line {start} is below 1 (lines are 1-indexed)"
            )));
        }
        if let Some(end) = end
            && start > end
        {
            return Err(FileAccessError::Range(format!(
                "start_line {start} is after end_line {end}"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> Option<usize> {
        self.end
    }

    /// Whether 1-indexed `line` falls inside the range.
    pub fn contains(&self, line: usize) -> bool {
        line >= self.start && self.end.is_none_or(|end| line <= end)
    }

    /// Whether every line after `line` is outside the range.
    pub fn is_past(&self, line: usize) -> bool {
        self.end.is_some_and(|end| line >= end)
    }
}

impl fmt::Display for LineRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.end {
            Some(end) => write!(f, "{}-{}", self.start, end),
            None => write!(f, "{}-EOF", self.start),
        }
    }
}

/// How a write applies its content to the target file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    /// Replace an inclusive line range of an existing file.
    ReplaceRange,
    /// Replace the whole file, creating it if absent.
    Overwrite,
    /// Append to the end of the file, creating it if absent.
    Append,
}

impl WriteMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReplaceRange => "replace_range",
            Self::Overwrite => "overwrite",
            Self::Append => "append",
        }
    }
}

impl fmt::Display for WriteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WriteMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "replace_range" | "replace" => Ok(Self::ReplaceRange),
            "overwrite" => Ok(Self::Overwrite),
            "append" => Ok(Self::Append),
            other => Err(format!(
                "unknown write mode '{other}' (expected replace_range, overwrite, or append)"
            )),
        }
    }
}

/// Content served by a read, plus line metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadOutput {
    /// The requested text, with original line terminators.
    pub content: String,

    /// Number of lines in the whole file, regardless of the range served.
    pub total_lines: usize,

    /// The range that was requested, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<LineRange>,
}

/// Outcome of a single write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteResult {
    pub path: PathBuf,
    pub mode: WriteMode,
    pub lines_before: usize,
    pub lines_after: usize,
    /// Human-readable change summary, e.g. "replaced lines 4-4 of 12 with 2 new lines".
    pub summary: String,
}

/// Count lines the way the file tools report them.
///
/// A trailing newline does not start a new line: `""` has 0 lines,
/// `"a"` and `"a\n"` have 1, `"a\nb"` has 2.
pub fn count_lines(bytes: &[u8]) -> usize {
    let newlines = bytes.iter().filter(|&&b| b == b'\n').count();
    match bytes.last() {
        Some(b'\n') | None => newlines,
        Some(_) => newlines + 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_range_validation() {
        assert!(LineRange::new(1, 1).is_ok());
        assert!(LineRange::new(3, 9).is_ok());
        assert!(matches!(
            LineRange::new(0, 4),
            Err(FileAccessError::Range(_))
        ));
        assert!(matches!(
            LineRange::new(5, 4),
            Err(FileAccessError::Range(_))
        ));
    }

    #[test]
    fn bounds_default_to_whole_file_or_line_one() {
        assert_eq!(LineRange::from_bounds(None, None).unwrap(), None);

        let r = LineRange::from_bounds(None, Some(4)).unwrap().unwrap();
        assert_eq!((r.start(), r.end()), (1, Some(4)));

        let r = LineRange::from_bounds(Some(3), None).unwrap().unwrap();
        assert_eq!((r.start(), r.end()), (3, None));
        assert_eq!(r.to_string(), "3-EOF");
    }

    #[test]
    fn contains_and_is_past() {
        let r = LineRange::new(2, 3).unwrap();
        assert!(!r.contains(1));
        assert!(r.contains(2));
        assert!(r.contains(3));
        assert!(!r.contains(4));
        assert!(!r.is_past(2));
        assert!(r.is_past(3));

        let open = LineRange::from_line(2).unwrap();
        assert!(open.contains(10_000));
        assert!(!open.is_past(10_000));
    }

    #[test]
    fn write_mode_parsing() {
        assert_eq!("append".parse::<WriteMode>().unwrap(), WriteMode::Append);
        assert_eq!(
            "replace_range".parse::<WriteMode>().unwrap(),
            WriteMode::ReplaceRange
        );
        assert!("truncate".parse::<WriteMode>().is_err());
        assert_eq!(
            serde_json::to_value(WriteMode::Overwrite).unwrap(),
            serde_json::json!("overwrite")
        );
    }

    #[test]
    fn line_counting() {
        assert_eq!(count_lines(b""), 0);
        assert_eq!(count_lines(b"a"), 1);
        assert_eq!(count_lines(b"a\n"), 1);
        assert_eq!(count_lines(b"a\nb"), 2);
        assert_eq!(count_lines(b"\n\n"), 2);
        assert_eq!(count_lines(b"a\r\nb\r\n"), 2);
    }
}
