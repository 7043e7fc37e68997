//! # Workbench Core
//!
//! Domain types, traits, and error definitions for the Workbench scoped file
//! access layer. This crate has **no I/O of its own**: it defines the model that
//! the security, tools, and workflow crates implement against.
//!
//! ## Layout
//!
//! - [`error`]: the `FileAccessError` taxonomy plus tool-level errors
//! - [`fs`]: line ranges, write modes, and the read/write result records
//! - [`tool`]: the `Tool` trait and the registry that executes calls by name

pub mod error;
pub mod fs;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use error::{Error, FileAccessError, Result, ToolError};
pub use fs::{LineRange, ReadOutput, WriteMode, WriteResult, count_lines};
pub use tool::{Tool, ToolCall, ToolDefinition, ToolRegistry, ToolResult};
