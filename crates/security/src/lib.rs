//! Security module for Workbench: confining tool paths to the workspace root.
//!
//! Provides:
//! - **WorkspaceRoot**: the canonical directory fixed at process start
//! - **PathResolver**: resolves caller paths and rejects escapes and directories
//! - **ResolvedPath**: a path proven to lie inside the root

pub mod path;

pub use path::{PathResolver, ResolvedPath, WorkspaceRoot};
