//! Subcommand implementations and the shared workspace context.

pub mod read;
pub mod status;
pub mod todos;
pub mod tools;
pub mod write;

use std::path::{Path, PathBuf};

use workbench_config::AppConfig;
use workbench_core::error::{Error, Result};
use workbench_security::{PathResolver, WorkspaceRoot};

/// Everything a subcommand needs: the loaded config and the confined resolver.
pub struct Context {
    pub config: AppConfig,
    pub resolver: PathResolver,
}

impl Context {
    /// Fix the workspace root (`--root` beats config) and build the resolver.
    pub fn new(config: AppConfig, root_override: Option<PathBuf>) -> Result<Self> {
        let root = root_override.unwrap_or_else(|| config.workspace_root());
        let root = WorkspaceRoot::new(&root)?;
        tracing::debug!(root = %root, "Workspace root fixed");
        Ok(Self {
            config,
            resolver: PathResolver::new(root),
        })
    }
}

/// Load the config from `path`, or from the default location.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let loaded = match path {
        Some(path) => AppConfig::load_from(path).and_then(|mut config| {
            config.apply_env_overrides(|key| std::env::var(key).ok())?;
            Ok(config)
        }),
        None => AppConfig::load(),
    };
    loaded.map_err(|e| Error::Config {
        message: e.to_string(),
    })
}
