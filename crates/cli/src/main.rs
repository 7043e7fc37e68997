//! Workbench CLI — the main entry point.
//!
//! Commands:
//! - `read`    — Read a workspace file, optionally a line range
//! - `write`   — Overwrite, append to, or replace lines of a workspace file
//! - `todos`   — Capture TODO/FIXME markers into workflow research notes
//! - `tools`   — Print the tool definitions
//! - `call`    — Execute one tool call through the registry
//! - `status`  — Show the effective configuration

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use workbench_core::fs::WriteMode;

mod commands;

#[derive(Parser)]
#[command(
    name = "workbench",
    about = "Workbench — workspace-confined file tools for agent sessions",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Workspace root (overrides config and WORKBENCH_ROOT)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Config file to load instead of ~/.workbench/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Read a file inside the workspace
    Read {
        path: String,

        /// First line to print (1-indexed)
        #[arg(long)]
        start: Option<usize>,

        /// Last line to print, inclusive
        #[arg(long)]
        end: Option<usize>,
    },

    /// Write a file inside the workspace (content from --content, --from-file, or stdin)
    Write {
        path: String,

        #[arg(long, conflicts_with = "from_file")]
        content: Option<String>,

        #[arg(long)]
        from_file: Option<PathBuf>,

        /// First line to replace (1-indexed)
        #[arg(long)]
        start: Option<usize>,

        /// Last line to replace, inclusive
        #[arg(long)]
        end: Option<usize>,

        /// replace_range, overwrite, or append
        #[arg(long)]
        mode: Option<WriteMode>,
    },

    /// Capture TODO/FIXME markers from one or more files
    Todos {
        #[arg(required = true)]
        paths: Vec<String>,

        /// Maximum markers per file
        #[arg(short, long, default_value_t = 5)]
        limit: usize,
    },

    /// Print tool definitions as JSON
    Tools,

    /// Execute a single tool call
    Call {
        /// Tool name, e.g. read.file
        tool: String,

        /// Arguments as a JSON object
        #[arg(default_value = "{}")]
        arguments: String,
    },

    /// Show the effective configuration
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = commands::load_config(cli.config.as_deref())?;

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { config.logging.level.as_str() };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));
    if config.logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .init();
    }

    let ctx = commands::Context::new(config, cli.root)?;

    match cli.command {
        Commands::Read { path, start, end } => commands::read::run(&ctx, &path, start, end)?,
        Commands::Write {
            path,
            content,
            from_file,
            start,
            end,
            mode,
        } => {
            let content = commands::write::content_from(content, from_file)?;
            commands::write::run(&ctx, &path, &content, start, end, mode)?
        }
        Commands::Todos { paths, limit } => commands::todos::run(&ctx, &paths, limit)?,
        Commands::Tools => commands::tools::list(&ctx)?,
        Commands::Call { tool, arguments } => commands::tools::call(&ctx, &tool, &arguments).await?,
        Commands::Status => commands::status::run(&ctx)?,
    }

    Ok(())
}
