//! `workbench status` — Show the effective configuration.

use workbench_config::AppConfig;
use workbench_core::error::Result;

use super::Context;

pub fn run(ctx: &Context) -> Result<()> {
    let config = &ctx.config;

    println!("🦀 Workbench Status");
    println!("===================");
    println!("  Config dir:   {}", AppConfig::config_dir().display());
    println!("  Workspace:    {}", ctx.resolver.root());
    println!(
        "  Shell:        {} (timeout {}s, {} bytes max output)",
        if config.shell.allowed_commands.is_empty() {
            "all commands allowed".to_string()
        } else {
            config.shell.allowed_commands.join(", ")
        },
        config.shell.timeout_secs,
        config.shell.max_output_bytes
    );
    println!(
        "  Logging:      {}{}",
        config.logging.level,
        if config.logging.json { " (json)" } else { "" }
    );

    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() {
        println!("\n  ✅ Config file found");
    } else {
        println!("\n  ⚠️  No config file, using defaults. Starter config:\n");
        println!("{}", AppConfig::default_toml());
    }

    Ok(())
}
