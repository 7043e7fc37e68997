//! `workbench tools` / `workbench call` — Inspect and invoke the tool registry.

use workbench_core::error::{Error, Result};
use workbench_core::tool::ToolCall;
use workbench_tools::default_registry;

use super::Context;

pub fn list(ctx: &Context) -> Result<()> {
    let registry = default_registry(ctx.resolver.clone(), &ctx.config.shell);
    println!("{}", serde_json::to_string_pretty(&registry.definitions())?);
    Ok(())
}

pub async fn call(ctx: &Context, tool: &str, arguments: &str) -> Result<()> {
    let registry = default_registry(ctx.resolver.clone(), &ctx.config.shell);
    let arguments: serde_json::Value = serde_json::from_str(arguments)?;

    let call = ToolCall {
        id: "cli".into(),
        name: tool.to_string(),
        arguments,
    };
    let result = registry.execute(&call).await?;

    println!("{}", result.output);
    if let Some(data) = &result.data {
        tracing::debug!(data = %data, "Tool data");
    }
    if !result.success {
        return Err(Error::Internal(format!("{tool} reported failure")));
    }
    Ok(())
}
