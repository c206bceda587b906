//! `mongo-ro tools` - list the tools the server exposes (offline).

use anyhow::Result;
use mongo_ro_mcp::{ToolRegistry, builtin_registry};
use std::fmt::Write;

/// Print the built-in tools.
pub fn list(verbose: bool) -> Result<()> {
    let registry = builtin_registry()?;
    print!("{}", render(&registry, verbose)?);
    Ok(())
}

fn render(registry: &ToolRegistry, verbose: bool) -> Result<String> {
    let mut out = String::new();
    writeln!(out, "\n🔧 Available Tools ({}):", registry.len())?;

    for tool in registry.list() {
        let read_only = tool
            .annotations
            .as_ref()
            .is_some_and(|a| a.read_only_hint == Some(true));
        let badge = if read_only { "read" } else { "write" };

        writeln!(out, "   • {} ({})", tool.name, badge)?;
        if let Some(desc) = &tool.description {
            writeln!(out, "     {}", desc)?;
        }
        if verbose {
            writeln!(
                out,
                "     Schema: {}",
                serde_json::to_string_pretty(&tool.input_schema)?
            )?;
        }
    }

    writeln!(out, "\nPipelines containing $out or $merge are refused.")?;
    Ok(out)
}
