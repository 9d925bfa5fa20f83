use anyhow::Result;
use clap::Args;
use serde_json::json;

use super::Session;

#[derive(Args, Default)]
pub struct ValidateArgs {}

pub fn execute(_args: ValidateArgs, session: &Session) -> Result<()> {
    let registry = session.load_registry()?;
    let output = &session.output;

    if session.is_json() {
        return output.json(&json!({
            "valid": true,
            "origin": registry.origin(),
            "repositories": registry.repositories().len(),
            "hooks": registry.len(),
        }));
    }

    output.success(&format!("{} is valid", registry.origin()));
    output.table_row("Repositories", &registry.repositories().len().to_string());
    output.table_row("Hooks", &registry.len().to_string());

    let global = registry.global_filter();
    if let Some(files) = &global.include {
        output.table_row("Top-level files", files.source().trim());
    }
    if let Some(exclude) = &global.exclude {
        output.table_row("Top-level exclude", exclude.source().trim());
    }

    if registry.is_empty() {
        output.warning("No hooks are configured");
    }

    Ok(())
}
