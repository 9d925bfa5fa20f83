use anyhow::Result;
use clap::Args;

use super::Session;
use crate::manifest::HookConfig;

#[derive(Args, Default)]
pub struct ListArgs {
    /// Only list hooks with this id or alias
    #[arg(long)]
    pub hook: Option<String>,
}

pub fn execute(args: ListArgs, session: &Session) -> Result<()> {
    let registry = session.load_registry()?;
    let hooks = session.hooks(&registry, args.hook.as_deref())?;
    let output = &session.output;

    if session.is_json() {
        return output.json(&hooks);
    }

    output.count("Hooks", hooks.len());
    for (position, hook) in hooks.iter().enumerate() {
        output.list_item(&format!("{}. {} ({})", position + 1, hook.id, origin(hook)));
        if output.is_verbose() {
            describe(session, hook);
        }
    }

    Ok(())
}

fn origin(hook: &HookConfig) -> String {
    match &hook.rev {
        Some(rev) => format!("{} @ {}", hook.repo, rev),
        None => hook.repo.clone(),
    }
}

fn describe(session: &Session, hook: &HookConfig) {
    let output = &session.output;
    if hook.name.is_some() {
        output.table_row("  name", hook.display_name());
    }
    if let Some(entry) = &hook.entry {
        output.table_row("  entry", entry);
    }
    if let Some(language) = &hook.language {
        output.table_row("  language", language);
    }
    if let Some(files) = &hook.filter.include {
        output.table_row("  files", &single_line(files.source()));
    }
    if let Some(exclude) = &hook.filter.exclude {
        output.table_row("  exclude", &single_line(exclude.source()));
    }
    let types: Vec<&str> = hook.filter.types.iter().map(String::as_str).collect();
    output.table_row("  types", &types.join(", "));
    if !hook.args.is_empty() {
        output.table_row("  args", &hook.args.join(" "));
    }
}

/// Collapse a multi-line verbose pattern for table display
fn single_line(pattern: &str) -> String {
    pattern.split_whitespace().collect::<Vec<_>>().join(" ")
}
