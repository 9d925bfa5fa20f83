use anyhow::Result;
use clap::Args;
use serde::Serialize;

use super::Session;
use crate::filter::{FileClassifier, FilenameClassifier, IdentifyClassifier, TagSet, Verdict};
use crate::select;

#[derive(Args)]
pub struct MatchArgs {
    /// Paths to evaluate, relative to the repository root
    #[arg(required = true)]
    pub paths: Vec<String>,

    /// Only evaluate hooks with this id or alias
    #[arg(long)]
    pub hook: Option<String>,

    /// Classify by file name instead of inspecting files on disk
    #[arg(long)]
    pub by_name: bool,

    /// Show every hook with the reason it does or does not apply
    #[arg(long)]
    pub explain: bool,
}

#[derive(Serialize)]
struct PathReport<'a> {
    path: String,
    tags: TagSet,
    hooks: Vec<HookVerdict<'a>>,
}

#[derive(Serialize)]
struct HookVerdict<'a> {
    id: &'a str,
    #[serde(flatten)]
    verdict: Verdict,
}

pub fn execute(args: MatchArgs, session: &Session) -> Result<()> {
    let registry = session.load_registry()?;
    let hooks = session.hooks(&registry, args.hook.as_deref())?;

    let classifier: Box<dyn FileClassifier> = if args.by_name {
        Box::new(FilenameClassifier)
    } else {
        Box::new(IdentifyClassifier::new("."))
    };
    let candidates = select::classify(&args.paths, classifier.as_ref());

    let reports: Vec<PathReport> = candidates
        .into_iter()
        .map(|candidate| {
            let verdicts = hooks
                .iter()
                .map(|hook| HookVerdict {
                    id: &hook.id,
                    verdict: registry.evaluate(hook, &candidate.path, &candidate.tags),
                })
                .filter(|v| args.explain || v.verdict.is_included())
                .collect();
            PathReport {
                path: candidate.path,
                tags: candidate.tags,
                hooks: verdicts,
            }
        })
        .collect();

    let output = &session.output;
    if session.is_json() {
        return output.json(&reports);
    }

    for report in &reports {
        output.section_header(&report.path);
        if output.is_verbose() {
            let tags: Vec<&str> = report.tags.iter().map(String::as_str).collect();
            output.verbose(&format!("tags: {}", tags.join(", ")));
        }
        if report.hooks.is_empty() {
            output.info("No hooks apply");
        }
        for hook in &report.hooks {
            let detail = if hook.verdict.is_included() {
                String::new()
            } else {
                hook.verdict.to_string()
            };
            output.verdict(hook.id, &detail, hook.verdict.is_included());
        }
    }

    Ok(())
}
