use anyhow::Result;
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

use super::Session;
use crate::filter::IdentifyClassifier;
use crate::git::{GitRepo, walk_files};
use crate::select::{self, HookSelection};

#[derive(Args, Default)]
pub struct FilesArgs {
    /// Candidate paths, relative to the repository root
    #[arg(conflicts_with_all = ["staged", "all_files", "from_ref"])]
    pub paths: Vec<String>,

    /// Only report hooks with this id or alias
    #[arg(long)]
    pub hook: Option<String>,

    /// Use the files staged for commit (the default)
    #[arg(long, conflicts_with_all = ["all_files", "from_ref"])]
    pub staged: bool,

    /// Use every tracked file, or every file on disk outside a repository
    #[arg(short, long, conflicts_with = "from_ref")]
    pub all_files: bool,

    /// Use the files changed since this revision
    #[arg(long, requires = "to_ref", value_name = "REV")]
    pub from_ref: Option<String>,

    /// Upper revision for --from-ref
    #[arg(long, requires = "from_ref", value_name = "REV")]
    pub to_ref: Option<String>,
}

/// Where candidates came from and the directory they are relative to
struct Candidates {
    root: PathBuf,
    files: Vec<String>,
}

#[derive(Serialize)]
struct SelectionReport<'a> {
    id: &'a str,
    repo: &'a str,
    files: &'a [String],
}

pub fn execute(args: FilesArgs, session: &Session) -> Result<()> {
    let registry = session.load_registry()?;
    let hooks = session.hooks(&registry, args.hook.as_deref())?;
    let candidates = collect_candidates(&args)?;
    tracing::info!("Evaluating {} candidate files", candidates.files.len());

    let classifier = IdentifyClassifier::new(&candidates.root);
    let classified = select::classify(&candidates.files, &classifier);
    let selections = select::select_candidates(&registry, hooks, &classified);

    let output = &session.output;
    if session.is_json() {
        let reports: Vec<SelectionReport> = selections.iter().map(report).collect();
        return output.json(&reports);
    }

    output.count("Candidate files", candidates.files.len());
    for selection in &selections {
        if selection.files.is_empty() && !output.is_verbose() {
            continue;
        }
        output.section_header(&format!("{} ({})", selection.hook.id, selection.files.len()));
        for file in &selection.files {
            output.list_item(file);
        }
    }

    if selections.iter().all(|s| s.files.is_empty()) {
        output.info("No hook applies to any candidate file");
    }

    Ok(())
}

fn report<'a>(selection: &'a HookSelection<'_>) -> SelectionReport<'a> {
    SelectionReport {
        id: &selection.hook.id,
        repo: &selection.hook.repo,
        files: &selection.files,
    }
}

fn collect_candidates(args: &FilesArgs) -> Result<Candidates> {
    if !args.paths.is_empty() {
        return Ok(Candidates {
            root: PathBuf::from("."),
            files: args.paths.clone(),
        });
    }

    if args.all_files {
        return match GitRepo::discover(".") {
            Ok(git) => Ok(Candidates {
                root: git.workdir()?.to_path_buf(),
                files: git.all_files()?,
            }),
            Err(e) => {
                tracing::debug!("{e:#}; walking the current directory instead");
                Ok(Candidates {
                    root: PathBuf::from("."),
                    files: walk_files(".")?,
                })
            }
        };
    }

    let git = GitRepo::discover(".")?;
    let root = git.workdir()?.to_path_buf();
    let files = match (&args.from_ref, &args.to_ref) {
        (Some(from), Some(to)) => git.changed_files(from, to)?,
        _ => git.staged_files()?,
    };

    Ok(Candidates { root, files })
}
