//! Per-hook file selection
//!
//! Applies a [`Registry`] to a batch of candidate files. Each file is
//! classified once, in parallel, and then evaluated against every hook.

use crate::filter::{FileClassifier, TagSet, Verdict, normalize_path};
use crate::manifest::{HookConfig, Registry};
use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

/// Files one hook applies to, in input order
#[derive(Debug, Clone, Serialize)]
pub struct HookSelection<'a> {
    pub hook: &'a HookConfig,
    pub files: Vec<String>,
}

/// A candidate path with the tags its classifier reported
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub path: String,
    pub tags: TagSet,
}

/// Normalise and classify candidate paths, keeping their order.
pub fn classify<C: FileClassifier + ?Sized>(files: &[String], classifier: &C) -> Vec<Candidate> {
    files
        .par_iter()
        .map(|file| {
            let path = normalize_path(file).into_owned();
            let tags = classifier.classify(&path);
            Candidate { path, tags }
        })
        .collect()
}

/// Work out which of `files` every hook in `registry` applies to.
///
/// One entry per hook, in declaration order, including hooks that select
/// nothing.
pub fn select<'a, C: FileClassifier + ?Sized>(
    registry: &'a Registry,
    files: &[String],
    classifier: &C,
) -> Vec<HookSelection<'a>> {
    let candidates = classify(files, classifier);
    select_candidates(registry, registry.hooks().iter(), &candidates)
}

/// Like [`select`] for already classified candidates and a subset of hooks.
pub fn select_candidates<'a, I>(
    registry: &'a Registry,
    hooks: I,
    candidates: &[Candidate],
) -> Vec<HookSelection<'a>>
where
    I: IntoIterator<Item = &'a HookConfig>,
{
    hooks
        .into_iter()
        .map(|hook| {
            let files: Vec<String> = candidates
                .iter()
                .filter(|candidate| {
                    let verdict = registry.evaluate(hook, &candidate.path, &candidate.tags);
                    if !verdict.is_included() {
                        debug!("{}: skipping {} ({})", hook.id, candidate.path, verdict);
                    }
                    verdict == Verdict::Included
                })
                .map(|candidate| candidate.path.clone())
                .collect();

            debug!("{}: {} of {} files selected", hook.id, files.len(), candidates.len());
            HookSelection { hook, files }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::StaticClassifier;

    const CONFIG: &str = r#"
exclude: '^docs/.*'
repos:
- repo: https://github.com/pre-commit/mirrors-yapf
  rev: v0.24.0
  hooks:
  - id: yapf
    types: [python]
    files: |
      (?x)^(
        aiida/work/.*\.py|
        aiida/orm/utils/node\.py
      )$
- repo: local
  hooks:
  - id: prospector
    types: [file, python]
    exclude: '^aiida/backends/djsite/db/migrations/.*$'
  - id: travis-linter
    files: .travis.yml
"#;

    fn files(paths: &[&str]) -> Vec<String> {
        paths.iter().map(|p| p.to_string()).collect()
    }

    fn classifier() -> StaticClassifier {
        let python = ["file", "text", "python"];
        StaticClassifier::new()
            .with("aiida/work/launch.py", python)
            .with("aiida/orm/utils/node.py", python)
            .with("aiida/settings.py", python)
            .with("aiida/backends/djsite/db/migrations/0006_dbnodefile_metadata.py", python)
            .with("docs/conf.py", python)
            .with(".travis.yml", ["file", "text", "yaml"])
    }

    #[test]
    fn test_select_per_hook() {
        let registry = Registry::from_yaml_str(CONFIG, "select.yaml").unwrap();
        let candidates = files(&[
            "aiida/work/launch.py",
            "./aiida/orm/utils/node.py",
            "aiida/settings.py",
            "aiida/backends/djsite/db/migrations/0006_dbnodefile_metadata.py",
            "docs/conf.py",
            ".travis.yml",
        ]);

        let selection = select(&registry, &candidates, &classifier());
        let ids: Vec<&str> = selection.iter().map(|s| s.hook.id.as_str()).collect();
        assert_eq!(ids, vec!["yapf", "prospector", "travis-linter"]);

        assert_eq!(
            selection[0].files,
            files(&["aiida/work/launch.py", "aiida/orm/utils/node.py"])
        );
        assert_eq!(
            selection[1].files,
            files(&["aiida/work/launch.py", "aiida/orm/utils/node.py", "aiida/settings.py"])
        );
        assert_eq!(selection[2].files, files(&[".travis.yml"]));
    }

    #[test]
    fn test_unclassified_files_drop_out_of_typed_hooks() {
        let registry = Registry::from_yaml_str(CONFIG, "select.yaml").unwrap();
        let selection = select(&registry, &files(&["aiida/work/deleted.py"]), &classifier());
        assert!(selection.iter().all(|s| s.files.is_empty()));
    }

    #[test]
    fn test_input_order_is_kept() {
        let registry = Registry::from_yaml_str(CONFIG, "select.yaml").unwrap();
        let forward = files(&["aiida/settings.py", "aiida/work/launch.py"]);
        let backward = files(&["aiida/work/launch.py", "aiida/settings.py"]);

        let a = select(&registry, &forward, &classifier());
        let b = select(&registry, &backward, &classifier());
        assert_eq!(a[1].files, forward);
        assert_eq!(b[1].files, backward);
    }

    #[test]
    fn test_select_subset_of_hooks() {
        let registry = Registry::from_yaml_str(CONFIG, "select.yaml").unwrap();
        let candidates = classify(&files(&[".travis.yml", "aiida/settings.py"]), &classifier());

        let selection = select_candidates(&registry, registry.find("travis-linter"), &candidates);
        assert_eq!(selection.len(), 1);
        assert_eq!(selection[0].files, files(&[".travis.yml"]));
    }

    #[test]
    fn test_classify_normalizes_paths() {
        let candidates = classify(&files(&["./.travis.yml"]), &classifier());
        assert_eq!(candidates[0].path, ".travis.yml");
        assert!(candidates[0].tags.contains("yaml"));
    }
}
