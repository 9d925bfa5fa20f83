//! Hook configuration loading
//!
//! Parses a `.pre-commit-config.yaml` into an ordered [`Registry`] of
//! [`HookConfig`] values. Every pattern is compiled and every type tag
//! checked while loading, so a registry that exists is always usable.
//!
//! Both layouts of the file are accepted:
//!
//! ```yaml
//! # legacy: a bare list of repositories
//! - repo: git://github.com/pre-commit/mirrors-yapf
//!   sha: v0.19.0
//!   hooks:
//!   - id: yapf
//!     files: '^aiida/work/.*\.py$'
//! ```
//!
//! ```yaml
//! # current: a mapping with top-level filters
//! exclude: '^docs/'
//! repos:
//! - repo: local
//!   hooks:
//!   - id: prospector
//!     entry: prospector
//!     types: [file, python]
//! ```

mod error;
mod raw;

pub use error::ConfigError;

use crate::filter::types::{self, TagSet};
use crate::filter::{FileFilter, Pattern, Verdict};
use raw::{RawConfig, RawHook, RawRepo};
use serde::Serialize;
use serde_yml::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

/// Repositories that are not fetched and therefore carry no revision
const PSEUDO_REPOS: &[&str] = &["local", "meta"];

/// Top-level keys understood by hook runners that have no bearing on file selection
const IGNORED_TOP_LEVEL_KEYS: &[&str] = &[
    "fail_fast",
    "default_stages",
    "default_install_hook_types",
    "default_language_version",
    "minimum_pre_commit_version",
    "ci",
];

/// Hook keys that have no bearing on file selection
const IGNORED_HOOK_KEYS: &[&str] = &[
    "description",
    "verbose",
    "require_serial",
    "log_file",
    "language_version",
    "minimum_pre_commit_version",
];

/// Options that change how strictly a configuration is checked
#[derive(Debug, Clone, Copy)]
pub struct LoadOptions {
    /// Reject type tags no classifier knows about
    pub strict_types: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self { strict_types: true }
    }
}

/// One hook as declared in the configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HookConfig {
    pub repo: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(flatten)]
    pub filter: FileFilter,
    pub args: Vec<String>,
    pub additional_dependencies: Vec<String>,
    pub pass_filenames: bool,
    pub always_run: bool,
    pub stages: Vec<String>,
}

impl HookConfig {
    /// `name` when given, otherwise the id
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    /// True when `query` is this hook's id or alias
    pub fn answers_to(&self, query: &str) -> bool {
        self.id == query || self.alias.as_deref() == Some(query)
    }
}

/// Ordered hooks of one configuration file
#[derive(Debug, Clone)]
pub struct Registry {
    origin: String,
    global: FileFilter,
    hooks: Vec<HookConfig>,
}

impl Registry {
    /// Load a configuration file with default options
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Self::load_with(path, LoadOptions::default())
    }

    pub fn load_with<P: AsRef<Path>>(path: P, options: LoadOptions) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::parse_with(&content, &path.display().to_string(), options)
    }

    /// Parse configuration text; `origin` names the source in errors.
    pub fn from_yaml_str(content: &str, origin: &str) -> Result<Self, ConfigError> {
        Self::parse_with(content, origin, LoadOptions::default())
    }

    pub fn parse_with(
        content: &str,
        origin: &str,
        options: LoadOptions,
    ) -> Result<Self, ConfigError> {
        let parse_error = |source| ConfigError::Parse {
            origin: origin.to_string(),
            source,
        };

        if content.trim().is_empty() {
            return Err(ConfigError::Shape {
                origin: origin.to_string(),
            });
        }

        let document: Value = serde_yml::from_str(content).map_err(parse_error)?;
        let raw = match document {
            Value::Sequence(_) => RawConfig {
                repos: serde_yml::from_value(document).map_err(parse_error)?,
                files: None,
                exclude: None,
                extra: BTreeMap::new(),
            },
            Value::Mapping(_) => serde_yml::from_value(document).map_err(parse_error)?,
            _ => {
                return Err(ConfigError::Shape {
                    origin: origin.to_string(),
                });
            }
        };

        Builder { origin, options }.build(raw)
    }

    /// Where the configuration was read from
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Top-level `files` / `exclude` filter, applied before every hook's own
    pub fn global_filter(&self) -> &FileFilter {
        &self.global
    }

    /// Hooks in declaration order
    pub fn hooks(&self) -> &[HookConfig] {
        &self.hooks
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Hooks whose id or alias is `query`, in declaration order
    pub fn find<'a>(&'a self, query: &str) -> impl Iterator<Item = &'a HookConfig> {
        self.hooks.iter().filter(move |hook| hook.answers_to(query))
    }

    /// Distinct repositories, in order of first appearance
    pub fn repositories(&self) -> Vec<&str> {
        let mut repos: Vec<&str> = Vec::new();
        for hook in &self.hooks {
            if !repos.contains(&hook.repo.as_str()) {
                repos.push(&hook.repo);
            }
        }
        repos
    }

    /// Evaluate `path` for `hook`, top-level filters first.
    pub fn evaluate(&self, hook: &HookConfig, path: &str, tags: &TagSet) -> Verdict {
        match self.global.evaluate_path(path) {
            Verdict::NotIncluded => Verdict::OutsideGlobalFiles,
            Verdict::Excluded => Verdict::GloballyExcluded,
            _ => hook.filter.evaluate(path, tags),
        }
    }
}

struct Builder<'a> {
    origin: &'a str,
    options: LoadOptions,
}

impl Builder<'_> {
    fn build(&self, raw: RawConfig) -> Result<Registry, ConfigError> {
        self.warn_unknown("top level", &raw.extra, IGNORED_TOP_LEVEL_KEYS);

        let global = FileFilter {
            include: self.compile("(top level)", "files", raw.files.as_deref())?,
            exclude: self.compile("(top level)", "exclude", raw.exclude.as_deref())?,
            ..FileFilter::default()
        };

        let mut hooks = Vec::new();
        for repo in raw.repos {
            hooks.extend(self.build_repo(repo)?);
        }

        debug!("Loaded {} hooks from {}", hooks.len(), self.origin);

        Ok(Registry {
            origin: self.origin.to_string(),
            global,
            hooks,
        })
    }

    fn build_repo(&self, repo: RawRepo) -> Result<Vec<HookConfig>, ConfigError> {
        self.warn_unknown(&format!("repository `{}`", repo.repo), &repo.extra, &[]);

        let rev = repo.rev.filter(|rev| !rev.trim().is_empty());
        if rev.is_none() && !PSEUDO_REPOS.contains(&repo.repo.as_str()) {
            return Err(ConfigError::MissingRevision {
                origin: self.origin.to_string(),
                repo: repo.repo,
            });
        }

        let mut hooks = Vec::with_capacity(repo.hooks.len());
        for (index, hook) in repo.hooks.into_iter().enumerate() {
            if hook.id.trim().is_empty() {
                return Err(ConfigError::EmptyHookId {
                    origin: self.origin.to_string(),
                    repo: repo.repo,
                    index: index + 1,
                });
            }
            hooks.push(self.build_hook(&repo.repo, rev.as_deref(), hook)?);
        }
        Ok(hooks)
    }

    fn build_hook(
        &self,
        repo: &str,
        rev: Option<&str>,
        hook: RawHook,
    ) -> Result<HookConfig, ConfigError> {
        self.warn_unknown(&format!("hook `{}`", hook.id), &hook.extra, IGNORED_HOOK_KEYS);

        let include = self.compile(&hook.id, "files", hook.files.as_deref())?;
        let exclude = self.compile(&hook.id, "exclude", hook.exclude.as_deref())?;

        let declared = hook
            .types
            .unwrap_or_else(|| vec![types::FILE.to_string()]);
        let filter = FileFilter {
            include,
            exclude,
            types: self.tags(&hook.id, "types", declared)?,
            types_or: self.tags(&hook.id, "types_or", hook.types_or)?,
            exclude_types: self.tags(&hook.id, "exclude_types", hook.exclude_types)?,
        };

        debug!(
            "Hook {} ({}): files={:?} exclude={:?} types={:?}",
            hook.id,
            repo,
            filter.include.as_ref().map(Pattern::source),
            filter.exclude.as_ref().map(Pattern::source),
            filter.types
        );

        Ok(HookConfig {
            repo: repo.to_string(),
            rev: rev.map(str::to_string),
            id: hook.id,
            name: hook.name,
            alias: hook.alias,
            entry: hook.entry,
            language: hook.language,
            filter,
            args: hook.args,
            additional_dependencies: hook.additional_dependencies,
            pass_filenames: hook.pass_filenames.unwrap_or(true),
            always_run: hook.always_run.unwrap_or(false),
            stages: hook.stages,
        })
    }

    fn compile(
        &self,
        hook: &str,
        field: &'static str,
        source: Option<&str>,
    ) -> Result<Option<Pattern>, ConfigError> {
        Pattern::optional(source).map_err(|e| ConfigError::InvalidPattern {
            origin: self.origin.to_string(),
            hook: hook.to_string(),
            field,
            pattern: source.unwrap_or_default().to_string(),
            source: e,
        })
    }

    fn tags(
        &self,
        hook: &str,
        field: &'static str,
        values: Vec<String>,
    ) -> Result<TagSet, ConfigError> {
        if self.options.strict_types {
            if let Some(tag) = values.iter().find(|tag| !types::is_known_tag(tag)) {
                return Err(ConfigError::UnknownTag {
                    origin: self.origin.to_string(),
                    hook: hook.to_string(),
                    field,
                    tag: tag.clone(),
                });
            }
        }
        Ok(values.into_iter().collect())
    }

    fn warn_unknown(&self, scope: &str, extra: &BTreeMap<String, Value>, ignored: &[&str]) {
        for key in extra.keys().filter(|key| !ignored.contains(&key.as_str())) {
            warn!("{}: unexpected key `{}` in {}", self.origin, key, scope);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEGACY: &str = r#"
- repo: git://github.com/pre-commit/mirrors-yapf
  sha: v0.19.0
  hooks:
  - id: yapf
    language: system
    files: |
      (?x)^(
        aiida/work/.*\.py|
        # aiida/backends/tests/cmdline/commands/.*\.py|
        aiida/orm/utils/node\.py
      )$
- repo: local
  hooks:
  - id: prospector
    language: system
    types: [file, python]
    entry: prospector
    exclude: '^(docs/.*|aiida/backends/djsite/db/migrations/.*)$'
  - id: travis-linter
    name: travis
    entry: travis lint
    files: .travis.yml
    language: ruby
    additional_dependencies: ['travis']
"#;

    fn set(values: &[&str]) -> TagSet {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_legacy_layout() {
        let registry = Registry::from_yaml_str(LEGACY, "legacy.yaml").unwrap();
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.origin(), "legacy.yaml");

        let yapf = &registry.hooks()[0];
        assert_eq!(yapf.repo, "git://github.com/pre-commit/mirrors-yapf");
        assert_eq!(yapf.rev.as_deref(), Some("v0.19.0"));
        assert_eq!(yapf.language.as_deref(), Some("system"));
        assert!(yapf.filter.include.is_some());
        assert_eq!(yapf.filter.types, set(&["file"]));

        let travis = &registry.hooks()[2];
        assert_eq!(travis.display_name(), "travis");
        assert_eq!(travis.additional_dependencies, vec!["travis"]);
        assert!(travis.rev.is_none());
        assert!(travis.pass_filenames);
        assert!(!travis.always_run);
    }

    #[test]
    fn test_declaration_order_is_preserved() {
        let registry = Registry::from_yaml_str(LEGACY, "legacy.yaml").unwrap();
        let ids: Vec<&str> = registry.hooks().iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["yapf", "prospector", "travis-linter"]);
        assert_eq!(
            registry.repositories(),
            vec!["git://github.com/pre-commit/mirrors-yapf", "local"]
        );
    }

    #[test]
    fn test_commented_pattern_line_is_inert() {
        let registry = Registry::from_yaml_str(LEGACY, "legacy.yaml").unwrap();
        let yapf = &registry.hooks()[0];
        let file = set(&["file"]);

        assert!(registry.evaluate(yapf, "aiida/work/launch.py", &file).is_included());
        assert_eq!(
            registry.evaluate(yapf, "aiida/backends/tests/cmdline/commands/foo.py", &file),
            Verdict::NotIncluded
        );
    }

    #[test]
    fn test_mapping_layout_with_global_filters() {
        let content = r#"
files: '^aiida/.*'
exclude: '^aiida/backends/djsite/db/migrations/.*'
fail_fast: true
repos:
- repo: https://github.com/pre-commit/mirrors-yapf
  rev: v0.24.0
  hooks:
  - id: yapf
    args: [-i]
    types: [python]
"#;
        let registry = Registry::from_yaml_str(content, "mapping.yaml").unwrap();
        let yapf = &registry.hooks()[0];
        let python = set(&["file", "python"]);

        assert_eq!(yapf.rev.as_deref(), Some("v0.24.0"));
        assert_eq!(yapf.args, vec!["-i"]);
        assert!(registry.global_filter().include.is_some());
        assert!(registry.evaluate(yapf, "aiida/settings.py", &python).is_included());
        assert_eq!(registry.evaluate(yapf, "setup.py", &python), Verdict::OutsideGlobalFiles);
        let migration = "aiida/backends/djsite/db/migrations/0010_auto_20170117_1832.py";
        assert_eq!(
            registry.evaluate(yapf, migration, &python),
            Verdict::GloballyExcluded
        );
    }

    #[test]
    fn test_invalid_pattern_fails_load() {
        let content = r#"
- repo: local
  hooks:
  - id: broken
    files: '^(aiida/work/.*\.py$'
"#;
        let err = Registry::from_yaml_str(content, "broken.yaml").unwrap_err();
        match err {
            ConfigError::InvalidPattern { hook, field, .. } => {
                assert_eq!(hook, "broken");
                assert_eq!(field, "files");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_dangling_escape_fails_load() {
        let content = r#"
- repo: local
  hooks:
  - id: broken
    exclude: 'aiida/work\'
"#;
        let err = Registry::from_yaml_str(content, "dangling.yaml").unwrap_err();
        match err {
            ConfigError::InvalidPattern { field, pattern, .. } => {
                assert_eq!(field, "exclude");
                assert_eq!(pattern, r"aiida/work\");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_literal_space_and_hash_in_class_load() {
        let content = r#"
- repo: local
  hooks:
  - id: docs
    files: 'my[ ]file\.py|docs/[#]x'
"#;
        let registry = Registry::from_yaml_str(content, "classes.yaml").unwrap();
        let docs = &registry.hooks()[0];
        let file = set(&["file"]);
        assert!(registry.evaluate(docs, "my file.py", &file).is_included());
        assert!(registry.evaluate(docs, "docs/#x", &file).is_included());
    }

    #[test]
    fn test_invalid_global_pattern_fails_load() {
        let content = "exclude: '[unterminated'\nrepos: []\n";
        let err = Registry::from_yaml_str(content, "global.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPattern { field: "exclude", .. }));
    }

    #[test]
    fn test_remote_repo_requires_rev() {
        let content = r#"
- repo: https://github.com/landscapeio/prospector
  hooks:
  - id: prospector
"#;
        let err = Registry::from_yaml_str(content, "norev.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::MissingRevision { .. }));
        assert!(err.to_string().contains("landscapeio/prospector"));
    }

    #[test]
    fn test_empty_hook_id_is_rejected() {
        let content = "- repo: local\n  hooks:\n  - id: ''\n";
        let err = Registry::from_yaml_str(content, "empty.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::EmptyHookId { index: 1, .. }));
    }

    #[test]
    fn test_missing_hook_id_is_a_parse_error() {
        let content = "- repo: local\n  hooks:\n  - entry: yapf\n";
        let err = Registry::from_yaml_str(content, "noid.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_scalar_document_is_rejected() {
        let err = Registry::from_yaml_str("just a string", "scalar.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Shape { .. }));

        let err = Registry::from_yaml_str("", "empty.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Shape { .. }));
    }

    #[test]
    fn test_malformed_yaml_is_rejected() {
        let err = Registry::from_yaml_str("- repo: [local\n", "bad.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_unknown_type_tag() {
        let content = "- repo: local\n  hooks:\n  - id: lint\n    types: [pyton]\n";
        let err = Registry::from_yaml_str(content, "tags.yaml").unwrap_err();
        match err {
            ConfigError::UnknownTag { hook, field, tag, .. } => {
                assert_eq!(hook, "lint");
                assert_eq!(field, "types");
                assert_eq!(tag, "pyton");
            }
            other => panic!("unexpected error: {other}"),
        }

        let relaxed =
            Registry::parse_with(content, "tags.yaml", LoadOptions { strict_types: false })
                .unwrap();
        assert_eq!(relaxed.hooks()[0].filter.types, set(&["pyton"]));
    }

    #[test]
    fn test_unknown_keys_are_tolerated() {
        let content = r#"
- repo: local
  shallow: true
  hooks:
  - id: yapf
    description: formats python
    colour: blue
"#;
        let registry = Registry::from_yaml_str(content, "extra.yaml").unwrap();
        assert_eq!(registry.hooks()[0].id, "yapf");
    }

    #[test]
    fn test_yaml_anchors_are_resolved() {
        let content = r#"
- repo: local
  hooks:
  - id: yapf
    files: &python_sources '^aiida/.*\.py$'
  - id: prospector
    files: *python_sources
"#;
        let registry = Registry::from_yaml_str(content, "anchors.yaml").unwrap();
        assert_eq!(registry.hooks()[0].filter, registry.hooks()[1].filter);
    }

    #[test]
    fn test_blank_patterns_are_absent() {
        let content = "- repo: local\n  hooks:\n  - id: all\n    files: ''\n    exclude: ''\n";
        let registry = Registry::from_yaml_str(content, "blank.yaml").unwrap();
        let hook = &registry.hooks()[0];
        assert!(hook.filter.include.is_none());
        assert!(hook.filter.exclude.is_none());
        assert!(registry.evaluate(hook, "anything.txt", &set(&["file"])).is_included());
    }

    #[test]
    fn test_find_by_id_and_alias() {
        let content = r#"
- repo: local
  hooks:
  - id: yapf
    alias: fmt
  - id: prospector
- repo: https://github.com/pre-commit/mirrors-yapf
  rev: v0.24.0
  hooks:
  - id: yapf
"#;
        let registry = Registry::from_yaml_str(content, "dupes.yaml").unwrap();
        assert_eq!(registry.find("yapf").count(), 2);
        assert_eq!(registry.find("fmt").count(), 1);
        assert_eq!(registry.find("missing").count(), 0);
    }

    #[test]
    fn test_load_reports_missing_file() {
        let err = Registry::load("/nonexistent/.pre-commit-config.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
