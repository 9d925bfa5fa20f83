//! Path filter evaluation
//!
//! Decides whether a candidate path is handed to a hook. A path passes when:
//!
//! - it fully matches the include pattern, if one is configured
//! - it does not fully match the exclude pattern, if one is configured
//! - it carries every tag in `types`, at least one tag in `types_or` and
//!   none of the tags in `exclude_types`
//!
//! Evaluation is a pure function of the path, the filter and the path's tags.

pub mod pattern;
pub mod types;

pub use pattern::{Pattern, normalize_path};
pub use types::{
    FileClassifier, FilenameClassifier, IdentifyClassifier, StaticClassifier, TagSet,
};

use serde::Serialize;
use std::fmt;

/// Outcome of evaluating one path against one filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    Included,
    /// The path does not match the top-level `files` pattern
    OutsideGlobalFiles,
    /// The path matches the top-level `exclude` pattern
    GloballyExcluded,
    /// The path does not match the hook's `files` pattern
    NotIncluded,
    /// The path matches the hook's `exclude` pattern
    Excluded,
    MissingTypes { missing: Vec<String> },
    NoTypesOr { wanted: Vec<String> },
    ExcludedType { tag: String },
}

impl Verdict {
    pub fn is_included(&self) -> bool {
        matches!(self, Verdict::Included)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Included => write!(f, "included"),
            Verdict::OutsideGlobalFiles => write!(f, "outside top-level files pattern"),
            Verdict::GloballyExcluded => write!(f, "excluded by top-level exclude pattern"),
            Verdict::NotIncluded => write!(f, "does not match files pattern"),
            Verdict::Excluded => write!(f, "excluded by exclude pattern"),
            Verdict::MissingTypes { missing } => write!(f, "missing types: {}", missing.join(", ")),
            Verdict::NoTypesOr { wanted } => write!(f, "none of types_or: {}", wanted.join(", ")),
            Verdict::ExcludedType { tag } => write!(f, "excluded type: {tag}"),
        }
    }
}

/// The file selection part of a hook definition
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FileFilter {
    #[serde(rename = "files", skip_serializing_if = "Option::is_none")]
    pub include: Option<Pattern>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude: Option<Pattern>,
    pub types: TagSet,
    #[serde(skip_serializing_if = "TagSet::is_empty")]
    pub types_or: TagSet,
    #[serde(skip_serializing_if = "TagSet::is_empty")]
    pub exclude_types: TagSet,
}

impl FileFilter {
    /// True when the filter needs file tags to reach a verdict
    pub fn uses_types(&self) -> bool {
        !(self.types.is_empty() && self.types_or.is_empty() && self.exclude_types.is_empty())
    }

    /// Pattern-only part of the evaluation
    pub fn evaluate_path(&self, path: &str) -> Verdict {
        if let Some(include) = &self.include {
            if !include.is_full_match(path) {
                return Verdict::NotIncluded;
            }
        }
        if let Some(exclude) = &self.exclude {
            if exclude.is_full_match(path) {
                return Verdict::Excluded;
            }
        }
        Verdict::Included
    }

    /// Evaluate `path` given the tags its classifier reported
    pub fn evaluate(&self, path: &str, tags: &TagSet) -> Verdict {
        let verdict = self.evaluate_path(path);
        if !verdict.is_included() {
            return verdict;
        }

        let missing: Vec<String> = self.types.difference(tags).cloned().collect();
        if !missing.is_empty() {
            return Verdict::MissingTypes { missing };
        }

        if !self.types_or.is_empty() && self.types_or.is_disjoint(tags) {
            return Verdict::NoTypesOr {
                wanted: self.types_or.iter().cloned().collect(),
            };
        }

        if let Some(tag) = self.exclude_types.intersection(tags).next() {
            return Verdict::ExcludedType { tag: tag.clone() };
        }

        Verdict::Included
    }

    /// Evaluate `path`, classifying it only when the regex checks pass and
    /// the filter constrains types.
    pub fn evaluate_with<C: FileClassifier + ?Sized>(&self, path: &str, classifier: &C) -> Verdict {
        let verdict = self.evaluate_path(path);
        if !verdict.is_included() || !self.uses_types() {
            return verdict;
        }
        self.evaluate(path, &classifier.classify(&normalize_path(path)))
    }
}

/// Decide whether `path` is eligible for a hook.
///
/// `declared_types` must all be present among the tags `classifier` reports
/// for the path; an empty set imposes no constraint and skips classification.
pub fn matches<C: FileClassifier + ?Sized>(
    path: &str,
    include: Option<&Pattern>,
    exclude: Option<&Pattern>,
    declared_types: &TagSet,
    classifier: &C,
) -> bool {
    let filter = FileFilter {
        include: include.cloned(),
        exclude: exclude.cloned(),
        types: declared_types.clone(),
        ..FileFilter::default()
    };
    filter.evaluate_with(path, classifier).is_included()
}
