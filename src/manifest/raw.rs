//! On-disk shapes of the configuration file
//!
//! These mirror the YAML exactly; validation and pattern compilation happen
//! when they are converted into [`super::Registry`].

use serde::Deserialize;
use serde_yml::Value;
use std::collections::BTreeMap;

/// Mapping form: `repos:` plus top-level options
#[derive(Debug, Deserialize)]
pub(crate) struct RawConfig {
    pub repos: Vec<RawRepo>,

    #[serde(default)]
    pub files: Option<String>,

    #[serde(default)]
    pub exclude: Option<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawRepo {
    pub repo: String,

    /// `sha` is the older spelling
    #[serde(default, alias = "sha")]
    pub rev: Option<String>,

    pub hooks: Vec<RawHook>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawHook {
    pub id: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub alias: Option<String>,

    #[serde(default)]
    pub entry: Option<String>,

    #[serde(default)]
    pub language: Option<String>,

    #[serde(default)]
    pub files: Option<String>,

    #[serde(default)]
    pub exclude: Option<String>,

    #[serde(default)]
    pub types: Option<Vec<String>>,

    #[serde(default)]
    pub types_or: Vec<String>,

    #[serde(default)]
    pub exclude_types: Vec<String>,

    #[serde(default)]
    pub args: Vec<String>,

    #[serde(default)]
    pub additional_dependencies: Vec<String>,

    #[serde(default)]
    pub pass_filenames: Option<bool>,

    #[serde(default)]
    pub always_run: Option<bool>,

    #[serde(default)]
    pub stages: Vec<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}
