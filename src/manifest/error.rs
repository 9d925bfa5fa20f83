use std::path::PathBuf;
use thiserror::Error;

/// Reasons a hook configuration fails to load
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{origin}: invalid configuration")]
    Parse {
        origin: String,
        #[source]
        source: serde_yml::Error,
    },

    #[error("{origin}: expected a list of repositories or a mapping with a `repos` key")]
    Shape { origin: String },

    #[error("{origin}: repository `{repo}` has no `rev`")]
    MissingRevision { origin: String, repo: String },

    #[error("{origin}: hook #{index} of repository `{repo}` has an empty id")]
    EmptyHookId {
        origin: String,
        repo: String,
        index: usize,
    },

    #[error("{origin}: hook `{hook}` has an invalid `{field}` pattern: {pattern}")]
    InvalidPattern {
        origin: String,
        hook: String,
        field: &'static str,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("{origin}: hook `{hook}` lists unknown tag `{tag}` in `{field}`")]
    UnknownTag {
        origin: String,
        hook: String,
        field: &'static str,
        tag: String,
    },
}
