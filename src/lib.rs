//! # hookscope - which files does each hook see?
//!
//! hookscope reads a pre-commit hook configuration (`.pre-commit-config.yaml`),
//! validates it, compiles every file pattern and answers, for any set of
//! candidate paths, which hooks apply to which files.
//!
//! It performs no hook execution: tool installation and running hooks are
//! left to the hook runner consuming the same file.
//!
//! ## Quick Start
//!
//! ```bash
//! # Check the configuration in the current repository
//! hookscope validate
//!
//! # Which hooks would run on these files?
//! hookscope match aiida/work/launch.py docs/conf.py --explain
//!
//! # Files each hook receives for the current commit
//! hookscope files --staged
//! ```
//!
//! ## Library Usage
//!
//! ```rust,no_run
//! use hookscope::filter::IdentifyClassifier;
//! use hookscope::manifest::Registry;
//!
//! let registry = Registry::load(".pre-commit-config.yaml")?;
//! let files = vec!["aiida/work/launch.py".to_string()];
//!
//! for selection in hookscope::select::select(&registry, &files, &IdentifyClassifier::new(".")) {
//!     println!("{}: {:?}", selection.hook.id, selection.files);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Pattern Semantics
//!
//! `files` and `exclude` are regular expressions in verbose syntax: whitespace
//! is ignored and `#` starts a comment. A path must match the whole pattern,
//! so a commented-out line contributes nothing:
//!
//! ```yaml
//! files: |
//!   (?x)^(
//!     aiida/work/.*\.py|
//!     # aiida/backends/tests/.*\.py|
//!     aiida/orm/utils/node\.py
//!   )$
//! ```

pub mod cli;
pub mod config;
pub mod filter;
pub mod git;
pub mod manifest;
pub mod select;

pub use filter::{FileFilter, Pattern, Verdict, matches};
pub use manifest::{ConfigError, HookConfig, Registry};

/// Result type alias for hookscope operations
pub type Result<T> = anyhow::Result<T>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
