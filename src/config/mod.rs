//! Settings for hookscope itself
//!
//! Layered with figment, lowest priority first:
//!
//! 1. embedded `default-config.toml`
//! 2. `~/.config/hookscope/config.toml` (or `.yaml` / `.yml`)
//! 3. `hookscope.toml` / `hookscope.yaml` / `hookscope.yml` in the current directory
//! 4. `HOOKSCOPE_*` environment variables
//!
//! A custom settings file replaces layers 2 and 3. Command line flags are
//! applied on top by the CLI.

use figment::{
    Figment,
    providers::{Env, Format, Toml, Yaml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// Embed the default config at compile time
const DEFAULT_CONFIG: &str = include_str!("default-config.toml");

/// How command results are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Hook configuration file to load
    pub config_file: PathBuf,

    pub format: OutputFormat,

    pub color: bool,

    /// Reject unknown type tags while loading
    pub strict_types: bool,
}

impl Settings {
    /// Load settings from the standard locations
    pub fn load() -> Result<Self, figment::Error> {
        Self::figment(None).extract()
    }

    /// Load settings, reading only `custom` instead of the user and repository files
    pub fn load_with_custom_config(custom: Option<&Path>) -> Result<Self, figment::Error> {
        Self::figment(custom).extract()
    }

    /// The merged provider stack
    pub fn figment(custom: Option<&Path>) -> Figment {
        let mut figment = Figment::new().merge(Toml::string(DEFAULT_CONFIG));

        if let Some(custom_path) = custom {
            figment = match custom_path.extension().and_then(|e| e.to_str()) {
                Some("yaml") | Some("yml") => figment.merge(Yaml::file(custom_path)),
                _ => figment.merge(Toml::file(custom_path)),
            };
        } else {
            let user_dir = Self::user_config_dir();
            figment = figment
                .merge(Toml::file(user_dir.join("config.toml")))
                .merge(Yaml::file(user_dir.join("config.yaml")))
                .merge(Yaml::file(user_dir.join("config.yml")))
                .merge(Toml::file("hookscope.toml"))
                .merge(Yaml::file("hookscope.yaml"))
                .merge(Yaml::file("hookscope.yml"));
        }

        // Environment variables always have highest priority
        figment.merge(Env::prefixed("HOOKSCOPE_"))
    }

    fn user_config_dir() -> PathBuf {
        match std::env::var("HOME") {
            Ok(home) => PathBuf::from(home).join(".config/hookscope"),
            Err(_) => PathBuf::from("~/.config/hookscope"),
        }
    }
}
