use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::cli::Output;
use crate::config::{OutputFormat, Settings};
use crate::manifest::{HookConfig, LoadOptions, Registry};

pub mod files;
pub mod list;
pub mod matching;
pub mod validate;

#[derive(Parser)]
#[command(
    name = "hookscope",
    version = env!("CARGO_PKG_VERSION"),
    about = "Work out which files each pre-commit hook applies to",
    long_about = "hookscope loads a pre-commit hook configuration, compiles its file \
                  patterns and reports which files every hook would receive."
)]
pub struct Cli {
    /// Run as if started in <DIR> instead of current working directory
    #[arg(short = 'C', long = "directory", global = true)]
    pub directory: Option<PathBuf>,

    /// Increase verbosity (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Hook configuration file [default: .pre-commit-config.yaml]
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Read hookscope settings from FILE instead of the standard locations
    #[arg(long, value_name = "FILE", global = true, env = "HOOKSCOPE_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, global = true)]
    pub format: Option<OutputFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load the hook configuration and report problems
    Validate(validate::ValidateArgs),
    /// List hooks in declaration order
    List(list::ListArgs),
    /// Show which hooks apply to the given paths
    Match(matching::MatchArgs),
    /// Show the files every hook would receive
    Files(files::FilesArgs),
}

/// Resolved settings and output shared by all commands
pub struct Session {
    pub settings: Settings,
    pub output: Output,
}

impl Session {
    pub fn config_path(&self) -> &Path {
        &self.settings.config_file
    }

    pub fn is_json(&self) -> bool {
        self.settings.format == OutputFormat::Json
    }

    pub fn load_registry(&self) -> Result<Registry> {
        let options = LoadOptions {
            strict_types: self.settings.strict_types,
        };
        let registry = Registry::load_with(self.config_path(), options)
            .context("Failed to load hook configuration")?;
        tracing::info!("Loaded {} hooks from {}", registry.len(), registry.origin());
        Ok(registry)
    }

    /// Hooks named by `--hook`, or all of them
    pub fn hooks<'a>(
        &self,
        registry: &'a Registry,
        hook: Option<&str>,
    ) -> Result<Vec<&'a HookConfig>> {
        match hook {
            Some(query) => {
                let hooks: Vec<&HookConfig> = registry.find(query).collect();
                if hooks.is_empty() {
                    anyhow::bail!("No hook with id or alias `{query}` in {}", registry.origin());
                }
                Ok(hooks)
            }
            None => Ok(registry.hooks().iter().collect()),
        }
    }
}

impl Cli {
    pub fn run(self) -> Result<()> {
        // Change directory if specified
        if let Some(dir) = &self.directory {
            std::env::set_current_dir(dir)
                .with_context(|| format!("Failed to change directory to {}", dir.display()))?;
        }

        setup_logging(self.verbose, self.quiet);

        let mut settings = Settings::load_with_custom_config(self.settings.as_deref())
            .context("Failed to load hookscope settings")?;
        if let Some(config) = self.config {
            settings.config_file = config;
        }
        if let Some(format) = self.format {
            settings.format = format;
        }
        if self.no_color {
            settings.color = false;
        }
        if !settings.color {
            console::set_colors_enabled(false);
            console::set_colors_enabled_stderr(false);
        }
        tracing::debug!("Settings: {:?}", settings);

        let session = Session {
            settings,
            output: Output::new(self.verbose > 0, self.quiet),
        };

        match self.command {
            Some(Commands::Validate(args)) => validate::execute(args, &session),
            Some(Commands::List(args)) => list::execute(args, &session),
            Some(Commands::Match(args)) => matching::execute(args, &session),
            Some(Commands::Files(args)) => files::execute(args, &session),
            None => {
                // Show help when no command is provided
                Cli::command().print_help()?;
                Ok(())
            }
        }
    }
}

fn setup_logging(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }

    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        match verbose {
            0 => tracing_subscriber::EnvFilter::new("warn"),
            1 => tracing_subscriber::EnvFilter::new("info,ignore=warn"),
            2 => tracing_subscriber::EnvFilter::new("debug,ignore=warn"),
            _ => tracing_subscriber::EnvFilter::new("trace"),
        }
    });

    // Logs go to stderr so JSON on stdout stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
