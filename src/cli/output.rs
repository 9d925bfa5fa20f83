//! Terminal output helpers
//!
//! Consistent symbols and styling for human-readable output, plus a JSON
//! printer for `--format json`.

use console::style;
use serde::Serialize;

/// Output handler for consistent CLI formatting
pub struct Output {
    verbose: bool,
    quiet: bool,
}

impl Output {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self { verbose, quiet }
    }

    pub fn success(&self, message: &str) {
        if !self.quiet {
            println!("{} {}", style("✔").green(), message);
        }
    }

    pub fn warning(&self, message: &str) {
        if !self.quiet {
            println!("{} {}", style("⚠").yellow(), message);
        }
    }

    pub fn info(&self, message: &str) {
        if !self.quiet {
            println!("{} {}", style("ℹ").blue(), message);
        }
    }

    /// Only printed with `-v`
    pub fn verbose(&self, message: &str) {
        if self.verbose && !self.quiet {
            println!("{} {}", style("ℹ").dim(), style(message).dim());
        }
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    pub fn section_header(&self, title: &str) {
        if !self.quiet {
            println!("\n{}", style(title).bold().cyan());
        }
    }

    /// Print a count/summary
    pub fn count(&self, message: &str, count: usize) {
        if !self.quiet {
            println!(
                "{} {} {}",
                style("❯").cyan().bold(),
                style(message).bold(),
                style(format!("({count})")).dim()
            );
        }
    }

    pub fn table_row(&self, key: &str, value: &str) {
        if !self.quiet {
            println!("  {:<20} {}", style(key).dim(), value);
        }
    }

    pub fn list_item(&self, item: &str) {
        if !self.quiet {
            println!("  • {item}");
        }
    }

    /// A verdict line: green tick for matches, dim cross otherwise
    pub fn verdict(&self, label: &str, detail: &str, included: bool) {
        if self.quiet {
            return;
        }
        if included {
            println!(
                "  {} {} {}",
                style("✓").green().bold(),
                style(label).bold(),
                style(detail).dim()
            );
        } else {
            println!("  {} {} {}", style("✗").dim(), style(label).dim(), style(detail).dim());
        }
    }

    /// Structured output is printed regardless of `--quiet`
    pub fn json<T: Serialize + ?Sized>(&self, value: &T) -> anyhow::Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }
}
