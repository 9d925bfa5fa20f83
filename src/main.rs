use anyhow::Result;
use clap::Parser;

use hookscope::cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.run()
}
