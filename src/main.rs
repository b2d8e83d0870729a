//! chartdoc CLI entry point
//!
//! Parses arguments, runs the documentation generator on a Tokio runtime and
//! turns any failure into a colored, user-friendly message with exit status 1.

use anyhow::Result;
use chartdoc_cli::cli;
use chartdoc_cli::core::user_friendly_error;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            user_friendly_error(e).display();
            std::process::exit(1);
        }
    }
}
