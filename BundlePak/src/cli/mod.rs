//! BundlePak CLI - label asset folders and rebuild bundle archives

pub mod commands;
pub mod progress;

use clap::Parser;
use commands::Commands;

use crate::error::Error;

#[derive(Parser)]
#[command(name = "bundlepak", version)]
#[command(about = "BundlePak: folder-driven asset bundle labelling and builds", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Run the BundlePak CLI
pub fn run_cli() -> anyhow::Result<()> {
    // Setup logging
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    cli.command.execute().map_err(|err| {
        let validation = err.downcast_ref::<Error>().is_some_and(Error::is_validation);
        if validation {
            err.context("invalid configuration")
        } else {
            err
        }
    })
}
