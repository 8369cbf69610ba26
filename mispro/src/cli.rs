//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use eyre::Result;

#[derive(Debug, Parser)]
#[command(name = "mispro")]
#[command(about = "Mispronunciation-detection dataset tools")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Build the dataset artifact from labels, ASR transcripts and a dictionary
    Build(crate::build::Args),

    /// Print the shape of a dataset artifact
    Inspect(crate::inspect::Args),
}

/// Execute CLI command - separated for testing.
pub fn run_cli(cli: Cli) -> Result<()> {
    tracing::debug!(?cli, "parsed arguments");

    match cli.command {
        Commands::Build(args) => crate::build::execute(args.try_into()?),
        Commands::Inspect(args) => crate::inspect::execute(args.into()),
    }
}
