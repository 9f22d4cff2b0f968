use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "channelfeed")]
#[command(about = "Builds the channel feed and URL history documents", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch all sources, merge them and write the output documents
    Run(RunArgs),
    /// Print the fixed category table
    Categories,
}

#[derive(clap::Args, Debug)]
pub struct RunArgs {
    /// Print a sample instead of writing files (same as DRY_RUN=1)
    #[arg(long)]
    pub dry_run: bool,

    /// Configuration file (defaults to $CHANNELFEED_CONFIG or config/channelfeed.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory the documents are written to
    #[arg(long)]
    pub output_dir: Option<PathBuf>,
}
