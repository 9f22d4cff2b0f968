mod cli;

use channelfeed::categories::CategoryTable;
use channelfeed::config::{Config, default_config_path};
use channelfeed::observability;
use channelfeed::pipeline::Pipeline;
use clap::Parser;
use cli::{Cli, Commands, RunArgs};
use std::process::ExitCode;
use tracing::error;

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[tokio::main]
async fn main() -> ExitCode {
    observability::init_tracing();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run(args) => run(args).await,
        Commands::Categories => {
            print_categories();
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "channelfeed failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: RunArgs) -> Result<(), AnyError> {
    let path = args.config.unwrap_or_else(default_config_path);
    let mut config = Config::load_with_env(path)?;

    if args.dry_run {
        config.output.dry_run = true;
    }
    if let Some(dir) = args.output_dir {
        config.output.dir = dir;
    }

    let pipeline = Pipeline::new(config)?;
    let summary = pipeline.run().await?;
    summary.log();

    Ok(())
}

fn print_categories() {
    for category in &CategoryTable::standard() {
        println!(
            "{:<14} genre={:<6} groups={:<32} query={:?}",
            category.name,
            category.genre_id,
            category.playlist_groups.join(","),
            category.search_query
        );
    }
}
