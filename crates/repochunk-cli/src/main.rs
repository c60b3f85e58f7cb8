//! Repochunk CLI
//!
//! Chunk repository dumps into metadata-enriched pieces for embedding.

use clap::Parser;
use repochunk_core::error::exit_codes;
use repochunk_core::{Config, RepoChunkError};

mod app;
mod commands;
mod output;
mod progress;

use app::{Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        let code = e
            .downcast_ref::<RepoChunkError>()
            .map(RepoChunkError::exit_code)
            .unwrap_or(exit_codes::GENERAL_ERROR);
        std::process::exit(code);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    config.validate()?;

    match cli.command {
        Commands::Chunk(args) => commands::chunk::run(args, &config, cli.format).await,
        Commands::Files(args) => commands::files::run(args, cli.format).await,
        Commands::Strategies => commands::strategies::run(&config, cli.format).await,
    }
}
