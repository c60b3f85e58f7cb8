//! CLI argument definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "repochunk")]
#[command(
    author,
    version,
    about = "Chunk repository dumps into metadata-enriched pieces for embedding"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (defaults to the user config directory)
    #[arg(long, global = true, env = "REPOCHUNK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format for reports and listings
    #[arg(long, global = true, value_enum, default_value = "cli")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Chunk a dump and write chunks as JSON lines
    Chunk(ChunkArgs),

    /// List the files in a dump with their metadata
    Files(FilesArgs),

    /// Show the effective chunking strategies
    Strategies,
}

#[derive(Args)]
pub struct ChunkArgs {
    /// Repository dump file
    pub dump: PathBuf,

    /// URL of the repository the dump was taken from
    #[arg(long)]
    pub repo_url: String,

    /// Write chunks here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Collection name recorded on every line
    #[arg(long)]
    pub collection: Option<String>,

    /// Files chunked concurrently
    #[arg(long)]
    pub workers: Option<usize>,

    /// Stop scheduling files after this many seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Show per-file progress on stderr
    #[arg(long)]
    pub progress: bool,
}

#[derive(Args)]
pub struct FilesArgs {
    /// Repository dump file
    pub dump: PathBuf,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Cli,
    Json,
}
