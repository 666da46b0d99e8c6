use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "vdr",
    about = "Verifiable Data Registry: store, read, and verify data through pluggable drivers",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Registry configuration (TOML). Defaults to a SQLite database at
    /// `.vdr/registry.db`.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Store a payload and print its locator
    Create(CreateArgs),
    /// Print the payload at a locator
    Read(ReadArgs),
    /// Replace the payload at a locator
    Update(UpdateArgs),
    /// Delete the payload at a locator
    Delete(DeleteArgs),
    /// Produce a proof for the payload at a locator
    Verify(VerifyArgs),
    /// List configured drivers
    Drivers,
}

/// Where the payload comes from: an argument, a file, or stdin.
#[derive(Args)]
pub struct PayloadArgs {
    /// Payload as text
    #[arg(conflicts_with = "file")]
    pub data: Option<String>,
    /// Read the payload from a file
    #[arg(short, long)]
    pub file: Option<PathBuf>,
}

#[derive(Args)]
pub struct CreateArgs {
    #[command(flatten)]
    pub payload: PayloadArgs,
    /// Route to the driver with this identifier
    #[arg(long)]
    pub driver_id: Option<String>,
    /// Route to the first driver of this family
    #[arg(long)]
    pub family: Option<String>,
    /// Mark the item as mutable
    #[arg(long)]
    pub mutable: bool,
    /// Extra driver option, `key=value` (repeatable)
    #[arg(short = 'o', long = "option", value_name = "KEY=VALUE")]
    pub options: Vec<String>,
}

#[derive(Args)]
pub struct ReadArgs {
    pub locator: String,
    /// Write the payload to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct UpdateArgs {
    pub locator: String,
    #[command(flatten)]
    pub payload: PayloadArgs,
    #[arg(short = 'o', long = "option", value_name = "KEY=VALUE")]
    pub options: Vec<String>,
}

#[derive(Args)]
pub struct DeleteArgs {
    pub locator: String,
    #[arg(short = 'o', long = "option", value_name = "KEY=VALUE")]
    pub options: Vec<String>,
}

#[derive(Args)]
pub struct VerifyArgs {
    pub locator: String,
    /// Attach the payload to the proof
    #[arg(long)]
    pub with_data: bool,
}
