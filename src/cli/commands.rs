use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "vitabs",
    about = concat!("vitabs v", env!("CARGO_PKG_VERSION"), " - a vi-like guitar tablature editor"),
    version,
    args_conflicts_with_subcommands = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Tablature file to open
    pub file: Option<PathBuf>,

    /// Read configuration from this file instead of the default location
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print a tablature file as plain text
    Print(PrintArgs),
    /// Summarize a tablature file
    Info(InfoArgs),
    /// Show the recovery log of discarded or unsaved documents
    Recovery(RecoveryArgs),
}

#[derive(Args)]
pub struct PrintArgs {
    /// File to print
    pub file: PathBuf,

    /// Page width in columns
    #[arg(long, default_value = "80")]
    pub width: usize,

    /// Bar meta line: meter, number, label or length
    #[arg(long, default_value = "meter")]
    pub meta: String,
}

#[derive(Args)]
pub struct InfoArgs {
    /// File to summarize
    pub file: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct RecoveryArgs {
    /// Maximum number of entries to show, newest last
    #[arg(long, default_value = "20")]
    pub limit: usize,

    /// Print the saved document of each entry as well
    #[arg(long)]
    pub full: bool,
}
