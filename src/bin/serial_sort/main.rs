mod category;
mod config;
mod logger;
mod mover;
mod serial;
mod sorter;
mod stats;

use std::path::PathBuf;

use clap::{CommandFactory, Parser};
use clap_complete::Shell;

use crate::sorter::SerialSorter;

#[derive(Parser)]
#[command(
    author,
    version,
    name = env!("CARGO_BIN_NAME"),
    about = "Sort serial-numbered files into a structured destination tree"
)]
pub struct Args {
    /// Optional source directory to process
    #[arg(value_hint = clap::ValueHint::DirPath)]
    pub(crate) path: Option<PathBuf>,

    /// Infer destination category from filename keywords
    #[arg(short, long)]
    pub(crate) auto: bool,

    /// Destination category key (0-8), skips the interactive menu
    #[arg(short, long, name = "KEY", conflicts_with = "auto")]
    pub(crate) category: Option<String>,

    /// Destination root directory
    #[arg(short, long, name = "ROOT", value_hint = clap::ValueHint::DirPath)]
    pub(crate) dest: Option<PathBuf>,

    /// Print debug information
    #[arg(short = 'D', long)]
    pub(crate) debug: bool,

    /// Path to the valid prefix list file
    #[arg(short = 'f', long, name = "FILE", value_hint = clap::ValueHint::FilePath)]
    pub(crate) prefixes: Option<PathBuf>,

    /// Only print changes without moving files
    #[arg(short, long)]
    pub(crate) print: bool,

    /// Include per-prefix breakdown in the run summary
    #[arg(short, long)]
    pub(crate) stats: bool,

    /// Generate shell completion
    #[arg(short = 'l', long, name = "SHELL")]
    pub(crate) completion: Option<Shell>,

    /// Print verbose output
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    if let Some(ref shell) = args.completion {
        serial_sort::generate_shell_completion(*shell, Args::command(), true, env!("CARGO_BIN_NAME"))
    } else {
        SerialSorter::new(args)?.run()
    }
}
