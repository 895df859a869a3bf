//! CLI argument parsing using clap.

use clap::Parser;
use clap::Subcommand;
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sdistr")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output results in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build a source distribution of a Python project
    Build(BuildArgs),
    /// Print the PKG-INFO metadata a build would embed
    Metadata(MetadataArgs),
    /// List the entries of a built source distribution
    List(ListArgs),
    /// Generate shell completions
    Completion(CompletionArgs),
}

#[derive(clap::Args)]
pub struct BuildArgs {
    /// Directory the archive is written to (created if missing)
    #[arg(value_name = "OUTPUT_DIR", default_value = "dist")]
    pub output_dir: PathBuf,

    /// Project root containing pyproject.toml
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub root: PathBuf,

    /// Compression level (1-9)
    #[arg(short = 'l', long, value_parser = clap::value_parser!(u8).range(1..=9))]
    pub compression_level: Option<u8>,

    /// Keep filesystem walk order instead of sorting entries
    #[arg(long)]
    pub no_sort: bool,

    /// Fail instead of replacing an existing archive
    #[arg(long)]
    pub no_overwrite: bool,

    /// Ignore-pattern file, relative to the project root
    #[arg(long, value_name = "FILE", default_value = ".gitignore")]
    pub ignore_file: PathBuf,

    /// Build backend setting passed through as KEY=VALUE (can be repeated)
    #[arg(short = 'C', long = "config-setting", value_name = "KEY=VALUE")]
    pub config_settings: Vec<String>,
}

#[derive(clap::Args)]
pub struct MetadataArgs {
    /// Project root containing pyproject.toml
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub root: PathBuf,
}

#[derive(clap::Args)]
pub struct ListArgs {
    /// Path to the .tar.gz archive
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Show mode and size of each entry
    #[arg(short, long)]
    pub long: bool,

    /// Show sizes in human-readable format
    #[arg(short = 'H', long)]
    pub human_readable: bool,
}

#[derive(clap::Args)]
pub struct CompletionArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,
}
