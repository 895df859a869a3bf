//! sdistr CLI - builds and inspects Python source distributions.

mod cli;
mod commands;
mod error;
mod output;
mod progress;

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::util::SubscriberInitExt;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();

    let formatter = output::create_formatter(cli.json, cli.verbose, cli.quiet);

    if let Err(err) = init_logging(cli.verbose) {
        formatter.format_warning(&format!("logging disabled: {err}"));
    }

    let result = match &cli.command {
        cli::Commands::Build(args) => {
            commands::build::execute(args, &*formatter, cli.quiet || cli.json)
        }
        cli::Commands::Metadata(args) => commands::metadata::execute(args, &*formatter),
        cli::Commands::List(args) => commands::list::execute(args, &*formatter),
        cli::Commands::Completion(args) => {
            commands::completion::execute(args.shell);
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            formatter.format_error(&err);
            ExitCode::FAILURE
        }
    }
}

/// Installs the stderr log subscriber. `RUST_LOG` overrides the default
/// level (`warn`, or `info` with `--verbose`).
fn init_logging(verbose: bool) -> Result<()> {
    let default_filter = if verbose {
        LevelFilter::INFO
    } else {
        LevelFilter::WARN
    };

    let env_filter = EnvFilter::builder()
        .with_default_directive(default_filter.into())
        .from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .without_time()
        .finish()
        .try_init()?;

    Ok(())
}
