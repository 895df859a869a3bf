//! Build command implementation.

use crate::cli::BuildArgs;
use crate::error::convert_sdist_error;
use crate::output::OutputFormatter;
use crate::progress::CliProgress;
use anyhow::Context;
use anyhow::Result;
use sdistr_core::NoopProgress;
use sdistr_core::SdistConfig;
use sdistr_core::build_sdist_with_progress;
use sdistr_core::parse_config_settings;
use std::fs;

pub fn execute(args: &BuildArgs, formatter: &dyn OutputFormatter, quiet: bool) -> Result<()> {
    fs::create_dir_all(&args.output_dir).with_context(|| {
        format!(
            "failed to create output directory '{}'",
            args.output_dir.display()
        )
    })?;

    let settings = parse_config_settings(args.config_settings.iter().map(String::as_str));
    if !settings.is_empty() {
        tracing::debug!(
            keys = ?settings.keys().collect::<Vec<_>>(),
            "config settings are accepted but unused"
        );
    }

    let mut config = SdistConfig::default()
        .with_sort_entries(!args.no_sort)
        .with_overwrite(!args.no_overwrite)
        .with_ignore_file(&args.ignore_file);
    if let Some(level) = args.compression_level {
        config = config.with_compression_level(level);
    }

    // Progress bar only for interactive, non-JSON output
    let report = if !quiet && CliProgress::should_show() {
        let mut progress = CliProgress::new("Packaging");
        build_sdist_with_progress(&args.root, &args.output_dir, &config, &mut progress)
    } else {
        let mut noop = NoopProgress;
        build_sdist_with_progress(&args.root, &args.output_dir, &config, &mut noop)
    }
    .map_err(|e| convert_sdist_error(e, &args.root))?;

    formatter.format_build_result(&args.output_dir.join(&report.filename), &report)?;

    Ok(())
}
