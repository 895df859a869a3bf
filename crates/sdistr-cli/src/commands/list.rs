//! List command implementation

use crate::cli::ListArgs;
use crate::error::convert_archive_error;
use crate::output::OutputFormatter;
use anyhow::Result;
use sdistr_core::list_sdist;

pub fn execute(args: &ListArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let manifest =
        list_sdist(&args.archive).map_err(|e| convert_archive_error(e, &args.archive))?;

    if args.long {
        formatter.format_manifest_long(&manifest, args.human_readable)?;
    } else {
        formatter.format_manifest_short(&manifest)?;
    }

    Ok(())
}
