//! Metadata command implementation

use crate::cli::MetadataArgs;
use crate::error::convert_sdist_error;
use crate::output::OutputFormatter;
use anyhow::Result;
use sdistr_core::SdistConfig;
use sdistr_core::load_metadata;

pub fn execute(args: &MetadataArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let metadata = load_metadata(&args.root, &SdistConfig::default())
        .map_err(|e| convert_sdist_error(e, &args.root))?;

    formatter.format_metadata(&metadata)
}
