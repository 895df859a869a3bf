//! JSON output formatter for machine-readable results.

use super::formatter::JsonOutput;
use super::formatter::OutputFormatter;
use anyhow::Result;
use sdistr_core::BuildReport;
use sdistr_core::ProjectMetadata;
use sdistr_core::SdistManifest;
use serde::Serialize;
use std::io::Write;
use std::io::{self};
use std::path::Path;

pub struct JsonFormatter;

impl JsonFormatter {
    fn output<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(io::stdout(), "{json}")?;
        Ok(())
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_build_result(&self, output_path: &Path, report: &BuildReport) -> Result<()> {
        #[derive(Serialize)]
        struct BuildOutput<'a> {
            filename: &'a str,
            output_path: String,
            files_added: usize,
            symlinks_added: usize,
            files_excluded: usize,
            bytes_written: u64,
            bytes_compressed: u64,
            compression_ratio: f64,
            duration_ms: u128,
        }

        let data = BuildOutput {
            filename: &report.filename,
            output_path: output_path.display().to_string(),
            files_added: report.files_added,
            symlinks_added: report.symlinks_added,
            files_excluded: report.files_excluded,
            bytes_written: report.bytes_written,
            bytes_compressed: report.bytes_compressed,
            compression_ratio: report.compression_ratio(),
            duration_ms: report.duration.as_millis(),
        };

        Self::output(&JsonOutput::success("build", data))
    }

    fn format_metadata(&self, metadata: &ProjectMetadata) -> Result<()> {
        #[derive(Serialize)]
        struct MetadataOutput<'a> {
            name: &'a str,
            version: &'a str,
            filename: String,
            pkg_info: String,
        }

        let data = MetadataOutput {
            name: &metadata.name,
            version: &metadata.version,
            filename: metadata.archive_filename(),
            pkg_info: String::from_utf8_lossy(&metadata.descriptor).into_owned(),
        };

        Self::output(&JsonOutput::success("metadata", data))
    }

    fn format_manifest_short(&self, manifest: &SdistManifest) -> Result<()> {
        let paths: Vec<String> = manifest
            .entries
            .iter()
            .map(|e| e.path.display().to_string())
            .collect();
        Self::output(&JsonOutput::success("list", paths))
    }

    fn format_manifest_long(&self, manifest: &SdistManifest, _human_readable: bool) -> Result<()> {
        Self::output(&JsonOutput::success("list", manifest))
    }

    fn format_error(&self, error: &anyhow::Error) {
        let output = JsonOutput::<()>::error("error", format!("{error:?}"));
        let _ = Self::output(&output);
    }

    fn format_warning(&self, message: &str) {
        #[derive(Serialize)]
        struct WarningData<'a> {
            message: &'a str,
        }

        let output = JsonOutput::success("warning", WarningData { message });
        let _ = Self::output(&output);
    }
}
