//! Output formatter trait for CLI results.

use anyhow::Result;
use sdistr_core::BuildReport;
use sdistr_core::ProjectMetadata;
use sdistr_core::SdistManifest;
use serde::Serialize;
use std::path::Path;

/// Common output formatter trait
pub trait OutputFormatter {
    /// Format the result of a build
    fn format_build_result(&self, output_path: &Path, report: &BuildReport) -> Result<()>;

    /// Format project metadata and its PKG-INFO descriptor
    fn format_metadata(&self, metadata: &ProjectMetadata) -> Result<()>;

    /// Format archive listing (paths only)
    fn format_manifest_short(&self, manifest: &SdistManifest) -> Result<()>;

    /// Format archive listing with mode and size
    fn format_manifest_long(&self, manifest: &SdistManifest, human_readable: bool) -> Result<()>;

    /// Format error message
    fn format_error(&self, error: &anyhow::Error);

    /// Format warning message
    fn format_warning(&self, message: &str);
}

/// Generic JSON output structure
#[derive(Debug, Serialize)]
pub struct JsonOutput<T> {
    pub operation: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn success(operation: impl Into<String>, data: T) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Success,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(operation: impl Into<String>, error: impl Into<String>) -> JsonOutput<()> {
        JsonOutput {
            operation: operation.into(),
            status: Status::Error,
            data: None,
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_json_output_success_shape() {
        let output = JsonOutput::success("build", vec![1, 2]);
        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["operation"], "build");
        assert_eq!(json["status"], "success");
        assert_eq!(json["data"], serde_json::json!([1, 2]));
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_json_output_error_shape() {
        let output = JsonOutput::<()>::error("list", "boom");
        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["error"], "boom");
        assert!(json.get("data").is_none());
    }
}
