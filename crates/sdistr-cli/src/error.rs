//! Error conversion utilities for CLI.
//!
//! Converts sdistr-core's typed errors (thiserror) into user-friendly
//! contextual errors (anyhow) with actionable guidance.

use anyhow::anyhow;
use sdistr_core::SdistError;
use std::path::Path;

/// Converts `SdistError` to a user-friendly anyhow error for a build or
/// metadata command run against `project`.
pub fn convert_sdist_error(err: SdistError, project: &Path) -> anyhow::Error {
    match err {
        SdistError::MetadataNotFound { path } => {
            anyhow!(
                "No project metadata found at '{}'\n\
                 HINT: Run from the project root or pass --root <DIR>.",
                path.display()
            )
        }
        SdistError::InvalidPyProject { path, source } => {
            anyhow!(
                "Failed to parse '{}': {}\n\
                 HINT: Check the file for TOML syntax errors and field types.",
                path.display(),
                source
            )
        }
        SdistError::InvalidMetadata { field, reason } => {
            anyhow!(
                "Invalid project metadata in '{}': `{field}` {reason}\n\
                 HINT: The [project] table must declare a static name and version.",
                project.display()
            )
        }
        SdistError::InvalidIgnoreFile { path, reason } => {
            anyhow!(
                "Invalid ignore pattern in '{}': {reason}\n\
                 HINT: Fix the pattern or pass --ignore-file to use another file.",
                path.display()
            )
        }
        SdistError::OutputExists { path } => {
            anyhow!(
                "Archive already exists: {}\n\
                 HINT: Remove it or drop --no-overwrite.",
                path.display()
            )
        }
        SdistError::OutputDirNotFound { path } => {
            anyhow!("Output directory not found: {}", path.display())
        }
        SdistError::Io(io_err) => {
            anyhow!(
                "I/O error while packaging '{}': {}",
                project.display(),
                io_err
            )
        }
        _ => anyhow::Error::from(err)
            .context(format!("Error packaging project '{}'", project.display())),
    }
}

/// Converts `SdistError` for commands that read an existing archive.
pub fn convert_archive_error(err: SdistError, archive: &Path) -> anyhow::Error {
    match err {
        SdistError::Io(io_err) => {
            anyhow!(
                "Failed to read archive '{}': {}\n\
                 HINT: The file may not be a gzip-compressed tar archive.",
                archive.display(),
                io_err
            )
        }
        _ => anyhow::Error::from(err)
            .context(format!("Error reading archive '{}'", archive.display())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::path::PathBuf;

    #[test]
    fn test_convert_metadata_not_found() {
        let err = SdistError::MetadataNotFound {
            path: PathBuf::from("proj/pyproject.toml"),
        };
        let msg = format!("{:?}", convert_sdist_error(err, Path::new("proj")));
        assert!(msg.contains("proj/pyproject.toml"));
        assert!(msg.contains("HINT"));
        assert!(msg.contains("--root"));
    }

    #[test]
    fn test_convert_invalid_metadata() {
        let err = SdistError::InvalidMetadata {
            field: "project.version".to_string(),
            reason: "field is required".to_string(),
        };
        let msg = format!("{:?}", convert_sdist_error(err, Path::new(".")));
        assert!(msg.contains("project.version"));
        assert!(msg.contains("field is required"));
    }

    #[test]
    fn test_convert_output_exists() {
        let err = SdistError::OutputExists {
            path: PathBuf::from("dist/demo-1.0.tar.gz"),
        };
        let msg = format!("{:?}", convert_sdist_error(err, Path::new(".")));
        assert!(msg.contains("--no-overwrite"));
    }

    #[test]
    fn test_convert_fallback_keeps_source() {
        let err = SdistError::InvalidCompressionLevel { level: 0 };
        let msg = format!("{:?}", convert_sdist_error(err, Path::new("proj")));
        assert!(msg.contains("Error packaging project 'proj'"));
        assert!(msg.contains("invalid compression level 0"));
    }

    #[test]
    fn test_convert_archive_io_error() {
        let err = SdistError::Io(io::Error::new(io::ErrorKind::InvalidInput, "bad header"));
        let msg = format!("{:?}", convert_archive_error(err, Path::new("x.tar.gz")));
        assert!(msg.contains("x.tar.gz"));
        assert!(msg.contains("HINT"));
    }
}
