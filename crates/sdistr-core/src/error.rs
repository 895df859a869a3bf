//! Error types for source distribution builds.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `SdistError`.
pub type Result<T> = std::result::Result<T, SdistError>;

/// Errors that can occur while building a source distribution.
#[derive(Error, Debug)]
pub enum SdistError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The project metadata file does not exist.
    #[error("project metadata file not found: {path}")]
    MetadataNotFound {
        /// Expected location of the metadata file.
        path: PathBuf,
    },

    /// The project metadata file is not valid TOML or has the wrong shape.
    #[error("failed to parse {path}: {source}")]
    InvalidPyProject {
        /// Path to the metadata file.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: toml::de::Error,
    },

    /// A metadata field is missing or invalid.
    #[error("invalid project metadata in `{field}`: {reason}")]
    InvalidMetadata {
        /// Dotted name of the offending field, e.g. `project.version`.
        field: String,
        /// Human-readable reason.
        reason: String,
    },

    /// The ignore-pattern file contains a pattern that cannot be compiled.
    #[error("invalid ignore file {path}: {reason}")]
    InvalidIgnoreFile {
        /// Path to the ignore file.
        path: PathBuf,
        /// Reason reported by the pattern compiler.
        reason: String,
    },

    /// The output directory does not exist.
    #[error("output directory not found: {path}")]
    OutputDirNotFound {
        /// The missing directory.
        path: PathBuf,
    },

    /// The archive already exists and overwriting is disabled.
    #[error("output archive already exists: {path}")]
    OutputExists {
        /// Path of the existing archive.
        path: PathBuf,
    },

    /// Walking the project tree failed.
    #[error("failed to walk {path}: {reason}")]
    Walk {
        /// Path being visited when the walk failed.
        path: PathBuf,
        /// Reason reported by the walker.
        reason: String,
    },

    /// Compression level outside 1-9.
    #[error("invalid compression level {level}, must be 1-9")]
    InvalidCompressionLevel {
        /// The rejected level.
        level: u8,
    },

    /// An existing archive is not a well-formed source distribution.
    #[error("invalid source distribution {path}: {reason}")]
    InvalidArchive {
        /// Path to the archive.
        path: PathBuf,
        /// What is wrong with it.
        reason: String,
    },
}

impl SdistError {
    /// Shorthand for building an [`SdistError::InvalidMetadata`].
    pub(crate) fn metadata(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidMetadata {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Returns `true` if the error was caused by the project's metadata
    /// rather than by the filesystem or archive writer.
    ///
    /// # Examples
    ///
    /// ```
    /// use sdistr_core::SdistError;
    /// use std::path::PathBuf;
    ///
    /// let err = SdistError::MetadataNotFound {
    ///     path: PathBuf::from("pyproject.toml"),
    /// };
    /// assert!(err.is_metadata_error());
    ///
    /// let err = SdistError::Io(std::io::Error::other("disk full"));
    /// assert!(!err.is_metadata_error());
    /// ```
    #[must_use]
    pub const fn is_metadata_error(&self) -> bool {
        matches!(
            self,
            Self::MetadataNotFound { .. }
                | Self::InvalidPyProject { .. }
                | Self::InvalidMetadata { .. }
        )
    }

    /// Returns the metadata field this error refers to, if any.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::InvalidMetadata { field, .. } => Some(field),
            _ => None,
        }
    }
}
