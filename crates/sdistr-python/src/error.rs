//! Python exception types for sdist build errors.

use pyo3::create_exception;
use pyo3::exceptions::PyException;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use sdistr_core::SdistError as CoreError;

// Base exception for all build errors
create_exception!(sdistr, SdistError, PyException);

// Project metadata could not be read
create_exception!(sdistr, MetadataError, SdistError);
// Archive could not be written or read back
create_exception!(sdistr, ArchiveError, SdistError);

/// Converts Rust build errors to Python exceptions.
///
/// This function is a workaround for Rust's orphan rules, which prevent
/// implementing `From<CoreError> for PyErr` directly.
pub fn convert_error(err: CoreError) -> PyErr {
    match err {
        CoreError::Io(e) => PyErr::from(e),
        CoreError::InvalidCompressionLevel { .. } => PyValueError::new_err(err.to_string()),
        CoreError::MetadataNotFound { .. }
        | CoreError::InvalidPyProject { .. }
        | CoreError::InvalidMetadata { .. } => MetadataError::new_err(err.to_string()),
        CoreError::OutputDirNotFound { .. }
        | CoreError::OutputExists { .. }
        | CoreError::InvalidArchive { .. } => ArchiveError::new_err(err.to_string()),
        CoreError::InvalidIgnoreFile { .. } | CoreError::Walk { .. } => {
            SdistError::new_err(err.to_string())
        }
    }
}

/// Registers all exception types with the Python module.
pub fn register_exceptions(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add("SdistError", m.py().get_type::<SdistError>())?;
    m.add("MetadataError", m.py().get_type::<MetadataError>())?;
    m.add("ArchiveError", m.py().get_type::<ArchiveError>())?;
    Ok(())
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::uninlined_format_args
)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_metadata_not_found_conversion() {
        pyo3::Python::initialize();
        Python::attach(|py| {
            let err = CoreError::MetadataNotFound {
                path: PathBuf::from("proj/pyproject.toml"),
            };
            let py_err = convert_error(err);
            assert!(py_err.is_instance_of::<MetadataError>(py));
            assert!(py_err.is_instance_of::<SdistError>(py));
            let err_str = py_err.to_string();
            assert!(
                err_str.contains("proj/pyproject.toml"),
                "Expected path in error message, got: {}",
                err_str
            );
        });
    }

    #[test]
    fn test_invalid_metadata_conversion() {
        pyo3::Python::initialize();
        Python::attach(|py| {
            let err = CoreError::InvalidMetadata {
                field: "project.version".to_string(),
                reason: "field is required".to_string(),
            };
            let py_err = convert_error(err);
            assert!(py_err.is_instance_of::<MetadataError>(py));
            assert!(py_err.to_string().contains("project.version"));
        });
    }

    #[test]
    fn test_output_exists_conversion() {
        pyo3::Python::initialize();
        Python::attach(|py| {
            let err = CoreError::OutputExists {
                path: PathBuf::from("dist/demo-0.1.0.tar.gz"),
            };
            let py_err = convert_error(err);
            assert!(py_err.is_instance_of::<ArchiveError>(py));
            assert!(!py_err.is_instance_of::<MetadataError>(py));
        });
    }

    #[test]
    fn test_ignore_file_conversion_uses_base() {
        pyo3::Python::initialize();
        Python::attach(|py| {
            let err = CoreError::InvalidIgnoreFile {
                path: PathBuf::from(".gitignore"),
                reason: "unclosed character class".to_string(),
            };
            let py_err = convert_error(err);
            assert!(py_err.is_instance_of::<SdistError>(py));
            assert!(!py_err.is_instance_of::<ArchiveError>(py));
        });
    }

    #[test]
    fn test_compression_level_conversion() {
        pyo3::Python::initialize();
        Python::attach(|py| {
            let py_err = convert_error(CoreError::InvalidCompressionLevel { level: 0 });
            assert!(py_err.is_instance_of::<PyValueError>(py));
        });
    }

    #[test]
    fn test_io_error_conversion() {
        pyo3::Python::initialize();
        Python::attach(|py| {
            let err = CoreError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "denied",
            ));
            let py_err = convert_error(err);
            assert!(py_err.is_instance_of::<pyo3::exceptions::PyPermissionError>(py));
        });
    }

    #[test]
    fn test_register_exceptions() {
        pyo3::Python::initialize();
        Python::attach(|py| {
            let module = PyModule::new(py, "test_errors").unwrap();
            register_exceptions(&module).unwrap();
            for name in ["SdistError", "MetadataError", "ArchiveError"] {
                assert!(module.getattr(name).is_ok(), "{name} not registered");
            }
        });
    }
}
