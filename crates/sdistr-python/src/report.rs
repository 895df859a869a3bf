//! Python bindings for `BuildReport`.

use pyo3::prelude::*;
use sdistr_core::BuildReport as CoreReport;

/// Report of a source distribution build.
///
/// # Attributes
///
/// * `filename` - Archive file name, `{name}-{version}.tar.gz`
/// * `files_added` - Number of regular files archived (PKG-INFO excluded)
/// * `symlinks_added` - Number of symlinks archived
/// * `files_excluded` - Number of files skipped by ignore patterns
/// * `bytes_written` - Uncompressed bytes of file content
/// * `bytes_compressed` - Size of the finished archive
/// * `duration_ms` - Build duration in milliseconds
#[pyclass(name = "BuildReport")]
#[derive(Debug, Clone)]
pub struct PyBuildReport {
    inner: CoreReport,
}

#[pymethods]
impl PyBuildReport {
    /// Archive file name.
    #[getter]
    fn filename(&self) -> &str {
        &self.inner.filename
    }

    /// Number of regular files archived.
    #[getter]
    fn files_added(&self) -> usize {
        self.inner.files_added
    }

    /// Number of symlinks archived.
    #[getter]
    fn symlinks_added(&self) -> usize {
        self.inner.symlinks_added
    }

    /// Number of files skipped by ignore patterns.
    #[getter]
    fn files_excluded(&self) -> usize {
        self.inner.files_excluded
    }

    #[getter]
    fn bytes_written(&self) -> u64 {
        self.inner.bytes_written
    }

    #[getter]
    fn bytes_compressed(&self) -> u64 {
        self.inner.bytes_compressed
    }

    /// Build duration in milliseconds.
    #[getter]
    fn duration_ms(&self) -> u128 {
        self.inner.duration.as_millis()
    }

    /// Returns the number of archive entries, PKG-INFO included.
    fn total_entries(&self) -> usize {
        self.inner.total_entries()
    }

    /// Returns compressed size divided by uncompressed size.
    fn compression_ratio(&self) -> f64 {
        self.inner.compression_ratio()
    }

    pub(crate) fn __str__(&self) -> String {
        format!(
            "BuildReport(filename={}, files={}, symlinks={}, excluded={}, bytes={}, compressed={}, duration={}ms)",
            self.inner.filename,
            self.inner.files_added,
            self.inner.symlinks_added,
            self.inner.files_excluded,
            self.inner.bytes_written,
            self.inner.bytes_compressed,
            self.inner.duration.as_millis(),
        )
    }

    fn __repr__(&self) -> String {
        self.__str__()
    }
}

impl From<CoreReport> for PyBuildReport {
    fn from(inner: CoreReport) -> Self {
        Self { inner }
    }
}
