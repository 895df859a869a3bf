//! Python bindings for sdistr-core.
//!
//! The module doubles as a PEP 517 build backend for source distributions:
//! front-ends call `build_sdist` from the project root and receive the
//! archive's file name.

use pyo3::exceptions::PyTypeError;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyDict;
use sdistr_core::ConfigSetting;
use sdistr_core::ConfigSettings;
use sdistr_core::SdistConfig;

mod error;
mod report;

/// Maximum path length in bytes (Linux/macOS `PATH_MAX` is typically 4096)
const MAX_PATH_LENGTH: usize = 4096;

use error::convert_error;
use error::register_exceptions;
use report::PyBuildReport;

/// Build a source distribution of the project in the current directory.
///
/// # Arguments
///
/// * `sdist_directory` - Existing directory the archive is written to (str
///   or pathlib.Path)
/// * `config_settings` - Front-end settings; accepted and ignored
///
/// # Returns
///
/// The archive file name, `{name}-{version}.tar.gz`
///
/// # Raises
///
/// * `MetadataError` - `pyproject.toml` is missing or invalid
/// * `ArchiveError` - Output directory missing or archive not writable
/// * `SdistError` - Invalid ignore file or unreadable project tree
/// * `TypeError` - `config_settings` values are not str or list of str
/// * `OSError` - I/O operation failed
///
/// # Examples
///
/// ```python
/// import sdistr
///
/// filename = sdistr.build_sdist("dist")
/// ```
#[pyfunction]
#[pyo3(signature = (sdist_directory, config_settings=None))]
fn build_sdist(
    py: Python<'_>,
    sdist_directory: &Bound<'_, PyAny>,
    config_settings: Option<&Bound<'_, PyDict>>,
) -> PyResult<String> {
    let sdist_directory = path_to_string(py, sdist_directory)?;
    let settings = config_settings.map(to_config_settings).transpose()?;

    // Release GIL while walking the tree and compressing
    py.detach(|| sdistr_core::build_sdist(&sdist_directory, settings.as_ref()))
        .map_err(convert_error)
}

/// Additional requirements for building an sdist. Always empty.
#[pyfunction]
#[pyo3(signature = (config_settings=None))]
#[allow(unused_variables)]
fn get_requires_for_build_sdist(config_settings: Option<&Bound<'_, PyDict>>) -> Vec<String> {
    Vec::new()
}

/// Build a source distribution of the project at `project_root`.
///
/// Unlike `build_sdist` this does not depend on the working directory and
/// returns a `BuildReport`.
///
/// # Raises
///
/// * `ValueError` - `compression_level` outside 1-9
/// * Same exceptions as `build_sdist` otherwise
#[pyfunction]
#[pyo3(signature = (project_root, sdist_directory, compression_level=None))]
fn build_sdist_from(
    py: Python<'_>,
    project_root: &Bound<'_, PyAny>,
    sdist_directory: &Bound<'_, PyAny>,
    compression_level: Option<u8>,
) -> PyResult<PyBuildReport> {
    let project_root = path_to_string(py, project_root)?;
    let sdist_directory = path_to_string(py, sdist_directory)?;

    let mut config = SdistConfig::default();
    if compression_level.is_some() {
        config.compression_level = compression_level;
    }

    let report = py
        .detach(|| sdistr_core::build_sdist_from(&project_root, &sdist_directory, &config))
        .map_err(convert_error)?;

    Ok(PyBuildReport::from(report))
}

/// Converts a PEP 517 `config_settings` dict.
///
/// Values must be `str` or a list of `str`.
fn to_config_settings(dict: &Bound<'_, PyDict>) -> PyResult<ConfigSettings> {
    let mut settings = ConfigSettings::new();
    for (key, value) in dict.iter() {
        let key: String = key.extract()?;
        let setting = if let Ok(single) = value.extract::<String>() {
            ConfigSetting::Single(single)
        } else if let Ok(list) = value.extract::<Vec<String>>() {
            ConfigSetting::List(list)
        } else {
            return Err(PyTypeError::new_err(format!(
                "config setting '{key}' must be a str or a list of str"
            )));
        };
        settings.insert(key, setting);
    }
    Ok(settings)
}

/// Converts a Path-like object to a string with validation.
///
/// Accepts both strings and `pathlib.Path` objects by calling `os.fspath()`.
/// Paths containing null bytes or longer than `MAX_PATH_LENGTH` bytes are
/// rejected.
fn path_to_string(py: Python<'_>, path: &Bound<'_, PyAny>) -> PyResult<String> {
    let path_str = if let Ok(s) = path.extract::<String>() {
        s
    } else {
        let os = py.import("os")?;
        let fspath = os.getattr("fspath")?;
        let result = fspath.call1((path,))?;
        result.extract()?
    };

    if path_str.contains('\0') {
        return Err(PyValueError::new_err("path contains null bytes"));
    }

    if path_str.len() > MAX_PATH_LENGTH {
        return Err(PyValueError::new_err(format!(
            "path exceeds maximum length of {} bytes (got {} bytes)",
            MAX_PATH_LENGTH,
            path_str.len()
        )));
    }

    Ok(path_str)
}

/// Python module definition.
#[pymodule]
fn sdistr(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add("__doc__", "PEP 517 source distribution builder")?;
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    // PEP 517 hooks
    m.add_function(wrap_pyfunction!(build_sdist, m)?)?;
    m.add_function(wrap_pyfunction!(get_requires_for_build_sdist, m)?)?;

    m.add_function(wrap_pyfunction!(build_sdist_from, m)?)?;
    m.add_class::<PyBuildReport>()?;

    register_exceptions(m)?;

    Ok(())
}
