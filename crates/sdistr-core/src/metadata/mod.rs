//! Project metadata loading.
//!
//! Reads the declarative metadata file from a project root, validates the
//! `[project]` table and renders the `PKG-INFO` descriptor embedded in the
//! source distribution.

pub mod core_metadata;
pub mod pyproject;
pub mod rfc822;

use crate::Result;
use crate::SdistConfig;
use crate::metadata::core_metadata::CoreMetadata;
use crate::metadata::pyproject::PyProject;
use std::path::Path;

/// Metadata of the project being packaged.
///
/// Loaded once per build and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectMetadata {
    /// Distribution name as declared by the project.
    pub name: String,
    /// Normalized version string.
    pub version: String,
    /// RFC 822 encoded core metadata (`PKG-INFO` contents).
    pub descriptor: Vec<u8>,
    /// The validated metadata the descriptor was rendered from.
    pub core: CoreMetadata,
}

impl ProjectMetadata {
    /// Builds project metadata from validated core metadata.
    #[must_use]
    pub fn from_core(core: CoreMetadata) -> Self {
        Self {
            name: core.name.clone(),
            version: core.version.to_string(),
            descriptor: core.to_rfc822().to_bytes(),
            core,
        }
    }

    /// Name of the single top-level directory inside the archive,
    /// `{name}-{version}`.
    ///
    /// # Examples
    ///
    /// ```
    /// use sdistr_core::metadata::ProjectMetadata;
    /// use sdistr_core::metadata::core_metadata::CoreMetadata;
    /// use sdistr_core::metadata::pyproject::PyProject;
    /// use std::path::Path;
    ///
    /// let doc: PyProject = toml::from_str("[project]\nname = \"demo\"\nversion = \"0.1.0\"\n")?;
    /// let meta = ProjectMetadata::from_core(CoreMetadata::from_pyproject(&doc, Path::new("."))?);
    /// assert_eq!(meta.dist_dir_name(), "demo-0.1.0");
    /// assert_eq!(meta.archive_filename(), "demo-0.1.0.tar.gz");
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    #[must_use]
    pub fn dist_dir_name(&self) -> String {
        format!("{}-{}", self.name, self.version)
    }

    /// File name of the produced archive, `{name}-{version}.tar.gz`.
    #[must_use]
    pub fn archive_filename(&self) -> String {
        format!("{}.tar.gz", self.dist_dir_name())
    }
}

/// Loads and validates project metadata from `project_root`.
///
/// The metadata file name comes from [`SdistConfig::metadata_file`].
///
/// # Errors
///
/// Fails with [`crate::SdistError::MetadataNotFound`] when the file is
/// absent, [`crate::SdistError::InvalidPyProject`] when it cannot be parsed
/// and [`crate::SdistError::InvalidMetadata`] when name or version cannot
/// be determined or another field is invalid.
pub fn load_metadata(project_root: &Path, config: &SdistConfig) -> Result<ProjectMetadata> {
    let path = project_root.join(&config.metadata_file);
    let pyproject = PyProject::from_path(&path)?;
    let core = CoreMetadata::from_pyproject(&pyproject, project_root)?;
    let metadata = ProjectMetadata::from_core(core);

    tracing::debug!(
        name = %metadata.name,
        version = %metadata.version,
        descriptor_len = metadata.descriptor.len(),
        "loaded project metadata from {}",
        path.display()
    );

    Ok(metadata)
}
