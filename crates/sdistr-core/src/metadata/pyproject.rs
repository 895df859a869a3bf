//! Serde model of the `[project]` table in `pyproject.toml`.
//!
//! This layer only mirrors the file's shape. Field validation (name syntax,
//! PEP 440 versions, PEP 508 requirements, readme resolution) happens in
//! [`crate::metadata::core_metadata`].

use crate::Result;
use crate::SdistError;
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::Path;

/// Top-level `pyproject.toml` document.
///
/// Tables other than `[project]` (`[build-system]`, `[tool.*]`) are
/// accepted and ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PyProject {
    /// The PEP 621 `[project]` table.
    pub project: Option<Project>,
}

impl PyProject {
    /// Reads and parses a `pyproject.toml` file.
    ///
    /// # Errors
    ///
    /// - [`SdistError::MetadataNotFound`] if the file does not exist
    /// - [`SdistError::InvalidPyProject`] if it is not valid TOML or a field
    ///   has the wrong type
    /// - [`SdistError::Io`] for other read failures
    pub fn from_path(path: &Path) -> Result<Self> {
        let source = match std::fs::read_to_string(path) {
            Ok(source) => source,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SdistError::MetadataNotFound {
                    path: path.to_path_buf(),
                });
            }
            Err(e) => return Err(SdistError::Io(e)),
        };

        toml::from_str(&source).map_err(|source| SdistError::InvalidPyProject {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// The `[project]` table.
///
/// `name` and `version` are optional at this layer so that a missing field
/// surfaces as a field-level metadata error instead of a TOML error.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Project {
    /// Distribution name.
    pub name: Option<String>,
    /// Static version string.
    pub version: Option<String>,
    /// One-line summary.
    pub description: Option<String>,
    /// Long description source.
    pub readme: Option<ReadmeField>,
    /// Supported Python versions as PEP 440 specifiers.
    pub requires_python: Option<String>,
    /// License text or file.
    pub license: Option<LicenseField>,
    /// Authors.
    #[serde(default)]
    pub authors: Vec<Contact>,
    /// Maintainers.
    #[serde(default)]
    pub maintainers: Vec<Contact>,
    /// Keywords.
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Trove classifiers.
    #[serde(default)]
    pub classifiers: Vec<String>,
    /// Labelled project URLs, in file order.
    #[serde(default)]
    pub urls: IndexMap<String, String>,
    /// PEP 508 runtime requirements.
    #[serde(default)]
    pub dependencies: Vec<String>,
    /// Extras and their PEP 508 requirements, in file order.
    #[serde(default)]
    pub optional_dependencies: IndexMap<String, Vec<String>>,
    /// Fields the build backend is expected to fill in.
    #[serde(default)]
    pub dynamic: Vec<String>,
}

/// `project.readme`: either a path or a table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ReadmeField {
    /// Path to the readme, content type inferred from the extension.
    Path(String),
    /// Explicit table form.
    Table {
        /// Path to the readme file.
        file: Option<String>,
        /// Inline readme text.
        text: Option<String>,
        /// MIME type of the readme.
        #[serde(rename = "content-type")]
        content_type: Option<String>,
    },
}

/// `project.license`: a table with `file` or `text`, or a plain string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum LicenseField {
    /// A bare license string.
    Text(String),
    /// Table form.
    Table {
        /// Path to a license file.
        file: Option<String>,
        /// Inline license text.
        text: Option<String>,
    },
}

/// An entry of `project.authors` / `project.maintainers`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Contact {
    /// Display name.
    pub name: Option<String>,
    /// E-mail address.
    pub email: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_parse_minimal_project() {
        let doc: PyProject = toml::from_str(
            r#"
            [project]
            name = "demo"
            version = "0.1.0"
            "#,
        )
        .unwrap();

        let project = doc.project.unwrap();
        assert_eq!(project.name.as_deref(), Some("demo"));
        assert_eq!(project.version.as_deref(), Some("0.1.0"));
        assert!(project.dependencies.is_empty());
        assert!(project.readme.is_none());
    }

    #[test]
    fn test_parse_full_project() {
        let doc: PyProject = toml::from_str(
            r#"
            [build-system]
            requires = ["sdistr"]

            [project]
            name = "demo"
            version = "1.0"
            readme = { file = "README.rst", content-type = "text/x-rst" }
            license = { text = "MIT" }
            authors = [{ name = "Ada", email = "ada@example.com" }, { email = "bob@example.com" }]
            urls = { homepage = "https://example.com", source = "https://example.com/src" }
            dependencies = ["requests>=2"]
            dynamic = ["classifiers"]

            [project.optional-dependencies]
            test = ["pytest"]
            docs = ["sphinx"]

            [tool.other]
            anything = true
            "#,
        )
        .unwrap();

        let project = doc.project.unwrap();
        assert_eq!(
            project.readme,
            Some(ReadmeField::Table {
                file: Some("README.rst".into()),
                text: None,
                content_type: Some("text/x-rst".into()),
            })
        );
        assert_eq!(
            project.license,
            Some(LicenseField::Table {
                file: None,
                text: Some("MIT".into())
            })
        );
        assert_eq!(project.authors.len(), 2);
        assert_eq!(project.authors[1].name, None);
        assert_eq!(
            project.urls.keys().collect::<Vec<_>>(),
            vec!["homepage", "source"]
        );
        assert_eq!(
            project.optional_dependencies.keys().collect::<Vec<_>>(),
            vec!["test", "docs"]
        );
        assert_eq!(project.dynamic, vec!["classifiers".to_string()]);
    }

    #[test]
    fn test_readme_string_form() {
        let doc: PyProject = toml::from_str(
            r#"
            [project]
            readme = "README.md"
            "#,
        )
        .unwrap();
        assert_eq!(
            doc.project.unwrap().readme,
            Some(ReadmeField::Path("README.md".into()))
        );
    }

    #[test]
    fn test_missing_project_table_parses() {
        let doc: PyProject = toml::from_str("[build-system]\nrequires = []\n").unwrap();
        assert!(doc.project.is_none());
    }

    #[test]
    fn test_from_path_not_found() {
        let temp = TempDir::new().unwrap();
        let err = PyProject::from_path(&temp.path().join("pyproject.toml")).unwrap_err();
        assert!(matches!(err, SdistError::MetadataNotFound { .. }));
    }

    #[test]
    fn test_from_path_invalid_toml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("pyproject.toml");
        fs::write(&path, "[project\nname = ").unwrap();

        let err = PyProject::from_path(&path).unwrap_err();
        assert!(matches!(err, SdistError::InvalidPyProject { .. }));
    }

    #[test]
    fn test_from_path_wrong_field_type() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("pyproject.toml");
        fs::write(&path, "[project]\nname = 42\n").unwrap();

        let err = PyProject::from_path(&path).unwrap_err();
        assert!(matches!(err, SdistError::InvalidPyProject { .. }));
    }
}
