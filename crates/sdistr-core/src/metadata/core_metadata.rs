//! Validated core metadata and its `PKG-INFO` rendering.

use crate::Result;
use crate::SdistError;
use crate::metadata::pyproject::Contact;
use crate::metadata::pyproject::LicenseField;
use crate::metadata::pyproject::Project;
use crate::metadata::pyproject::PyProject;
use crate::metadata::pyproject::ReadmeField;
use crate::metadata::rfc822::Rfc822Message;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use indexmap::IndexMap;
use pep440_rs::Version;
use pep440_rs::VersionSpecifiers;
use pep508_rs::ExtraName;
use pep508_rs::ExtraOperator;
use pep508_rs::MarkerExpression;
use pep508_rs::MarkerTree;
use pep508_rs::MarkerValueExtra;
use pep508_rs::Requirement;
use std::fmt::Write;
use std::path::Path;
use std::str::FromStr;

/// Fields that may never be listed in `project.dynamic`.
const STATIC_ONLY_FIELDS: [&str; 2] = ["name", "version"];

/// Long description with its MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Readme {
    /// Readme contents.
    pub text: String,
    /// MIME type, e.g. `text/markdown`.
    pub content_type: Option<String>,
}

/// Core metadata of a project after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreMetadata {
    /// Distribution name as written in `pyproject.toml`.
    pub name: String,
    /// Normalized PEP 440 version.
    pub version: Version,
    /// One-line summary.
    pub summary: Option<String>,
    /// Long description.
    pub readme: Option<Readme>,
    /// Normalized `Requires-Python` specifier set.
    pub requires_python: Option<String>,
    /// License text.
    pub license: Option<String>,
    /// Authors.
    pub authors: Vec<Contact>,
    /// Maintainers.
    pub maintainers: Vec<Contact>,
    /// Keywords.
    pub keywords: Vec<String>,
    /// Trove classifiers.
    pub classifiers: Vec<String>,
    /// Labelled URLs.
    pub urls: IndexMap<String, String>,
    /// Runtime requirements.
    pub dependencies: Vec<Requirement>,
    /// Requirements per normalized extra name. Extras that normalize to
    /// the same name share one list.
    pub optional_dependencies: IndexMap<ExtraName, Vec<Requirement>>,
    /// Fields left to the backend.
    pub dynamic: Vec<String>,
}

impl CoreMetadata {
    /// Validates the `[project]` table of `pyproject`.
    ///
    /// Readme and license files are resolved relative to `project_root`.
    ///
    /// # Errors
    ///
    /// Returns [`SdistError::InvalidMetadata`] when the `[project]` table is
    /// missing, `name` or `version` cannot be determined, or any field fails
    /// validation. Unreadable readme or license files also surface as
    /// metadata errors.
    pub fn from_pyproject(pyproject: &PyProject, project_root: &Path) -> Result<Self> {
        let project = pyproject
            .project
            .as_ref()
            .ok_or_else(|| SdistError::metadata("project", "section missing in pyproject.toml"))?;

        for field in &project.dynamic {
            if STATIC_ONLY_FIELDS.contains(&field.as_str()) {
                return Err(SdistError::metadata(
                    "project.dynamic",
                    format!("`{field}` must be declared statically"),
                ));
            }
        }

        let name = validate_name(project.name.as_deref())?;
        let version = validate_version(project.version.as_deref())?;
        let requires_python = project
            .requires_python
            .as_deref()
            .map(normalize_requires_python)
            .transpose()?;

        let dependencies = project
            .dependencies
            .iter()
            .map(|req| validate_requirement("project.dependencies", req))
            .collect::<Result<Vec<_>>>()?;

        let mut optional_dependencies: IndexMap<ExtraName, Vec<Requirement>> = IndexMap::new();
        for (extra, requirements) in &project.optional_dependencies {
            let field = format!("project.optional-dependencies.{extra}");
            let name = ExtraName::from_str(extra).map_err(|e| {
                SdistError::metadata(field.as_str(), format!("invalid extra name: {e}"))
            })?;
            let requirements = requirements
                .iter()
                .map(|req| validate_requirement(&field, req))
                .collect::<Result<Vec<_>>>()?;
            optional_dependencies
                .entry(name)
                .or_default()
                .extend(requirements);
        }

        for (field, people) in [
            ("project.authors", &project.authors),
            ("project.maintainers", &project.maintainers),
        ] {
            if people.iter().any(|p| p.name.is_none() && p.email.is_none()) {
                return Err(SdistError::metadata(
                    field,
                    "each entry needs a `name` or an `email`",
                ));
            }
        }

        Ok(Self {
            name,
            version,
            summary: project.description.clone(),
            readme: resolve_readme(project, project_root)?,
            requires_python,
            license: resolve_license(project, project_root)?,
            authors: project.authors.clone(),
            maintainers: project.maintainers.clone(),
            keywords: project.keywords.clone(),
            classifiers: project.classifiers.clone(),
            urls: project.urls.clone(),
            dependencies,
            optional_dependencies,
            dynamic: project.dynamic.clone(),
        })
    }

    /// Core metadata version written to `Metadata-Version`.
    ///
    /// `2.2` is required as soon as any field is dynamic.
    #[must_use]
    pub fn metadata_version(&self) -> &'static str {
        if self.dynamic.is_empty() { "2.1" } else { "2.2" }
    }

    /// Renders the metadata as an RFC 822 message.
    ///
    /// # Examples
    ///
    /// ```
    /// use sdistr_core::metadata::core_metadata::CoreMetadata;
    /// use sdistr_core::metadata::pyproject::PyProject;
    /// use std::path::Path;
    ///
    /// let doc: PyProject = toml::from_str("[project]\nname = \"demo\"\nversion = \"0.1.0\"\n")?;
    /// let core = CoreMetadata::from_pyproject(&doc, Path::new("."))?;
    /// assert_eq!(
    ///     core.to_rfc822().to_string(),
    ///     "Metadata-Version: 2.1\nName: demo\nVersion: 0.1.0\n"
    /// );
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    #[must_use]
    pub fn to_rfc822(&self) -> Rfc822Message {
        let mut msg = Rfc822Message::new();
        msg.set("Metadata-Version", self.metadata_version());
        msg.set("Name", self.name.as_str());
        msg.set("Version", self.version.to_string());
        if let Some(summary) = &self.summary {
            msg.set("Summary", summary.as_str());
        }
        msg.set("Keywords", self.keywords.join(","));
        if let Some(homepage) = self.urls.get("homepage") {
            msg.set("Home-page", homepage.as_str());
        }
        msg.set("Author", name_list(&self.authors));
        msg.set("Author-Email", email_list(&self.authors));
        msg.set("Maintainer", name_list(&self.maintainers));
        msg.set("Maintainer-Email", email_list(&self.maintainers));
        if let Some(license) = &self.license {
            msg.set("License", license.as_str());
        }
        for classifier in &self.classifiers {
            msg.set("Classifier", classifier.as_str());
        }
        for (label, url) in &self.urls {
            msg.set("Project-URL", format!("{}, {url}", capitalize(label)));
        }
        if let Some(requires_python) = &self.requires_python {
            msg.set("Requires-Python", requires_python.as_str());
        }
        for requirement in &self.dependencies {
            msg.set("Requires-Dist", requirement.to_string());
        }
        for (extra, requirements) in &self.optional_dependencies {
            msg.set("Provides-Extra", extra.to_string());
            for requirement in requirements {
                msg.set(
                    "Requires-Dist",
                    with_extra_marker(requirement, extra).to_string(),
                );
            }
        }
        if let Some(readme) = &self.readme {
            if let Some(content_type) = &readme.content_type {
                msg.set("Description-Content-Type", content_type.as_str());
            }
            msg.set_body(readme.text.as_str());
        }
        for field in &self.dynamic {
            msg.set("Dynamic", field.as_str());
        }
        msg
    }
}

/// Checks a distribution name against the PEP 508 name grammar.
fn validate_name(name: Option<&str>) -> Result<String> {
    let name = name.ok_or_else(|| SdistError::metadata("project.name", "field is required"))?;

    let bytes = name.as_bytes();
    let valid = match (bytes.first(), bytes.last()) {
        (Some(first), Some(last)) => {
            first.is_ascii_alphanumeric()
                && last.is_ascii_alphanumeric()
                && bytes
                    .iter()
                    .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-'))
        }
        _ => false,
    };

    if valid {
        Ok(name.to_string())
    } else {
        Err(SdistError::metadata(
            "project.name",
            format!("invalid project name `{name}`"),
        ))
    }
}

fn validate_version(version: Option<&str>) -> Result<Version> {
    let version = version.ok_or_else(|| {
        SdistError::metadata(
            "project.version",
            "field is required and may not be dynamic",
        )
    })?;
    Version::from_str(version.trim()).map_err(|e| {
        SdistError::metadata(
            "project.version",
            format!("invalid version `{version}`: {e}"),
        )
    })
}

/// Parses `requires-python` and renders it as a sorted, comma-joined set.
fn normalize_requires_python(specifiers: &str) -> Result<String> {
    let parsed = VersionSpecifiers::from_str(specifiers).map_err(|e| {
        SdistError::metadata(
            "project.requires-python",
            format!("invalid specifier `{specifiers}`: {e}"),
        )
    })?;
    let mut parts: Vec<String> = parsed.iter().map(ToString::to_string).collect();
    parts.sort();
    Ok(parts.join(","))
}

/// Parses a requirement against the PEP 508 grammar.
fn validate_requirement(field: &str, requirement: &str) -> Result<Requirement> {
    requirement.trim().parse().map_err(|e| {
        SdistError::metadata(field, format!("invalid requirement `{requirement}`: {e}"))
    })
}

/// Returns `requirement` with `extra == '<extra>'` and-ed onto its marker.
fn with_extra_marker(requirement: &Requirement, extra: &ExtraName) -> Requirement {
    let mut requirement = requirement.clone();
    requirement
        .marker
        .and(MarkerTree::expression(MarkerExpression::Extra {
            operator: ExtraOperator::Equal,
            name: MarkerValueExtra::Extra(extra.clone()),
        }));
    requirement
}

fn resolve_readme(project: &Project, root: &Path) -> Result<Option<Readme>> {
    const FIELD: &str = "project.readme";

    let Some(readme) = &project.readme else {
        return Ok(None);
    };

    let readme = match readme {
        ReadmeField::Path(file) => Readme {
            text: read_project_file(FIELD, root, file)?,
            content_type: Some(content_type_for(file)?.to_string()),
        },
        ReadmeField::Table {
            file,
            text,
            content_type,
        } => {
            let content_type = content_type.clone().ok_or_else(|| {
                SdistError::metadata("project.readme.content-type", "field is required")
            })?;
            let text = match (file, text) {
                (Some(file), None) => read_project_file(FIELD, root, file)?,
                (None, Some(text)) => text.clone(),
                (Some(_), Some(_)) => {
                    return Err(SdistError::metadata(
                        FIELD,
                        "`file` and `text` are mutually exclusive",
                    ));
                }
                (None, None) => {
                    return Err(SdistError::metadata(FIELD, "either `file` or `text` is required"));
                }
            };
            Readme {
                text,
                content_type: Some(content_type),
            }
        }
    };

    Ok(Some(readme))
}

fn resolve_license(project: &Project, root: &Path) -> Result<Option<String>> {
    const FIELD: &str = "project.license";

    match &project.license {
        None => Ok(None),
        Some(LicenseField::Text(text)) => Ok(Some(text.clone())),
        Some(LicenseField::Table { file, text }) => match (file, text) {
            (Some(file), None) => read_project_file(FIELD, root, file).map(Some),
            (None, Some(text)) => Ok(Some(text.clone())),
            (Some(_), Some(_)) => Err(SdistError::metadata(
                FIELD,
                "`file` and `text` are mutually exclusive",
            )),
            (None, None) => Err(SdistError::metadata(
                FIELD,
                "either `file` or `text` is required",
            )),
        },
    }
}

fn read_project_file(field: &str, root: &Path, file: &str) -> Result<String> {
    let path = root.join(file);
    std::fs::read_to_string(&path).map_err(|e| {
        SdistError::metadata(field, format!("cannot read {}: {e}", path.display()))
    })
}

/// Infers a readme MIME type from its file extension.
fn content_type_for(file: &str) -> Result<&'static str> {
    let extension = Path::new(file)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("md") => Ok("text/markdown"),
        Some("rst") => Ok("text/x-rst"),
        Some("txt") => Ok("text/plain"),
        _ => Err(SdistError::metadata(
            "project.readme",
            format!("could not infer content type for readme `{file}`"),
        )),
    }
}

/// Upper-cases the first character and lower-cases the rest.
fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
    })
}

fn name_list(people: &[Contact]) -> String {
    people
        .iter()
        .filter(|p| p.email.is_none())
        .filter_map(|p| p.name.as_deref())
        .collect::<Vec<_>>()
        .join(", ")
}

fn email_list(people: &[Contact]) -> String {
    people
        .iter()
        .filter_map(|p| {
            p.email
                .as_deref()
                .map(|email| format_address(p.name.as_deref(), email))
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Formats `name <email>`, quoting the name when it contains RFC 822
/// specials and RFC 2047 encoding it when it is not ASCII.
fn format_address(name: Option<&str>, email: &str) -> String {
    const SPECIALS: &[char] = &[
        '(', ')', '<', '>', '@', ',', ':', ';', '.', '"', '[', ']', '\\',
    ];

    match name {
        None | Some("") => email.to_string(),
        Some(name) if !name.is_ascii() => format!("{} <{email}>", encode_word(name)),
        Some(name) if name.contains(SPECIALS) => {
            let escaped = name.replace('\\', "\\\\").replace('"', "\\\"");
            format!("\"{escaped}\" <{email}>")
        }
        Some(name) => format!("{name} <{email}>"),
    }
}

/// RFC 2047 encoded word in UTF-8, using whichever of the `q` and `b`
/// encodings is shorter (`q` on a tie).
fn encode_word(text: &str) -> String {
    let bytes = text.as_bytes();
    let b_len = bytes.len().div_ceil(3) * 4;

    let mut q = String::with_capacity(bytes.len() * 3);
    for &byte in bytes {
        match byte {
            b' ' => q.push('_'),
            b'-' | b'!' | b'*' | b'+' | b'/' => q.push(byte as char),
            _ if byte.is_ascii_alphanumeric() => q.push(byte as char),
            _ => {
                let _ = write!(q, "={byte:02X}");
            }
        }
    }

    if b_len < q.len() {
        format!("=?utf-8?b?{}?=", BASE64.encode(bytes))
    } else {
        format!("=?utf-8?q?{q}?=")
    }
}
