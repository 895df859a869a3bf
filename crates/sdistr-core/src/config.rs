//! Configuration for source distribution builds.

use crate::Result;
use crate::SdistError;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::path::PathBuf;

/// Default name of the project metadata file.
pub const DEFAULT_METADATA_FILE: &str = "pyproject.toml";

/// Default name of the ignore-pattern file.
pub const DEFAULT_IGNORE_FILE: &str = ".gitignore";

/// Options controlling how a source distribution is assembled.
///
/// # Examples
///
/// ```
/// use sdistr_core::SdistConfig;
///
/// let config = SdistConfig::default()
///     .with_compression_level(9)
///     .with_sort_entries(false);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SdistConfig {
    /// Gzip compression level (1-9).
    ///
    /// Default: `Some(6)`.
    pub compression_level: Option<u8>,

    /// Sort archive entries by their project-relative path.
    ///
    /// Filesystem walk order is platform-dependent; sorting makes the entry
    /// listing identical across builds of the same tree.
    ///
    /// Default: `true`.
    pub sort_entries: bool,

    /// Metadata file name, relative to the project root.
    ///
    /// Default: `pyproject.toml`.
    pub metadata_file: PathBuf,

    /// Ignore-pattern file name, relative to the project root. A missing
    /// file disables filtering.
    ///
    /// Default: `.gitignore`.
    pub ignore_file: PathBuf,

    /// Replace an existing archive with the same name.
    ///
    /// Default: `true`.
    pub overwrite: bool,
}

impl Default for SdistConfig {
    fn default() -> Self {
        Self {
            compression_level: Some(6),
            sort_entries: true,
            metadata_file: PathBuf::from(DEFAULT_METADATA_FILE),
            ignore_file: PathBuf::from(DEFAULT_IGNORE_FILE),
            overwrite: true,
        }
    }
}

impl SdistConfig {
    /// Creates a new `SdistConfig` with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the compression level.
    ///
    /// # Panics
    ///
    /// Panics if the compression level is not in the range 1-9.
    /// Use `validate()` for non-panicking validation.
    #[must_use]
    pub fn with_compression_level(mut self, level: u8) -> Self {
        assert!((1..=9).contains(&level), "compression level must be 1-9");
        self.compression_level = Some(level);
        self
    }

    /// Sets whether entries are sorted before writing.
    #[must_use]
    pub fn with_sort_entries(mut self, sort: bool) -> Self {
        self.sort_entries = sort;
        self
    }

    /// Sets the metadata file name.
    #[must_use]
    pub fn with_metadata_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.metadata_file = file.into();
        self
    }

    /// Sets the ignore-pattern file name.
    #[must_use]
    pub fn with_ignore_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.ignore_file = file.into();
        self
    }

    /// Sets whether an existing archive may be replaced.
    #[must_use]
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the compression level is set but not in 1-9.
    pub fn validate(&self) -> Result<()> {
        if let Some(level) = self.compression_level
            && !(1..=9).contains(&level)
        {
            return Err(SdistError::InvalidCompressionLevel { level });
        }
        Ok(())
    }
}

/// A single value passed through the build hook's `config_settings`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSetting {
    /// A plain string value.
    Single(String),
    /// A list of strings (the key was given more than once).
    List(Vec<String>),
}

/// Front-end supplied settings for the build hook.
///
/// Accepted for protocol compatibility; the sdist build does not read them.
pub type ConfigSettings = BTreeMap<String, ConfigSetting>;

/// Parses `KEY=VALUE` pairs into [`ConfigSettings`], folding repeated keys
/// into [`ConfigSetting::List`].
///
/// A pair without `=` maps the key to an empty string.
///
/// # Examples
///
/// ```
/// use sdistr_core::config::{ConfigSetting, parse_config_settings};
///
/// let settings = parse_config_settings(["a=1", "a=2", "b=x"]);
/// assert_eq!(
///     settings["a"],
///     ConfigSetting::List(vec!["1".to_string(), "2".to_string()])
/// );
/// assert_eq!(settings["b"], ConfigSetting::Single("x".to_string()));
/// ```
pub fn parse_config_settings<'a>(pairs: impl IntoIterator<Item = &'a str>) -> ConfigSettings {
    let mut settings = ConfigSettings::new();
    for pair in pairs {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        let value = value.to_string();
        match settings.entry(key.to_string()) {
            Entry::Vacant(slot) => {
                slot.insert(ConfigSetting::Single(value));
            }
            Entry::Occupied(mut slot) => {
                let existing = slot.get_mut();
                let merged = match existing {
                    ConfigSetting::Single(first) => vec![std::mem::take(first), value],
                    ConfigSetting::List(values) => {
                        values.push(value);
                        continue;
                    }
                };
                *existing = ConfigSetting::List(merged);
            }
        }
    }
    settings
}
