//! Python source distribution builder.
//!
//! `sdistr-core` packages a Python project into a `{name}-{version}.tar.gz`
//! source distribution: it reads the `[project]` table of `pyproject.toml`,
//! renders the `PKG-INFO` core metadata, walks the project tree while
//! honoring `.gitignore` exclusions, and writes a gzip-compressed tar
//! archive with the metadata appended as the final entry.
//!
//! # Examples
//!
//! ```no_run
//! use sdistr_core::SdistConfig;
//! use sdistr_core::build_sdist_from;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let report = build_sdist_from(".", "dist", &SdistConfig::default())?;
//! println!("Built {} with {} files", report.filename, report.files_added);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod archive;
pub mod config;
pub mod error;
pub mod exclude;
pub mod inspect;
pub mod metadata;
pub mod progress;
pub mod report;
pub mod walker;

// Re-export main API types
pub use api::build_sdist;
pub use api::build_sdist_from;
pub use api::build_sdist_with_progress;
pub use config::ConfigSetting;
pub use config::ConfigSettings;
pub use config::SdistConfig;
pub use config::parse_config_settings;
pub use error::Result;
pub use error::SdistError;
pub use exclude::GitignoreMatcher;
pub use exclude::PathMatcher;
pub use inspect::SdistEntry;
pub use inspect::SdistEntryKind;
pub use inspect::SdistManifest;
pub use inspect::list_sdist;
pub use inspect::read_pkg_info;
pub use metadata::ProjectMetadata;
pub use metadata::load_metadata;
pub use progress::NoopProgress;
pub use progress::ProgressCallback;
pub use report::BuildReport;
