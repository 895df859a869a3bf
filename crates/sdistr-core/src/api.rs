//! High-level public API for building source distributions.

use crate::BuildReport;
use crate::ConfigSettings;
use crate::NoopProgress;
use crate::ProgressCallback;
use crate::Result;
use crate::SdistConfig;
use crate::archive::SdistWriter;
use crate::exclude::PathMatcher;
use crate::exclude::load_exclusions;
use crate::metadata::load_metadata;
use crate::progress::ProgressTracker;
use crate::walker::collect_entries;
use std::path::Path;
use std::time::Instant;

/// PEP 517 `build_sdist` hook.
///
/// Packages the project in the current working directory into
/// `{name}-{version}.tar.gz` inside `output_directory` and returns the file
/// name (not the full path). `config_settings` is accepted for interface
/// compatibility and otherwise ignored.
///
/// # Errors
///
/// Returns an error if:
/// - `pyproject.toml` is missing or invalid
/// - `.gitignore` contains an invalid pattern
/// - `output_directory` does not exist
/// - A source file cannot be read or the archive cannot be written
///
/// # Examples
///
/// ```no_run
/// use sdistr_core::build_sdist;
///
/// let filename = build_sdist("dist", None)?;
/// assert!(filename.ends_with(".tar.gz"));
/// # Ok::<(), sdistr_core::SdistError>(())
/// ```
pub fn build_sdist<P: AsRef<Path>>(
    output_directory: P,
    config_settings: Option<&ConfigSettings>,
) -> Result<String> {
    if let Some(settings) = config_settings
        && !settings.is_empty()
    {
        tracing::debug!(
            keys = ?settings.keys().collect::<Vec<_>>(),
            "ignoring config settings"
        );
    }

    let report = build_sdist_from(".", output_directory, &SdistConfig::default())?;
    Ok(report.filename)
}

/// Builds a source distribution of the project at `project_root`.
///
/// # Errors
///
/// Same as [`build_sdist`], plus [`crate::SdistError::InvalidCompressionLevel`]
/// for an invalid `config`.
///
/// # Examples
///
/// ```no_run
/// use sdistr_core::SdistConfig;
/// use sdistr_core::build_sdist_from;
///
/// let config = SdistConfig::default().with_compression_level(9);
/// let report = build_sdist_from("path/to/project", "dist", &config)?;
/// println!("{}: {} files", report.filename, report.files_added);
/// # Ok::<(), sdistr_core::SdistError>(())
/// ```
pub fn build_sdist_from<P: AsRef<Path>, Q: AsRef<Path>>(
    project_root: P,
    output_directory: Q,
    config: &SdistConfig,
) -> Result<BuildReport> {
    let mut progress = NoopProgress;
    build_sdist_with_progress(project_root, output_directory, config, &mut progress)
}

/// Builds a source distribution, reporting progress per entry.
///
/// Metadata and the file list are gathered before the output file is
/// created, so a metadata error leaves the output directory untouched and
/// an output directory inside the project never archives its own
/// in-progress file.
///
/// # Errors
///
/// Same as [`build_sdist_from`].
pub fn build_sdist_with_progress<P: AsRef<Path>, Q: AsRef<Path>>(
    project_root: P,
    output_directory: Q,
    config: &SdistConfig,
    progress: &mut dyn ProgressCallback,
) -> Result<BuildReport> {
    let project_root = project_root.as_ref();
    let output_directory = output_directory.as_ref();
    let start = Instant::now();

    config.validate()?;

    let metadata = load_metadata(project_root, config)?;
    let exclusions = load_exclusions(project_root, config)?;
    let collected = collect_entries(
        project_root,
        exclusions.as_ref().map(|m| m as &dyn PathMatcher),
        config.sort_entries,
    )?;
    tracing::debug!(
        included = collected.entries.len(),
        excluded = collected.excluded,
        "collected source files from {}",
        project_root.display()
    );

    let dist_dir = metadata.dist_dir_name();
    let mut writer = SdistWriter::create(
        output_directory,
        &dist_dir,
        config.compression_level,
        config.overwrite,
    )?;

    let mut tracker = ProgressTracker::new(progress, collected.entries.len() + 1);
    for entry in &collected.entries {
        writer.append_entry(entry, &mut tracker)?;
    }

    let pkg_info = Path::new(&dist_dir).join(crate::archive::PKG_INFO);
    tracker.on_entry_start(&pkg_info);
    writer.append_pkg_info(&metadata.descriptor)?;
    tracker.on_entry_complete(&pkg_info);

    let summary = writer.finish()?;
    tracker.on_complete();

    let mut report = BuildReport::new(metadata.archive_filename());
    report.files_added = summary.files_added;
    report.symlinks_added = summary.symlinks_added;
    report.files_excluded = collected.excluded;
    report.bytes_written = summary.bytes_written;
    report.bytes_compressed = summary.bytes_compressed;
    report.duration = start.elapsed();

    Ok(report)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::SdistError;
    use crate::list_sdist;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn demo_project() -> TempDir {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("pyproject.toml"),
            "[project]\nname = \"demo\"\nversion = \"0.1.0\"\n",
        )
        .unwrap();
        fs::create_dir(temp.path().join("demo")).unwrap();
        fs::write(temp.path().join("demo/__init__.py"), "").unwrap();
        temp
    }

    #[test]
    fn test_build_sdist_from() {
        let project = demo_project();
        let out = TempDir::new().unwrap();

        let report = build_sdist_from(project.path(), out.path(), &SdistConfig::default()).unwrap();

        assert_eq!(report.filename, "demo-0.1.0.tar.gz");
        assert_eq!(report.files_added, 2);
        assert_eq!(report.files_excluded, 0);
        assert_eq!(report.total_entries(), 3);

        let manifest = list_sdist(out.path().join(&report.filename)).unwrap();
        let paths: Vec<_> = manifest.entries.iter().map(|e| e.path.clone()).collect();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("demo-0.1.0/demo/__init__.py"),
                PathBuf::from("demo-0.1.0/pyproject.toml"),
                PathBuf::from("demo-0.1.0/PKG-INFO"),
            ]
        );
    }

    #[test]
    fn test_invalid_config_rejected_before_work() {
        let project = demo_project();
        let out = TempDir::new().unwrap();
        let mut config = SdistConfig::default();
        config.compression_level = Some(0);

        let err = build_sdist_from(project.path(), out.path(), &config).unwrap_err();
        assert!(matches!(err, SdistError::InvalidCompressionLevel { level: 0 }));
        assert_eq!(fs::read_dir(out.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_missing_output_directory() {
        let project = demo_project();
        let out = TempDir::new().unwrap();

        let err = build_sdist_from(
            project.path(),
            out.path().join("missing"),
            &SdistConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, SdistError::OutputDirNotFound { .. }));
    }

    #[test]
    fn test_progress_sees_every_entry() {
        #[derive(Default)]
        struct Count {
            started: Vec<(usize, usize)>,
            complete: bool,
        }

        impl ProgressCallback for Count {
            fn on_entry_start(&mut self, _path: &Path, total: usize, current: usize) {
                self.started.push((current, total));
            }
            fn on_bytes_written(&mut self, _bytes: u64) {}
            fn on_entry_complete(&mut self, _path: &Path) {}
            fn on_complete(&mut self) {
                self.complete = true;
            }
        }

        let project = demo_project();
        let out = TempDir::new().unwrap();
        let mut count = Count::default();

        build_sdist_with_progress(
            project.path(),
            out.path(),
            &SdistConfig::default(),
            &mut count,
        )
        .unwrap();

        assert_eq!(count.started, vec![(1, 3), (2, 3), (3, 3)]);
        assert!(count.complete);
    }
}
