//! Integration tests for sdistr-core.
//!
//! These tests build real archives from temporary project trees and read
//! them back.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use flate2::read::GzDecoder;
use sdistr_core::SdistConfig;
use sdistr_core::SdistEntryKind;
use sdistr_core::SdistError;
use sdistr_core::build_sdist_from;
use sdistr_core::list_sdist;
use sdistr_core::load_metadata;
use sdistr_core::read_pkg_info;
use std::collections::BTreeMap;
use std::fs;
use std::io::Read;
use std::path::Path;
use std::path::PathBuf;
use tempfile::TempDir;

const DEMO_PYPROJECT: &str = r#"
[project]
name = "demo"
version = "0.1.0"
description = "A demo package"
"#;

/// Creates the two-file demo project. Metadata lives outside the tree so
/// that only the listed files are walked.
fn demo_tree() -> (TempDir, TempDir, SdistConfig) {
    let project = TempDir::new().unwrap();
    fs::create_dir(project.path().join("demo")).unwrap();
    fs::write(project.path().join("demo/__init__.py"), "__version__ = '0.1.0'\n").unwrap();
    fs::write(project.path().join("README.md"), "# demo\n").unwrap();

    let side = TempDir::new().unwrap();
    let pyproject = side.path().join("pyproject.toml");
    fs::write(&pyproject, DEMO_PYPROJECT).unwrap();

    let config = SdistConfig::default()
        .with_metadata_file(pyproject)
        .with_ignore_file(side.path().join("ignore"));
    (project, side, config)
}

fn entry_names(archive: &Path) -> Vec<String> {
    list_sdist(archive)
        .unwrap()
        .entries
        .into_iter()
        .map(|e| e.path.to_string_lossy().into_owned())
        .collect()
}

fn entry_contents(archive: &Path) -> BTreeMap<String, Vec<u8>> {
    let file = fs::File::open(archive).unwrap();
    let mut tar = tar::Archive::new(GzDecoder::new(file));
    tar.entries()
        .unwrap()
        .map(|e| {
            let mut e = e.unwrap();
            let name = e.path().unwrap().to_string_lossy().into_owned();
            let mut data = Vec::new();
            e.read_to_end(&mut data).unwrap();
            (name, data)
        })
        .collect()
}

#[test]
fn test_demo_project_three_entries() {
    let (project, _side, config) = demo_tree();
    let out = TempDir::new().unwrap();

    let report = build_sdist_from(project.path(), out.path(), &config).unwrap();

    assert_eq!(report.filename, "demo-0.1.0.tar.gz");
    assert_eq!(
        entry_names(&out.path().join(&report.filename)),
        vec![
            "demo-0.1.0/README.md",
            "demo-0.1.0/demo/__init__.py",
            "demo-0.1.0/PKG-INFO",
        ]
    );
}

#[test]
fn test_demo_project_with_ignored_readme() {
    let (project, side, config) = demo_tree();
    fs::write(side.path().join("ignore"), "README.md\n").unwrap();
    let out = TempDir::new().unwrap();

    let report = build_sdist_from(project.path(), out.path(), &config).unwrap();

    assert_eq!(report.files_excluded, 1);
    assert_eq!(
        entry_names(&out.path().join(&report.filename)),
        vec!["demo-0.1.0/demo/__init__.py", "demo-0.1.0/PKG-INFO"]
    );
}

#[test]
fn test_missing_metadata_creates_nothing() {
    let project = TempDir::new().unwrap();
    fs::write(project.path().join("setup.py"), "").unwrap();
    let out = TempDir::new().unwrap();

    let err = build_sdist_from(project.path(), out.path(), &SdistConfig::default()).unwrap_err();

    assert!(matches!(err, SdistError::MetadataNotFound { .. }));
    assert!(err.is_metadata_error());
    assert_eq!(fs::read_dir(out.path()).unwrap().count(), 0);
}

#[test]
fn test_in_tree_metadata_and_ignore_files_are_archived() {
    let project = TempDir::new().unwrap();
    fs::write(project.path().join("pyproject.toml"), DEMO_PYPROJECT).unwrap();
    fs::write(project.path().join(".gitignore"), "*.pyc\n").unwrap();
    fs::write(project.path().join("mod.py"), "").unwrap();
    fs::write(project.path().join("mod.pyc"), "").unwrap();
    let out = TempDir::new().unwrap();

    let report = build_sdist_from(project.path(), out.path(), &SdistConfig::default()).unwrap();

    assert_eq!(
        entry_names(&out.path().join(&report.filename)),
        vec![
            "demo-0.1.0/.gitignore",
            "demo-0.1.0/mod.py",
            "demo-0.1.0/pyproject.toml",
            "demo-0.1.0/PKG-INFO",
        ]
    );
}

#[test]
fn test_pkg_info_matches_loaded_descriptor() {
    let (project, _side, config) = demo_tree();
    let out = TempDir::new().unwrap();

    let report = build_sdist_from(project.path(), out.path(), &config).unwrap();
    let archive = out.path().join(&report.filename);

    let metadata = load_metadata(project.path(), &config).unwrap();
    let pkg_info = read_pkg_info(&archive).unwrap();
    assert_eq!(pkg_info, metadata.descriptor);
    assert_eq!(
        String::from_utf8(pkg_info).unwrap(),
        "Metadata-Version: 2.1\nName: demo\nVersion: 0.1.0\nSummary: A demo package\n"
    );

    let manifest = list_sdist(&archive).unwrap();
    let pkg_entries: Vec<_> = manifest
        .entries
        .iter()
        .filter(|e| e.path.ends_with("PKG-INFO"))
        .collect();
    assert_eq!(pkg_entries.len(), 1);
    assert_eq!(pkg_entries[0].size, metadata.descriptor.len() as u64);
    assert_eq!(manifest.entries.last().unwrap().path, Path::new("demo-0.1.0/PKG-INFO"));
}

#[test]
fn test_file_contents_round_trip() {
    let (project, _side, config) = demo_tree();
    let out = TempDir::new().unwrap();

    let report = build_sdist_from(project.path(), out.path(), &config).unwrap();
    let contents = entry_contents(&out.path().join(&report.filename));

    assert_eq!(contents["demo-0.1.0/README.md"], b"# demo\n");
    assert_eq!(
        contents["demo-0.1.0/demo/__init__.py"],
        b"__version__ = '0.1.0'\n"
    );
    assert_eq!(report.bytes_written, 7 + 22 + contents["demo-0.1.0/PKG-INFO"].len() as u64);
}

#[test]
fn test_rebuild_yields_same_entries_and_contents() {
    let (project, _side, config) = demo_tree();
    let out_a = TempDir::new().unwrap();
    let out_b = TempDir::new().unwrap();

    let a = build_sdist_from(project.path(), out_a.path(), &config).unwrap();
    let b = build_sdist_from(project.path(), out_b.path(), &config).unwrap();

    assert_eq!(
        entry_names(&out_a.path().join(&a.filename)),
        entry_names(&out_b.path().join(&b.filename))
    );
    assert_eq!(
        entry_contents(&out_a.path().join(&a.filename)),
        entry_contents(&out_b.path().join(&b.filename))
    );
}

#[test]
fn test_rebuild_into_same_directory_overwrites() {
    let (project, _side, config) = demo_tree();
    let out = TempDir::new().unwrap();

    build_sdist_from(project.path(), out.path(), &config).unwrap();
    fs::write(project.path().join("NEW.txt"), "new").unwrap();
    let report = build_sdist_from(project.path(), out.path(), &config).unwrap();

    assert!(entry_names(&out.path().join(&report.filename)).contains(&"demo-0.1.0/NEW.txt".to_string()));
    assert_eq!(fs::read_dir(out.path()).unwrap().count(), 1);
}

#[test]
fn test_no_overwrite_keeps_existing_archive() {
    let (project, _side, config) = demo_tree();
    let out = TempDir::new().unwrap();
    fs::write(out.path().join("demo-0.1.0.tar.gz"), "existing").unwrap();

    let err = build_sdist_from(project.path(), out.path(), &config.with_overwrite(false)).unwrap_err();

    assert!(matches!(err, SdistError::OutputExists { .. }));
    assert_eq!(fs::read(out.path().join("demo-0.1.0.tar.gz")).unwrap(), b"existing");
}

#[test]
fn test_output_inside_project_does_not_archive_itself() {
    let project = TempDir::new().unwrap();
    fs::write(project.path().join("pyproject.toml"), DEMO_PYPROJECT).unwrap();
    fs::create_dir(project.path().join("dist")).unwrap();

    let report = build_sdist_from(
        project.path(),
        project.path().join("dist"),
        &SdistConfig::default(),
    )
    .unwrap();

    let names = entry_names(&project.path().join("dist").join(&report.filename));
    assert!(names.iter().all(|n| !n.contains("dist/")));
}

#[test]
fn test_gitignore_negation_and_directory_patterns() {
    let project = TempDir::new().unwrap();
    fs::write(project.path().join("pyproject.toml"), DEMO_PYPROJECT).unwrap();
    fs::write(project.path().join(".gitignore"), "*.log\n!keep.log\nbuild/\n").unwrap();
    fs::write(project.path().join("debug.log"), "").unwrap();
    fs::write(project.path().join("keep.log"), "kept").unwrap();
    fs::create_dir_all(project.path().join("build/lib/demo")).unwrap();
    fs::write(project.path().join("build/lib/demo/x.py"), "").unwrap();
    let out = TempDir::new().unwrap();

    let report = build_sdist_from(project.path(), out.path(), &SdistConfig::default()).unwrap();
    let names = entry_names(&out.path().join(&report.filename));

    assert!(names.contains(&"demo-0.1.0/keep.log".to_string()));
    assert!(!names.iter().any(|n| n.ends_with("debug.log")));
    assert!(!names.iter().any(|n| n.contains("/build/")));
    assert_eq!(report.files_excluded, 2);
}

#[test]
fn test_long_paths_round_trip() {
    let project = TempDir::new().unwrap();
    fs::write(project.path().join("pyproject.toml"), DEMO_PYPROJECT).unwrap();

    let mut relative = PathBuf::new();
    for i in 0..6 {
        relative.push(format!("segment_{i}_{}", "x".repeat(25)));
    }
    fs::create_dir_all(project.path().join(&relative)).unwrap();
    relative.push("module_with_a_rather_long_name.py");
    fs::write(project.path().join(&relative), "deep = True\n").unwrap();
    let out = TempDir::new().unwrap();

    let report = build_sdist_from(project.path(), out.path(), &SdistConfig::default()).unwrap();
    let contents = entry_contents(&out.path().join(&report.filename));

    let expected = format!("demo-0.1.0/{}", relative.to_string_lossy());
    assert!(expected.len() > 100);
    assert_eq!(contents[&expected], b"deep = True\n");
}

#[cfg(unix)]
#[test]
fn test_symlinks_stored_as_links() {
    use std::os::unix::fs::symlink;

    let project = TempDir::new().unwrap();
    fs::write(project.path().join("pyproject.toml"), DEMO_PYPROJECT).unwrap();
    fs::write(project.path().join("real.py"), "").unwrap();
    fs::create_dir(project.path().join("pkg")).unwrap();
    fs::write(project.path().join("pkg/inner.py"), "").unwrap();
    symlink("real.py", project.path().join("alias.py")).unwrap();
    symlink("pkg", project.path().join("pkg_alias")).unwrap();
    let out = TempDir::new().unwrap();

    let report = build_sdist_from(project.path(), out.path(), &SdistConfig::default()).unwrap();
    assert_eq!(report.symlinks_added, 1);

    let manifest = list_sdist(out.path().join(&report.filename)).unwrap();
    let alias = manifest
        .entries
        .iter()
        .find(|e| e.path == Path::new("demo-0.1.0/alias.py"))
        .unwrap();
    assert_eq!(
        alias.kind,
        SdistEntryKind::Symlink {
            target: PathBuf::from("real.py")
        }
    );
    assert!(
        manifest
            .entries
            .iter()
            .all(|e| !e.path.starts_with("demo-0.1.0/pkg_alias"))
    );
}

#[cfg(unix)]
#[test]
fn test_file_mode_preserved() {
    use std::os::unix::fs::PermissionsExt;

    let project = TempDir::new().unwrap();
    fs::write(project.path().join("pyproject.toml"), DEMO_PYPROJECT).unwrap();
    let script = project.path().join("run.sh");
    fs::write(&script, "#!/bin/sh\n").unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
    let out = TempDir::new().unwrap();

    let report = build_sdist_from(project.path(), out.path(), &SdistConfig::default()).unwrap();
    let manifest = list_sdist(out.path().join(&report.filename)).unwrap();
    let entry = manifest
        .entries
        .iter()
        .find(|e| e.path == Path::new("demo-0.1.0/run.sh"))
        .unwrap();
    assert_eq!(entry.mode, 0o755);
}

#[test]
fn test_invalid_ignore_pattern_fails_before_output() {
    let project = TempDir::new().unwrap();
    fs::write(project.path().join("pyproject.toml"), DEMO_PYPROJECT).unwrap();
    fs::write(project.path().join(".gitignore"), "[broken\n").unwrap();
    let out = TempDir::new().unwrap();

    let err = build_sdist_from(project.path(), out.path(), &SdistConfig::default()).unwrap_err();

    assert!(matches!(err, SdistError::InvalidIgnoreFile { .. }));
    assert_eq!(fs::read_dir(out.path()).unwrap().count(), 0);
}

#[test]
fn test_normalized_version_in_filename() {
    let project = TempDir::new().unwrap();
    fs::write(
        project.path().join("pyproject.toml"),
        "[project]\nname = \"demo\"\nversion = \"1.0.0-rc1\"\n",
    )
    .unwrap();
    let out = TempDir::new().unwrap();

    let report = build_sdist_from(project.path(), out.path(), &SdistConfig::default()).unwrap();
    assert_eq!(report.filename, "demo-1.0.0rc1.tar.gz");
}
