//! Tests for the working-directory `build_sdist` hook.
//!
//! The hook builds from the process working directory, so everything that
//! changes it lives in this one test binary and in a single test.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use sdistr_core::build_sdist;
use sdistr_core::list_sdist;
use sdistr_core::parse_config_settings;
use sdistr_core::read_pkg_info;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_build_sdist_uses_working_directory() {
    let project = TempDir::new().unwrap();
    fs::write(
        project.path().join("pyproject.toml"),
        "[project]\nname = \"demo\"\nversion = \"0.1.0\"\n",
    )
    .unwrap();
    fs::create_dir(project.path().join("demo")).unwrap();
    fs::write(project.path().join("demo/__init__.py"), "x = 1\n").unwrap();
    let out = TempDir::new().unwrap();

    let previous = std::env::current_dir().unwrap();
    std::env::set_current_dir(project.path()).unwrap();

    let settings = parse_config_settings(["a=1", "b=2", "b=3"]);
    let with_settings = build_sdist(out.path(), Some(&settings));
    let without_settings = build_sdist(out.path(), None);

    std::env::set_current_dir(previous).unwrap();

    assert_eq!(with_settings.unwrap(), "demo-0.1.0.tar.gz");
    assert_eq!(without_settings.unwrap(), "demo-0.1.0.tar.gz");

    let archive = out.path().join("demo-0.1.0.tar.gz");
    assert!(archive.exists());

    let mut paths: Vec<PathBuf> = list_sdist(&archive)
        .unwrap()
        .entries
        .into_iter()
        .map(|e| e.path)
        .collect();
    paths.sort();
    assert_eq!(
        paths,
        [
            PathBuf::from("demo-0.1.0/PKG-INFO"),
            PathBuf::from("demo-0.1.0/demo/__init__.py"),
            PathBuf::from("demo-0.1.0/pyproject.toml"),
        ]
    );

    let pkg_info = String::from_utf8(read_pkg_info(&archive).unwrap()).unwrap();
    assert!(pkg_info.contains("Name: demo\n"));
    assert!(pkg_info.contains("Version: 0.1.0\n"));
}
