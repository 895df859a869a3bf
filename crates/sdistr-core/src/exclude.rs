//! Exclusion filtering driven by an ignore-pattern file.
//!
//! Pattern semantics (negation, directory patterns, last-match-wins) are
//! those of the `ignore` crate's gitignore engine. A file is excluded when
//! it or any of its parent directories is ignored.

use crate::Result;
use crate::SdistConfig;
use crate::SdistError;
use ignore::gitignore::Gitignore;
use ignore::gitignore::GitignoreBuilder;
use std::path::Path;
use std::path::PathBuf;

/// Decides whether a project-relative path is left out of the archive.
///
/// Implemented for [`GitignoreMatcher`] and for any
/// `Fn(&Path, bool) -> bool`, which keeps tests free of pattern files.
///
/// # Examples
///
/// ```
/// use sdistr_core::exclude::PathMatcher;
/// use std::path::Path;
///
/// let skip_logs = |path: &Path, _is_dir: bool| {
///     path.extension().is_some_and(|ext| ext == "log")
/// };
/// assert!(skip_logs.matches(Path::new("build/out.log"), false));
/// assert!(!skip_logs.matches(Path::new("src/lib.py"), false));
/// ```
pub trait PathMatcher {
    /// Returns `true` if `path` (relative to the project root) is excluded.
    fn matches(&self, path: &Path, is_dir: bool) -> bool;
}

impl<F> PathMatcher for F
where
    F: Fn(&Path, bool) -> bool,
{
    fn matches(&self, path: &Path, is_dir: bool) -> bool {
        self(path, is_dir)
    }
}

/// Compiled gitignore patterns rooted at the project directory.
#[derive(Debug, Clone)]
pub struct GitignoreMatcher {
    inner: Gitignore,
    source: PathBuf,
}

impl GitignoreMatcher {
    /// Compiles gitignore-syntax `lines` rooted at `root`.
    ///
    /// `source` is only used in error messages.
    ///
    /// # Errors
    ///
    /// Returns [`SdistError::InvalidIgnoreFile`] if a pattern cannot be
    /// compiled.
    ///
    /// # Examples
    ///
    /// ```
    /// use sdistr_core::exclude::{GitignoreMatcher, PathMatcher};
    /// use std::path::Path;
    ///
    /// let matcher = GitignoreMatcher::from_lines(
    ///     Path::new("/project"),
    ///     Path::new(".gitignore"),
    ///     ["*.log", "!keep.log", "build/"],
    /// )?;
    /// assert!(matcher.matches(Path::new("debug.log"), false));
    /// assert!(!matcher.matches(Path::new("keep.log"), false));
    /// assert!(matcher.matches(Path::new("build/lib/mod.py"), false));
    /// # Ok::<(), sdistr_core::SdistError>(())
    /// ```
    pub fn from_lines<'a>(
        root: &Path,
        source: &Path,
        lines: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self> {
        let mut builder = GitignoreBuilder::new(root);
        for line in lines {
            builder
                .add_line(Some(source.to_path_buf()), line)
                .map_err(|e| invalid_ignore_file(source, &e))?;
        }
        let inner = builder.build().map_err(|e| invalid_ignore_file(source, &e))?;

        Ok(Self {
            inner,
            source: source.to_path_buf(),
        })
    }

    /// Path of the ignore file the patterns were read from.
    #[must_use]
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Number of compiled patterns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if no patterns were compiled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl PathMatcher for GitignoreMatcher {
    fn matches(&self, path: &Path, is_dir: bool) -> bool {
        self.inner
            .matched_path_or_any_parents(path, is_dir)
            .is_ignore()
    }
}

/// Loads the ignore-pattern file named by [`SdistConfig::ignore_file`].
///
/// Returns `Ok(None)` when the file does not exist; filtering is then
/// skipped entirely.
///
/// # Errors
///
/// Returns [`SdistError::Io`] if the file exists but cannot be read and
/// [`SdistError::InvalidIgnoreFile`] if a pattern is invalid.
pub fn load_exclusions(project_root: &Path, config: &SdistConfig) -> Result<Option<GitignoreMatcher>> {
    let path = project_root.join(&config.ignore_file);
    let contents = match std::fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("no ignore file at {}, archiving every file", path.display());
            return Ok(None);
        }
        Err(e) => return Err(SdistError::Io(e)),
    };

    let matcher = GitignoreMatcher::from_lines(project_root, &path, contents.lines())?;
    tracing::debug!(
        patterns = matcher.len(),
        "loaded exclusion patterns from {}",
        path.display()
    );
    Ok(Some(matcher))
}

fn invalid_ignore_file(path: &Path, err: &ignore::Error) -> SdistError {
    SdistError::InvalidIgnoreFile {
        path: path.to_path_buf(),
        reason: err.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn matcher(lines: &[&str]) -> GitignoreMatcher {
        GitignoreMatcher::from_lines(
            Path::new("/project"),
            Path::new(".gitignore"),
            lines.iter().copied(),
        )
        .unwrap()
    }

    #[test]
    fn test_plain_name_matches_at_any_depth() {
        let m = matcher(&["README.md"]);
        assert!(m.matches(Path::new("README.md"), false));
        assert!(m.matches(Path::new("docs/README.md"), false));
        assert!(!m.matches(Path::new("README.rst"), false));
    }

    #[test]
    fn test_anchored_pattern_matches_only_at_root() {
        let m = matcher(&["/setup.cfg"]);
        assert!(m.matches(Path::new("setup.cfg"), false));
        assert!(!m.matches(Path::new("pkg/setup.cfg"), false));
    }

    #[test]
    fn test_directory_pattern_excludes_descendants() {
        let m = matcher(&["build/"]);
        assert!(m.matches(Path::new("build/lib/demo.py"), false));
        assert!(m.matches(Path::new("build"), true));
        // A file named `build` is not a directory.
        assert!(!m.matches(Path::new("build"), false));
    }

    #[test]
    fn test_negation_reincludes() {
        let m = matcher(&["*.log", "!keep.log"]);
        assert!(m.matches(Path::new("a.log"), false));
        assert!(!m.matches(Path::new("keep.log"), false));
    }

    #[test]
    fn test_later_pattern_wins() {
        let m = matcher(&["!keep.log", "*.log"]);
        assert!(m.matches(Path::new("keep.log"), false));
    }

    #[test]
    fn test_comments_and_blank_lines_ignored() {
        let m = matcher(&["# comment", "", "*.pyc"]);
        assert_eq!(m.len(), 1);
        assert!(m.matches(Path::new("pkg/__pycache__/mod.pyc"), false));
    }

    #[test]
    fn test_double_star() {
        let m = matcher(&["**/generated/**"]);
        assert!(m.matches(Path::new("a/b/generated/x.py"), false));
        assert!(!m.matches(Path::new("a/b/x.py"), false));
    }

    #[test]
    fn test_closure_matcher() {
        let never = |_: &Path, _: bool| false;
        assert!(!never.matches(Path::new("anything"), false));
    }

    #[test]
    fn test_load_exclusions_missing_file() {
        let temp = TempDir::new().unwrap();
        let result = load_exclusions(temp.path(), &SdistConfig::default()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_load_exclusions_reads_file() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(".gitignore"), "dist/\n*.egg-info\n").unwrap();

        let m = load_exclusions(temp.path(), &SdistConfig::default())
            .unwrap()
            .unwrap();
        assert_eq!(m.len(), 2);
        assert!(m.source().ends_with(".gitignore"));
        assert!(m.matches(Path::new("dist/demo-0.1.0.tar.gz"), false));
        assert!(m.matches(Path::new("demo.egg-info/PKG-INFO"), false));
    }

    #[test]
    fn test_load_exclusions_custom_file() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(".sdistignore"), "tests/\n").unwrap();

        let config = SdistConfig::default().with_ignore_file(".sdistignore");
        let m = load_exclusions(temp.path(), &config).unwrap().unwrap();
        assert!(m.matches(Path::new("tests/test_a.py"), false));
    }

    #[test]
    fn test_invalid_pattern() {
        let result = GitignoreMatcher::from_lines(
            Path::new("/project"),
            Path::new(".gitignore"),
            ["[unclosed"],
        );
        assert!(matches!(
            result.unwrap_err(),
            SdistError::InvalidIgnoreFile { .. }
        ));
    }
}
