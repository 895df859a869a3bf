//! Project tree walking with exclusion filtering.
//!
//! Mirrors the file lists of a plain recursive directory walk: directories
//! themselves are never yielded, symlinks to directories are neither
//! yielded nor descended into, and every other symlink is yielded as-is.

use crate::Result;
use crate::SdistError;
use crate::exclude::PathMatcher;
use std::path::Path;
use std::path::PathBuf;
use walkdir::WalkDir;

/// A file selected for the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    /// Full filesystem path.
    pub path: PathBuf,

    /// Path relative to the project root.
    pub relative_path: PathBuf,

    /// Regular file or symlink.
    pub kind: SourceKind,

    /// Size in bytes (0 for symlinks).
    pub size: u64,
}

/// Kind of an archived source entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    /// Regular file.
    File,

    /// Symbolic link stored as a link.
    Symlink {
        /// Link target as read from the filesystem.
        target: PathBuf,
    },
}

/// Outcome of visiting one candidate file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Visit {
    /// The file goes into the archive.
    Include(SourceEntry),
    /// The file matched the exclusion filter; holds its relative path.
    Exclude(PathBuf),
}

/// Walks a project root, classifying candidate files against an optional
/// exclusion matcher.
///
/// # Examples
///
/// ```no_run
/// use sdistr_core::walker::{ProjectWalker, Visit};
/// use std::path::Path;
///
/// let walker = ProjectWalker::new(Path::new("./project"));
/// for visit in walker.walk() {
///     if let Visit::Include(entry) = visit? {
///         println!("would add {}", entry.relative_path.display());
///     }
/// }
/// # Ok::<(), sdistr_core::SdistError>(())
/// ```
pub struct ProjectWalker<'a> {
    root: &'a Path,
    matcher: Option<&'a dyn PathMatcher>,
}

impl<'a> ProjectWalker<'a> {
    /// Creates a walker over `root` with no exclusions.
    #[must_use]
    pub fn new(root: &'a Path) -> Self {
        Self {
            root,
            matcher: None,
        }
    }

    /// Sets the exclusion matcher. `None` disables filtering.
    #[must_use]
    pub fn with_matcher(mut self, matcher: Option<&'a dyn PathMatcher>) -> Self {
        self.matcher = matcher;
        self
    }

    /// Returns an iterator over visited candidate files.
    ///
    /// # Errors
    ///
    /// Items are errors when a directory cannot be read, metadata is
    /// unavailable, or a symlink target cannot be read.
    pub fn walk(&self) -> impl Iterator<Item = Result<Visit>> + '_ {
        WalkDir::new(self.root)
            .follow_links(false)
            .min_depth(1)
            .into_iter()
            .filter_map(move |entry| match entry {
                Ok(entry) => self.visit(&entry).transpose(),
                Err(e) => Some(Err(SdistError::Walk {
                    path: e.path().unwrap_or(self.root).to_path_buf(),
                    reason: e.to_string(),
                })),
            })
    }

    /// Classifies one walk entry. `Ok(None)` means it is not a candidate.
    fn visit(&self, entry: &walkdir::DirEntry) -> Result<Option<Visit>> {
        let file_type = entry.file_type();
        if file_type.is_dir() {
            return Ok(None);
        }

        let path = entry.path();
        let kind = if file_type.is_symlink() {
            if std::fs::metadata(path).is_ok_and(|m| m.is_dir()) {
                tracing::trace!("skipping directory symlink {}", path.display());
                return Ok(None);
            }
            SourceKind::Symlink {
                target: std::fs::read_link(path)?,
            }
        } else if file_type.is_file() {
            SourceKind::File
        } else {
            tracing::trace!("skipping special file {}", path.display());
            return Ok(None);
        };

        let relative_path = relative_to(path, self.root)?;

        if let Some(matcher) = self.matcher
            && matcher.matches(&relative_path, false)
        {
            tracing::trace!("excluded {}", relative_path.display());
            return Ok(Some(Visit::Exclude(relative_path)));
        }

        let size = match kind {
            SourceKind::File => entry
                .metadata()
                .map_err(|e| SdistError::Walk {
                    path: path.to_path_buf(),
                    reason: format!("cannot read metadata: {e}"),
                })?
                .len(),
            SourceKind::Symlink { .. } => 0,
        };

        Ok(Some(Visit::Include(SourceEntry {
            path: path.to_path_buf(),
            relative_path,
            kind,
            size,
        })))
    }
}

/// Entries gathered from a single walk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectedEntries {
    /// Files to archive.
    pub entries: Vec<SourceEntry>,
    /// Number of files left out by the exclusion matcher.
    pub excluded: usize,
}

/// Collects every included file under `root` in one pass.
///
/// With `sort` set, entries are ordered by relative path so repeated walks
/// over the same tree produce the same sequence.
///
/// # Errors
///
/// Returns [`SdistError::Walk`] when a directory cannot be traversed and
/// [`SdistError::Io`] when a symlink target cannot be read.
pub fn collect_entries(
    root: &Path,
    matcher: Option<&dyn PathMatcher>,
    sort: bool,
) -> Result<CollectedEntries> {
    let mut collected = CollectedEntries::default();

    for visit in ProjectWalker::new(root).with_matcher(matcher).walk() {
        match visit? {
            Visit::Include(entry) => collected.entries.push(entry),
            Visit::Exclude(_) => collected.excluded += 1,
        }
    }

    if sort {
        collected
            .entries
            .sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    }

    Ok(collected)
}

/// Computes `path` relative to `root`.
fn relative_to(path: &Path, root: &Path) -> Result<PathBuf> {
    path.strip_prefix(root)
        .map(Path::to_path_buf)
        .map_err(|_| SdistError::Walk {
            path: path.to_path_buf(),
            reason: format!("path is not under project root {}", root.display()),
        })
}
