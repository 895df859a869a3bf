//! Reading back built source distributions.

use crate::Result;
use crate::SdistError;
use crate::archive::PKG_INFO;
use flate2::read::GzDecoder;
use serde::Serialize;
use std::fs::File;
use std::io::BufReader;
use std::io::Read;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

/// Kind of an entry inside a source distribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "type")]
pub enum SdistEntryKind {
    /// Regular file.
    File,
    /// Directory entry (not produced by this crate, tolerated when reading).
    Directory,
    /// Symbolic link.
    Symlink {
        /// Link target.
        target: PathBuf,
    },
    /// Any other tar entry type.
    Other,
}

/// One entry of a source distribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SdistEntry {
    /// Full archive path, including the top-level directory.
    pub path: PathBuf,
    /// Size in bytes.
    pub size: u64,
    /// Unix permission bits.
    pub mode: u32,
    /// Entry kind.
    #[serde(flatten)]
    pub kind: SdistEntryKind,
}

/// Entries of a source distribution in archive order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SdistManifest {
    /// All entries, in the order they appear in the archive.
    pub entries: Vec<SdistEntry>,
}

impl SdistManifest {
    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` for an empty archive.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of entry sizes.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.entries.iter().map(|e| e.size).sum()
    }

    /// The single top-level directory shared by every entry, if there is
    /// one.
    #[must_use]
    pub fn top_level_dir(&self) -> Option<&Path> {
        let mut top: Option<&Path> = None;
        for entry in &self.entries {
            let first = match entry.path.components().next()? {
                Component::Normal(name) => Path::new(name),
                _ => return None,
            };
            match top {
                None => top = Some(first),
                Some(existing) if existing == first => {}
                Some(_) => return None,
            }
        }
        top
    }

    /// The `{top}/PKG-INFO` entry, if present.
    #[must_use]
    pub fn pkg_info(&self) -> Option<&SdistEntry> {
        self.entries.iter().find(|e| is_pkg_info(&e.path))
    }
}

/// Lists the entries of a `.tar.gz` source distribution.
///
/// # Errors
///
/// Returns [`SdistError::Io`] if the file cannot be opened or is not a
/// valid gzip-compressed tar stream.
///
/// # Examples
///
/// ```no_run
/// use sdistr_core::list_sdist;
///
/// let manifest = list_sdist("dist/demo-0.1.0.tar.gz")?;
/// for entry in &manifest.entries {
///     println!("{} ({} bytes)", entry.path.display(), entry.size);
/// }
/// # Ok::<(), sdistr_core::SdistError>(())
/// ```
pub fn list_sdist<P: AsRef<Path>>(path: P) -> Result<SdistManifest> {
    let path = path.as_ref();
    let mut archive = open_archive(path)?;
    let mut manifest = SdistManifest::default();

    for entry in archive.entries()? {
        let entry = entry?;
        let header = entry.header();
        let kind = match header.entry_type() {
            tar::EntryType::Regular | tar::EntryType::Continuous => SdistEntryKind::File,
            tar::EntryType::Directory => SdistEntryKind::Directory,
            tar::EntryType::Symlink => SdistEntryKind::Symlink {
                target: entry
                    .link_name()?
                    .map(std::borrow::Cow::into_owned)
                    .unwrap_or_default(),
            },
            _ => SdistEntryKind::Other,
        };

        manifest.entries.push(SdistEntry {
            path: entry.path()?.into_owned(),
            size: entry.size(),
            mode: header.mode().unwrap_or(0),
            kind,
        });
    }

    tracing::debug!(entries = manifest.len(), "listed {}", path.display());
    Ok(manifest)
}

/// Returns the contents of the `PKG-INFO` entry of a source distribution.
///
/// # Errors
///
/// Returns [`SdistError::InvalidArchive`] if the archive has no
/// top-level `PKG-INFO`, and [`SdistError::Io`] on read failures.
pub fn read_pkg_info<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
    let path = path.as_ref();
    let mut archive = open_archive(path)?;

    for entry in archive.entries()? {
        let mut entry = entry?;
        if entry.header().entry_type().is_file() && is_pkg_info(&entry.path()?) {
            let mut contents = Vec::new();
            entry.read_to_end(&mut contents)?;
            return Ok(contents);
        }
    }

    Err(SdistError::InvalidArchive {
        path: path.to_path_buf(),
        reason: format!("no top-level {PKG_INFO} entry"),
    })
}

fn open_archive(path: &Path) -> Result<tar::Archive<GzDecoder<BufReader<File>>>> {
    let file = File::open(path)?;
    Ok(tar::Archive::new(GzDecoder::new(BufReader::new(file))))
}

/// `{top}/PKG-INFO` exactly one level deep.
fn is_pkg_info(path: &Path) -> bool {
    let mut components = path.components();
    matches!(
        (components.next(), components.next(), components.next()),
        (Some(Component::Normal(_)), Some(Component::Normal(name)), None) if name == PKG_INFO
    )
}
