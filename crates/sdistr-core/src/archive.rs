//! Gzip-compressed tar writer for source distributions.
//!
//! Headers are ustar; names longer than the 100-byte ustar field get a PAX
//! extended header carrying the full `path` (and `linkpath` for long
//! symlink targets) while the ustar field keeps a truncated copy. The
//! archive is written to a temporary file in the output directory and only
//! renamed to its final name by [`SdistWriter::finish`]; dropping the
//! writer early deletes the temporary file.

use crate::Result;
use crate::SdistError;
use crate::progress::ProgressReader;
use crate::progress::ProgressTracker;
use crate::walker::SourceEntry;
use crate::walker::SourceKind;
use flate2::write::GzEncoder;
use std::fs::File;
use std::io;
use std::io::ErrorKind;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use tar::Builder;
use tar::EntryType;
use tar::Header;
use tempfile::NamedTempFile;

/// Name of the synthesized metadata entry.
pub const PKG_INFO: &str = "PKG-INFO";

/// Size of the ustar `name` and `linkname` fields.
const USTAR_NAME_LEN: usize = 100;

/// Mode of the synthesized `PKG-INFO` entry.
const PKG_INFO_MODE: u32 = 0o644;

/// Mode given to the finished archive file.
#[cfg(unix)]
const ARCHIVE_FILE_MODE: u32 = 0o644;

/// Writes one `.tar.gz` source distribution.
///
/// Every entry is stored under the top-level directory passed to
/// [`SdistWriter::create`].
///
/// # Examples
///
/// ```no_run
/// use sdistr_core::archive::SdistWriter;
/// use std::path::Path;
///
/// let mut writer = SdistWriter::create(Path::new("dist"), "demo-0.1.0", Some(6), true)?;
/// writer.append_pkg_info(b"Metadata-Version: 2.1\nName: demo\nVersion: 0.1.0\n")?;
/// let summary = writer.finish()?;
/// assert!(summary.path.ends_with("demo-0.1.0.tar.gz"));
/// # Ok::<(), sdistr_core::SdistError>(())
/// ```
pub struct SdistWriter {
    builder: Builder<GzEncoder<CountingWriter<NamedTempFile>>>,
    dist_dir: String,
    output_path: PathBuf,
    overwrite: bool,
    files_added: usize,
    symlinks_added: usize,
    bytes_written: u64,
}

/// Totals of a finished archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveSummary {
    /// Final location of the archive.
    pub path: PathBuf,
    /// Regular files appended, excluding `PKG-INFO`.
    pub files_added: usize,
    /// Symlinks appended.
    pub symlinks_added: usize,
    /// Uncompressed payload bytes, `PKG-INFO` included.
    pub bytes_written: u64,
    /// Size of the compressed file.
    pub bytes_compressed: u64,
}

impl SdistWriter {
    /// Starts a new archive `{dist_dir}.tar.gz` in `output_dir`.
    ///
    /// Nothing is visible at the final path until [`finish`](Self::finish)
    /// succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`SdistError::OutputDirNotFound`] if `output_dir` is not a
    /// directory, [`SdistError::OutputExists`] if the archive exists and
    /// `overwrite` is false, and [`SdistError::Io`] if the temporary file
    /// cannot be created.
    pub fn create(
        output_dir: &Path,
        dist_dir: &str,
        compression_level: Option<u8>,
        overwrite: bool,
    ) -> Result<Self> {
        if !output_dir.is_dir() {
            return Err(SdistError::OutputDirNotFound {
                path: output_dir.to_path_buf(),
            });
        }

        let output_path = output_dir.join(format!("{dist_dir}.tar.gz"));
        if !overwrite && output_path.exists() {
            return Err(SdistError::OutputExists { path: output_path });
        }

        let temp = tempfile::Builder::new()
            .prefix(".sdistr-")
            .suffix(".tar.gz.part")
            .tempfile_in(output_dir)?;
        tracing::trace!("writing archive to {}", temp.path().display());

        let level = compression_level_to_flate2(compression_level);
        let encoder = GzEncoder::new(CountingWriter::new(temp), level);

        Ok(Self {
            builder: Builder::new(encoder),
            dist_dir: dist_dir.to_string(),
            output_path,
            overwrite,
            files_added: 0,
            symlinks_added: 0,
            bytes_written: 0,
        })
    }

    /// Final path the archive is renamed to.
    #[must_use]
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Appends one collected source entry, reporting progress.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the source cannot be read or the archive
    /// cannot be written.
    pub fn append_entry(
        &mut self,
        entry: &SourceEntry,
        tracker: &mut ProgressTracker<'_>,
    ) -> Result<()> {
        let arcname = self.arcname(&entry.relative_path)?;
        let shown = PathBuf::from(String::from_utf8_lossy(&arcname).into_owned());

        tracker.on_entry_start(&shown);
        match &entry.kind {
            SourceKind::File => self.append_file(&entry.path, &arcname, tracker)?,
            SourceKind::Symlink { target } => self.append_symlink(&entry.path, &arcname, target)?,
        }
        tracing::trace!("added {}", shown.display());
        tracker.on_entry_complete(&shown);

        Ok(())
    }

    /// Appends the `PKG-INFO` entry holding `descriptor`.
    ///
    /// Regular file, mode `0o644`, mtime 0, size equal to the descriptor
    /// length. Call it after all source entries.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the archive cannot be written.
    pub fn append_pkg_info(&mut self, descriptor: &[u8]) -> Result<()> {
        let arcname = self.arcname(Path::new(PKG_INFO))?;

        let mut header = Header::new_ustar();
        header.set_entry_type(EntryType::Regular);
        header.set_size(descriptor.len() as u64);
        header.set_mode(PKG_INFO_MODE);
        header.set_uid(0);
        header.set_gid(0);
        header.set_mtime(0);

        self.append_with_names(header, &arcname, None, descriptor)?;
        self.bytes_written += descriptor.len() as u64;

        Ok(())
    }

    /// Finishes the tar and gzip streams and renames the archive into
    /// place.
    ///
    /// # Errors
    ///
    /// Returns [`SdistError::OutputExists`] if `overwrite` is false and a
    /// file appeared at the final path, or [`SdistError::Io`] if flushing
    /// or renaming fails. The temporary file is removed on failure.
    pub fn finish(self) -> Result<ArchiveSummary> {
        let encoder = self.builder.into_inner()?;
        let mut counting = encoder.finish()?;
        counting.flush()?;
        let bytes_compressed = counting.total_bytes();
        let temp = counting.into_inner();

        temp.as_file().sync_all()?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            temp.as_file()
                .set_permissions(std::fs::Permissions::from_mode(ARCHIVE_FILE_MODE))?;
        }

        let persisted = if self.overwrite {
            temp.persist(&self.output_path)
        } else {
            temp.persist_noclobber(&self.output_path)
        };
        if let Err(e) = persisted {
            if e.error.kind() == std::io::ErrorKind::AlreadyExists {
                return Err(SdistError::OutputExists {
                    path: self.output_path,
                });
            }
            return Err(SdistError::Io(e.error));
        }

        tracing::info!(
            files = self.files_added,
            symlinks = self.symlinks_added,
            bytes_written = self.bytes_written,
            bytes_compressed,
            "wrote {}",
            self.output_path.display()
        );

        Ok(ArchiveSummary {
            path: self.output_path,
            files_added: self.files_added,
            symlinks_added: self.symlinks_added,
            bytes_written: self.bytes_written,
            bytes_compressed,
        })
    }

    fn append_file(
        &mut self,
        path: &Path,
        arcname: &[u8],
        tracker: &mut ProgressTracker<'_>,
    ) -> Result<()> {
        let file = File::open(path)?;
        let metadata = file.metadata()?;
        let size = metadata.len();

        let mut header = Header::new_ustar();
        header.set_entry_type(EntryType::Regular);
        header.set_size(size);
        set_permissions(&mut header, &metadata);

        let reader = ProgressReader::new(ExactReader::new(file, size), tracker.callback());
        self.append_with_names(header, arcname, None, reader)
            .map_err(|e| match e {
                SdistError::Io(err) if err.kind() == ErrorKind::UnexpectedEof => {
                    SdistError::Io(io::Error::new(
                        ErrorKind::UnexpectedEof,
                        format!("{}: {err}", path.display()),
                    ))
                }
                other => other,
            })?;

        self.files_added += 1;
        self.bytes_written += size;
        Ok(())
    }

    fn append_symlink(&mut self, path: &Path, arcname: &[u8], target: &Path) -> Result<()> {
        let metadata = std::fs::symlink_metadata(path)?;
        let target = path_bytes(target)?;

        let mut header = Header::new_ustar();
        header.set_entry_type(EntryType::Symlink);
        header.set_size(0);
        set_permissions(&mut header, &metadata);

        self.append_with_names(header, arcname, Some(&target), std::io::empty())?;

        self.symlinks_added += 1;
        Ok(())
    }

    /// Writes `header` with `name`/`linkname`, preceded by a PAX extended
    /// header for any value that does not fit its ustar field.
    fn append_with_names<R: Read>(
        &mut self,
        mut header: Header,
        name: &[u8],
        link_name: Option<&[u8]>,
        data: R,
    ) -> Result<()> {
        let mut pax: Vec<(&str, &[u8])> = Vec::new();
        if name.len() > USTAR_NAME_LEN {
            pax.push(("path", name));
        }
        if let Some(link) = link_name
            && link.len() > USTAR_NAME_LEN
        {
            pax.push(("linkpath", link));
        }
        if !pax.is_empty() {
            self.builder.append_pax_extensions(pax)?;
        }

        let old = header.as_old_mut();
        fill_field(&mut old.name, name);
        if let Some(link) = link_name {
            fill_field(&mut old.linkname, link);
        }
        header.set_cksum();

        self.builder.append(&header, data)?;
        Ok(())
    }

    /// `{dist_dir}/{relative}` with forward slashes.
    fn arcname(&self, relative: &Path) -> Result<Vec<u8>> {
        let mut name = self.dist_dir.as_bytes().to_vec();
        for component in relative.components() {
            name.push(b'/');
            name.extend_from_slice(&component_bytes(component.as_os_str())?);
        }
        Ok(name)
    }
}

/// Copies `value` into a NUL-padded header field, truncating if needed.
fn fill_field(field: &mut [u8], value: &[u8]) {
    let len = value.len().min(field.len());
    field[..len].copy_from_slice(&value[..len]);
    field[len..].fill(0);
}

/// Raw bytes of a path using `/` separators.
fn path_bytes(path: &Path) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    for (i, component) in path.components().enumerate() {
        if i > 0 && !out.ends_with(b"/") {
            out.push(b'/');
        }
        match component {
            std::path::Component::RootDir => out.push(b'/'),
            other => out.extend_from_slice(&component_bytes(other.as_os_str())?),
        }
    }
    Ok(out)
}

#[cfg(unix)]
#[allow(clippy::unnecessary_wraps)]
fn component_bytes(component: &std::ffi::OsStr) -> Result<Vec<u8>> {
    use std::os::unix::ffi::OsStrExt;
    Ok(component.as_bytes().to_vec())
}

#[cfg(not(unix))]
fn component_bytes(component: &std::ffi::OsStr) -> Result<Vec<u8>> {
    component
        .to_str()
        .map(|s| s.as_bytes().to_vec())
        .ok_or_else(|| {
            SdistError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("path component is not valid unicode: {}", component.to_string_lossy()),
            ))
        })
}

/// Copies mode, uid, gid and mtime from filesystem metadata.
#[cfg(unix)]
fn set_permissions(header: &mut Header, metadata: &std::fs::Metadata) {
    use std::os::unix::fs::MetadataExt;
    header.set_mode(metadata.mode() & 0o7777);
    header.set_uid(u64::from(metadata.uid()));
    header.set_gid(u64::from(metadata.gid()));
    // mtime can be negative for dates before epoch, clamp to 0
    #[allow(clippy::cast_sign_loss)]
    let mtime = metadata.mtime().max(0) as u64;
    header.set_mtime(mtime);
}

#[cfg(not(unix))]
fn set_permissions(header: &mut Header, metadata: &std::fs::Metadata) {
    let mode = if metadata.permissions().readonly() {
        0o444
    } else {
        0o644
    };
    header.set_mode(mode);

    if let Ok(modified) = metadata.modified()
        && let Ok(duration) = modified.duration_since(std::time::UNIX_EPOCH)
    {
        header.set_mtime(duration.as_secs());
    }
}

/// Maps a 1-9 level to flate2; `None` means the gzip default.
fn compression_level_to_flate2(level: Option<u8>) -> flate2::Compression {
    match level {
        None => flate2::Compression::default(),
        Some(n) => flate2::Compression::new(u32::from(n.clamp(1, 9))),
    }
}

/// Reader yielding exactly `expected` bytes of `inner`.
///
/// Extra bytes (the file grew) are not read; running out early (the file
/// shrank) is an `UnexpectedEof` error so the header size never lies.
struct ExactReader<R> {
    inner: io::Take<R>,
    expected: u64,
}

impl<R: Read> ExactReader<R> {
    fn new(inner: R, expected: u64) -> Self {
        Self {
            inner: inner.take(expected),
            expected,
        }
    }
}

impl<R: Read> Read for ExactReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = self.inner.limit();
        let bytes = self.inner.read(buf)?;
        if bytes == 0 && remaining > 0 && !buf.is_empty() {
            return Err(io::Error::new(
                ErrorKind::UnexpectedEof,
                format!(
                    "expected {} bytes, read {}",
                    self.expected,
                    self.expected - remaining
                ),
            ));
        }
        Ok(bytes)
    }
}

/// Writer adapter counting bytes that reach the underlying file.
struct CountingWriter<W> {
    inner: W,
    bytes_written: u64,
}

impl<W> CountingWriter<W> {
    fn new(inner: W) -> Self {
        Self {
            inner,
            bytes_written: 0,
        }
    }

    fn total_bytes(&self) -> u64 {
        self.bytes_written
    }

    fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let bytes = self.inner.write(buf)?;
        self.bytes_written += bytes as u64;
        Ok(bytes)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}
