//! Progress reporting during sdist assembly.
//!
//! [`ProgressCallback`] is the hook the CLI uses to drive its progress
//! bar. [`ProgressTracker`] numbers entries, and [`ProgressReader`] reports
//! bytes as file contents are copied into the archive.

use std::io::Read;
use std::path::Path;

/// Default number of bytes accumulated before `on_bytes_written` fires.
const DEFAULT_BATCH_THRESHOLD: u64 = 1024 * 1024;

/// Receives progress events while an archive is being written.
///
/// Paths passed to the callbacks are archive names
/// (`{name}-{version}/...`).
///
/// # Examples
///
/// ```
/// use sdistr_core::ProgressCallback;
/// use std::path::Path;
///
/// struct PrintProgress;
///
/// impl ProgressCallback for PrintProgress {
///     fn on_entry_start(&mut self, path: &Path, total: usize, current: usize) {
///         println!("[{current}/{total}] {}", path.display());
///     }
///
///     fn on_bytes_written(&mut self, _bytes: u64) {}
///
///     fn on_entry_complete(&mut self, _path: &Path) {}
///
///     fn on_complete(&mut self) {
///         println!("done");
///     }
/// }
/// ```
pub trait ProgressCallback: Send {
    /// Called before an entry is written.
    ///
    /// `total` counts every entry including `PKG-INFO`; `current` is
    /// 1-indexed.
    fn on_entry_start(&mut self, path: &Path, total: usize, current: usize);

    /// Called with the number of uncompressed bytes copied since the last
    /// call.
    fn on_bytes_written(&mut self, bytes: u64);

    /// Called after an entry has been written.
    fn on_entry_complete(&mut self, path: &Path);

    /// Called once after the archive has been finalized.
    fn on_complete(&mut self);
}

/// A [`ProgressCallback`] that ignores every event.
#[derive(Debug, Default)]
pub struct NoopProgress;

impl ProgressCallback for NoopProgress {
    fn on_entry_start(&mut self, _path: &Path, _total: usize, _current: usize) {}

    fn on_bytes_written(&mut self, _bytes: u64) {}

    fn on_entry_complete(&mut self, _path: &Path) {}

    fn on_complete(&mut self) {}
}

/// Wraps a callback and numbers entries as they start.
pub struct ProgressTracker<'a> {
    progress: &'a mut dyn ProgressCallback,
    current_entry: usize,
    total_entries: usize,
}

impl<'a> ProgressTracker<'a> {
    /// Creates a tracker expecting `total_entries` entries.
    #[must_use]
    pub fn new(progress: &'a mut dyn ProgressCallback, total_entries: usize) -> Self {
        Self {
            progress,
            current_entry: 0,
            total_entries,
        }
    }

    /// Reports the start of the next entry.
    pub fn on_entry_start(&mut self, path: &Path) {
        self.current_entry += 1;
        self.progress
            .on_entry_start(path, self.total_entries, self.current_entry);
    }

    /// Reports that `path` has been written.
    pub fn on_entry_complete(&mut self, path: &Path) {
        self.progress.on_entry_complete(path);
    }

    /// Reports that the whole archive is done.
    pub fn on_complete(&mut self) {
        self.progress.on_complete();
    }

    /// Number of entries started so far.
    #[must_use]
    pub fn current(&self) -> usize {
        self.current_entry
    }

    /// Borrows the wrapped callback, e.g. for a [`ProgressReader`].
    pub fn callback(&mut self) -> &mut dyn ProgressCallback {
        &mut *self.progress
    }
}

/// Reader adapter reporting bytes read in batches.
///
/// Remaining bytes are flushed to the callback on drop.
pub struct ProgressReader<'a, R> {
    inner: R,
    progress: &'a mut dyn ProgressCallback,
    bytes_since_last_update: u64,
    batch_threshold: u64,
}

impl<'a, R> ProgressReader<'a, R> {
    /// Wraps `inner` with the default 1 MB batch threshold.
    #[must_use]
    pub fn new(inner: R, progress: &'a mut dyn ProgressCallback) -> Self {
        Self::with_batch_threshold(inner, progress, DEFAULT_BATCH_THRESHOLD)
    }

    /// Wraps `inner`, reporting every `batch_threshold` bytes.
    #[must_use]
    pub fn with_batch_threshold(
        inner: R,
        progress: &'a mut dyn ProgressCallback,
        batch_threshold: u64,
    ) -> Self {
        Self {
            inner,
            progress,
            bytes_since_last_update: 0,
            batch_threshold: batch_threshold.max(1),
        }
    }

    fn flush_progress(&mut self) {
        if self.bytes_since_last_update > 0 {
            self.progress.on_bytes_written(self.bytes_since_last_update);
            self.bytes_since_last_update = 0;
        }
    }
}

impl<R: Read> Read for ProgressReader<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let bytes_read = self.inner.read(buf)?;
        self.bytes_since_last_update += bytes_read as u64;
        if self.bytes_since_last_update >= self.batch_threshold {
            self.flush_progress();
        }
        Ok(bytes_read)
    }
}

impl<R> Drop for ProgressReader<'_, R> {
    fn drop(&mut self) {
        self.flush_progress();
    }
}
