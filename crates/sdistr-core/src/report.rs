//! Build statistics.

use std::time::Duration;

/// Summary of a completed sdist build.
///
/// # Examples
///
/// ```
/// use sdistr_core::BuildReport;
///
/// let mut report = BuildReport::new("demo-0.1.0.tar.gz");
/// report.bytes_written = 1000;
/// report.bytes_compressed = 250;
///
/// assert_eq!(report.compression_ratio(), 4.0);
/// assert_eq!(report.compression_percentage(), 75.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// File name of the archive inside the output directory.
    pub filename: String,

    /// Regular files copied from the project, excluding `PKG-INFO`.
    pub files_added: usize,

    /// Symlinks stored as links.
    pub symlinks_added: usize,

    /// Files left out by the exclusion filter.
    pub files_excluded: usize,

    /// Uncompressed payload bytes, `PKG-INFO` included.
    pub bytes_written: u64,

    /// Size of the finished `.tar.gz`.
    pub bytes_compressed: u64,

    /// Wall time of the build.
    pub duration: Duration,
}

impl BuildReport {
    /// Creates an empty report for `filename`.
    #[must_use]
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            ..Self::default()
        }
    }

    /// Total archive entries including the synthesized `PKG-INFO`.
    #[must_use]
    pub fn total_entries(&self) -> usize {
        self.files_added + self.symlinks_added + 1
    }

    /// Uncompressed over compressed size, or 0.0 when either is zero.
    #[must_use]
    pub fn compression_ratio(&self) -> f64 {
        if self.bytes_compressed == 0 || self.bytes_written == 0 {
            return 0.0;
        }
        self.bytes_written as f64 / self.bytes_compressed as f64
    }

    /// Percentage of space saved by compression, clamped at 0.
    #[must_use]
    pub fn compression_percentage(&self) -> f64 {
        if self.bytes_written == 0 {
            return 0.0;
        }
        let saved = 1.0 - self.bytes_compressed as f64 / self.bytes_written as f64;
        (saved * 100.0).max(0.0)
    }
}
